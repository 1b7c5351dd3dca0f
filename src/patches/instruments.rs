//! Keyboard instrument - a resonant saw lead played one note at a time.
//!
//! # How It Works
//!
//! 1. `midiNumber` parameter converted to Hz at control rate
//! 2. Sawtooth at that frequency
//! 3. 24 dB low-pass, Q 10, cutoff at twice the note frequency swept by a
//!    1 Hz sine of half the note frequency
//! 4. Percussive envelope (instant attack, 0.5 s decay, no sustain) in legato
//!    mode, retriggered by every write to the `trigger` parameter
//! 5. Optionally a stereo delay (0.5 s left, 0.75 s right)

use crate::{
    control::{Control, Parameters},
    graph::{adsr, lpf24, saw, sine, stereo_delay},
    synth::{EngineConfig, Synth, SynthError},
};

/// Two octaves of a major pentatonic scale, in semitones.
pub const PENTATONIC_DEGREES: [u8; 10] = [0, 2, 4, 7, 9, 12, 14, 16, 19, 21];

const BASE_NOTE: f32 = 44.0;

pub struct Instrument {
    pub synth: Synth,
    pub note: Control,
    pub frequency: Control,
    parameters: Parameters,
}

pub fn instrument(config: EngineConfig, with_delay: bool) -> Result<Instrument, SynthError> {
    let mut synth = Synth::new(config)?;

    let note = synth.add_parameter("midiNumber")?;
    let frequency = note.midi_to_freq();

    let tone = saw(frequency.hold());
    let cutoff = (&frequency * 2.0).hold() + sine(1.0) * 0.5 * frequency.hold();
    let tone = lpf24(tone, cutoff).q(10.0);

    let trigger = synth.add_parameter("trigger")?;
    let envelope = adsr(0.0, 0.5, 0.0, 0.0).trigger(&trigger).legato(true);
    let voice = tone * envelope;

    if with_delay {
        synth.set_output(
            stereo_delay(voice, 0.5, 0.75)
                .wet_level(0.1)
                .feedback(0.2),
        )?;
    } else {
        synth.set_output(voice)?;
    }

    let parameters = synth.parameters();
    Ok(Instrument {
        synth,
        note,
        frequency,
        parameters,
    })
}

impl Instrument {
    /// Handle for playing notes from another thread once the synth is moved
    /// into an audio stream.
    pub fn parameters(&self) -> Parameters {
        self.parameters.clone()
    }

    /// Play scale degree `degree` (clamped to the two-octave scale).
    pub fn play_degree(&self, degree: usize) -> Result<(), SynthError> {
        play_degree(&self.parameters, degree)
    }
}

/// Set the note for `degree` and retrigger the envelope.
pub fn play_degree(parameters: &Parameters, degree: usize) -> Result<(), SynthError> {
    let step = PENTATONIC_DEGREES[degree.min(PENTATONIC_DEGREES.len() - 1)];
    parameters.set("midiNumber", BASE_NOTE + f32::from(step))?;
    // Any write is a trigger, so the value itself only needs to be positive.
    parameters.set("trigger", 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(synth: &mut Synth, frames: usize) -> Vec<f32> {
        let mut buffer = vec![0.0; frames * 2];
        synth.fill_buffer(&mut buffer, frames, 2);
        buffer
    }

    #[test]
    fn silent_until_triggered() {
        let mut keys = instrument(EngineConfig::default(), false).unwrap();
        assert!(render(&mut keys.synth, 1_024).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn degree_sets_note_and_sounds() {
        let mut keys = instrument(EngineConfig::default(), true).unwrap();
        keys.play_degree(3).unwrap();

        let out = render(&mut keys.synth, 2_048);
        assert!(out.iter().any(|s| s.abs() > 0.01));
        assert!(out.iter().all(|s| s.is_finite()));

        let note = keys.synth.value_of(&keys.note).unwrap();
        assert_eq!(note.value, 51.0);
        let freq = keys.synth.value_of(&keys.frequency).unwrap();
        assert!((freq.value - crate::dsp::midi_to_freq(51.0)).abs() < 1e-3);
    }

    #[test]
    fn degree_is_clamped() {
        let keys = instrument(EngineConfig::default(), false).unwrap();
        keys.play_degree(99).unwrap();
        assert_eq!(keys.parameters().get("midiNumber").unwrap(), 65.0);
    }
}
