//! Synesthesia study - five panned voices of pulsed, high-passed pink noise.
//!
//! # How It Works
//!
//! One pink noise source is shared by every voice. Per voice:
//!
//! 1. A reset trigger fires once at start, then on a slow metronome (10-15 bpm)
//! 2. Each reset picks a new pulse rate (50-200 bpm), pulse length
//!    (0.1-0.5 s), filter position and resonance
//! 3. The pulse gates an envelope (decay at half the pulse length) on the noise
//! 4. A 24 dB high-pass with cutoff snapped to a pentatonic-ish scale between
//!    MIDI 40 and 90
//! 5. Panned across the stereo field, left to right by voice index
//!
//! The voice sum is shared again and fed dry plus a 0.2 wet reverb.
//! Each voice bridges its pulse and its filter position for a UI to flash on.

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    control::{midi_to_freq, metro, pulse, random, snap_to_scale, Control, ControlTrigger},
    graph::{adsr, hpf24, pan, pink, reverb, Gen, Generator},
    synth::{ControlEvent, EngineConfig, Synth, SynthError},
};

pub const NUM_VOICES: usize = 5;

const SCALE: [f32; 5] = [0.0, 2.0, 4.0, 7.0, 11.0];

/// Bridged controls of one voice.
#[derive(Clone)]
pub struct VoiceEvents {
    /// 1 on each pulse start, 0 on each pulse end.
    pub pulse: ControlEvent,
    /// Filter position in `[0, 1)`, new value on every reset.
    pub filter_amount: ControlEvent,
    /// Stereo position in `[-1, 1)`.
    pub pan: f32,
}

pub struct Synesthesia {
    pub synth: Synth,
    pub voices: Vec<VoiceEvents>,
}

pub fn synesthesia(config: EngineConfig) -> Result<Synesthesia, SynthError> {
    let mut setup_rng = SmallRng::seed_from_u64(config.seed);
    let mut synth = Synth::new(config)?;

    let noise = synth.share(pink())?;
    let mut all_voices: Option<Gen<Box<dyn Generator>>> = None;
    let mut voices = Vec::with_capacity(NUM_VOICES);

    for i in 0..NUM_VOICES {
        // Fire once at start rather than waiting a whole metronome period.
        let initial = ControlTrigger::new();
        initial.trigger();
        let reset = initial.control() + metro().bpm(setup_rng.gen_range(10.0_f32..15.0));

        let noise_trigger: Control = metro()
            .bpm(random().min(50.0).max(200.0).trigger(&reset))
            .into();
        let pulse_length: Control = random().min(0.1).max(0.5).trigger(&reset).into();
        let gate: Control = pulse().length(&pulse_length).trigger(&noise_trigger).into();

        let envelope = adsr(0.01, 0.0, 0.5, 0.01)
            .decay(&pulse_length * 0.5)
            .trigger(&gate);
        let voice = noise.clone() * envelope;

        let filter_amount: Control = random().min(0.0).max(1.0).trigger(&reset).into();
        let snapped = snap_to_scale(&SCALE).input(40.0 + &filter_amount * 50.0);
        let cutoff = midi_to_freq(snapped);
        let q: Control = random().min(0.5).max(1.0).trigger(&reset).into();
        let voice = hpf24(voice, cutoff.hold()).q(&q * &q * 50.0);

        let position = 2.0 * i as f32 / NUM_VOICES as f32 - 1.0;
        let voice = pan(voice, position) * (15.0 / NUM_VOICES as f32);

        all_voices = Some(match all_voices {
            Some(sum) => (sum + voice).boxed(),
            None => voice.boxed(),
        });

        voices.push(VoiceEvents {
            pulse: synth.bridge(&gate),
            filter_amount: synth.bridge(&filter_amount),
            pan: position,
        });
    }

    if let Some(all_voices) = all_voices {
        let all_voices = synth.share(all_voices)?;
        let tail = reverb(all_voices.clone())
            .density(1.0)
            .dry_level(0.0)
            .wet_level(0.2)
            .decay_time(1.0);
        synth.set_output(all_voices + tail)?;
    }

    Ok(Synesthesia { synth, voices })
}
