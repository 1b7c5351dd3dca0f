//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! making them safe to embed directly inside generator structs. They stay
//! focused on the signal-processing math so graph nodes can layer on control
//! inputs and composition.

/// Time-domain delay line with fractional read positions.
pub mod delay;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// White and pink noise sources.
pub mod noise;
/// Phase-accumulating oscillator waveforms.
pub mod oscillator;
/// Comb/allpass reverb network.
pub mod reverb;

pub use envelope::EnvelopeState;

/// Convert a MIDI note number (fractional allowed) to Hz. A4 = 69 = 440 Hz.
#[inline]
pub fn midi_to_freq(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

/// Convert a frequency in Hz to a fractional MIDI note number.
#[inline]
pub fn freq_to_midi(freq: f32) -> f32 {
    if freq <= 0.0 {
        return 0.0;
    }
    69.0 + 12.0 * (freq / 440.0).log2()
}
