use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
}

/// Naive phase-accumulating oscillator. Phase lives in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Saw)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Produce the sample at the current phase, then advance by `freq / sample_rate`.
    #[inline]
    pub fn next_sample(&mut self, freq: f32, sample_rate: f32) -> f32 {
        let p = self.phase;
        let sample = match self.waveform {
            Waveform::Sine => (TAU * p).sin(),
            Waveform::Saw => 2.0 * p - 1.0,
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
        };

        self.phase += freq / sample_rate;
        self.phase -= self.phase.floor();
        sample
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
