#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::SynthError;

/// Engine configuration, handed to a synth once at setup.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Frames per audio callback requested from the output device.
    pub buffer_size: u32,
    pub channels: u16,
    /// Index into the host's output devices; `None` picks the default device.
    pub output_device: Option<usize>,
    /// Seed for every random control node and noise source in patches.
    pub seed: u64,
    /// Measure render time and count late buffers.
    pub diagnostics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            buffer_size: 512,
            channels: 2,
            output_device: None,
            seed: 0,
            diagnostics: false,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_buffer_size(mut self, frames: u32) -> Self {
        self.buffer_size = frames;
        self
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_output_device(mut self, index: usize) -> Self {
        self.output_device = Some(index);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), SynthError> {
        if !(self.sample_rate.is_finite() && self.sample_rate >= 1_000.0) {
            return Err(SynthError::InvalidConfig(format!(
                "sample rate {} Hz is not usable",
                self.sample_rate
            )));
        }
        if self.buffer_size == 0 {
            return Err(SynthError::InvalidConfig("buffer size must be non-zero".into()));
        }
        if self.channels == 0 {
            return Err(SynthError::InvalidConfig("channel count must be non-zero".into()));
        }
        Ok(())
    }
}
