use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| kind       | passes          | rejects      |
| ---------- | --------------- | ------------ |
| low-pass   | below cutoff    | above cutoff |
| high-pass  | above cutoff    | below cutoff |
| band-pass  | around cutoff   | both sides   |
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

/// Precomputed per-sample coefficients, shared by every channel of a filter.
#[derive(Debug, Clone, Copy)]
pub struct SvfCoefficients {
    g: f32,
    k: f32,
    h: f32,
}

impl SvfCoefficients {
    /// `q` is clamped to a stable range; cutoff is kept below Nyquist. A NaN
    /// cutoff or `q` reads as the lower bound.
    #[inline]
    pub fn new(cutoff_hz: f32, q: f32, sample_rate: f32) -> Self {
        let cutoff = cutoff_hz.max(10.0).min(sample_rate * 0.49);
        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / q.max(0.1).min(50.0);
        let h = 1.0 / (1.0 + g * (g + k));
        Self { g, k, h }
    }
}

/// Topology-preserving-transform state-variable filter (one channel).
#[derive(Debug, Clone, Default)]
pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,
}

impl SVFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, coeffs: &SvfCoefficients) -> FilterOutputs {
        let v3 = sample - self.ic2eq;
        let v1 = coeffs.h * (self.ic1eq + coeffs.g * v3);
        let v2 = self.ic2eq + coeffs.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - coeffs.k * v1 - v2,
        }
    }

    #[inline]
    pub fn process(&mut self, sample: f32, kind: FilterKind, coeffs: &SvfCoefficients) -> f32 {
        let outputs = self.next_sample(sample, coeffs);
        match kind {
            FilterKind::LowPass => outputs.lowpass,
            FilterKind::HighPass => outputs.highpass,
            FilterKind::BandPass => outputs.bandpass,
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
