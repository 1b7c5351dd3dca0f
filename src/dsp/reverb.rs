//! Reverb via a Schroeder delay network.
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) ──→ [Allpass 1] ──→ [Allpass 2] ──→ Output
//!         └──→ [Comb 4] ──┘
//! ```
//!
//! Comb feedback is derived from the requested decay time (RT60) so that each
//! comb's echoes fall by 60 dB after `decay_time` seconds regardless of its
//! length. Allpass gain is driven by `density`. Buffers are allocated once in
//! [`SchroederReverb::new`]; every setter is allocation-free.

/// Comb lengths in ms; mutually prime-ish so echoes don't pile up.
const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];

/// Offset added to the right channel's delay lengths for stereo width.
pub const STEREO_SPREAD_SAMPLES: usize = 23;

#[derive(Debug, Clone)]
pub struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];

        // One-pole lowpass in the loop absorbs high frequencies.
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;
        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

#[derive(Debug, Clone)]
pub struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.9);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let output = -self.feedback * input + delayed;

        self.buffer[self.write_pos] = input + self.feedback * output;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// One channel of Schroeder reverb: 4 parallel combs into 2 series allpasses.
#[derive(Debug, Clone)]
pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
    sample_rate: f32,
}

impl SchroederReverb {
    /// `room_size` scales every delay length (1.0 = nominal). `spread` pads
    /// each length by a fixed number of samples to decorrelate channels.
    pub fn new(sample_rate: f32, room_size: f32, spread: usize) -> Self {
        let scale = room_size.clamp(0.1, 4.0) * sample_rate / 1000.0;
        let len = |ms: f32| (ms * scale) as usize + spread;

        Self {
            combs: COMB_DELAYS_MS.map(|ms| CombFilter::new(len(ms))),
            allpasses: ALLPASS_DELAYS_MS.map(|ms| AllpassFilter::new(len(ms))),
            sample_rate,
        }
    }

    /// Set the time (seconds) for the tail to fall by 60 dB.
    pub fn set_decay_time(&mut self, decay_time: f32) {
        let decay_time = decay_time.max(0.01);
        for comb in &mut self.combs {
            let delay_s = comb.delay_samples() as f32 / self.sample_rate;
            comb.set_feedback(10.0_f32.powf(-3.0 * delay_s / decay_time));
        }
    }

    /// High frequency absorption, 0 (bright) to 1 (dark).
    pub fn set_damping(&mut self, damp: f32) {
        for comb in &mut self.combs {
            comb.set_damp(damp);
        }
    }

    /// Diffusion amount, 0 (sparse echoes) to 1 (smooth wash).
    pub fn set_density(&mut self, density: f32) {
        let gain = 0.3 + density.clamp(0.0, 1.0) * 0.4;
        for allpass in &mut self.allpasses {
            allpass.set_feedback(gain);
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25;

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }

        output
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}
