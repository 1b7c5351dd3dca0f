use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Uniform white noise in `[-1, 1)`, deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    rng: SmallRng,
}

impl WhiteNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }
}

/// Pink (-3 dB/octave) noise using Paul Kellet's filter bank over white noise.
#[derive(Debug, Clone)]
pub struct PinkNoise {
    white: WhiteNoise,
    b: [f32; 7],
}

impl PinkNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            white: WhiteNoise::new(seed),
            b: [0.0; 7],
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let white = self.white.next_sample();
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.0555179;
        b[1] = 0.99332 * b[1] + white * 0.0750759;
        b[2] = 0.96900 * b[2] + white * 0.1538520;
        b[3] = 0.86650 * b[3] + white * 0.3104856;
        b[4] = 0.55000 * b[4] + white * 0.5329522;
        b[5] = -0.7616 * b[5] - white * 0.0168980;
        let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        b[6] = white * 0.115926;
        pink * 0.11
    }
}
