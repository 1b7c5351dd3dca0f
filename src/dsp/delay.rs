/// Circular delay line. The buffer is sized once at construction; reads and
/// writes never allocate.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Create a delay line able to hold `max_delay_samples` of history.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1) + 2],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len() - 2
    }

    /// Read `delay_samples` behind the write head with linear interpolation.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        // max/min rather than clamp: a NaN delay reads one sample back.
        let delay = delay_samples.max(1.0).min(self.capacity() as f32);
        let whole = delay.floor();
        let frac = delay - whole;

        let idx_a = (self.write_pos + len - whole as usize) % len;
        let idx_b = (idx_a + len - 1) % len;

        let a = self.buffer[idx_a];
        let b = self.buffer[idx_b];
        a + (b - a) * frac
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read the delayed sample, then push `sample`.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: f32) -> f32 {
        let delayed = self.read(delay_samples);
        self.write(sample);
        delayed
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
