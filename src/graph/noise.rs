use crate::{
    dsp::noise::{PinkNoise, WhiteNoise},
    graph::node::{Frame, Gen, Generator, RenderCtx},
};

const DEFAULT_SEED: u64 = 0x5EED;

enum Source {
    White(WhiteNoise),
    Pink(PinkNoise),
}

/// Mono noise source. Deterministic: the same seed always renders the same
/// stream.
pub struct NoiseNode {
    source: Source,
}

pub fn white() -> Gen<NoiseNode> {
    Gen(NoiseNode {
        source: Source::White(WhiteNoise::new(DEFAULT_SEED)),
    })
}

pub fn pink() -> Gen<NoiseNode> {
    Gen(NoiseNode {
        source: Source::Pink(PinkNoise::new(DEFAULT_SEED)),
    })
}

impl Gen<NoiseNode> {
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.source = match self.0.source {
            Source::White(_) => Source::White(WhiteNoise::new(seed)),
            Source::Pink(_) => Source::Pink(PinkNoise::new(seed)),
        };
        self
    }
}

impl Generator for NoiseNode {
    fn render_block(&mut self, out: &mut [Frame], _ctx: &RenderCtx) {
        match &mut self.source {
            Source::White(noise) => out.fill_with(|| Frame::mono(noise.next_sample())),
            Source::Pink(noise) => out.fill_with(|| Frame::mono(noise.next_sample())),
        }
    }
}
