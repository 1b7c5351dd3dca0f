use crate::{
    control::Control,
    dsp::filter::{FilterKind, SVFilter, SvfCoefficients},
    graph::{
        hold::ControlInput,
        node::{Frame, Gen, Generator, GraphBuilder, IntoGen, RenderCtx},
    },
    CONTROL_BLOCK_SIZE,
};

/*
State-Variable Filters
======================

Cutoff is an audio-rate input so it can be swept by an envelope or LFO; Q is
a control. Coefficients are recomputed per sample from the cutoff and shared
by both channels, each of which keeps its own filter state.

  lpf12 / hpf12 / bpf12   one SVF stage  (12 dB/oct)
  lpf24 / hpf24           two cascaded   (24 dB/oct)

Example:
  let freq = note.midi_to_freq();
  let cutoff = (&freq * 2.0).hold() + sine(1.0) * 0.5 * freq.hold();
  let tone = lpf24(saw(freq.hold()), cutoff).q(10.0);
*/

const DEFAULT_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

pub struct FilterNode<I, C> {
    kind: FilterKind,
    input: I,
    cutoff: C,
    q: ControlInput,
    stages: usize,
    // [stage][channel]
    state: [[SVFilter; 2]; 2],
    cutoff_buf: Vec<Frame>,
}

fn filter<I: IntoGen, C: IntoGen>(
    kind: FilterKind,
    stages: usize,
    input: I,
    cutoff: C,
) -> Gen<FilterNode<I::Node, C::Node>> {
    Gen(FilterNode {
        kind,
        input: input.into_gen().into_inner(),
        cutoff: cutoff.into_gen().into_inner(),
        q: ControlInput::new(DEFAULT_Q),
        stages,
        state: Default::default(),
        cutoff_buf: vec![Frame::ZERO; CONTROL_BLOCK_SIZE],
    })
}

pub fn lpf12<I: IntoGen, C: IntoGen>(input: I, cutoff: C) -> Gen<FilterNode<I::Node, C::Node>> {
    filter(FilterKind::LowPass, 1, input, cutoff)
}

pub fn lpf24<I: IntoGen, C: IntoGen>(input: I, cutoff: C) -> Gen<FilterNode<I::Node, C::Node>> {
    filter(FilterKind::LowPass, 2, input, cutoff)
}

pub fn hpf12<I: IntoGen, C: IntoGen>(input: I, cutoff: C) -> Gen<FilterNode<I::Node, C::Node>> {
    filter(FilterKind::HighPass, 1, input, cutoff)
}

pub fn hpf24<I: IntoGen, C: IntoGen>(input: I, cutoff: C) -> Gen<FilterNode<I::Node, C::Node>> {
    filter(FilterKind::HighPass, 2, input, cutoff)
}

pub fn bpf12<I: IntoGen, C: IntoGen>(input: I, cutoff: C) -> Gen<FilterNode<I::Node, C::Node>> {
    filter(FilterKind::BandPass, 1, input, cutoff)
}

impl<I, C> Gen<FilterNode<I, C>> {
    /// Resonance. Clamped to a stable range while rendering.
    pub fn q(mut self, q: impl Into<Control>) -> Self {
        self.0.q = ControlInput::new(q);
        self
    }
}

impl<I, C> FilterNode<I, C> {
    pub fn kind(&self) -> FilterKind {
        self.kind
    }
}

impl<I: Generator, C: Generator> Generator for FilterNode<I, C> {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        self.input.render_block(out, ctx);
        let q = self.q.value(ctx);
        let (kind, stages) = (self.kind, self.stages);

        for chunk in out.chunks_mut(self.cutoff_buf.len()) {
            let cutoff = &mut self.cutoff_buf[..chunk.len()];
            self.cutoff.render_block(cutoff, ctx);

            for (frame, fc) in chunk.iter_mut().zip(cutoff.iter()) {
                let coeffs = SvfCoefficients::new(fc.left, q, ctx.sample_rate);
                let (mut left, mut right) = (frame.left, frame.right);
                for stage in &mut self.state[..stages] {
                    left = stage[0].process(left, kind, &coeffs);
                    right = stage[1].process(right, kind, &coeffs);
                }
                *frame = Frame::new(left, right);
            }
        }
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.input.connect(graph);
        self.cutoff.connect(graph);
        self.q.connect(graph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::oscillator::sine;

    fn peak(mut node: impl Generator) -> f32 {
        let ctx = RenderCtx::standalone(44_100.0);
        let mut out = vec![Frame::ZERO; 512];
        // Let the filter settle before measuring.
        for _ in 0..8 {
            node.render_block(&mut out, &ctx);
        }
        out.iter().map(|f| f.left.abs()).fold(0.0, f32::max)
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let passed = peak(lpf12(sine(100.0), 2_000.0));
        let cut = peak(lpf12(sine(8_000.0), 200.0));
        assert!(passed > 0.8, "passband peak {}", passed);
        assert!(cut < 0.05, "stopband peak {}", cut);
    }

    #[test]
    fn four_pole_is_steeper_than_two_pole() {
        let two = peak(lpf12(sine(4_000.0), 500.0));
        let four = peak(lpf24(sine(4_000.0), 500.0));
        assert!(four < two);
    }

    #[test]
    fn highpass_removes_low_end() {
        let low = peak(hpf24(sine(50.0), 2_000.0));
        let high = peak(hpf24(sine(10_000.0), 2_000.0));
        assert!(low < 0.01);
        assert!(high > 0.8);
    }
}
