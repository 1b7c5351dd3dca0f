use std::f32::consts::FRAC_PI_4;

use crate::{
    control::Control,
    graph::{
        hold::ControlInput,
        node::{Frame, Gen, Generator, GraphBuilder, IntoGen, RenderCtx},
    },
};

/// Equal-power mono-to-stereo panner. `pan` runs from -1 (left) through 0
/// (centre, both sides at -3 dB) to 1 (right). The input is downmixed first.
pub struct PanNode<I> {
    input: I,
    pan: ControlInput,
}

pub fn pan<I: IntoGen>(input: I, pan: impl Into<Control>) -> Gen<PanNode<I::Node>> {
    Gen(PanNode {
        input: input.into_gen().into_inner(),
        pan: ControlInput::new(pan),
    })
}

#[inline]
fn gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

impl<I: Generator> Generator for PanNode<I> {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        self.input.render_block(out, ctx);
        let (left, right) = gains(self.pan.value(ctx));
        for frame in out.iter_mut() {
            let mono = frame.mid();
            *frame = Frame::new(mono * left, mono * right);
        }
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.input.connect(graph);
        self.pan.connect(graph);
    }
}
