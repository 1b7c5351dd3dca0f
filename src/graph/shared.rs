use crate::graph::node::{Frame, Generator, GraphBuilder, RenderCtx};

/// Reads the block of a generator registered with [`crate::Synth::share`].
///
/// The shared generator itself is rendered by the synth once per block, before
/// the output graph; every `SharedGen` clone copies that same block, so a
/// source feeding several consumers is computed once.
#[derive(Debug, Clone)]
pub struct SharedGen {
    pub(crate) index: usize,
    pub(crate) instance: u64,
}

impl Generator for SharedGen {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        match ctx.shared(self.index) {
            Some(block) if block.len() >= out.len() => out.copy_from_slice(&block[..out.len()]),
            _ => out.fill(Frame::ZERO),
        }
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        graph.check_shared(self.instance, self.index);
    }
}
