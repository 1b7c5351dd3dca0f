use crate::{
    control::{Control, ControlId, ControlOutput},
    graph::node::{Frame, Generator, GraphBuilder, RenderCtx},
};

/// A control read by an audio-rate node. Resolved to a control graph slot in
/// `connect`; until then it reads as the control's constant value (or zero).
#[derive(Debug, Clone)]
pub struct ControlInput {
    control: Control,
    id: ControlId,
    fallback: f32,
}

impl ControlInput {
    pub fn new(control: impl Into<Control>) -> Self {
        let control = control.into();
        Self {
            fallback: control.constant_value().unwrap_or(0.0),
            control,
            id: ControlId::UNRESOLVED,
        }
    }

    pub fn connect(&mut self, graph: &mut GraphBuilder) {
        self.id = graph.intern(&self.control);
    }

    #[inline]
    pub fn read(&self, ctx: &RenderCtx) -> ControlOutput {
        if self.id == ControlId::UNRESOLVED {
            return ControlOutput {
                value: self.fallback,
                triggered: false,
            };
        }
        ctx.control(self.id)
    }

    #[inline]
    pub fn value(&self, ctx: &RenderCtx) -> f32 {
        self.read(ctx).value
    }

    pub fn control(&self) -> &Control {
        &self.control
    }
}

/// Sample-and-hold from control rate to audio rate: every frame of the block
/// carries the control's value from the latest tick.
#[derive(Debug, Clone)]
pub struct Hold {
    input: ControlInput,
}

impl Hold {
    pub fn new(control: impl Into<Control>) -> Self {
        Self {
            input: ControlInput::new(control),
        }
    }
}

impl Generator for Hold {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        out.fill(Frame::mono(self.input.value(ctx)));
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.input.connect(graph);
    }
}
