use std::ops::{Add, Mul, Sub};

use crate::{
    control::{graph::ControlGraph, Control, ControlId, ControlOutput},
    synth::SynthError,
};

/// One stereo audio frame. Mono sources write the same value to both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    pub const ZERO: Frame = Frame {
        left: 0.0,
        right: 0.0,
    };

    #[inline]
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    #[inline]
    pub const fn mono(value: f32) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Average of both channels.
    #[inline]
    pub fn mid(self) -> f32 {
        (self.left + self.right) * 0.5
    }

    #[inline]
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.left), f(self.right))
    }

    #[inline]
    pub fn zip_with(self, other: Frame, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(f(self.left, other.left), f(self.right, other.right))
    }
}

impl Add for Frame {
    type Output = Frame;

    fn add(self, rhs: Frame) -> Frame {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for Frame {
    type Output = Frame;

    fn sub(self, rhs: Frame) -> Frame {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul<f32> for Frame {
    type Output = Frame;

    fn mul(self, rhs: f32) -> Frame {
        self.map(|a| a * rhs)
    }
}

/// Context passed to generators during rendering.
///
/// Carries the sample rate, the index of the control tick that produced the
/// current block, the latest output of every control-rate node and the
/// already-rendered blocks of shared generators.
pub struct RenderCtx<'a> {
    pub sample_rate: f32,
    pub tick: u64,
    controls: &'a [ControlOutput],
    shared: &'a [Vec<Frame>],
}

impl<'a> RenderCtx<'a> {
    pub(crate) fn new(
        sample_rate: f32,
        tick: u64,
        controls: &'a [ControlOutput],
        shared: &'a [Vec<Frame>],
    ) -> Self {
        Self {
            sample_rate,
            tick,
            controls,
            shared,
        }
    }

    /// Context with no control graph behind it; every control input reads zero.
    pub fn standalone(sample_rate: f32) -> RenderCtx<'static> {
        RenderCtx {
            sample_rate,
            tick: 0,
            controls: &[],
            shared: &[],
        }
    }

    /// Latest output of a control node. Unresolved ids read as zero.
    #[inline]
    pub fn control(&self, id: ControlId) -> ControlOutput {
        self.controls.get(id.index()).copied().unwrap_or_default()
    }

    #[inline]
    pub fn shared(&self, index: usize) -> Option<&[Frame]> {
        self.shared.get(index).map(Vec::as_slice)
    }
}

/// Setup-time view of a synth handed to [`Generator::connect`].
///
/// Generators use it to resolve their control inputs to slots in the control
/// graph and to size buffers for the engine's sample rate.
pub struct GraphBuilder<'a> {
    controls: &'a mut ControlGraph,
    sample_rate: f32,
    instance: u64,
    shared_len: usize,
    error: Option<SynthError>,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(
        controls: &'a mut ControlGraph,
        sample_rate: f32,
        instance: u64,
        shared_len: usize,
    ) -> Self {
        Self {
            controls,
            sample_rate,
            instance,
            shared_len,
            error: None,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Register `control` (and everything it reads) with the control graph.
    pub fn intern(&mut self, control: &Control) -> ControlId {
        self.controls.intern(control)
    }

    pub(crate) fn check_shared(&mut self, instance: u64, index: usize) {
        if instance != self.instance || index >= self.shared_len {
            self.error.get_or_insert(SynthError::ForeignHandle);
        }
    }

    pub(crate) fn finish(self) -> Result<(), SynthError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Core trait for audio-rate graph nodes.
///
/// `render_block` is called once per control block, from the render context:
/// implementations must not allocate, lock or block. Everything that needs
/// memory is set up in the constructor or in `connect`.
pub trait Generator: Send {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx);

    /// Resolve control inputs and size buffers. Composite nodes forward this
    /// to their children.
    fn connect(&mut self, _graph: &mut GraphBuilder) {}
}

impl Generator for Box<dyn Generator> {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        (**self).connect(graph)
    }
}

/// Audio-rate node wrapper. Arithmetic on `Gen` values builds new nodes.
#[derive(Debug, Clone)]
pub struct Gen<N>(pub N);

impl<N: Generator> Gen<N> {
    pub fn new(node: N) -> Self {
        Self(node)
    }

    pub fn into_inner(self) -> N {
        self.0
    }

    /// Erase the node type, e.g. to accumulate a sum of voices in a loop.
    pub fn boxed(self) -> Gen<Box<dyn Generator>>
    where
        N: 'static,
    {
        Gen(Box::new(self.0))
    }
}

impl<N: Generator> Generator for Gen<N> {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        self.0.render_block(out, ctx)
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.0.connect(graph)
    }
}

/// Anything usable as an audio-rate operand: `Gen<_>` values and plain `f32`
/// constants. Control-rate nodes are not `IntoGen`; wrap them with
/// [`Control::hold`] to broadcast them across the audio block.
pub trait IntoGen {
    type Node: Generator;

    fn into_gen(self) -> Gen<Self::Node>;
}

impl<N: Generator> IntoGen for Gen<N> {
    type Node = N;

    fn into_gen(self) -> Gen<N> {
        self
    }
}

impl IntoGen for f32 {
    type Node = super::ops::Constant;

    fn into_gen(self) -> Gen<super::ops::Constant> {
        Gen(super::ops::Constant(self))
    }
}
