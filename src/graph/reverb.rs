use crate::{
    control::Control,
    dsp::reverb::{SchroederReverb, STEREO_SPREAD_SAMPLES},
    graph::{
        hold::ControlInput,
        node::{Frame, Gen, Generator, GraphBuilder, IntoGen, RenderCtx},
    },
};

/// Stereo Schroeder reverb. Each channel runs its own network; the right one
/// is detuned by a few samples for width.
///
/// Networks are built in `connect` for the engine's sample rate. An
/// unconnected reverb passes its input through at the dry level.
pub struct ReverbNode<I> {
    input: I,
    room_size: f32,
    decay_time: ControlInput,
    density: ControlInput,
    damping: ControlInput,
    wet: ControlInput,
    dry: ControlInput,
    channels: Option<[SchroederReverb; 2]>,
}

pub fn reverb<I: IntoGen>(input: I) -> Gen<ReverbNode<I::Node>> {
    Gen(ReverbNode {
        input: input.into_gen().into_inner(),
        room_size: 1.0,
        decay_time: ControlInput::new(1.5),
        density: ControlInput::new(0.5),
        damping: ControlInput::new(0.5),
        wet: ControlInput::new(0.3),
        dry: ControlInput::new(1.0),
        channels: None,
    })
}

impl<I> Gen<ReverbNode<I>> {
    /// Scales every delay length. Fixed once the reverb is connected.
    pub fn room_size(mut self, size: f32) -> Self {
        self.0.room_size = size;
        self
    }

    /// Seconds for the tail to fall by 60 dB.
    pub fn decay_time(mut self, seconds: impl Into<Control>) -> Self {
        self.0.decay_time = ControlInput::new(seconds);
        self
    }

    pub fn density(mut self, density: impl Into<Control>) -> Self {
        self.0.density = ControlInput::new(density);
        self
    }

    pub fn damping(mut self, damping: impl Into<Control>) -> Self {
        self.0.damping = ControlInput::new(damping);
        self
    }

    pub fn wet_level(mut self, level: impl Into<Control>) -> Self {
        self.0.wet = ControlInput::new(level);
        self
    }

    pub fn dry_level(mut self, level: impl Into<Control>) -> Self {
        self.0.dry = ControlInput::new(level);
        self
    }
}

impl<I> ReverbNode<I> {
    fn build(&mut self, sample_rate: f32) {
        self.channels = Some([
            SchroederReverb::new(sample_rate, self.room_size, 0),
            SchroederReverb::new(sample_rate, self.room_size, STEREO_SPREAD_SAMPLES),
        ]);
    }
}

impl<I: Generator> Generator for ReverbNode<I> {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        self.input.render_block(out, ctx);
        let (wet, dry) = (self.wet.value(ctx), self.dry.value(ctx));

        let Some([left, right]) = &mut self.channels else {
            out.iter_mut().for_each(|frame| *frame = *frame * dry);
            return;
        };

        let (decay, density, damping) = (
            self.decay_time.value(ctx),
            self.density.value(ctx),
            self.damping.value(ctx),
        );
        for channel in [&mut *left, &mut *right] {
            channel.set_decay_time(decay);
            channel.set_density(density);
            channel.set_damping(damping);
        }

        for frame in out.iter_mut() {
            let tail = Frame::new(left.process(frame.left), right.process(frame.right));
            *frame = *frame * dry + tail * wet;
        }
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.input.connect(graph);
        self.decay_time.connect(graph);
        self.density.connect(graph);
        self.damping.connect(graph);
        self.wet.connect(graph);
        self.dry.connect(graph);
        self.build(graph.sample_rate());
    }
}
