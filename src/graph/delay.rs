use crate::{
    control::Control,
    dsp::delay::DelayLine,
    graph::{
        hold::ControlInput,
        node::{Frame, Gen, Generator, GraphBuilder, IntoGen, RenderCtx},
    },
};

/// Used when neither delay time is a constant.
const DEFAULT_MAX_DELAY_SECONDS: f32 = 2.0;

/// Feedback delay with independent left and right delay times (seconds).
///
/// Delay lines are sized in `connect`, once the sample rate is known, to the
/// configured maximum delay. Longer delay times are clamped to it.
pub struct StereoDelay<I> {
    input: I,
    delay_left: ControlInput,
    delay_right: ControlInput,
    feedback: ControlInput,
    wet: ControlInput,
    dry: ControlInput,
    max_delay: f32,
    lines: [DelayLine; 2],
}

pub fn stereo_delay<I: IntoGen>(
    input: I,
    left: impl Into<Control>,
    right: impl Into<Control>,
) -> Gen<StereoDelay<I::Node>> {
    let (left, right) = (left.into(), right.into());
    let max_delay = match (left.constant_value(), right.constant_value()) {
        (Some(l), Some(r)) => l.max(r) * 1.5,
        _ => DEFAULT_MAX_DELAY_SECONDS,
    };

    Gen(StereoDelay {
        input: input.into_gen().into_inner(),
        delay_left: ControlInput::new(left),
        delay_right: ControlInput::new(right),
        feedback: ControlInput::new(0.4),
        wet: ControlInput::new(0.5),
        dry: ControlInput::new(1.0),
        max_delay,
        lines: [DelayLine::new(1), DelayLine::new(1)],
    })
}

impl<I> Gen<StereoDelay<I>> {
    /// Longest delay time the lines can hold, in seconds.
    pub fn max_delay(mut self, seconds: f32) -> Self {
        self.0.max_delay = seconds.max(0.0);
        self
    }

    pub fn feedback(mut self, feedback: impl Into<Control>) -> Self {
        self.0.feedback = ControlInput::new(feedback);
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

impl<I: Generator> Generator for StereoDelay<I> {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        self.input.render_block(out, ctx);

        let sr = ctx.sample_rate;
        let delay = [self.delay_left.value(ctx) * sr, self.delay_right.value(ctx) * sr];
        let feedback = self.feedback.value(ctx).clamp(-0.99, 0.99);
        let (wet, dry) = (self.wet.value(ctx), self.dry.value(ctx));

        let [left_line, right_line] = &mut self.lines;
        for frame in out.iter_mut() {
            let delayed = Frame::new(left_line.read(delay[0]), right_line.read(delay[1]));
            left_line.write(frame.left + delayed.left * feedback);
            right_line.write(frame.right + delayed.right * feedback);
            *frame = *frame * dry + delayed * wet;
        }
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.input.connect(graph);
        self.delay_left.connect(graph);
        self.delay_right.connect(graph);
        self.feedback.connect(graph);
        self.wet.connect(graph);
        self.dry.connect(graph);

        let samples = (self.max_delay * graph.sample_rate()).ceil() as usize;
        self.lines = [DelayLine::new(samples), DelayLine::new(samples)];
    }
}
