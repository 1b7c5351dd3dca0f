use crate::{
    control::Control,
    dsp::envelope::{Envelope, EnvelopeState},
    graph::{
        hold::ControlInput,
        node::{Frame, Gen, Generator, GraphBuilder, RenderCtx},
    },
};

/// ADSR envelope driven by a control trigger.
///
/// On a trigger with a positive value the envelope (re)starts its attack; on
/// a trigger with value zero or below it releases. Stage times and sustain
/// level are controls read once per block.
pub struct Adsr {
    env: Envelope,
    attack: ControlInput,
    decay: ControlInput,
    sustain: ControlInput,
    release: ControlInput,
    trigger: Option<ControlInput>,
    legato: bool,
}

pub fn adsr(
    attack: impl Into<Control>,
    decay: impl Into<Control>,
    sustain: impl Into<Control>,
    release: impl Into<Control>,
) -> Gen<Adsr> {
    Gen(Adsr {
        env: Envelope::default(),
        attack: ControlInput::new(attack),
        decay: ControlInput::new(decay),
        sustain: ControlInput::new(sustain),
        release: ControlInput::new(release),
        trigger: None,
        legato: false,
    })
}

impl Gen<Adsr> {
    pub fn attack(mut self, seconds: impl Into<Control>) -> Self {
        self.0.attack = ControlInput::new(seconds);
        self
    }

    pub fn decay(mut self, seconds: impl Into<Control>) -> Self {
        self.0.decay = ControlInput::new(seconds);
        self
    }

    pub fn sustain(mut self, level: impl Into<Control>) -> Self {
        self.0.sustain = ControlInput::new(level);
        self
    }

    pub fn release(mut self, seconds: impl Into<Control>) -> Self {
        self.0.release = ControlInput::new(seconds);
        self
    }

    pub fn trigger(mut self, trigger: impl Into<Control>) -> Self {
        self.0.trigger = Some(ControlInput::new(trigger));
        self
    }

    /// Restart the attack from the current level instead of from zero.
    pub fn legato(mut self, legato: bool) -> Self {
        self.0.legato = legato;
        self
    }
}

impl Adsr {
    pub fn state(&self) -> EnvelopeState {
        self.env.state()
    }
}

impl Generator for Adsr {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        self.env.set_params(
            self.attack.value(ctx),
            self.decay.value(ctx),
            self.sustain.value(ctx),
            self.release.value(ctx),
        );

        if let Some(trigger) = &self.trigger {
            let trigger = trigger.read(ctx);
            if trigger.triggered {
                if trigger.value > 0.0 {
                    self.env.trigger(self.legato);
                } else {
                    self.env.release(ctx.sample_rate);
                }
            }
        }

        for frame in out.iter_mut() {
            *frame = Frame::mono(self.env.next_sample(ctx.sample_rate));
        }
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.attack.connect(graph);
        self.decay.connect(graph);
        self.sustain.connect(graph);
        self.release.connect(graph);
        if let Some(trigger) = &mut self.trigger {
            trigger.connect(graph);
        }
    }
}
