//! Stateful control-rate generators.
//!
//! Builders follow one pattern: configure with chained setters, then pass the
//! builder anywhere a `impl Into<Control>` is accepted (or call `.into()`).
//! Each conversion creates a new node; convert once and clone the resulting
//! [`Control`] to read the same generator from several places.

use std::sync::Arc;

use super::{node::ControlNode, parameter::ControlCell, Control};

/// Manually fired trigger, e.g. to kick a patch off at start-up.
///
/// Every clone fires the same node.
#[derive(Clone)]
pub struct ControlTrigger {
    cell: Arc<ControlCell>,
    control: Control,
}

impl Default for ControlTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlTrigger {
    pub fn new() -> Self {
        let cell = Arc::new(ControlCell::new(0.0));
        let control = Control::from_node(ControlNode::Cell(Arc::clone(&cell)));
        Self { cell, control }
    }

    /// Fire with value 1. Seen as one trigger at the next control tick.
    pub fn trigger(&self) {
        self.trigger_with(1.0);
    }

    pub fn trigger_with(&self, value: f32) {
        self.cell.write(value);
    }

    pub fn control(&self) -> Control {
        self.control.clone()
    }
}

impl From<&ControlTrigger> for Control {
    fn from(trigger: &ControlTrigger) -> Self {
        trigger.control()
    }
}

/// Metronome: triggers once per beat. The first beat is one period after the
/// synth starts.
pub struct ControlMetro {
    bpm: Control,
}

pub fn metro() -> ControlMetro {
    ControlMetro {
        bpm: Control::constant(120.0),
    }
}

impl ControlMetro {
    pub fn bpm(mut self, bpm: impl Into<Control>) -> Self {
        self.bpm = bpm.into();
        self
    }
}

impl From<ControlMetro> for Control {
    fn from(metro: ControlMetro) -> Self {
        Control::from_node(ControlNode::Metro { bpm: metro.bpm })
    }
}

/// Uniform random value in `[min, max)`, picked once at start and again each
/// time `trigger` fires. Triggered exactly when a new value is picked on a
/// trigger.
pub struct ControlRandom {
    min: Control,
    max: Control,
    trigger: Option<Control>,
}

pub fn random() -> ControlRandom {
    ControlRandom {
        min: Control::constant(0.0),
        max: Control::constant(1.0),
        trigger: None,
    }
}

impl ControlRandom {
    pub fn min(mut self, min: impl Into<Control>) -> Self {
        self.min = min.into();
        self
    }

    pub fn max(mut self, max: impl Into<Control>) -> Self {
        self.max = max.into();
        self
    }

    pub fn trigger(mut self, trigger: impl Into<Control>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }
}

impl From<ControlRandom> for Control {
    fn from(random: ControlRandom) -> Self {
        Control::from_node(ControlNode::Random {
            min: random.min,
            max: random.max,
            trigger: random.trigger,
        })
    }
}

/// Gate: goes to 1 when `trigger` fires, back to 0 after `length` seconds.
/// Both edges are triggers. Re-firing while high restarts the gate.
pub struct ControlPulse {
    length: Control,
    trigger: Control,
}

pub fn pulse() -> ControlPulse {
    ControlPulse {
        length: Control::constant(0.1),
        trigger: Control::constant(0.0),
    }
}

impl ControlPulse {
    pub fn length(mut self, seconds: impl Into<Control>) -> Self {
        self.length = seconds.into();
        self
    }

    pub fn trigger(mut self, trigger: impl Into<Control>) -> Self {
        self.trigger = trigger.into();
        self
    }
}

impl From<ControlPulse> for Control {
    fn from(pulse: ControlPulse) -> Self {
        Control::from_node(ControlNode::Pulse {
            length: pulse.length,
            trigger: pulse.trigger,
        })
    }
}

/// Snap a MIDI note number to the nearest degree of a scale given as semitone
/// offsets from C.
pub struct ControlSnapToScale {
    input: Control,
    scale: Vec<f32>,
}

pub fn snap_to_scale(scale: &[f32]) -> ControlSnapToScale {
    ControlSnapToScale {
        input: Control::constant(0.0),
        scale: scale.to_vec(),
    }
}

impl ControlSnapToScale {
    pub fn input(mut self, input: impl Into<Control>) -> Self {
        self.input = input.into();
        self
    }
}

impl From<ControlSnapToScale> for Control {
    fn from(snap: ControlSnapToScale) -> Self {
        Control::from_node(ControlNode::SnapToScale {
            input: snap.input,
            scale: snap.scale,
        })
    }
}

/// `440 * 2^((note - 69) / 12)`.
pub fn midi_to_freq(note: impl Into<Control>) -> Control {
    note.into().midi_to_freq()
}
