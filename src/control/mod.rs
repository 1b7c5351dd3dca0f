//! Control-rate dataflow.
//!
//! A [`Control`] is a cheap, clonable handle to an immutable expression node:
//! a constant, a parameter, an arithmetic combination of other controls, or
//! one of the stateful generators in [`catalog`] (metronome, random, pulse,
//! scale snapping). Cloning a handle shares the node, so a control read from
//! several places is still evaluated exactly once per control tick.
//!
//! Nothing is evaluated until a control is reachable from a synth's output,
//! from a shared generator or from a bridge. At that point it is interned
//! into the synth's [`graph::ControlGraph`], which owns all runtime state.
//!
//! ```ignore
//! let note = synth.add_parameter("midiNumber")?;
//! let freq = control::midi_to_freq(&note);
//! let cutoff = &freq * 2.0 + 100.0;
//! ```

pub mod catalog;
pub mod graph;
pub mod node;
pub mod parameter;

use std::{
    ops::{Add, Div, Mul, Neg, Sub},
    sync::Arc,
};

use crate::graph::{ops::BinaryOp, Gen, Hold};

pub use catalog::{
    metro, midi_to_freq, pulse, random, snap_to_scale, ControlMetro, ControlPulse, ControlRandom,
    ControlSnapToScale, ControlTrigger,
};
pub use node::UnaryOp;
pub use parameter::{ParameterSpec, Parameters};

use node::ControlNode;

/// Value and trigger flag produced by a control node on one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlOutput {
    pub value: f32,
    pub triggered: bool,
}

/// Slot index of an interned control node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(usize);

impl ControlId {
    /// Id of a control input that has not been connected to a synth yet.
    pub const UNRESOLVED: ControlId = ControlId(usize::MAX);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a control-rate node.
#[derive(Clone)]
pub struct Control {
    node: Arc<ControlNode>,
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("node", &self.node.kind())
            .finish()
    }
}

impl Control {
    pub(crate) fn from_node(node: ControlNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    pub fn constant(value: f32) -> Self {
        Self::from_node(ControlNode::Constant(value))
    }

    pub(crate) fn node(&self) -> &ControlNode {
        &self.node
    }

    /// Identity of the shared node. Two handles with the same key always
    /// evaluate to the same output.
    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.node) as usize
    }

    /// True if both handles point at the same node.
    pub fn same_node(&self, other: &Control) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// The value of a constant node, `None` for anything that can change.
    pub fn constant_value(&self) -> Option<f32> {
        match *self.node {
            ControlNode::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Broadcast this control's latest value across every frame of an audio
    /// block.
    pub fn hold(&self) -> Gen<Hold> {
        Gen(Hold::new(self.clone()))
    }

    pub fn min(&self, other: impl Into<Control>) -> Control {
        combine(BinaryOp::Min, self.clone(), other)
    }

    pub fn max(&self, other: impl Into<Control>) -> Control {
        combine(BinaryOp::Max, self.clone(), other)
    }

    pub fn abs(&self) -> Control {
        self.unary(UnaryOp::Abs)
    }

    pub fn midi_to_freq(&self) -> Control {
        self.unary(UnaryOp::MidiToFreq)
    }

    pub fn freq_to_midi(&self) -> Control {
        self.unary(UnaryOp::FreqToMidi)
    }

    fn unary(&self, op: UnaryOp) -> Control {
        Self::from_node(ControlNode::Unary {
            op,
            input: self.clone(),
        })
    }
}

impl From<f32> for Control {
    fn from(value: f32) -> Self {
        Control::constant(value)
    }
}

impl From<&Control> for Control {
    fn from(value: &Control) -> Self {
        value.clone()
    }
}

/// Build a binary node over two controls. The result is triggered whenever
/// either operand is.
pub fn combine(op: BinaryOp, a: impl Into<Control>, b: impl Into<Control>) -> Control {
    Control::from_node(ControlNode::Binary {
        op,
        a: a.into(),
        b: b.into(),
    })
}

macro_rules! impl_control_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<Control>> $trait<R> for Control {
            type Output = Control;

            fn $method(self, rhs: R) -> Control {
                combine($op, self, rhs)
            }
        }

        impl<R: Into<Control>> $trait<R> for &Control {
            type Output = Control;

            fn $method(self, rhs: R) -> Control {
                combine($op, self, rhs)
            }
        }

        impl $trait<Control> for f32 {
            type Output = Control;

            fn $method(self, rhs: Control) -> Control {
                combine($op, self, rhs)
            }
        }

        impl $trait<&Control> for f32 {
            type Output = Control;

            fn $method(self, rhs: &Control) -> Control {
                combine($op, self, rhs)
            }
        }
    };
}

impl_control_op!(Add, add, BinaryOp::Add);
impl_control_op!(Sub, sub, BinaryOp::Subtract);
impl_control_op!(Mul, mul, BinaryOp::Multiply);
impl_control_op!(Div, div, BinaryOp::Divide);

impl Neg for Control {
    type Output = Control;

    fn neg(self) -> Control {
        self.unary(UnaryOp::Negate)
    }
}

impl Neg for &Control {
    type Output = Control;

    fn neg(self) -> Control {
        self.unary(UnaryOp::Negate)
    }
}
