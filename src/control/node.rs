use std::sync::Arc;

use rand::{rngs::SmallRng, Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{parameter::ControlCell, Control, ControlId, ControlOutput};
use crate::{dsp, graph::ops::BinaryOp};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Abs,
    MidiToFreq,
    FreqToMidi,
}

impl UnaryOp {
    #[inline]
    pub fn apply(self, value: f32) -> f32 {
        match self {
            UnaryOp::Negate => -value,
            UnaryOp::Abs => value.abs(),
            UnaryOp::MidiToFreq => dsp::midi_to_freq(value),
            UnaryOp::FreqToMidi => dsp::freq_to_midi(value),
        }
    }
}

/// Immutable description of a control node, shared by every handle to it.
pub(crate) enum ControlNode {
    Constant(f32),
    /// Parameter or manual trigger, written from outside the render context.
    Cell(Arc<ControlCell>),
    Binary {
        op: BinaryOp,
        a: Control,
        b: Control,
    },
    Unary {
        op: UnaryOp,
        input: Control,
    },
    Metro {
        bpm: Control,
    },
    Random {
        min: Control,
        max: Control,
        trigger: Option<Control>,
    },
    Pulse {
        length: Control,
        trigger: Control,
    },
    SnapToScale {
        input: Control,
        scale: Vec<f32>,
    },
}

impl ControlNode {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ControlNode::Constant(_) => "constant",
            ControlNode::Cell(_) => "cell",
            ControlNode::Binary { .. } => "binary",
            ControlNode::Unary { .. } => "unary",
            ControlNode::Metro { .. } => "metro",
            ControlNode::Random { .. } => "random",
            ControlNode::Pulse { .. } => "pulse",
            ControlNode::SnapToScale { .. } => "snap_to_scale",
        }
    }

    /// Inputs that must be interned (and therefore evaluated) before this node.
    pub(crate) fn inputs(&self) -> impl Iterator<Item = &Control> {
        let (first, second, third) = match self {
            ControlNode::Constant(_) | ControlNode::Cell(_) => (None, None, None),
            ControlNode::Binary { a, b, .. } => (Some(a), Some(b), None),
            ControlNode::Unary { input, .. } => (Some(input), None, None),
            ControlNode::Metro { bpm } => (Some(bpm), None, None),
            ControlNode::Random { min, max, trigger } => (Some(min), Some(max), trigger.as_ref()),
            ControlNode::Pulse { length, trigger } => (Some(length), Some(trigger), None),
            ControlNode::SnapToScale { input, .. } => (Some(input), None, None),
        };
        first.into_iter().chain(second).chain(third)
    }
}

/// Timing of the control tick being evaluated.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TickCtx {
    /// Seconds covered by one control tick.
    pub dt: f64,
}

/// Runtime state of one interned control node.
///
/// Inputs are referenced by slot id; the graph guarantees every input id is
/// smaller than the id of the node reading it.
pub(crate) enum ControlState {
    Constant(f32),
    Cell {
        cell: Arc<ControlCell>,
        seen: u32,
    },
    Binary {
        op: BinaryOp,
        a: ControlId,
        b: ControlId,
    },
    Unary {
        op: UnaryOp,
        input: ControlId,
    },
    Metro {
        bpm: ControlId,
        elapsed: f64,
    },
    Random {
        min: ControlId,
        max: ControlId,
        trigger: Option<ControlId>,
        rng: SmallRng,
        value: f32,
        primed: bool,
    },
    Pulse {
        length: ControlId,
        trigger: ControlId,
        remaining: f64,
        high: bool,
    },
    SnapToScale {
        input: ControlId,
        scale: Box<[f32]>,
    },
}

impl ControlState {
    /// Build runtime state from a description. `resolve` maps each input
    /// handle to its already-interned slot.
    pub(crate) fn from_node(
        node: &ControlNode,
        seed: u64,
        mut resolve: impl FnMut(&Control) -> ControlId,
    ) -> Self {
        match node {
            ControlNode::Constant(value) => ControlState::Constant(*value),
            ControlNode::Cell(cell) => ControlState::Cell {
                cell: Arc::clone(cell),
                seen: 0,
            },
            ControlNode::Binary { op, a, b } => ControlState::Binary {
                op: *op,
                a: resolve(a),
                b: resolve(b),
            },
            ControlNode::Unary { op, input } => ControlState::Unary {
                op: *op,
                input: resolve(input),
            },
            ControlNode::Metro { bpm } => ControlState::Metro {
                bpm: resolve(bpm),
                elapsed: 0.0,
            },
            ControlNode::Random { min, max, trigger } => ControlState::Random {
                min: resolve(min),
                max: resolve(max),
                trigger: trigger.as_ref().map(&mut resolve),
                rng: SmallRng::seed_from_u64(seed),
                value: 0.0,
                primed: false,
            },
            ControlNode::Pulse { length, trigger } => ControlState::Pulse {
                length: resolve(length),
                trigger: resolve(trigger),
                remaining: 0.0,
                high: false,
            },
            ControlNode::SnapToScale { input, scale } => ControlState::SnapToScale {
                input: resolve(input),
                scale: scale.clone().into_boxed_slice(),
            },
        }
    }

    /// Compute this node's output for the current tick. `done` holds the
    /// outputs of every slot evaluated earlier in the same tick.
    pub(crate) fn tick(&mut self, done: &[ControlOutput], ctx: TickCtx) -> ControlOutput {
        let read = |id: ControlId| done.get(id.index()).copied().unwrap_or_default();

        match self {
            ControlState::Constant(value) => ControlOutput {
                value: *value,
                triggered: false,
            },

            ControlState::Cell { cell, seen } => {
                let (value, sequence) = cell.load();
                let triggered = sequence != *seen;
                *seen = sequence;
                ControlOutput { value, triggered }
            }

            ControlState::Binary { op, a, b } => {
                let (a, b) = (read(*a), read(*b));
                ControlOutput {
                    value: op.apply(a.value, b.value),
                    triggered: a.triggered || b.triggered,
                }
            }

            ControlState::Unary { op, input } => {
                let input = read(*input);
                ControlOutput {
                    value: op.apply(input.value),
                    triggered: input.triggered,
                }
            }

            ControlState::Metro { bpm, elapsed } => {
                let bpm = f64::from(read(*bpm).value).max(1e-3);
                let period = 60.0 / bpm;
                let triggered = *elapsed >= period;
                if triggered {
                    *elapsed = (*elapsed - period) % period;
                }
                *elapsed += ctx.dt;
                ControlOutput {
                    value: 1.0,
                    triggered,
                }
            }

            ControlState::Random {
                min,
                max,
                trigger,
                rng,
                value,
                primed,
            } => {
                let fired = trigger.is_some_and(|id| read(id).triggered);
                if fired || !*primed {
                    *value = uniform(rng, read(*min).value, read(*max).value);
                    *primed = true;
                }
                ControlOutput {
                    value: *value,
                    triggered: fired,
                }
            }

            ControlState::Pulse {
                length,
                trigger,
                remaining,
                high,
            } => {
                if read(*trigger).triggered {
                    *remaining = f64::from(read(*length).value.max(0.0));
                    *high = true;
                    return ControlOutput {
                        value: 1.0,
                        triggered: true,
                    };
                }

                if *high {
                    *remaining -= ctx.dt;
                    if *remaining <= 0.0 {
                        *high = false;
                        return ControlOutput {
                            value: 0.0,
                            triggered: true,
                        };
                    }
                }

                ControlOutput {
                    value: if *high { 1.0 } else { 0.0 },
                    triggered: false,
                }
            }

            ControlState::SnapToScale { input, scale } => {
                let input = read(*input);
                ControlOutput {
                    value: snap_to_scale(input.value, scale),
                    triggered: input.triggered,
                }
            }
        }
    }
}

/// Uniform value between `a` and `b` (either order). Spans that are not
/// finite hold the lower bound, or 0 if that is not finite either.
fn uniform(rng: &mut SmallRng, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let span = hi - lo;
    if !span.is_finite() {
        return if lo.is_finite() { lo } else { 0.0 };
    }
    lo + span * rng.gen::<f32>()
}

/// Snap a MIDI note number to the nearest note whose pitch class is in
/// `scale` (semitone offsets from C, e.g. `[0, 2, 4, 7, 11]`).
pub(crate) fn snap_to_scale(note: f32, scale: &[f32]) -> f32 {
    if scale.is_empty() {
        return note;
    }

    let octave = (note / 12.0).floor();
    let pitch_class = note - octave * 12.0;

    let mut best = note;
    let mut best_distance = f32::INFINITY;
    // Candidates from the neighbouring octaves so values near a boundary can
    // snap across it.
    for shift in [-12.0, 0.0, 12.0] {
        for &degree in scale {
            let candidate = degree.rem_euclid(12.0) + shift;
            let distance = (candidate - pitch_class).abs();
            if distance < best_distance {
                best_distance = distance;
                best = octave * 12.0 + candidate;
            }
        }
    }
    best
}
