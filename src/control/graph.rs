use std::collections::HashMap;

use tracing::trace;

use super::{
    node::{ControlState, TickCtx},
    Control, ControlId, ControlOutput,
};
use crate::CONTROL_BLOCK_SIZE;

struct Slot {
    state: ControlState,
    evaluations: u64,
}

/// Arena of every control node reachable from one synth.
///
/// Nodes are interned by identity: however many handles or consumers refer to
/// a node, it occupies one slot. Inputs are always interned before the node
/// reading them, so slot order is a valid evaluation order and one pass over
/// the arena evaluates each node exactly once per tick.
pub struct ControlGraph {
    slots: Vec<Slot>,
    outputs: Vec<ControlOutput>,
    index: HashMap<usize, ControlId>,
    // Keeps interned nodes alive so their identity keys are never reused.
    sources: Vec<Control>,
    seed: u64,
    ticks: u64,
    dt: f64,
}

/// Mixes the engine seed with a slot index so each random node gets its own
/// reproducible stream.
fn slot_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl ControlGraph {
    pub(crate) fn new(sample_rate: f32, seed: u64) -> Self {
        Self {
            slots: Vec::new(),
            outputs: Vec::new(),
            index: HashMap::new(),
            sources: Vec::new(),
            seed,
            ticks: 0,
            dt: CONTROL_BLOCK_SIZE as f64 / f64::from(sample_rate),
        }
    }

    /// Intern `control` and, recursively, everything it reads. Returns the
    /// existing slot if the node is already known.
    pub(crate) fn intern(&mut self, control: &Control) -> ControlId {
        if let Some(&id) = self.index.get(&control.key()) {
            return id;
        }

        let node = control.node();
        for input in node.inputs() {
            self.intern(input);
        }

        let id = ControlId::new(self.slots.len());
        let state = ControlState::from_node(node, slot_seed(self.seed, id.index()), |input| {
            self.lookup(input).unwrap_or(ControlId::UNRESOLVED)
        });

        self.slots.push(Slot {
            state,
            evaluations: 0,
        });
        self.outputs.push(ControlOutput::default());
        self.index.insert(control.key(), id);
        self.sources.push(control.clone());

        trace!(slot = id.index(), kind = node.kind(), "control node interned");
        id
    }

    pub(crate) fn lookup(&self, control: &Control) -> Option<ControlId> {
        self.index.get(&control.key()).copied()
    }

    /// Evaluate every slot once, in dependency order.
    pub(crate) fn tick(&mut self) {
        let ctx = TickCtx { dt: self.dt };
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let (done, rest) = self.outputs.split_at_mut(index);
            rest[0] = slot.state.tick(done, ctx);
            slot.evaluations += 1;
        }
        self.ticks += 1;
    }

    pub(crate) fn outputs(&self) -> &[ControlOutput] {
        &self.outputs
    }

    pub(crate) fn output(&self, id: ControlId) -> ControlOutput {
        self.outputs.get(id.index()).copied().unwrap_or_default()
    }

    pub(crate) fn evaluations(&self, id: ControlId) -> u64 {
        self.slots.get(id.index()).map_or(0, |slot| slot.evaluations)
    }

    /// Number of completed control ticks.
    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
