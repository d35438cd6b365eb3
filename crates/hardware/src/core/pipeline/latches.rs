//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the state carried between the five pipeline stages:
//! Fetch → Decode → Execute → Memory → Writeback.
//!
//! 1. **Instruction Flow:** `Slot` carries one in-flight instruction with its sequence number.
//! 2. **Superscalar Support:** `LatchRow` holds one slot per lane; an empty slot is a bubble.
//! 3. **Prediction Metadata:** Fetch-time branch predictions travel with the instruction
//!    until it resolves at Writeback.

use std::fmt;

use crate::core::pipeline::traits::PipelineLatch;
use crate::trace::Instruction;

/// The four inter-stage latches, named after the stage that fills them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Fetch output (IF/ID).
    If,
    /// Decode output (ID/EX).
    Id,
    /// Execute output (EX/MEM).
    Ex,
    /// Memory output (MEM/WB).
    Ma,
}

impl Stage {
    /// All latches, youngest first.
    pub const ALL: [Self; 4] = [Self::If, Self::Id, Self::Ex, Self::Ma];

    /// Short latch name used in traces.
    pub const fn name(self) -> &'static str {
        match self {
            Self::If => "IF",
            Self::Id => "ID",
            Self::Ex => "EX",
            Self::Ma => "MA",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fetch-time prediction for a conditional branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    /// Predicted direction.
    pub taken: bool,
    /// Predicted target, if the BTB supplied one.
    pub target: Option<u64>,
}

impl Prediction {
    /// Whether this prediction disagrees with the resolved outcome.
    ///
    /// A taken prediction is only correct if it also names the right target.
    pub fn mispredicts(self, taken: bool, target: u64) -> bool {
        self.taken != taken || (self.taken && self.target != Some(target))
    }
}

/// One in-flight instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Fetch sequence number; strictly increasing in program order.
    pub op_id: u64,
    /// The traced instruction.
    pub inst: Instruction,
    /// Prediction made at fetch, for branches when a predictor is configured.
    pub prediction: Option<Prediction>,
    /// The prediction disagreed with the traced outcome.
    pub mispredicted: bool,
}

impl Slot {
    /// A freshly fetched slot with no prediction.
    pub const fn new(op_id: u64, inst: Instruction) -> Self {
        Self {
            op_id,
            inst,
            prediction: None,
            mispredicted: false,
        }
    }
}

/// One latch: `width` lanes, each holding a slot or a bubble.
///
/// Lanes are not age-ordered; after a partial decode stall, newly fetched
/// instructions can occupy lower lanes than older stalled ones. Use `op_id`
/// for ordering.
#[derive(Debug, Clone)]
pub struct LatchRow {
    /// Per-lane contents.
    pub slots: Vec<Option<Slot>>,
    /// Per-lane stall signal; only meaningful for the IF latch, where it keeps a
    /// decode-stalled instruction in place.
    pub stall: Vec<bool>,
}

impl LatchRow {
    /// An all-bubble latch of `width` lanes.
    pub fn new(width: usize) -> Self {
        Self {
            slots: vec![None; width],
            stall: vec![false; width],
        }
    }

    /// Number of lanes.
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots, in lane order.
    pub fn occupied(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().flatten()
    }

    /// Lane indices of occupied slots, oldest instruction first.
    pub fn lanes_by_age(&self) -> Vec<usize> {
        let mut lanes: Vec<usize> = (0..self.width())
            .filter(|&lane| self.slots[lane].is_some())
            .collect();
        lanes.sort_by_key(|&lane| self.slots[lane].map_or(u64::MAX, |s| s.op_id));
        lanes
    }

    /// Clears every stall signal.
    pub fn clear_stalls(&mut self) {
        self.stall.fill(false);
    }

    /// Moves the contents out, leaving bubbles behind.
    pub fn take_all(&mut self) -> Vec<Option<Slot>> {
        let width = self.width();
        std::mem::replace(&mut self.slots, vec![None; width])
    }
}

impl PipelineLatch for LatchRow {
    fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    fn squash_younger(&mut self, op_id: u64) -> usize {
        let mut squashed = 0;
        for (slot, stall) in self.slots.iter_mut().zip(self.stall.iter_mut()) {
            if slot.is_some_and(|s| s.op_id > op_id) {
                *slot = None;
                *stall = false;
                squashed += 1;
            }
        }
        squashed
    }
}

impl fmt::Display for LatchRow {
    /// Renders lanes as op ids, `--` for bubbles and a trailing `*` on stalled lanes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (lane, slot) in self.slots.iter().enumerate() {
            if lane > 0 {
                f.write_str(" ")?;
            }
            match slot {
                Some(s) => write!(f, "{:>4}", s.op_id)?,
                None => f.write_str("  --")?,
            }
            if self.stall[lane] {
                f.write_str("*")?;
            }
        }
        Ok(())
    }
}
