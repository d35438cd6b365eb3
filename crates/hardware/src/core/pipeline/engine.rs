//! Cycle-level pipeline engine.
//!
//! The engine advances an N-wide in-order pipeline one cycle at a time. Each
//! cycle evaluates the stages in reverse order (Writeback, Memory, Execute,
//! Decode, Fetch) so that every stage reads the latch contents its upstream
//! neighbour produced in the previous cycle.
//!
//! Branches are predicted at Fetch, and the predictor learns the traced outcome
//! in the same step since the trace already knows it. A mispredicted branch
//! blocks further fetch until it reaches Writeback; a trace-driven front end has
//! no wrong path to follow, so the blocked fetch slots model the refill penalty.
//!
//! Fetch also rewrites every fifth ALU op into a three-source op that reads the
//! most recently fetched destination register (see [`ThirdSource`]).

use crate::common::constants::{NUM_LATCHES, THIRD_SOURCE_ALU_INTERVAL};
use crate::common::error::{DecodeError, InvariantViolation, SimError};
use crate::config::{Config, ForwardingConfig};
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::{LatchRow, Prediction, Slot, Stage};
use crate::core::pipeline::traits::PipelineLatch;
use crate::core::units::bru::{BranchPredictor, BranchPredictorWrapper};
use crate::stats::SimStats;
use crate::trace::{Instruction, InstructionSource, OpClass};

/// Fetch-side state for the synthetic third source operand.
///
/// Counts ALU ops across the whole run; the [`THIRD_SOURCE_ALU_INTERVAL`]th one
/// reads the last destination register fetched before it, through its third
/// source and through any unused first or second source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThirdSource {
    alu_ops: u32,
    last_dest: u8,
}

impl ThirdSource {
    /// Rewrites `inst` in fetch order.
    pub fn apply(&mut self, inst: &mut Instruction) {
        inst.src3 = None;
        if inst.op == OpClass::Alu {
            self.alu_ops += 1;
            if self.alu_ops == THIRD_SOURCE_ALU_INTERVAL {
                *inst = inst.with_third_source(self.last_dest);
                self.alu_ops = 0;
            }
        }
        if let Some(dest) = inst.dest {
            self.last_dest = dest;
        }
    }
}

/// The pipeline: four latches, the instruction source, and the branch predictor.
#[derive(Debug)]
pub struct Pipeline<S> {
    width: usize,
    forwarding: ForwardingConfig,
    watchdog_cycles: u64,

    source: S,
    source_done: bool,
    predictor: Option<BranchPredictorWrapper>,
    third_source: ThirdSource,

    if_latch: LatchRow,
    id_latch: LatchRow,
    ex_latch: LatchRow,
    ma_latch: LatchRow,

    /// Sequence number for the next fetched instruction.
    next_op_id: u64,
    /// Sequence number the next retirement must carry.
    next_retire: u64,
    /// Op id of an unresolved mispredicted branch; fetch is blocked while set.
    pending_redirect: Option<u64>,
    cycles_since_retire: u64,

    stats: SimStats,
}

impl<S: InstructionSource> Pipeline<S> {
    /// Builds an empty pipeline. `config` must already be validated.
    pub fn new(config: &Config, source: S) -> Self {
        let width = config.pipeline.width;
        let predictor = BranchPredictorWrapper::from_config(config);
        Self {
            width,
            forwarding: config.pipeline.forwarding,
            watchdog_cycles: config.general.watchdog_cycles,
            source,
            source_done: false,
            stats: SimStats::new(predictor.is_some()),
            predictor,
            third_source: ThirdSource::default(),
            if_latch: LatchRow::new(width),
            id_latch: LatchRow::new(width),
            ex_latch: LatchRow::new(width),
            ma_latch: LatchRow::new(width),
            next_op_id: 0,
            next_retire: 0,
            pending_redirect: None,
            cycles_since_retire: 0,
        }
    }

    /// Advances the pipeline by one clock cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Decode`] if the source yields malformed data (or no
    /// data at all), and [`SimError::Invariant`] if retirement order breaks or
    /// the watchdog expires.
    pub fn cycle(&mut self) -> Result<(), SimError> {
        self.stats.record_cycle();

        let retired = self.writeback()?;
        self.memory();
        self.execute();
        self.decode();
        self.fetch()?;

        if retired > 0 {
            self.cycles_since_retire = 0;
        } else {
            self.cycles_since_retire += 1;
            if self.cycles_since_retire >= self.watchdog_cycles {
                return Err(InvariantViolation::Stalled {
                    cycles: self.cycles_since_retire,
                    at_cycle: self.stats.cycles,
                }
                .into());
            }
        }

        tracing::trace!(cycle = self.stats.cycles, state = %self.render_state());
        Ok(())
    }

    /// Runs cycles until the trace is exhausted and the pipeline has drained.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`Pipeline::cycle`].
    pub fn run_to_completion(&mut self) -> Result<(), SimError> {
        loop {
            self.cycle()?;
            if self.is_done() {
                return Ok(());
            }
        }
    }

    /// True once the source is exhausted and every latch is empty.
    pub fn is_done(&self) -> bool {
        self.source_done && self.latches().iter().all(|l| l.is_empty())
    }

    /// Statistics accumulated so far.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Consumes the pipeline, returning its statistics.
    pub fn into_stats(self) -> SimStats {
        self.stats
    }

    /// Lane count.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Where instruction `op_id` currently sits, as `(latch, lane)`.
    pub fn position(&self, op_id: u64) -> Option<(Stage, usize)> {
        Stage::ALL.into_iter().find_map(|stage| {
            self.latch(stage)
                .slots
                .iter()
                .position(|s| s.is_some_and(|s| s.op_id == op_id))
                .map(|lane| (stage, lane))
        })
    }

    /// One-line view of every latch: op ids per lane, `--` for bubbles, `*` for stalls.
    pub fn render_state(&self) -> String {
        Stage::ALL
            .into_iter()
            .map(|stage| format!("{stage} [{}]", self.latch(stage)))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    const fn latch(&self, stage: Stage) -> &LatchRow {
        match stage {
            Stage::If => &self.if_latch,
            Stage::Id => &self.id_latch,
            Stage::Ex => &self.ex_latch,
            Stage::Ma => &self.ma_latch,
        }
    }

    const fn latches(&self) -> [&LatchRow; NUM_LATCHES] {
        [&self.if_latch, &self.id_latch, &self.ex_latch, &self.ma_latch]
    }

    // ══════════════════════════════════════════════════════════
    // Stages
    // ══════════════════════════════════════════════════════════

    /// Retires everything in the MEM/WB latch, oldest first.
    fn writeback(&mut self) -> Result<usize, InvariantViolation> {
        let mut retiring: Vec<Slot> = self.ma_latch.take_all().into_iter().flatten().collect();
        retiring.sort_by_key(|s| s.op_id);
        for slot in &retiring {
            self.retire(slot)?;
        }
        Ok(retiring.len())
    }

    fn retire(&mut self, slot: &Slot) -> Result<(), InvariantViolation> {
        if slot.op_id != self.next_retire {
            return Err(InvariantViolation::OutOfOrderRetire {
                expected: self.next_retire,
                got: slot.op_id,
            });
        }
        self.next_retire += 1;
        self.stats.record_retire(slot.inst.op);

        if slot.inst.is_branch() {
            self.resolve_branch(slot);
        }
        Ok(())
    }

    /// Counts a predicted branch and, on a misprediction, releases fetch.
    fn resolve_branch(&mut self, slot: &Slot) {
        let Some(prediction) = slot.prediction else {
            return;
        };
        self.stats.record_branch(!slot.mispredicted);

        if slot.mispredicted {
            let squashed: usize = [
                &mut self.if_latch,
                &mut self.id_latch,
                &mut self.ex_latch,
                &mut self.ma_latch,
            ]
            .into_iter()
            .map(|latch| latch.squash_younger(slot.op_id))
            .sum();
            self.stats.record_squash(squashed as u64);

            if self.pending_redirect == Some(slot.op_id) {
                self.pending_redirect = None;
            }
            tracing::debug!(
                op_id = slot.op_id,
                pc = slot.inst.pc,
                predicted_taken = prediction.taken,
                predicted_target = ?prediction.target,
                cycle = self.stats.cycles,
                "branch misprediction resolved"
            );
        }
    }

    fn memory(&mut self) {
        self.ma_latch.slots = self.ex_latch.take_all();
    }

    fn execute(&mut self) {
        self.ex_latch.slots = self.id_latch.take_all();
    }

    /// Moves IF into ID, then holds back every instruction that cannot issue.
    ///
    /// A held instruction returns to its IF lane with the stall signal set, and
    /// every younger instruction in ID is held with it.
    fn decode(&mut self) {
        self.if_latch.clear_stalls();
        self.id_latch.slots = self.if_latch.take_all();

        let in_flight: Vec<(Stage, Slot)> = [Stage::Id, Stage::Ex, Stage::Ma]
            .into_iter()
            .flat_map(|stage| self.latch(stage).occupied().map(move |s| (stage, *s)))
            .collect();

        let mut holding = false;
        for lane in self.id_latch.lanes_by_age() {
            let Some(slot) = self.id_latch.slots[lane] else {
                continue;
            };
            holding = holding
                || hazards::must_stall(
                    &slot,
                    in_flight.iter().map(|(stage, s)| (*stage, s)),
                    self.forwarding,
                );
            if holding {
                self.id_latch.slots[lane] = None;
                self.if_latch.slots[lane] = Some(slot);
                self.if_latch.stall[lane] = true;
                self.stats.record_data_stall();
            }
        }
    }

    /// Fills every unstalled IF lane from the source, predicting branches.
    fn fetch(&mut self) -> Result<(), DecodeError> {
        for lane in 0..self.width {
            if self.if_latch.stall[lane] {
                continue;
            }
            if self.pending_redirect.is_some() {
                self.stats.record_squash(1);
                continue;
            }
            let Some(mut inst) = self.next_instruction()? else {
                continue;
            };
            self.third_source.apply(&mut inst);

            let mut slot = Slot::new(self.next_op_id, inst);
            self.next_op_id += 1;
            self.predict(&mut slot);
            self.if_latch.slots[lane] = Some(slot);
        }
        Ok(())
    }

    /// Predicts a fetched branch, then trains the predictor on its traced outcome.
    fn predict(&mut self, slot: &mut Slot) {
        let (Some(outcome), Some(predictor)) = (slot.inst.branch, self.predictor.as_mut()) else {
            return;
        };
        let (taken, target) = predictor.predict_branch(slot.inst.pc);
        predictor.update_branch(slot.inst.pc, outcome.taken, outcome.taken_target());
        let prediction = Prediction { taken, target };
        slot.prediction = Some(prediction);

        if prediction.mispredicts(outcome.taken, outcome.target) {
            slot.mispredicted = true;
            self.pending_redirect = Some(slot.op_id);
            tracing::debug!(
                op_id = slot.op_id,
                pc = slot.inst.pc,
                actual_taken = outcome.taken,
                "branch mispredicted at fetch"
            );
        }
    }

    fn next_instruction(&mut self) -> Result<Option<Instruction>, DecodeError> {
        if self.source_done {
            return Ok(None);
        }
        match self.source.next_instruction()? {
            Some(inst) => Ok(Some(inst)),
            None => {
                self.source_done = true;
                if self.next_op_id == 0 {
                    return Err(DecodeError::Empty);
                }
                tracing::debug!(
                    instructions = self.next_op_id,
                    cycle = self.stats.cycles,
                    "end of trace"
                );
                Ok(None)
            }
        }
    }
}
