//! Tournament Branch Predictor.
//!
//! A hybrid predictor that employs a meta-predictor (chooser) to select between
//! two global-history components:
//! 1. **GShare:** history XOR PC, good at context-dependent branches.
//! 2. **GSelect:** low PC bits concatenated with a short history, which aliases
//!    less for branches with a strong per-site bias.
//!
//! The chooser is indexed by PC and is only trained when the components disagree.

use super::counter::{CounterTable, GlobalHistory, pc_index};
use super::gshare::GSharePredictor;
use super::{BranchPredictor, btb::Btb};
use crate::config::TournamentConfig;

/// Tournament Predictor structure.
#[derive(Debug, Clone)]
pub struct TournamentPredictor {
    btb: Btb,
    /// Global history shared by both components.
    ghr: GlobalHistory,
    gshare: CounterTable,
    gselect: CounterTable,
    /// Number of history bits in the gselect index.
    gselect_history_bits: usize,
    /// Chooser counters: 0-1 prefer gselect, 2-3 prefer gshare.
    chooser: CounterTable,
}

impl TournamentPredictor {
    /// Creates a new Tournament Predictor based on the provided configuration.
    pub fn new(config: &TournamentConfig, btb_size: usize) -> Self {
        Self {
            btb: Btb::new(btb_size),
            ghr: GlobalHistory::new(config.global_bits),
            gshare: CounterTable::new(config.global_bits),
            gselect: CounterTable::new(config.global_bits),
            gselect_history_bits: config.gselect_history_bits,
            chooser: CounterTable::new(config.chooser_bits),
        }
    }

    fn gselect_index(&self, pc: u64) -> u64 {
        let history_mask = (1u64 << self.gselect_history_bits) - 1;
        (pc_index(pc) << self.gselect_history_bits) | (self.ghr.value() & history_mask)
    }

    /// Component predictions as `(gshare, gselect)`.
    fn components(&self, pc: u64) -> (bool, bool) {
        (
            self.gshare
                .get(GSharePredictor::index(pc, self.ghr))
                .taken(),
            self.gselect.get(self.gselect_index(pc)).taken(),
        )
    }
}

impl BranchPredictor for TournamentPredictor {
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>) {
        let (gshare_taken, gselect_taken) = self.components(pc);
        let taken = if self.chooser.get(pc_index(pc)).taken() {
            gshare_taken
        } else {
            gselect_taken
        };

        if taken {
            (true, self.btb.lookup(pc))
        } else {
            (false, None)
        }
    }

    /// Updates the chooser toward whichever component was right, then trains
    /// both components and the shared history.
    fn update_branch(&mut self, pc: u64, taken: bool, target: Option<u64>) {
        let (gshare_taken, gselect_taken) = self.components(pc);
        let gshare_correct = gshare_taken == taken;
        if gshare_correct != (gselect_taken == taken) {
            self.chooser.train(pc_index(pc), gshare_correct);
        }

        let gshare_idx = GSharePredictor::index(pc, self.ghr);
        let gselect_idx = self.gselect_index(pc);
        self.gshare.train(gshare_idx, taken);
        self.gselect.train(gselect_idx, taken);
        self.ghr.push(taken);

        if let Some(tgt) = target {
            self.btb.update(pc, tgt);
        }
    }
}
