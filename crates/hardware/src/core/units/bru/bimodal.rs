//! Bimodal Branch Predictor.
//!
//! One 2-bit saturating counter per PC-indexed table entry, with no history.
//! Aliasing branches share a counter.

use super::counter::{CounterTable, pc_index};
use super::{BranchPredictor, btb::Btb};

/// Bimodal Predictor structure.
#[derive(Debug, Clone)]
pub struct BimodalPredictor {
    pht: CounterTable,
    btb: Btb,
}

impl BimodalPredictor {
    /// Creates a predictor with `1 << table_bits` counters.
    pub fn new(table_bits: usize, btb_size: usize) -> Self {
        Self {
            pht: CounterTable::new(table_bits),
            btb: Btb::new(btb_size),
        }
    }
}

impl BranchPredictor for BimodalPredictor {
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>) {
        if self.pht.get(pc_index(pc)).taken() {
            (true, self.btb.lookup(pc))
        } else {
            (false, None)
        }
    }

    fn update_branch(&mut self, pc: u64, taken: bool, target: Option<u64>) {
        self.pht.train(pc_index(pc), taken);
        if let Some(tgt) = target {
            self.btb.update(pc, tgt);
        }
    }
}
