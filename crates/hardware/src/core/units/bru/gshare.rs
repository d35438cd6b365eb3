//! GShare Branch Predictor.
//!
//! GShare correlates global branch history with the program counter using an XOR
//! hash. This allows the predictor to distinguish the same branch instruction
//! in different execution contexts.
//!
//! # Performance
//!
//! - **Time Complexity:** `predict()` and `update()` are O(1)
//! - **Space Complexity:** O(2^N) 2-bit counters, where N is the configured history length
//! - **Best Case:** Correlated branches whose outcome depends on recent history
//! - **Worst Case:** Uncorrelated branches or history too short for the pattern

use super::counter::{CounterTable, GlobalHistory, pc_index};
use super::{BranchPredictor, btb::Btb};

/// GShare Predictor structure.
#[derive(Debug, Clone)]
pub struct GSharePredictor {
    /// Global History Register, as long as the table index.
    ghr: GlobalHistory,
    /// Pattern History Table.
    pht: CounterTable,
    btb: Btb,
}

impl GSharePredictor {
    /// Creates a predictor with `1 << bits` counters and a `bits`-long history.
    pub fn new(bits: usize, btb_size: usize) -> Self {
        Self {
            ghr: GlobalHistory::new(bits),
            pht: CounterTable::new(bits),
            btb: Btb::new(btb_size),
        }
    }

    /// Computes the XOR of the PC (shifted) and the Global History Register.
    pub(crate) const fn index(pc: u64, ghr: GlobalHistory) -> u64 {
        pc_index(pc) ^ ghr.value()
    }
}

impl BranchPredictor for GSharePredictor {
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>) {
        if self.pht.get(Self::index(pc, self.ghr)).taken() {
            (true, self.btb.lookup(pc))
        } else {
            (false, None)
        }
    }

    /// Trains the counter selected by the pre-update history, then shifts the
    /// outcome into the history.
    fn update_branch(&mut self, pc: u64, taken: bool, target: Option<u64>) {
        self.pht.train(Self::index(pc, self.ghr), taken);
        self.ghr.push(taken);

        if let Some(tgt) = target {
            self.btb.update(pc, tgt);
        }
    }
}
