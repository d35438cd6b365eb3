//! Static Branch Predictors.
//!
//! Policies whose direction guess never changes with history:
//! 1. **Always Not Taken:** Every branch falls through.
//! 2. **Always Taken:** Every branch is taken, to whatever target the BTB remembers.
//! 3. **BTFN:** Backward branches (loops) are taken, forward branches are not.
//!
//! All three still train the BTB so taken predictions carry a target.

use super::{BranchPredictor, btb::Btb};

/// Direction rule applied by a [`StaticPredictor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticPolicy {
    /// Predict every branch not taken.
    AlwaysNotTaken,
    /// Predict every branch taken.
    AlwaysTaken,
    /// Predict taken only when the remembered target lies at or below the branch.
    ///
    /// The predictor only sees the PC, so the branch direction comes from the
    /// BTB. A branch missing from the BTB is predicted not taken, which means a
    /// backward loop branch mispredicts the first time it is fetched and on any
    /// later fetch after its entry is evicted.
    BackwardTaken,
}

/// Static Branch Predictor structure.
#[derive(Debug, Clone)]
pub struct StaticPredictor {
    policy: StaticPolicy,
    btb: Btb,
}

impl StaticPredictor {
    /// Creates a static predictor with a `btb_size`-entry BTB.
    pub fn new(policy: StaticPolicy, btb_size: usize) -> Self {
        Self {
            policy,
            btb: Btb::new(btb_size),
        }
    }

    /// The direction rule in effect.
    pub const fn policy(&self) -> StaticPolicy {
        self.policy
    }
}

impl BranchPredictor for StaticPredictor {
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>) {
        match self.policy {
            StaticPolicy::AlwaysNotTaken => (false, None),
            StaticPolicy::AlwaysTaken => (true, self.btb.lookup(pc)),
            // BTB miss: no target to compare, so fall through.
            StaticPolicy::BackwardTaken => match self.btb.lookup(pc) {
                Some(target) if target <= pc => (true, Some(target)),
                _ => (false, None),
            },
        }
    }

    fn update_branch(&mut self, pc: u64, _taken: bool, target: Option<u64>) {
        if let Some(tgt) = target {
            self.btb.update(pc, tgt);
        }
    }
}
