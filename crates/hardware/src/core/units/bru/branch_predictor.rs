//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait that every prediction policy
//! implements. The pipeline queries it when a conditional branch is fetched and
//! trains it straight away with the outcome recorded in the trace.

/// Trait for branch prediction algorithms.
pub trait BranchPredictor {
    /// Predicts whether a branch instruction will be taken and its target address.
    ///
    /// # Arguments
    ///
    /// * `pc` - Program counter of the branch instruction
    ///
    /// # Returns
    ///
    /// A tuple `(taken, target)` where `taken` indicates if the branch
    /// is predicted to be taken, and `target` is the predicted target
    /// address if the BTB holds one. `target` is always `None` for a
    /// not-taken prediction.
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>);

    /// Updates the branch predictor with the actual branch outcome.
    ///
    /// # Arguments
    ///
    /// * `pc` - Program counter of the branch instruction
    /// * `taken` - Whether the branch was actually taken
    /// * `target` - The actual target address if the branch was taken
    fn update_branch(&mut self, pc: u64, taken: bool, target: Option<u64>);
}
