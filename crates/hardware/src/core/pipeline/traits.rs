//! Pipeline Latch Interface.
//!
//! Latches hold the instructions moving between stages. They support occupancy
//! checks and selective squashing of work younger than a mispredicted branch.

/// Represents a pipeline latch (inter-stage buffer).
pub trait PipelineLatch {
    /// Checks if the latch is empty.
    ///
    /// # Returns
    ///
    /// `true` if there are no valid instructions in the latch, `false` otherwise.
    fn is_empty(&self) -> bool;

    /// Removes every instruction younger than `op_id`.
    ///
    /// # Returns
    ///
    /// The number of slots squashed.
    fn squash_younger(&mut self, op_id: u64) -> usize;
}
