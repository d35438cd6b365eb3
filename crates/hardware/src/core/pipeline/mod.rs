//! Instruction pipeline implementation.
//!
//! This module contains the implementation of the N-wide, in-order, five-stage pipeline.
//! It includes the following components:
//! 1. **Engine:** The cycle loop that advances every stage once per cycle.
//! 2. **Hazards:** Detection of data hazards and the forwarding-aware stall policy.
//! 3. **Latches:** Inter-stage buffers for communication between pipeline stages.
//! 4. **Traits:** Common interfaces for pipeline latches.

/// Cycle-level pipeline engine.
pub mod engine;

/// Pipeline hazard detection and forwarding logic.
pub mod hazards;

/// Inter-stage pipeline latches (IF/ID, ID/EX, EX/MEM, MEM/WB).
pub mod latches;

/// Traits for pipeline latches.
pub mod traits;

pub use engine::{Pipeline, ThirdSource};
pub use latches::Stage;
