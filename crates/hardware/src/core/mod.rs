//! Processor core implementation.
//!
//! This module contains the instruction pipeline and the execution units it
//! consults.

/// Instruction pipeline implementation (engine, latches, hazards).
pub mod pipeline;

/// Execution units (branch prediction).
pub mod units;
