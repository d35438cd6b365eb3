//! Trace-driven pipeline simulator library.
//!
//! This crate implements a cycle-accurate model of an N-wide, in-order,
//! five-stage pipeline with the following:
//! 1. **Trace:** Streaming decode of 48-byte instruction records, raw or gzip-compressed.
//! 2. **Core:** Pipeline latches, hazard detection with configurable forwarding, and
//!    branch predictors selected by policy code.
//! 3. **Simulation:** A driver that runs a trace to completion under a validated configuration.
//! 4. **Statistics:** Cycle, instruction, branch, and stall counters, finalized into CPI and
//!    misprediction rate and printed in the `LAB2_*` report format.

/// Common types and constants (trace format, limits, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Processor core (pipeline and branch prediction unit).
pub mod core;
/// Simulation driver.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Instruction trace model, reader, and writer.
pub mod trace;

/// Any failure of a run.
pub use crate::common::error::SimError;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Top-level simulator; construct with `Simulator::new` or `Simulator::from_trace_path`.
pub use crate::sim::Simulator;
/// Run statistics and their finalized metrics.
pub use crate::stats::{Metrics, SimStats};
