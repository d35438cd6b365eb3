//! Error definitions for the simulator.
//!
//! This module defines the failure taxonomy of a simulation run. It provides:
//! 1. **Configuration Errors:** Invalid flag values or config files, detected before simulation starts.
//! 2. **Decode Errors:** Malformed or truncated trace data, detected while fetching.
//! 3. **Invariant Violations:** Broken pipeline or statistics invariants, which indicate a simulator bug.
//! 4. **Run Errors:** `SimError`, the umbrella type returned by the top-level simulator.
//!
//! Every error is fatal to the run that produced it. No partial metrics are reported.

use std::io;

use thiserror::Error;

/// Invalid run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Pipeline width outside `1..=MAX_PIPE_WIDTH`.
    #[error("pipeline width {width} is out of range (expected 1..={max})")]
    InvalidWidth {
        /// The rejected width.
        width: usize,
        /// Largest supported width.
        max: usize,
    },

    /// Branch predictor policy code that does not name a known policy.
    #[error("unknown branch predictor policy {0} (expected 1..=6)")]
    InvalidPredictorPolicy(u32),

    /// Predictor table index width outside the supported range.
    #[error("{table} index width {bits} is out of range (expected 1..={max})")]
    InvalidTableBits {
        /// Name of the table being configured.
        table: &'static str,
        /// The rejected index width.
        bits: usize,
        /// Largest supported index width.
        max: usize,
    },

    /// Branch target buffer size that is zero or not a power of two.
    #[error("BTB size {0} must be a non-zero power of two")]
    InvalidBtbSize(usize),

    /// Watchdog limit of zero cycles.
    #[error("watchdog limit must be at least one cycle")]
    InvalidWatchdog,

    /// A configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Malformed trace data.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The trace ended part-way through a record.
    #[error("trace truncated in record {record}: got {bytes} of {expected} bytes")]
    Truncated {
        /// Zero-based index of the incomplete record.
        record: u64,
        /// Bytes available for the record.
        bytes: usize,
        /// Bytes a complete record needs.
        expected: usize,
    },

    /// A record carried an operation class outside the known range.
    #[error("record {record} has invalid op class {value}")]
    InvalidOpClass {
        /// Zero-based index of the offending record.
        record: u64,
        /// The raw op class byte.
        value: u8,
    },

    /// The trace contains no instruction records.
    #[error("trace contains no instruction records")]
    Empty,

    /// The underlying stream failed (includes corrupt gzip data).
    #[error("failed to read trace: {0}")]
    Io(#[from] io::Error),
}

/// A pipeline or statistics invariant was broken.
///
/// These never stem from user input; they indicate a bug in the engine and
/// must abort the run rather than be swallowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// An instruction retired out of fetch order.
    #[error("instruction {got} retired out of order (expected {expected})")]
    OutOfOrderRetire {
        /// The op id that should have retired next.
        expected: u64,
        /// The op id that actually retired.
        got: u64,
    },

    /// The pipeline made no forward progress for too long.
    #[error("no instruction retired for {cycles} cycles (at cycle {at_cycle})")]
    Stalled {
        /// Length of the retire-free window.
        cycles: u64,
        /// Cycle at which the watchdog fired.
        at_cycle: u64,
    },

    /// More mispredictions were counted than branches.
    #[error("{mispredicted} mispredictions recorded for only {branches} branches")]
    MispredictOverflow {
        /// Mispredicted branch count.
        mispredicted: u64,
        /// Total branch count.
        branches: u64,
    },
}

/// Any failure of a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration; raised before the first cycle.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed trace; the run is abandoned.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Simulator bug.
    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Opening the trace or writing output failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl SimError {
    /// Wraps an I/O error with a short description of the failed operation.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
