//! Common utilities and types used throughout the pipeline simulator.
//!
//! This module provides building blocks shared across all components of the
//! simulator. It includes:
//! 1. **Constants:** Trace format, pipeline limits, and report tokens.
//! 2. **Error Handling:** Configuration, decode, and invariant error types.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for configuration, trace decoding, and engine invariants.
pub mod error;

pub use constants::{MAX_PIPE_WIDTH, TRACE_RECORD_SIZE};
pub use error::{ConfigError, DecodeError, InvariantViolation, SimError};
