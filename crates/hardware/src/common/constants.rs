//! Global Simulator Constants.
//!
//! This module defines constants shared across the simulator. It includes:
//! 1. **Trace Format:** Record size and compression magic for trace files.
//! 2. **Pipeline Limits:** Structural bounds on the pipeline configuration.
//! 3. **Report Format:** The metric prefix and sentinel token consumed by external graders.

/// Size of one encoded trace record in bytes.
pub const TRACE_RECORD_SIZE: usize = 48;

/// Leading bytes of a gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Widest supported pipeline.
pub const MAX_PIPE_WIDTH: usize = 8;

/// Every this-many ALU ops, fetch turns one into a three-source op.
pub const THIRD_SOURCE_ALU_INTERVAL: u32 = 5;

/// Number of inter-stage latches (IF, ID, EX, MA).
pub const NUM_LATCHES: usize = 4;

/// Prefix for every metric line in the report.
pub const METRIC_PREFIX: &str = "LAB2";

/// Token printed in place of the misprediction rate when no predictor is engaged.
///
/// External tooling searches for `nan` case-insensitively; keep it verbatim.
pub const NOT_APPLICABLE_TOKEN: &str = "NaN";
