//! Execution units and functional components.
//!
//! The timing model only needs the branch prediction unit; data values are
//! never computed.

/// Branch Resolution Unit including branch predictors and BTB.
pub mod bru;
