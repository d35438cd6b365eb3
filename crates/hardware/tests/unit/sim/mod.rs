//! # Simulator Tests



/// Whole-run scenarios with known cycle and misprediction counts.
pub mod scenarios;
