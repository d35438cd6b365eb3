//! # Branch Prediction Unit Tests

/// Branch target buffer.
pub mod btb;
