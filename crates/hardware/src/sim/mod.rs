//! Simulation driver.
//!
//! Ties a configuration, an instruction source, and the pipeline together
//! for a single run.

/// The top-level simulator.
pub mod simulator;

pub use simulator::Simulator;
