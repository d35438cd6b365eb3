//! Simulator: owns the configuration and the pipeline for one run.
//!
//! A `Simulator` is built from a validated configuration and an instruction
//! source, driven to completion with [`Simulator::run`], and consumed in the
//! process. Nothing outlives the run except the returned statistics.

use std::path::Path;

use crate::common::error::SimError;
use crate::config::Config;
use crate::core::pipeline::Pipeline;
use crate::stats::SimStats;
use crate::trace::{FileTrace, InstructionSource};

/// Top-level simulator: configuration plus pipeline.
#[derive(Debug)]
pub struct Simulator<S> {
    config: Config,
    pipeline: Pipeline<S>,
}

impl<S: InstructionSource> Simulator<S> {
    /// Creates a simulator over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails validation.
    pub fn new(config: Config, source: S) -> Result<Self, SimError> {
        config.validate()?;
        tracing::debug!(?config, "simulator configuration");
        let pipeline = Pipeline::new(&config, source);
        Ok(Self { config, pipeline })
    }

    /// The run configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The pipeline, for inspection between steps.
    pub const fn pipeline(&self) -> &Pipeline<S> {
        &self.pipeline
    }

    /// Advances the simulator by one clock cycle.
    ///
    /// Returns `true` once the run is complete.
    ///
    /// # Errors
    ///
    /// Propagates decode failures and invariant violations.
    pub fn step(&mut self) -> Result<bool, SimError> {
        self.pipeline.cycle()?;
        Ok(self.pipeline.is_done())
    }

    /// Runs the trace to completion and returns the final statistics.
    ///
    /// # Errors
    ///
    /// Returns the first decode failure or invariant violation. No partial
    /// statistics are returned.
    pub fn run(mut self) -> Result<SimStats, SimError> {
        let shape = &self.config.pipeline;
        tracing::info!(
            width = shape.width,
            exe_fwd = shape.forwarding.execute,
            mem_fwd = shape.forwarding.memory,
            predictor = shape.branch_predictor.map_or("none", |bp| bp.name()),
            "starting simulation"
        );

        if !self.pipeline.is_done() {
            self.pipeline.run_to_completion()?;
        }
        let stats = self.pipeline.into_stats();
        stats.check()?;

        let metrics = stats.finalize();
        tracing::info!(
            cycles = stats.cycles,
            instructions = stats.instructions_retired,
            cpi = metrics.cpi,
            mispred_rate = ?metrics.mispred_rate,
            "simulation finished"
        );
        Ok(stats)
    }
}

impl Simulator<FileTrace> {
    /// Opens the trace at `path` (raw or gzip) and builds a simulator over it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for an invalid configuration and
    /// [`SimError::Io`] if the trace cannot be opened.
    pub fn from_trace_path(config: Config, path: impl AsRef<Path>) -> Result<Self, SimError> {
        config.validate()?;
        let source = FileTrace::open(path)?;
        Self::new(config, source)
    }
}
