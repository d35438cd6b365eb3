//! Configuration system for the pipeline simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! a run. It provides:
//! 1. **Defaults:** Baseline pipeline and predictor sizing constants.
//! 2. **Structures:** Hierarchical config for general, pipeline, and predictor settings.
//! 3. **Enums:** Branch predictor policy selection, including the integer policy codes
//!    accepted on the command line.
//!
//! Configuration is supplied via CLI flags, a JSON file, or `Config::default()`.
//! A `Config` is validated once with [`Config::validate`] and is immutable for the
//! lifetime of the run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::constants::MAX_PIPE_WIDTH;
use crate::common::error::{ConfigError, SimError};

/// Default configuration constants for the simulator.
///
/// These values define the baseline configuration when not explicitly
/// overridden by flags or a JSON configuration file.
mod defaults {
    /// Default pipeline width (1 instruction per cycle).
    pub const PIPELINE_WIDTH: usize = 1;

    /// Cycles without a retirement before the run is declared wedged.
    pub const WATCHDOG_CYCLES: u64 = 10_000;

    /// Default Branch Target Buffer size (4096 entries).
    pub const BTB_SIZE: usize = 4096;

    /// Default bimodal counter table size (log2, 4096 entries).
    pub const BIMODAL_BITS: usize = 12;

    /// Default gshare pattern table size (log2, 16384 entries).
    pub const GSHARE_BITS: usize = 14;

    /// Default tournament component table size (log2, 16384 entries).
    pub const TOURNAMENT_GLOBAL_BITS: usize = 14;

    /// Default number of history bits concatenated into the gselect index.
    pub const TOURNAMENT_GSELECT_HISTORY_BITS: usize = 4;

    /// Default tournament chooser table size (log2, 1024 entries).
    pub const TOURNAMENT_CHOOSER_BITS: usize = 10;

    /// Largest supported predictor table index width.
    pub const MAX_TABLE_BITS: usize = 24;
}

/// Branch prediction policies.
///
/// Each policy has a stable integer code, which is how the command line selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictor {
    /// Code 1: every branch predicted not taken.
    AlwaysNotTaken,
    /// Code 2: static backward-taken, forward-not-taken.
    #[serde(alias = "BTFN")]
    Btfn,
    /// Code 3: single-level table of 2-bit saturating counters.
    Bimodal,
    /// Code 4: two-level correlating predictor (global history XOR PC).
    #[serde(alias = "Gshare")]
    GShare,
    /// Code 5: every branch predicted taken.
    AlwaysTaken,
    /// Code 6: chooser between gshare and gselect components.
    Tournament,
}

impl BranchPredictor {
    /// Every policy, in code order.
    pub const ALL: [Self; 6] = [
        Self::AlwaysNotTaken,
        Self::Btfn,
        Self::Bimodal,
        Self::GShare,
        Self::AlwaysTaken,
        Self::Tournament,
    ];

    /// Resolves a command-line policy code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPredictorPolicy`] for codes outside `1..=6`.
    pub const fn from_code(code: u32) -> Result<Self, ConfigError> {
        match code {
            1 => Ok(Self::AlwaysNotTaken),
            2 => Ok(Self::Btfn),
            3 => Ok(Self::Bimodal),
            4 => Ok(Self::GShare),
            5 => Ok(Self::AlwaysTaken),
            6 => Ok(Self::Tournament),
            other => Err(ConfigError::InvalidPredictorPolicy(other)),
        }
    }

    /// The command-line code for this policy.
    pub const fn code(self) -> u32 {
        match self {
            Self::AlwaysNotTaken => 1,
            Self::Btfn => 2,
            Self::Bimodal => 3,
            Self::GShare => 4,
            Self::AlwaysTaken => 5,
            Self::Tournament => 6,
        }
    }

    /// Short human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::AlwaysNotTaken => "always-not-taken",
            Self::Btfn => "btfn",
            Self::Bimodal => "bimodal",
            Self::GShare => "gshare",
            Self::AlwaysTaken => "always-taken",
            Self::Tournament => "tournament",
        }
    }
}

/// Root configuration structure for the simulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// General run options
    #[serde(default)]
    pub general: GeneralConfig,

    /// Pipeline shape and forwarding
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Branch predictor sizing
    #[serde(default)]
    pub predictor: PredictorConfig,
}

impl Config {
    /// Parses a configuration from JSON text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid configuration.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, or
    /// [`SimError::Config`] if it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SimError::io(format!("reading config {}", path.display()), e))?;
        Ok(Self::from_json_str(&text)?)
    }

    /// Checks every field against its supported range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.watchdog_cycles == 0 {
            return Err(ConfigError::InvalidWatchdog);
        }
        self.pipeline.validate()?;
        self.predictor.validate()
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Abort the run if no instruction retires for this many consecutive cycles
    #[serde(default = "GeneralConfig::default_watchdog")]
    pub watchdog_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default watchdog window in cycles.
    const fn default_watchdog() -> u64 {
        defaults::WATCHDOG_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            watchdog_cycles: defaults::WATCHDOG_CYCLES,
        }
    }
}

/// Pipeline shape, forwarding paths, and predictor selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Superscalar width (instructions per cycle per stage)
    #[serde(default = "PipelineConfig::default_width")]
    pub width: usize,

    /// Operand bypass paths
    #[serde(default)]
    pub forwarding: ForwardingConfig,

    /// Branch predictor policy; `None` disables prediction entirely
    #[serde(default)]
    pub branch_predictor: Option<BranchPredictor>,
}

impl PipelineConfig {
    /// Returns the default pipeline width (instructions per cycle).
    const fn default_width() -> usize {
        defaults::PIPELINE_WIDTH
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.width > MAX_PIPE_WIDTH {
            return Err(ConfigError::InvalidWidth {
                width: self.width,
                max: MAX_PIPE_WIDTH,
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Creates a default pipeline configuration.
    ///
    /// Single-issue, no forwarding, and no branch predictor.
    fn default() -> Self {
        Self {
            width: defaults::PIPELINE_WIDTH,
            forwarding: ForwardingConfig::default(),
            branch_predictor: None,
        }
    }
}

/// Operand forwarding enables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForwardingConfig {
    /// Bypass non-load results from the Execute stage to Decode
    #[serde(default)]
    pub execute: bool,

    /// Bypass results (including loads) from the Memory stage to Decode
    #[serde(default)]
    pub memory: bool,
}

impl ForwardingConfig {
    /// Both forwarding paths enabled.
    pub const fn full() -> Self {
        Self {
            execute: true,
            memory: true,
        }
    }
}

/// Branch predictor table sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PredictorConfig {
    /// Branch Target Buffer entries (power of two)
    #[serde(default = "PredictorConfig::default_btb_size")]
    pub btb_size: usize,

    /// Bimodal counter table size (log2)
    #[serde(default = "PredictorConfig::default_bimodal_bits")]
    pub bimodal_bits: usize,

    /// GShare pattern table size and history length (log2)
    #[serde(default = "PredictorConfig::default_gshare_bits")]
    pub gshare_bits: usize,

    /// Tournament predictor configuration
    #[serde(default)]
    pub tournament: TournamentConfig,
}

impl PredictorConfig {
    /// Returns the default Branch Target Buffer size.
    const fn default_btb_size() -> usize {
        defaults::BTB_SIZE
    }

    /// Returns the default bimodal table size (log2).
    const fn default_bimodal_bits() -> usize {
        defaults::BIMODAL_BITS
    }

    /// Returns the default gshare table size (log2).
    const fn default_gshare_bits() -> usize {
        defaults::GSHARE_BITS
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.btb_size == 0 || !self.btb_size.is_power_of_two() {
            return Err(ConfigError::InvalidBtbSize(self.btb_size));
        }
        check_bits("bimodal table", self.bimodal_bits, defaults::MAX_TABLE_BITS)?;
        check_bits("gshare table", self.gshare_bits, defaults::MAX_TABLE_BITS)?;
        self.tournament.validate()
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            btb_size: defaults::BTB_SIZE,
            bimodal_bits: defaults::BIMODAL_BITS,
            gshare_bits: defaults::GSHARE_BITS,
            tournament: TournamentConfig::default(),
        }
    }
}

/// Tournament branch predictor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TournamentConfig {
    /// Size of the gshare and gselect component tables (log2)
    #[serde(default = "TournamentConfig::default_global")]
    pub global_bits: usize,

    /// History bits concatenated with PC bits to index gselect
    #[serde(default = "TournamentConfig::default_gselect_history")]
    pub gselect_history_bits: usize,

    /// Chooser table size (log2)
    #[serde(default = "TournamentConfig::default_chooser")]
    pub chooser_bits: usize,
}

impl TournamentConfig {
    /// Returns the default component table size (log2).
    const fn default_global() -> usize {
        defaults::TOURNAMENT_GLOBAL_BITS
    }

    /// Returns the default gselect history length.
    const fn default_gselect_history() -> usize {
        defaults::TOURNAMENT_GSELECT_HISTORY_BITS
    }

    /// Returns the default chooser table size (log2).
    const fn default_chooser() -> usize {
        defaults::TOURNAMENT_CHOOSER_BITS
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_bits(
            "tournament component table",
            self.global_bits,
            defaults::MAX_TABLE_BITS,
        )?;
        // gselect needs at least one PC bit next to the history bits.
        check_bits(
            "gselect history",
            self.gselect_history_bits,
            self.global_bits - 1,
        )?;
        check_bits(
            "tournament chooser",
            self.chooser_bits,
            defaults::MAX_TABLE_BITS,
        )
    }
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            global_bits: defaults::TOURNAMENT_GLOBAL_BITS,
            gselect_history_bits: defaults::TOURNAMENT_GSELECT_HISTORY_BITS,
            chooser_bits: defaults::TOURNAMENT_CHOOSER_BITS,
        }
    }
}

fn check_bits(table: &'static str, bits: usize, max: usize) -> Result<(), ConfigError> {
    if bits == 0 || bits > max {
        return Err(ConfigError::InvalidTableBits { table, bits, max });
    }
    Ok(())
}
