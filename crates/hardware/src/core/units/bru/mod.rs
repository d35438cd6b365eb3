//! Branch prediction unit (BRU) implementations.
//!
//! This module contains the direction predictors selectable by policy code
//! (static, bimodal, gshare, and tournament) and the branch target buffer
//! (BTB) each of them uses to supply taken targets.

pub use self::branch_predictor::BranchPredictor;

/// Branch predictor trait.
pub mod branch_predictor;

/// Bimodal (PC-indexed counter table) predictor.
pub mod bimodal;

/// Branch Target Buffer for storing predicted branch targets.
pub mod btb;

/// Saturating counters and history registers shared by the dynamic predictors.
pub mod counter;

/// Global history branch predictor (gshare algorithm).
pub mod gshare;

/// Static predictors (always-not-taken, always-taken, BTFN).
pub mod static_bp;

/// Tournament branch predictor (chooses between gshare and gselect).
pub mod tournament;

use self::{
    bimodal::BimodalPredictor,
    gshare::GSharePredictor,
    static_bp::{StaticPolicy, StaticPredictor},
    tournament::TournamentPredictor,
};
use crate::config::{BranchPredictor as BpType, Config};

/// Enum wrapper for static dispatch of Branch Predictors.
/// This avoids vtable lookups in the fetch loop.
#[derive(Debug, Clone)]
pub enum BranchPredictorWrapper {
    /// Always-not-taken, always-taken, or BTFN.
    Static(StaticPredictor),
    /// PC-indexed 2-bit counters.
    Bimodal(BimodalPredictor),
    /// Global history XOR PC.
    GShare(GSharePredictor),
    /// GShare/GSelect hybrid.
    Tournament(TournamentPredictor),
}

impl BranchPredictorWrapper {
    /// Builds the predictor for `policy`, sized from `config.predictor`.
    pub fn new(policy: BpType, config: &Config) -> Self {
        let sizing = &config.predictor;
        let btb_size = sizing.btb_size;

        match policy {
            BpType::AlwaysNotTaken => {
                Self::Static(StaticPredictor::new(StaticPolicy::AlwaysNotTaken, btb_size))
            }
            BpType::AlwaysTaken => {
                Self::Static(StaticPredictor::new(StaticPolicy::AlwaysTaken, btb_size))
            }
            BpType::Btfn => {
                Self::Static(StaticPredictor::new(StaticPolicy::BackwardTaken, btb_size))
            }
            BpType::Bimodal => Self::Bimodal(BimodalPredictor::new(sizing.bimodal_bits, btb_size)),
            BpType::GShare => Self::GShare(GSharePredictor::new(sizing.gshare_bits, btb_size)),
            BpType::Tournament => {
                Self::Tournament(TournamentPredictor::new(&sizing.tournament, btb_size))
            }
        }
    }

    /// Builds the predictor selected in `config`, if any.
    pub fn from_config(config: &Config) -> Option<Self> {
        config
            .pipeline
            .branch_predictor
            .map(|policy| Self::new(policy, config))
    }
}

impl BranchPredictor for BranchPredictorWrapper {
    #[inline(always)]
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>) {
        match self {
            Self::Static(bp) => bp.predict_branch(pc),
            Self::Bimodal(bp) => bp.predict_branch(pc),
            Self::GShare(bp) => bp.predict_branch(pc),
            Self::Tournament(bp) => bp.predict_branch(pc),
        }
    }

    #[inline(always)]
    fn update_branch(&mut self, pc: u64, taken: bool, target: Option<u64>) {
        match self {
            Self::Static(bp) => bp.update_branch(pc, taken, target),
            Self::Bimodal(bp) => bp.update_branch(pc, taken, target),
            Self::GShare(bp) => bp.update_branch(pc, taken, target),
            Self::Tournament(bp) => bp.update_branch(pc, taken, target),
        }
    }
}
