//! Trunk diameter estimation pipeline.
//!
//! This module wires together the breast-height band filter, the per-`k`
//! clustering, cluster validation and circle fitting, and the final ranking
//! of trunk-count hypotheses.

mod error;
mod params;
mod pipeline;
mod ranking;
mod result;
mod validation;

pub use error::{DbhEstimateError, DbhParamsError};
pub use params::{ClusterValidationParams, DbhEstimatorParams, ScoreWeights};
pub use pipeline::DbhEstimator;
pub use ranking::rank_hypotheses;
pub use result::{
    DbhEstimate, HypothesisOutcome, HypothesisRecord, RejectionKind, RejectionReason, TreeResult,
};
pub use validation::validate_cluster;
