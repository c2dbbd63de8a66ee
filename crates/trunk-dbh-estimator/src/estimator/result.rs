use serde::{Deserialize, Serialize};
use std::fmt;
use trunk_dbh_core::CircleEstimate;

/// Why a tree (or one trunk-count hypothesis) produced no diameter.
///
/// These are expected outcomes, not errors. Each variant carries the
/// measurement that failed the check.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The breast-height slice is empty.
    NoPointsAtHeight,
    /// The primary cluster has fewer than `min_points` points.
    InsufficientPoints { count: usize },
    /// Radial spread of the primary cluster exceeds `max_spread`.
    ExcessiveDeviation { spread: f64 },
    /// Diameter below `min_diameter`.
    TooSmall { diameter: f64 },
    /// Diameter above `max_diameter`.
    TooLarge { diameter: f64 },
    /// Every trunk-count hypothesis produced an empty cluster.
    NoValidHypothesis,
}

impl RejectionReason {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::NoPointsAtHeight => RejectionKind::NoPointsAtHeight,
            Self::InsufficientPoints { .. } => RejectionKind::InsufficientPoints,
            Self::ExcessiveDeviation { .. } => RejectionKind::ExcessiveDeviation,
            Self::TooSmall { .. } => RejectionKind::TooSmall,
            Self::TooLarge { .. } => RejectionKind::TooLarge,
            Self::NoValidHypothesis => RejectionKind::NoValidHypothesis,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPointsAtHeight => write!(f, "no points at breast height"),
            Self::InsufficientPoints { count } => write!(f, "insufficient points: {count}"),
            Self::ExcessiveDeviation { spread } => write!(f, "excessive deviation: {spread:.4}"),
            Self::TooSmall { diameter } => write!(f, "tree too small: {diameter:.3}"),
            Self::TooLarge { diameter } => write!(f, "tree too large: {diameter:.3}"),
            Self::NoValidHypothesis => write!(f, "no valid trunk hypothesis"),
        }
    }
}

/// Fieldless tag of a [`RejectionReason`], used to tally failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    NoPointsAtHeight,
    InsufficientPoints,
    ExcessiveDeviation,
    TooSmall,
    TooLarge,
    NoValidHypothesis,
}

impl RejectionKind {
    pub const ALL: [RejectionKind; 6] = [
        RejectionKind::NoPointsAtHeight,
        RejectionKind::InsufficientPoints,
        RejectionKind::ExcessiveDeviation,
        RejectionKind::TooSmall,
        RejectionKind::TooLarge,
        RejectionKind::NoValidHypothesis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPointsAtHeight => "no_points_at_height",
            Self::InsufficientPoints => "insufficient_points",
            Self::ExcessiveDeviation => "excessive_deviation",
            Self::TooSmall => "too_small",
            Self::TooLarge => "too_large",
            Self::NoValidHypothesis => "no_valid_hypothesis",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one tree: a non-empty list of trunks, or exactly one reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeResult {
    Success(Vec<CircleEstimate>),
    Fail(RejectionReason),
}

impl TreeResult {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn estimates(&self) -> Option<&[CircleEstimate]> {
        match self {
            Self::Success(estimates) => Some(estimates),
            Self::Fail(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Success(_) => None,
            Self::Fail(reason) => Some(reason),
        }
    }
}

/// What one trunk-count hypothesis produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisOutcome {
    /// The primary cluster passed; every passing cluster, primary first.
    Estimates(Vec<CircleEstimate>),
    /// The primary cluster failed this check.
    Rejected(RejectionReason),
}

/// One evaluated hypothesis, scored by its primary cluster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HypothesisRecord {
    /// Assumed number of trunks.
    pub k: usize,
    /// Point count of the primary cluster.
    pub point_count: usize,
    /// Radial spread of the primary cluster.
    pub spread: f64,
    pub outcome: HypothesisOutcome,
}

/// Full account of one tree's run, for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DbhEstimate {
    pub result: TreeResult,
    /// Points inside the breast-height slice.
    pub band_points: usize,
    /// Non-degenerate hypotheses in increasing `k`.
    pub hypotheses: Vec<HypothesisRecord>,
}
