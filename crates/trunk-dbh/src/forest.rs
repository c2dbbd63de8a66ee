//! Batch estimation over a segmented forest.
//!
//! Points arrive labelled with the id of the tree they were segmented into.
//! Each tree is estimated independently with its own seed, derived from the
//! base seed and the tree id, so the report does not depend on the order in
//! which trees are scheduled.

use log::{debug, info, warn};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use trunk_dbh_core::normalize_ground;
use trunk_dbh_estimator::{
    DbhEstimateError, DbhEstimator, DbhEstimatorParams, DbhParamsError, RejectionKind,
    TreeResult,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// One lidar return with its segmentation label.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct LabeledPoint {
    pub tree_id: u32,
    pub position: Point3<f64>,
}

impl LabeledPoint {
    pub fn new(tree_id: u32, position: Point3<f64>) -> Self {
        Self { tree_id, position }
    }
}

/// All points of one segmented tree.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TreeCloud {
    pub tree_id: u32,
    pub points: Vec<Point3<f64>>,
}

/// Split labelled points into per-tree clouds, sorted by tree id.
///
/// Point order within a tree follows the input.
pub fn group_by_tree(points: &[LabeledPoint]) -> Vec<TreeCloud> {
    let mut trees: BTreeMap<u32, Vec<Point3<f64>>> = BTreeMap::new();
    for p in points {
        trees.entry(p.tree_id).or_default().push(p.position);
    }
    trees
        .into_iter()
        .map(|(tree_id, points)| TreeCloud { tree_id, points })
        .collect()
}

/// Parameters of the batch driver.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForestParams {
    pub estimator: DbhEstimatorParams,
    /// Shift every tree so its lowest point is at `z = 0` before estimating.
    pub normalize_ground: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            estimator: DbhEstimatorParams::default(),
            normalize_ground: true,
        }
    }
}

/// One output row per estimated trunk.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DbhRow {
    pub tree_id: u32,
    pub x: f64,
    pub y: f64,
    pub dbh: f64,
    pub basal_area: f64,
    /// Tree height, filled in by a later canopy-height join.
    #[serde(default)]
    pub height: Option<f64>,
}

/// Estimator result of one processed tree.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TreeOutcome {
    pub tree_id: u32,
    pub result: TreeResult,
}

/// Tallies over a forest run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ForestSummary {
    pub trees_total: usize,
    /// Trees that ran before any cancellation.
    pub trees_processed: usize,
    pub trees_with_estimates: usize,
    /// Trunk estimates over all trees; one tree can contribute several.
    pub estimates: usize,
    /// Failed trees per rejection reason.
    pub failures: BTreeMap<RejectionKind, usize>,
    pub cancelled: bool,
}

impl ForestSummary {
    /// Number of processed trees without an estimate.
    pub fn trees_failed(&self) -> usize {
        self.failures.values().sum()
    }
}

/// Rows, per-tree outcomes and summary of a forest run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ForestReport {
    pub rows: Vec<DbhRow>,
    /// Processed trees in tree order.
    pub outcomes: Vec<TreeOutcome>,
    pub summary: ForestSummary,
}

#[derive(thiserror::Error, Debug)]
pub enum ForestError {
    #[error(transparent)]
    Params(#[from] DbhParamsError),
    #[error("tree {tree_id}: {source}")]
    Tree {
        tree_id: u32,
        #[source]
        source: DbhEstimateError,
    },
}

/// Estimate every tree of a forest.
///
/// Trees are processed in parallel with the `rayon` feature. `cancel` is
/// polled before each tree; once it is set, remaining trees are skipped and
/// the summary is marked as cancelled. Outcomes and rows are in the order of
/// `trees`.
///
/// Fails on invalid parameters, or on the first tree (in input order) whose
/// points contain a non-finite coordinate.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(trees, params, cancel), fields(trees = trees.len()))
)]
pub fn estimate_forest(
    trees: &[TreeCloud],
    params: &ForestParams,
    cancel: Option<&AtomicBool>,
) -> Result<ForestReport, ForestError> {
    let estimator = DbhEstimator::new(params.estimator.clone())?;
    let base_seed = params.estimator.seed.unwrap_or_else(rand::random);

    let results = map_trees(trees, |tree| {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return None;
        }
        Some(estimate_tree(
            &estimator,
            tree,
            tree_seed(base_seed, tree.tree_id),
            params.normalize_ground,
        ))
    });

    let mut report = ForestReport {
        summary: ForestSummary {
            trees_total: trees.len(),
            ..Default::default()
        },
        ..Default::default()
    };
    for result in results {
        match result {
            Some(outcome) => report.push(outcome?),
            None => report.summary.cancelled = true,
        }
    }

    log_summary(&report.summary);
    Ok(report)
}

impl ForestReport {
    fn push(&mut self, outcome: TreeOutcome) {
        let summary = &mut self.summary;
        summary.trees_processed += 1;
        match &outcome.result {
            TreeResult::Success(trunks) => {
                summary.trees_with_estimates += 1;
                summary.estimates += trunks.len();
                self.rows.extend(trunks.iter().map(|c| DbhRow {
                    tree_id: outcome.tree_id,
                    x: c.center.x,
                    y: c.center.y,
                    dbh: c.diameter,
                    basal_area: c.basal_area(),
                    height: None,
                }));
            }
            TreeResult::Fail(reason) => {
                *summary.failures.entry(reason.kind()).or_default() += 1;
            }
        }
        self.outcomes.push(outcome);
    }
}

fn estimate_tree(
    estimator: &DbhEstimator,
    tree: &TreeCloud,
    seed: u64,
    normalize: bool,
) -> Result<TreeOutcome, ForestError> {
    let result = if normalize {
        let mut points = tree.points.clone();
        if let Some(ground) = normalize_ground(&mut points) {
            debug!("tree {}: ground at {ground:.3}", tree.tree_id);
        }
        estimator.estimate_with_seed(&points, seed)
    } else {
        estimator.estimate_with_seed(&tree.points, seed)
    };

    result
        .map(|result| TreeOutcome {
            tree_id: tree.tree_id,
            result,
        })
        .map_err(|source| ForestError::Tree {
            tree_id: tree.tree_id,
            source,
        })
}

/// Per-tree seed, independent of scheduling.
fn tree_seed(base: u64, tree_id: u32) -> u64 {
    base ^ u64::from(tree_id).wrapping_mul(0xD1B5_4A32_D192_ED03)
}

fn log_summary(summary: &ForestSummary) {
    if summary.cancelled {
        warn!(
            "cancelled after {} of {} trees",
            summary.trees_processed, summary.trees_total
        );
    }
    info!(
        "generated {} diameter estimates from {} segmented trees",
        summary.estimates, summary.trees_processed
    );
    let failed = summary.trees_failed();
    if failed > 0 {
        info!("could not process {failed} trees:");
        for (kind, count) in &summary.failures {
            info!("  {kind}: {count}");
        }
    }
}

#[cfg(feature = "rayon")]
fn map_trees<R, F>(trees: &[TreeCloud], f: F) -> Vec<R>
where
    R: Send,
    F: Fn(&TreeCloud) -> R + Sync + Send,
{
    trees.par_iter().map(f).collect()
}

#[cfg(not(feature = "rayon"))]
fn map_trees<R, F>(trees: &[TreeCloud], f: F) -> Vec<R>
where
    F: Fn(&TreeCloud) -> R,
{
    trees.iter().map(f).collect()
}
