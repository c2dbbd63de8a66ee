//! High-level facade crate for the `trunk-dbh-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core geometry and the per-tree estimator
//! - a batch driver that runs the estimator over every tree of a segmented
//!   forest and tallies the outcome
//! - JSON helpers for configs, point inputs and reports
//!
//! ## Quickstart
//!
//! ```
//! use trunk_dbh::{estimate_forest, group_by_tree, ForestParams, LabeledPoint};
//! use trunk_dbh::estimator::DbhEstimatorParams;
//! use nalgebra::Point3;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // One 0.4 m stem labelled as tree 7, sitting on ground at z = 250.
//! let points: Vec<LabeledPoint> = (0..200)
//!     .map(|i| {
//!         let t = std::f64::consts::TAU * i as f64 / 200.0;
//!         let z = 251.0 + 0.7 * ((i * 37) % 200) as f64 / 200.0;
//!         LabeledPoint::new(7, Point3::new(0.2 * t.cos(), 0.2 * t.sin(), z))
//!     })
//!     .chain(std::iter::once(LabeledPoint::new(7, Point3::new(0.0, 0.0, 250.0))))
//!     .collect();
//!
//! let params = ForestParams {
//!     estimator: DbhEstimatorParams::default().with_seed(1),
//!     ..Default::default()
//! };
//! let report = estimate_forest(&group_by_tree(&points), &params, None)?;
//! assert_eq!(report.rows.len(), 1);
//! assert_eq!(report.rows[0].tree_id, 7);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `trunk_dbh::core`: height band, k-means, circle metrics, logging setup.
//! - `trunk_dbh::estimator`: multi-hypothesis per-tree estimator.
//! - [`forest`]: grouping, batch estimation, report rows and summary.
//! - [`io`]: JSON config, input and report files.
//!
//! ## Features
//! - `rayon`: estimate trees on the rayon thread pool.
//! - `tracing`: spans around the pipeline stages and a `tracing` subscriber.

pub use trunk_dbh_core as core;
pub use trunk_dbh_estimator as estimator;

pub use trunk_dbh_core::{CircleEstimate, HeightBandParams};
pub use trunk_dbh_estimator::{
    DbhEstimator, DbhEstimatorParams, RejectionKind, RejectionReason, TreeResult,
};

pub mod forest;
pub mod io;

pub use forest::{
    estimate_forest, group_by_tree, DbhRow, ForestError, ForestParams, ForestReport,
    ForestSummary, LabeledPoint, TreeCloud, TreeOutcome,
};
pub use io::{ForestConfig, ForestInput, ForestIoError};
