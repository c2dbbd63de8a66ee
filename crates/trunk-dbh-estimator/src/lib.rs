//! Trunk diameter at breast height (DBH) from one segmented lidar tree.
//!
//! ## Quickstart
//!
//! ```
//! use trunk_dbh_estimator::{DbhEstimator, DbhEstimatorParams, TreeResult};
//! use nalgebra::Point3;
//!
//! let estimator = DbhEstimator::new(DbhEstimatorParams::default().with_seed(1))?;
//!
//! let tree: Vec<Point3<f64>> = (0..200)
//!     .map(|i| {
//!         let t = std::f64::consts::TAU * i as f64 / 200.0;
//!         Point3::new(0.15 * t.cos(), 0.15 * t.sin(), 1.2 + 0.001 * i as f64)
//!     })
//!     .collect();
//!
//! match estimator.estimate(&tree)? {
//!     TreeResult::Success(trunks) => println!("dbh = {:.2}", trunks[0].diameter),
//!     TreeResult::Fail(reason) => println!("no dbh: {reason}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Algorithm, per tree:
//! 1. Keep points strictly inside the breast-height band.
//! 2. For every trunk count `k = 1..=max_trunks`, partition the band with
//!    seeded 3D k-means; partitions with an empty cluster are skipped.
//! 3. Validate the largest ("primary") cluster: point count, radial spread,
//!    diameter range. A failing primary rejects the whole hypothesis.
//! 4. Every passing cluster gets a circle fit with one two-sigma outlier pass.
//! 5. Rank hypotheses by the primary cluster's score. Any success beats any
//!    rejection; with no success the best-scoring rejection is reported.

mod estimator;

pub use estimator::{
    rank_hypotheses, validate_cluster, ClusterValidationParams, DbhEstimate, DbhEstimateError,
    DbhEstimator, DbhEstimatorParams, DbhParamsError, HypothesisOutcome, HypothesisRecord,
    RejectionKind, RejectionReason, ScoreWeights, TreeResult,
};

pub use trunk_dbh_core::{CircleEstimate, ClusterMetrics, HeightBandParams, KMeansParams};
