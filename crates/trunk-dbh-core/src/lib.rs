//! Core geometry for trunk diameter estimation.
//!
//! This crate is intentionally small and purely geometric. It knows nothing
//! about trunk-count hypotheses, validation thresholds or ranking; those live
//! in `trunk-dbh-estimator`.
//!
//! - [`filter_height_band`]: the breast-height slice of a tree.
//! - [`kmeans_3d`]: seeded k-means++ partition of that slice.
//! - [`ClusterMetrics`] / [`fit_circle_two_sigma`]: cross-section circle.

mod band;
mod circle;
mod kmeans;
mod logger;

pub use band::{filter_height_band, normalize_ground, HeightBandParams};
pub use circle::{flatten_xy, fit_circle_two_sigma, CircleEstimate, ClusterMetrics};
pub use kmeans::{kmeans_3d, KMeansParams, KMeansResult};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, init_with_levels};

pub use nalgebra::{Point2, Point3};
