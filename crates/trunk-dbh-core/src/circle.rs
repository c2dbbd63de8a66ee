//! Trunk cross-section metrics and circle fit.
//!
//! A cluster is flattened to (x, y) once it has been separated from its
//! neighbours. The circle is the centroid plus the mean radial distance; the
//! standard deviation of the radial distances ("spread") says how ring-like
//! the cluster is.

use nalgebra::{Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Final trunk cross-section guess.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct CircleEstimate {
    /// Trunk center in map units.
    pub center: Point2<f64>,
    /// Diameter at breast height.
    pub diameter: f64,
}

impl CircleEstimate {
    #[inline]
    pub fn radius(&self) -> f64 {
        0.5 * self.diameter
    }

    /// Cross-section area, `π·d²/4`.
    #[inline]
    pub fn basal_area(&self) -> f64 {
        let r = self.radius();
        PI * r * r
    }
}

/// Radial statistics of one cluster around its 2D centroid.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ClusterMetrics {
    pub point_count: usize,
    /// Centroid over (x, y).
    pub center: Point2<f64>,
    /// Mean distance from `center`.
    pub radius: f64,
    /// Population standard deviation of the distances from `center`.
    pub spread: f64,
}

impl ClusterMetrics {
    /// Compute metrics over flattened points. `None` if `points` is empty.
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let center = centroid(points);
        let distances = radial_distances(points, center);
        let (radius, spread) = mean_and_std(&distances);
        Some(Self {
            point_count: points.len(),
            center,
            radius,
            spread,
        })
    }

    #[inline]
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    #[inline]
    pub fn as_estimate(&self) -> CircleEstimate {
        CircleEstimate {
            center: self.center,
            diameter: self.diameter(),
        }
    }
}

/// Drop the (x, y) of 3D points.
pub fn flatten_xy<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Vec<Point2<f64>> {
    points.into_iter().map(|p| Point2::new(p.x, p.y)).collect()
}

/// Fit a circle with one pass of two-sigma outlier rejection.
///
/// `metrics` must describe `points`. Points whose distance exceeds the mean by
/// `2·spread` or more are discarded and the circle is recomputed from the
/// rest. If nothing survives the cut (zero spread), the unfiltered circle is
/// returned.
pub fn fit_circle_two_sigma(points: &[Point2<f64>], metrics: &ClusterMetrics) -> CircleEstimate {
    let cutoff = 2.0 * metrics.spread;
    let kept: Vec<Point2<f64>> = points
        .iter()
        .filter(|p| (*p - metrics.center).norm() - metrics.radius < cutoff)
        .copied()
        .collect();

    match ClusterMetrics::from_points(&kept) {
        Some(refined) => refined.as_estimate(),
        None => metrics.as_estimate(),
    }
}

fn centroid(points: &[Point2<f64>]) -> Point2<f64> {
    let sum = points.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / points.len() as f64)
}

fn radial_distances(points: &[Point2<f64>], center: Point2<f64>) -> Vec<f64> {
    points.iter().map(|p| (p - center).norm()).collect()
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
