use super::DbhParamsError;
use serde::{Deserialize, Serialize};
use trunk_dbh_core::{HeightBandParams, KMeansParams};

/// Plausibility checks applied to each cluster, in field order.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterValidationParams {
    /// Minimal number of points in a trunk cross-section.
    pub min_points: usize,
    /// Maximal standard deviation of radial distances.
    ///
    /// Set to `f64::INFINITY` to disable the check.
    pub max_spread: f64,
    /// Smallest feasible trunk diameter.
    pub min_diameter: f64,
    /// Largest feasible trunk diameter.
    pub max_diameter: f64,
}

impl Default for ClusterValidationParams {
    fn default() -> Self {
        Self {
            min_points: 50,
            max_spread: 1.0,
            min_diameter: 0.1,
            max_diameter: 3.0,
        }
    }
}

/// Linear score used to rank hypotheses by their primary cluster.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Reward per point.
    pub points_weight: f64,
    /// Contribution per unit of spread; negative so rougher rings lose.
    pub deviation_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            points_weight: 0.01,
            deviation_weight: -100.0,
        }
    }
}

impl ScoreWeights {
    #[inline]
    pub fn score(&self, point_count: usize, spread: f64) -> f64 {
        point_count as f64 * self.points_weight + spread * self.deviation_weight
    }
}

/// Configuration of the trunk diameter estimator.
///
/// Every field has a default; partial JSON objects fill the rest.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DbhEstimatorParams {
    /// Breast-height slice.
    pub band: HeightBandParams,
    /// Trunk counts `1..=max_trunks` are tried.
    pub max_trunks: usize,
    pub validation: ClusterValidationParams,
    pub scoring: ScoreWeights,
    pub kmeans: KMeansParams,
    /// Seed for cluster initialisation. `None` draws a fresh seed per tree.
    pub seed: Option<u64>,
}

impl Default for DbhEstimatorParams {
    fn default() -> Self {
        Self {
            band: HeightBandParams::default(),
            max_trunks: 4,
            validation: ClusterValidationParams::default(),
            scoring: ScoreWeights::default(),
            kmeans: KMeansParams::default(),
            seed: None,
        }
    }
}

impl DbhEstimatorParams {
    /// Same parameters with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the parameters describe a usable estimator.
    pub fn validate(&self) -> Result<(), DbhParamsError> {
        if !self.band.breast_height.is_finite() {
            return Err(DbhParamsError::BreastHeight(self.band.breast_height));
        }
        if !(self.band.band_height.is_finite() && self.band.band_height > 0.0) {
            return Err(DbhParamsError::BandHeight(self.band.band_height));
        }
        if self.max_trunks == 0 {
            return Err(DbhParamsError::NoHypotheses);
        }
        if self.kmeans.max_iters == 0 {
            return Err(DbhParamsError::NoIterations);
        }

        let v = &self.validation;
        for (name, value) in [
            ("max_spread", v.max_spread),
            ("min_diameter", v.min_diameter),
            ("max_diameter", v.max_diameter),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(DbhParamsError::Threshold { name, value });
            }
        }
        if v.min_diameter > v.max_diameter {
            return Err(DbhParamsError::DiameterRange {
                min: v.min_diameter,
                max: v.max_diameter,
            });
        }

        for (name, value) in [
            ("points_weight", self.scoring.points_weight),
            ("deviation_weight", self.scoring.deviation_weight),
        ] {
            if !value.is_finite() {
                return Err(DbhParamsError::Weight { name, value });
            }
        }
        Ok(())
    }
}
