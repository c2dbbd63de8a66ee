/// Invalid estimator configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DbhParamsError {
    #[error("breast_height must be finite (got {0})")]
    BreastHeight(f64),
    #[error("band_height must be finite and positive (got {0})")]
    BandHeight(f64),
    #[error("max_trunks must be at least 1")]
    NoHypotheses,
    #[error("kmeans.max_iters must be at least 1")]
    NoIterations,
    #[error("{name} must be a non-negative number (got {value})")]
    Threshold { name: &'static str, value: f64 },
    #[error("min_diameter ({min}) exceeds max_diameter ({max})")]
    DiameterRange { min: f64, max: f64 },
    #[error("{name} must be finite (got {value})")]
    Weight { name: &'static str, value: f64 },
}

/// Malformed tree input. Never produced for well-formed trees: those always
/// resolve to a [`TreeResult`](super::TreeResult).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DbhEstimateError {
    #[error("point {index} has a non-finite coordinate ({x}, {y}, {z})")]
    NonFiniteCoordinate { index: usize, x: f64, y: f64, z: f64 },
}
