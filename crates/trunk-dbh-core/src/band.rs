//! Horizontal slicing of a tree around breast height.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Where the trunk cross-section is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeightBandParams {
    /// Height above local ground at which the diameter is measured.
    pub breast_height: f64,
    /// Full thickness of the slice centred on `breast_height`.
    pub band_height: f64,
}

impl Default for HeightBandParams {
    fn default() -> Self {
        Self {
            breast_height: 1.35,
            band_height: 1.0,
        }
    }
}

impl HeightBandParams {
    /// Exclusive `(bottom, top)` bounds of the slice.
    #[inline]
    pub fn bounds(&self) -> (f64, f64) {
        let half = 0.5 * self.band_height;
        (self.breast_height - half, self.breast_height + half)
    }

    /// `true` if `z` lies strictly inside the slice.
    #[inline]
    pub fn contains(&self, z: f64) -> bool {
        let (bottom, top) = self.bounds();
        bottom < z && z < top
    }
}

/// Keep the points whose height is strictly inside the breast-height slice.
///
/// Points exactly on either boundary are dropped. Order is preserved.
pub fn filter_height_band(points: &[Point3<f64>], params: &HeightBandParams) -> Vec<Point3<f64>> {
    points
        .iter()
        .filter(|p| params.contains(p.z))
        .copied()
        .collect()
}

/// Shift a tree so its lowest point sits at `z = 0`.
///
/// Returns the subtracted ground level, or `None` for an empty slice.
pub fn normalize_ground(points: &mut [Point3<f64>]) -> Option<f64> {
    let ground = points.iter().map(|p| p.z).reduce(f64::min)?;
    for p in points.iter_mut() {
        p.z -= ground;
    }
    Some(ground)
}
