//! Plausibility checks for a candidate trunk cross-section.

use super::{ClusterValidationParams, RejectionReason};
use trunk_dbh_core::ClusterMetrics;

/// Accept or reject one cluster. Checks run in a fixed order and the first
/// failing one is reported:
///
/// 1. point count below `min_points`,
/// 2. spread above `max_spread`,
/// 3. diameter below `min_diameter`,
/// 4. diameter above `max_diameter`.
pub fn validate_cluster(
    metrics: &ClusterMetrics,
    params: &ClusterValidationParams,
) -> Result<(), RejectionReason> {
    if metrics.point_count < params.min_points {
        return Err(RejectionReason::InsufficientPoints {
            count: metrics.point_count,
        });
    }
    if metrics.spread > params.max_spread {
        return Err(RejectionReason::ExcessiveDeviation {
            spread: metrics.spread,
        });
    }
    let diameter = metrics.diameter();
    if diameter < params.min_diameter {
        return Err(RejectionReason::TooSmall { diameter });
    }
    if diameter > params.max_diameter {
        return Err(RejectionReason::TooLarge { diameter });
    }
    Ok(())
}
