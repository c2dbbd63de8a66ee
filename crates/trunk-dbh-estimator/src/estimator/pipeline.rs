use super::ranking::rank_hypotheses;
use super::validation::validate_cluster;
use super::{
    DbhEstimate, DbhEstimateError, DbhEstimatorParams, DbhParamsError, HypothesisOutcome,
    HypothesisRecord, RejectionReason, TreeResult,
};
use log::{debug, trace};
use nalgebra::{Point2, Point3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use trunk_dbh_core::{
    filter_height_band, fit_circle_two_sigma, flatten_xy, kmeans_3d, ClusterMetrics,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Multi-hypothesis trunk diameter estimator.
///
/// Holds only immutable parameters, so one instance can serve many trees
/// from many threads.
#[derive(Clone, Debug)]
pub struct DbhEstimator {
    params: DbhEstimatorParams,
}

impl DbhEstimator {
    /// Create an estimator after checking the parameters.
    pub fn new(params: DbhEstimatorParams) -> Result<Self, DbhParamsError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Estimator parameters.
    #[inline]
    pub fn params(&self) -> &DbhEstimatorParams {
        &self.params
    }

    /// Estimate the trunk diameter(s) of one ground-normalised tree.
    ///
    /// Uses the configured seed, or a fresh random one if none is set.
    pub fn estimate(&self, points: &[Point3<f64>]) -> Result<TreeResult, DbhEstimateError> {
        let seed = self.params.seed.unwrap_or_else(rand::random);
        Ok(self.estimate_detailed(points, seed)?.result)
    }

    /// Like [`estimate`](Self::estimate) with an explicit seed.
    pub fn estimate_with_seed(
        &self,
        points: &[Point3<f64>],
        seed: u64,
    ) -> Result<TreeResult, DbhEstimateError> {
        Ok(self.estimate_detailed(points, seed)?.result)
    }

    /// Run the full pipeline and keep every hypothesis record.
    ///
    /// Band filter → for each `k`: cluster, validate, fit → rank.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, points), fields(points = points.len()))
    )]
    pub fn estimate_detailed(
        &self,
        points: &[Point3<f64>],
        seed: u64,
    ) -> Result<DbhEstimate, DbhEstimateError> {
        check_finite(points)?;

        let band = filter_height_band(points, &self.params.band);
        if band.is_empty() {
            debug!("no points in breast-height band ({} total)", points.len());
            return Ok(DbhEstimate {
                result: TreeResult::Fail(RejectionReason::NoPointsAtHeight),
                band_points: 0,
                hypotheses: Vec::new(),
            });
        }

        let hypotheses: Vec<HypothesisRecord> = (1..=self.params.max_trunks)
            .filter_map(|k| self.evaluate_hypothesis(&band, k, seed))
            .collect();

        let result = rank_hypotheses(&hypotheses, &self.params.scoring);
        Ok(DbhEstimate {
            result,
            band_points: band.len(),
            hypotheses,
        })
    }

    /// Evaluate the assumption that `band` holds `k` trunks.
    ///
    /// Returns `None` when the partition has an empty cluster. Otherwise the
    /// record is scored by the primary (largest) cluster: if it fails
    /// validation the whole hypothesis is rejected, else every passing
    /// cluster yields an estimate, primary first.
    pub fn evaluate_hypothesis(
        &self,
        band: &[Point3<f64>],
        k: usize,
        seed: u64,
    ) -> Option<HypothesisRecord> {
        let mut rng = StdRng::seed_from_u64(hypothesis_seed(seed, k));
        let partition = match kmeans_3d(band, k, &self.params.kmeans, &mut rng) {
            Some(p) if !p.is_degenerate() => p,
            _ => {
                trace!("k={k} skipped: empty cluster");
                return None;
            }
        };

        // Metrics for every cluster first, then validation with the primary known.
        let clusters: Vec<(Vec<Point2<f64>>, ClusterMetrics)> = (0..k)
            .map(|c| {
                let flat = flatten_xy(partition.members(c).map(|i| &band[i]));
                ClusterMetrics::from_points(&flat).map(|m| (flat, m))
            })
            .collect::<Option<_>>()?;

        let primary = primary_cluster(&clusters);
        let (primary_points, primary_metrics) = &clusters[primary];
        let record = |outcome| HypothesisRecord {
            k,
            point_count: primary_metrics.point_count,
            spread: primary_metrics.spread,
            outcome,
        };

        if let Err(reason) = validate_cluster(primary_metrics, &self.params.validation) {
            debug!("k={k} rejected: {reason}");
            return Some(record(HypothesisOutcome::Rejected(reason)));
        }

        let mut estimates = vec![fit_circle_two_sigma(primary_points, primary_metrics)];
        for (c, (flat, metrics)) in clusters.iter().enumerate() {
            if c == primary {
                continue;
            }
            match validate_cluster(metrics, &self.params.validation) {
                Ok(()) => estimates.push(fit_circle_two_sigma(flat, metrics)),
                Err(reason) => trace!("k={k} cluster {c} skipped: {reason}"),
            }
        }

        debug!("k={k} accepted: {} trunk(s)", estimates.len());
        Some(record(HypothesisOutcome::Estimates(estimates)))
    }
}

/// Index of the cluster with the most points, lowest index on ties.
fn primary_cluster(clusters: &[(Vec<Point2<f64>>, ClusterMetrics)]) -> usize {
    let mut best = 0;
    for (i, (_, m)) in clusters.iter().enumerate().skip(1) {
        if m.point_count > clusters[best].1.point_count {
            best = i;
        }
    }
    best
}

/// Independent RNG stream per hypothesis.
fn hypothesis_seed(seed: u64, k: usize) -> u64 {
    seed ^ (k as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn check_finite(points: &[Point3<f64>]) -> Result<(), DbhEstimateError> {
    match points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        Some(index) => {
            let p = points[index];
            Err(DbhEstimateError::NonFiniteCoordinate {
                index,
                x: p.x,
                y: p.y,
                z: p.z,
            })
        }
        None => Ok(()),
    }
}
