//! Seeded k-means on 3D points.
//!
//! Used to separate the stems that segmentation lumped into one tree. The
//! clustering runs on (x, y, z) rather than on the flattened cross-section:
//! a neighbouring stem leaning into the slice is better separated with its
//! height kept.
//!
//! Seeding is k-means++ and all randomness comes from the caller's RNG, so a
//! fixed seed reproduces the partition exactly. Empty clusters are reported
//! through [`KMeansResult::is_degenerate`] instead of being patched over.

use log::trace;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parameters for k-means.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KMeansParams {
    /// Max Lloyd iterations.
    pub max_iters: usize,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self { max_iters: 10 }
    }
}

/// Partition produced by [`kmeans_3d`].
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansResult {
    /// Final cluster centers, one per requested cluster.
    pub centers: Vec<Point3<f64>>,
    /// Cluster index of every input point.
    pub labels: Vec<usize>,
    /// Number of points per cluster.
    pub counts: Vec<usize>,
    /// Lloyd iterations actually run.
    pub iterations: usize,
}

impl KMeansResult {
    /// `true` if any cluster ended up without points.
    pub fn is_degenerate(&self) -> bool {
        self.counts.iter().any(|&c| c == 0)
    }

    /// Indices of the input points assigned to `cluster`, in input order.
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |&(_, &l)| l == cluster)
            .map(|(i, _)| i)
    }
}

/// Partition `points` into `k` clusters.
///
/// Returns `None` when `k` is zero or exceeds the number of points (no
/// partition without an empty cluster exists).
pub fn kmeans_3d<R: Rng>(
    points: &[Point3<f64>],
    k: usize,
    params: &KMeansParams,
    rng: &mut R,
) -> Option<KMeansResult> {
    let n = points.len();
    if k == 0 || k > n {
        trace!("kmeans: k = {k} with {n} points");
        return None;
    }

    let mut centers = seed_plus_plus(points, k, rng);
    let mut labels = vec![usize::MAX; n];
    let mut iterations = 0;

    for _ in 0..params.max_iters.max(1) {
        iterations += 1;

        // Assignment step.
        if !assign_labels(points, &centers, &mut labels) {
            break;
        }

        // Update step: empty clusters keep their previous center.
        let mut sums = vec![Vector3::<f64>::zeros(); k];
        let mut counts = vec![0usize; k];
        for (p, &l) in points.iter().zip(labels.iter()) {
            sums[l] += p.coords;
            counts[l] += 1;
        }
        for ((center, sum), &count) in centers.iter_mut().zip(&sums).zip(&counts) {
            if count > 0 {
                *center = Point3::from(sum / count as f64);
            }
        }
    }

    let mut counts = vec![0usize; k];
    for &l in &labels {
        counts[l] += 1;
    }

    Some(KMeansResult {
        centers,
        labels,
        counts,
        iterations,
    })
}

/// Assign each point to its nearest center, lowest index on ties.
///
/// Returns whether any label changed.
fn assign_labels(points: &[Point3<f64>], centers: &[Point3<f64>], labels: &mut [usize]) -> bool {
    let mut changed = false;
    for (p, label) in points.iter().zip(labels.iter_mut()) {
        let mut best = 0usize;
        let mut best_d2 = f64::INFINITY;
        for (c, center) in centers.iter().enumerate() {
            let d2 = (p - center).norm_squared();
            if d2 < best_d2 {
                best = c;
                best_d2 = d2;
            }
        }
        if *label != best {
            *label = best;
            changed = true;
        }
    }
    changed
}

/// k-means++ initial centers.
fn seed_plus_plus<R: Rng>(points: &[Point3<f64>], k: usize, rng: &mut R) -> Vec<Point3<f64>> {
    let n = points.len();
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.random_range(0..n)]);

    let mut d2: Vec<f64> = points
        .iter()
        .map(|p| (p - centers[0]).norm_squared())
        .collect();

    while centers.len() < k {
        let total: f64 = d2.iter().sum();
        let idx = if total > 0.0 && total.is_finite() {
            let mut target = rng.random::<f64>() * total;
            // Rounding can leave `target` past the last bucket.
            let mut chosen = d2.iter().rposition(|&w| w > 0.0).unwrap_or(n - 1);
            for (i, &w) in d2.iter().enumerate() {
                if target < w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            rng.random_range(0..n)
        };

        let center = points[idx];
        for (p, d) in points.iter().zip(d2.iter_mut()) {
            *d = d.min((p - center).norm_squared());
        }
        centers.push(center);
    }

    centers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn blob(cx: f64, cy: f64, n: usize) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                let t = i as f64 * 0.7;
                Point3::new(
                    cx + 0.05 * t.cos(),
                    cy + 0.05 * t.sin(),
                    1.3 + 0.1 * (i % 5) as f64 / 5.0,
                )
            })
            .collect()
    }

    #[test]
    fn separates_two_distant_blobs() {
        let mut points = blob(0.0, 0.0, 40);
        points.extend(blob(3.0, 0.0, 30));
        let mut rng = StdRng::seed_from_u64(7);

        let res = kmeans_3d(&points, 2, &KMeansParams::default(), &mut rng).expect("partition");
        assert!(!res.is_degenerate());

        let first = res.labels[0];
        assert!(res.labels[..40].iter().all(|&l| l == first));
        assert!(res.labels[40..].iter().all(|&l| l != first));

        let mut counts = res.counts.clone();
        counts.sort_unstable();
        assert_eq!(counts, vec![30, 40]);
    }

    #[test]
    fn single_cluster_takes_everything() {
        let points = blob(1.0, 1.0, 25);
        let mut rng = StdRng::seed_from_u64(1);
        let res = kmeans_3d(&points, 1, &KMeansParams::default(), &mut rng).expect("partition");
        assert_eq!(res.counts, vec![25]);
        assert_eq!(res.members(0).count(), 25);
        approx::assert_abs_diff_eq!(res.centers[0].x, 1.0, epsilon = 0.05);
    }

    #[test]
    fn identical_points_leave_empty_clusters() {
        let points = vec![Point3::new(2.0, 2.0, 1.35); 12];
        let mut rng = StdRng::seed_from_u64(3);
        let res = kmeans_3d(&points, 3, &KMeansParams::default(), &mut rng).expect("partition");
        assert!(res.is_degenerate());
        assert_eq!(res.counts.iter().sum::<usize>(), 12);
    }

    #[test]
    fn rejects_more_clusters_than_points() {
        let points = blob(0.0, 0.0, 3);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(kmeans_3d(&points, 4, &KMeansParams::default(), &mut rng).is_none());
        assert!(kmeans_3d(&points, 0, &KMeansParams::default(), &mut rng).is_none());
    }

    #[test]
    fn params_fill_missing_fields_from_defaults() {
        let params: KMeansParams = serde_json::from_str("{}").expect("empty object");
        assert_eq!(params, KMeansParams::default());
        let params: KMeansParams = serde_json::from_str(r#"{"max_iters": 25}"#).expect("json");
        assert_eq!(params.max_iters, 25);
    }

    #[test]
    fn same_seed_same_partition() {
        let mut points = blob(0.0, 0.0, 20);
        points.extend(blob(0.4, 0.2, 20));
        points.extend(blob(1.0, -0.5, 20));
        let params = KMeansParams::default();

        let a = kmeans_3d(&points, 3, &params, &mut StdRng::seed_from_u64(42));
        let b = kmeans_3d(&points, 3, &params, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
