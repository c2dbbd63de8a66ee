//! Selection of the winning trunk-count hypothesis.

use super::{HypothesisOutcome, HypothesisRecord, RejectionReason, ScoreWeights, TreeResult};

/// Pick the tree outcome from all evaluated hypotheses.
///
/// Any hypothesis with estimates beats every rejected one. Within a group the
/// highest [`ScoreWeights::score`] of the primary cluster wins; on equal
/// scores the earlier record is kept. With no records at all the tree fails
/// with [`RejectionReason::NoValidHypothesis`].
pub fn rank_hypotheses(records: &[HypothesisRecord], weights: &ScoreWeights) -> TreeResult {
    let best_success = best_by_score(
        records.iter().filter_map(|r| match &r.outcome {
            HypothesisOutcome::Estimates(estimates) => Some((r, estimates)),
            HypothesisOutcome::Rejected(_) => None,
        }),
        weights,
    );
    if let Some(estimates) = best_success {
        return TreeResult::Success(estimates.clone());
    }

    let best_failure = best_by_score(
        records.iter().filter_map(|r| match &r.outcome {
            HypothesisOutcome::Rejected(reason) => Some((r, reason)),
            HypothesisOutcome::Estimates(_) => None,
        }),
        weights,
    );
    TreeResult::Fail(
        best_failure
            .copied()
            .unwrap_or(RejectionReason::NoValidHypothesis),
    )
}

/// Relative tolerance under which two scores count as tied.
const SCORE_TIE_EPS: f64 = 1e-9;

/// `true` if `score` beats `best` by more than rounding noise.
fn beats(score: f64, best: f64) -> bool {
    score > best + SCORE_TIE_EPS * best.abs().max(1.0)
}

/// First maximum by score, with near-equal scores treated as ties. A NaN
/// score never replaces an earlier candidate.
fn best_by_score<'a, T>(
    candidates: impl Iterator<Item = (&'a HypothesisRecord, T)>,
    weights: &ScoreWeights,
) -> Option<T> {
    let mut best: Option<(f64, T)> = None;
    for (record, payload) in candidates {
        let score = weights.score(record.point_count, record.spread);
        let better = match &best {
            Some((best_score, _)) => beats(score, *best_score),
            None => true,
        };
        if better {
            best = Some((score, payload));
        }
    }
    best.map(|(_, payload)| payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use trunk_dbh_core::CircleEstimate;

    fn estimate(x: f64, diameter: f64) -> CircleEstimate {
        CircleEstimate {
            center: Point2::new(x, 0.0),
            diameter,
        }
    }

    fn success(k: usize, point_count: usize, spread: f64, xs: &[f64]) -> HypothesisRecord {
        HypothesisRecord {
            k,
            point_count,
            spread,
            outcome: HypothesisOutcome::Estimates(
                xs.iter().map(|&x| estimate(x, 0.3)).collect(),
            ),
        }
    }

    fn failure(
        k: usize,
        point_count: usize,
        spread: f64,
        reason: RejectionReason,
    ) -> HypothesisRecord {
        HypothesisRecord {
            k,
            point_count,
            spread,
            outcome: HypothesisOutcome::Rejected(reason),
        }
    }

    #[test]
    fn success_beats_better_scored_failure() {
        let records = [
            failure(1, 500, 0.0, RejectionReason::TooLarge { diameter: 4.0 }),
            success(2, 60, 0.2, &[1.0]),
        ];
        let res = rank_hypotheses(&records, &ScoreWeights::default());
        assert_eq!(res, TreeResult::Success(vec![estimate(1.0, 0.3)]));
    }

    #[test]
    fn highest_scoring_success_wins() {
        let records = [
            success(1, 200, 0.07, &[0.5]),
            success(2, 100, 0.007, &[0.0, 1.0]),
            success(3, 100, 0.01, &[0.0, 1.0, 1.1]),
        ];
        let res = rank_hypotheses(&records, &ScoreWeights::default());
        assert_eq!(res.estimates().map(|e| e.len()), Some(2));
    }

    #[test]
    fn ties_keep_the_first_record() {
        let records = [success(2, 100, 0.01, &[0.0]), success(3, 100, 0.01, &[9.0])];
        let res = rank_hypotheses(&records, &ScoreWeights::default());
        assert_eq!(res, TreeResult::Success(vec![estimate(0.0, 0.3)]));
    }

    #[test]
    fn rounding_noise_does_not_break_ties() {
        // Same point count, spreads that differ only by float noise.
        let spread = 0.005 / 2f64.sqrt();
        let noisy = spread - 1e-15;
        let weights = ScoreWeights::default();
        assert!(weights.score(100, noisy) > weights.score(100, spread));

        let records = [
            success(2, 100, spread, &[0.0, 1.5]),
            success(3, 100, noisy, &[1.5, 0.1, -0.1]),
        ];
        let res = rank_hypotheses(&records, &weights);
        assert_eq!(res.estimates().map(|e| e.len()), Some(2));
    }

    #[test]
    fn clearly_better_later_record_still_wins() {
        let records = [success(1, 100, 0.01, &[0.0]), success(2, 100, 0.0099, &[7.0])];
        let res = rank_hypotheses(&records, &ScoreWeights::default());
        assert_eq!(res, TreeResult::Success(vec![estimate(7.0, 0.3)]));
    }

    #[test]
    fn most_promising_failure_is_reported() {
        let records = [
            failure(1, 10, 0.01, RejectionReason::InsufficientPoints { count: 10 }),
            failure(2, 6, 0.05, RejectionReason::InsufficientPoints { count: 6 }),
            failure(3, 4, 0.02, RejectionReason::InsufficientPoints { count: 4 }),
        ];
        let res = rank_hypotheses(&records, &ScoreWeights::default());
        assert_eq!(
            res,
            TreeResult::Fail(RejectionReason::InsufficientPoints { count: 10 })
        );
    }

    #[test]
    fn spread_penalty_is_negative() {
        // The rougher hypothesis has more points but must lose.
        let records = [
            failure(1, 120, 1.2, RejectionReason::ExcessiveDeviation { spread: 1.2 }),
            failure(2, 60, 0.01, RejectionReason::TooSmall { diameter: 0.05 }),
        ];
        let res = rank_hypotheses(&records, &ScoreWeights::default());
        assert_eq!(
            res,
            TreeResult::Fail(RejectionReason::TooSmall { diameter: 0.05 })
        );
    }

    #[test]
    fn no_records_is_no_valid_hypothesis() {
        let res = rank_hypotheses(&[], &ScoreWeights::default());
        assert_eq!(res, TreeResult::Fail(RejectionReason::NoValidHypothesis));
    }
}
