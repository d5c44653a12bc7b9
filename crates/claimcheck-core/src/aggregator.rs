//! Aggregator: folds per-claim scores into a single verdict.
//!
//! The rules are fixed:
//! 1. A claim is supported if its score meets the threshold
//! 2. If EVERY claim is supported → PASS
//! 3. Otherwise → FAIL, with the supported claims kept as the fix value
//!
//! Aggregation never runs on partial input. Each claim must have exactly
//! one score, matched by claim index rather than by arrival order.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::claims::{join_claims, Claim};
use crate::score::{ScoreResult, SupportScore};
use crate::types::{ClaimVerdict, ValidationResult};

/// Errors raised when the scores do not line up with the claims.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("no score for claim {index}")]
    MissingScore { index: usize },

    #[error("more than one score for claim {index}")]
    DuplicateScore { index: usize },

    #[error("score refers to unknown claim {index}")]
    UnknownClaim { index: usize },
}

/// The Aggregator turns claim scores into a [`ValidationResult`].
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    threshold: f64,
}

impl Aggregator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Aggregate `scores` for `claims`.
    ///
    /// `scores` may arrive in any order.
    pub fn aggregate(
        &self,
        claims: &[Claim],
        scores: impl IntoIterator<Item = ScoreResult>,
    ) -> Result<ValidationResult, AggregationError> {
        let mut by_index = self.index_scores(claims, scores)?;

        let mut verdicts = Vec::with_capacity(claims.len());
        for claim in claims {
            let score = by_index
                .remove(&claim.index)
                .ok_or(AggregationError::MissingScore { index: claim.index })?;
            verdicts.push(self.judge(claim, score));
        }

        let supported = verdicts.iter().filter(|v| v.supported).count();
        tracing::debug!(
            claims = verdicts.len(),
            supported,
            threshold = self.threshold,
            "Aggregated claim scores"
        );

        if supported == verdicts.len() {
            return Ok(ValidationResult::pass(verdicts));
        }

        let fix_value = join_claims(verdicts.iter().filter(|v| v.supported).map(|v| &v.claim));
        Ok(ValidationResult::fail(verdicts, fix_value))
    }

    fn index_scores(
        &self,
        claims: &[Claim],
        scores: impl IntoIterator<Item = ScoreResult>,
    ) -> Result<BTreeMap<usize, SupportScore>, AggregationError> {
        let known: BTreeSet<usize> = claims.iter().map(|c| c.index).collect();
        let mut by_index = BTreeMap::new();

        for result in scores {
            let index = result.claim_index;
            if !known.contains(&index) {
                return Err(AggregationError::UnknownClaim { index });
            }
            if by_index.insert(index, result.score).is_some() {
                return Err(AggregationError::DuplicateScore { index });
            }
        }

        Ok(by_index)
    }

    fn judge(&self, claim: &Claim, score: SupportScore) -> ClaimVerdict {
        let supported = score.supports(self.threshold);
        ClaimVerdict {
            claim: claim.clone(),
            score,
            supported,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(crate::input::DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;
    use proptest::prelude::*;

    fn claims(texts: &[&str]) -> Vec<Claim> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Claim::new(i, *t))
            .collect()
    }

    fn prob(index: usize, p: f64) -> ScoreResult {
        ScoreResult::new(index, SupportScore::Probability(p))
    }

    #[test]
    fn test_all_supported_passes() {
        let claims = claims(&["Alex likes dogs."]);
        let result = Aggregator::default()
            .aggregate(&claims, vec![prob(0, 0.93)])
            .unwrap();

        assert_eq!(result.outcome, Outcome::Pass);
        assert!(result.fix_value.is_none());
        assert!(result.claims[0].supported);
    }

    #[test]
    fn test_unsupported_claim_dropped_from_fix_value() {
        let claims = claims(&["Alex likes cats.", "Alex likes dogs."]);
        // Scores arrive out of order
        let result = Aggregator::default()
            .aggregate(&claims, vec![prob(1, 0.91), prob(0, 0.02)])
            .unwrap();

        assert_eq!(result.outcome, Outcome::Fail);
        assert_eq!(result.fix_value.as_deref(), Some("Alex likes dogs."));
        assert_eq!(
            result.unsupported().map(|c| c.text.as_str()).collect::<Vec<_>>(),
            vec!["Alex likes cats."]
        );
    }

    #[test]
    fn test_nothing_supported_gives_empty_fix_value() {
        let claims = claims(&["A.", "B."]);
        let result = Aggregator::new(0.5)
            .aggregate(&claims, vec![prob(0, 0.1), prob(1, 0.2)])
            .unwrap();
        assert_eq!(result.fix_value.as_deref(), Some(""));
    }

    #[test]
    fn test_no_claims_passes() {
        let result = Aggregator::default().aggregate(&[], vec![]).unwrap();
        assert!(result.is_pass());
    }

    #[test]
    fn test_per_context_scores() {
        let claims = claims(&["A.", "B."]);
        let scores = vec![
            ScoreResult::new(0, SupportScore::PerContext(vec![0.1, 0.6])),
            ScoreResult::new(1, SupportScore::PerContext(vec![0.2, 0.3])),
        ];
        let result = Aggregator::new(0.5).aggregate(&claims, scores).unwrap();
        assert_eq!(result.fix_value.as_deref(), Some("A."));
    }

    #[test]
    fn test_missing_score_rejected() {
        let claims = claims(&["A.", "B."]);
        let err = Aggregator::default()
            .aggregate(&claims, vec![prob(0, 0.9)])
            .unwrap_err();
        assert_eq!(err, AggregationError::MissingScore { index: 1 });
    }

    #[test]
    fn test_duplicate_score_rejected() {
        let claims = claims(&["A."]);
        let err = Aggregator::default()
            .aggregate(&claims, vec![prob(0, 0.9), prob(0, 0.1)])
            .unwrap_err();
        assert_eq!(err, AggregationError::DuplicateScore { index: 0 });
    }

    #[test]
    fn test_unknown_claim_rejected() {
        let claims = claims(&["A."]);
        let err = Aggregator::default()
            .aggregate(&claims, vec![prob(0, 0.9), prob(7, 0.9)])
            .unwrap_err();
        assert_eq!(err, AggregationError::UnknownClaim { index: 7 });
    }

    proptest! {
        #[test]
        fn outcome_is_pass_iff_every_score_meets_threshold(
            scores in proptest::collection::vec(0.0f64..=1.0, 1..12),
            threshold in 0.0f64..=1.0,
        ) {
            let texts: Vec<String> = (0..scores.len()).map(|i| format!("Claim {i}.")).collect();
            let claims: Vec<Claim> = texts.iter().enumerate().map(|(i, t)| Claim::new(i, t.as_str())).collect();
            let results = scores.iter().enumerate().map(|(i, p)| prob(i, *p));

            let result = Aggregator::new(threshold).aggregate(&claims, results).unwrap();
            let all_supported = scores.iter().all(|p| *p >= threshold);

            prop_assert_eq!(result.is_pass(), all_supported);
            if !all_supported {
                let expected = texts
                    .iter()
                    .zip(&scores)
                    .filter(|(_, p)| **p >= threshold)
                    .map(|(t, _)| t.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                prop_assert_eq!(result.fix_value, Some(expected));
            }
        }

        #[test]
        fn arrival_order_does_not_change_verdict(
            scores in proptest::collection::vec(0.0f64..=1.0, 1..12),
            rotation in 0usize..12,
        ) {
            let claims: Vec<Claim> = (0..scores.len()).map(|i| Claim::new(i, format!("C{i}."))).collect();
            let in_order: Vec<ScoreResult> = scores.iter().enumerate().map(|(i, p)| prob(i, *p)).collect();
            let mut shuffled = in_order.clone();
            shuffled.reverse();
            let len = shuffled.len();
            shuffled.rotate_left(rotation % len);

            let aggregator = Aggregator::new(0.5);
            let a = aggregator.aggregate(&claims, in_order).unwrap();
            let b = aggregator.aggregate(&claims, shuffled).unwrap();

            prop_assert_eq!(a.outcome, b.outcome);
            prop_assert_eq!(a.fix_value, b.fix_value);
            prop_assert_eq!(a.claims, b.claims);
        }
    }
}
