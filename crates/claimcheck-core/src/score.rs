//! Support scores returned by a fact-check service.

use serde::{Deserialize, Serialize};

/// How strongly the context supports a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupportScore {
    /// One probability for the claim against all contexts together
    Probability(f64),

    /// One score per context, in context order
    PerContext(Vec<f64>),
}

impl SupportScore {
    /// Whether this score meets `threshold` (inclusive).
    ///
    /// A per-context score is supported when any context meets the
    /// threshold. NaN scores never do, and neither does an empty list.
    pub fn supports(&self, threshold: f64) -> bool {
        match self {
            SupportScore::Probability(p) => *p >= threshold,
            SupportScore::PerContext(scores) => scores.iter().any(|s| *s >= threshold),
        }
    }

    /// Highest finite score, if any.
    pub fn best(&self) -> Option<f64> {
        match self {
            SupportScore::Probability(p) if p.is_finite() => Some(*p),
            SupportScore::Probability(_) => None,
            SupportScore::PerContext(scores) => scores
                .iter()
                .copied()
                .filter(|s| s.is_finite())
                .fold(None, |best, s| Some(best.map_or(s, |b: f64| b.max(s)))),
        }
    }
}

/// A score tied to the claim it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Index of the claim this score belongs to
    pub claim_index: usize,

    pub score: SupportScore,
}

impl ScoreResult {
    pub fn new(claim_index: usize, score: SupportScore) -> Self {
        Self { claim_index, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_threshold_is_inclusive() {
        assert!(SupportScore::Probability(0.5).supports(0.5));
        assert!(!SupportScore::Probability(0.49).supports(0.5));
    }

    #[test]
    fn test_per_context_any_supports() {
        let score = SupportScore::PerContext(vec![0.1, 0.8, 0.3]);
        assert!(score.supports(0.5));
        assert!(!score.supports(0.9));
    }

    #[test]
    fn test_degenerate_scores_unsupported() {
        assert!(!SupportScore::Probability(f64::NAN).supports(0.0));
        assert!(!SupportScore::PerContext(vec![]).supports(0.0));
    }

    #[test]
    fn test_best() {
        assert_eq!(SupportScore::Probability(0.4).best(), Some(0.4));
        assert_eq!(SupportScore::Probability(f64::NAN).best(), None);
        assert_eq!(
            SupportScore::PerContext(vec![0.2, f64::NAN, 0.7]).best(),
            Some(0.7)
        );
        assert_eq!(SupportScore::PerContext(vec![]).best(), None);
    }

    #[test]
    fn test_untagged_serde() {
        let p: SupportScore = serde_json::from_str("0.75").unwrap();
        assert_eq!(p, SupportScore::Probability(0.75));

        let many: SupportScore = serde_json::from_str("[0.1, 0.9]").unwrap();
        assert_eq!(many, SupportScore::PerContext(vec![0.1, 0.9]));
    }
}
