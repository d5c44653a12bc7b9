//! Verdict types shared between the core and the runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claims::Claim;
use crate::score::SupportScore;

/// Error message attached to every fail verdict.
pub const NOT_SUPPORTED_MESSAGE: &str = "Claim not supported by the fact-check service";

/// Outcome of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Pass => write!(f, "pass"),
            Outcome::Fail => write!(f, "fail"),
        }
    }
}

/// Per-claim result of aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerdict {
    pub claim: Claim,
    pub score: SupportScore,
    pub supported: bool,
}

/// Final result of verifying a text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Pass if every claim is supported
    pub outcome: Outcome,

    /// On fail: the supported claims, space-joined in original order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_value: Option<String>,

    /// On fail: why validation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Every claim with its score, in original order
    pub claims: Vec<ClaimVerdict>,

    /// When the verdict was produced
    pub validated_at: DateTime<Utc>,
}

impl ValidationResult {
    /// A passing result.
    pub fn pass(claims: Vec<ClaimVerdict>) -> Self {
        Self {
            outcome: Outcome::Pass,
            fix_value: None,
            error_message: None,
            claims,
            validated_at: Utc::now(),
        }
    }

    /// A failing result carrying the degraded output.
    pub fn fail(claims: Vec<ClaimVerdict>, fix_value: String) -> Self {
        Self {
            outcome: Outcome::Fail,
            fix_value: Some(fix_value),
            error_message: Some(NOT_SUPPORTED_MESSAGE.to_string()),
            claims,
            validated_at: Utc::now(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// Claims that did not meet the threshold.
    pub fn unsupported(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter().filter(|v| !v.supported).map(|v| &v.claim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Pass).unwrap(), "\"pass\"");
        assert_eq!(serde_json::to_string(&Outcome::Fail).unwrap(), "\"fail\"");
        assert_eq!(Outcome::Fail.to_string(), "fail");
    }

    #[test]
    fn test_pass_has_no_fix_value() {
        let result = ValidationResult::pass(vec![]);
        assert!(result.is_pass());
        assert!(result.fix_value.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "pass");
        assert!(json.get("fix_value").is_none());
    }

    #[test]
    fn test_fail_carries_message() {
        let result = ValidationResult::fail(vec![], String::new());
        assert!(!result.is_pass());
        assert_eq!(result.fix_value.as_deref(), Some(""));
        assert_eq!(result.error_message.as_deref(), Some(NOT_SUPPORTED_MESSAGE));
    }
}
