//! Per-call validation options and their metadata overrides.

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{json_type, InputError, Metadata};

/// Default minimum support score for a claim to count as supported.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Metadata key overriding the threshold for one call.
pub const THRESHOLD_KEY: &str = "threshold";

/// Metadata key overriding sentence splitting for one call.
pub const SPLIT_SENTENCES_KEY: &str = "split_sentences";

/// Options that control how a text is verified.
///
/// Fields are only reachable through the checked constructors, so the
/// threshold is always a finite value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationOptions {
    /// Minimum score (inclusive) for a claim to be supported
    threshold: f64,

    /// Whether to verify each sentence separately
    split_sentences: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            split_sentences: true,
        }
    }
}

impl ValidationOptions {
    /// Create options, checking that the threshold is a probability.
    pub fn new(threshold: f64, split_sentences: bool) -> Result<Self, InputError> {
        Ok(Self {
            threshold: check_threshold(threshold)?,
            split_sentences,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn split_sentences(&self) -> bool {
        self.split_sentences
    }

    /// Apply `threshold` / `split_sentences` overrides found in metadata.
    ///
    /// Keys that are absent keep the value from `self`.
    pub fn with_overrides(&self, metadata: &Metadata) -> Result<Self, InputError> {
        let mut options = *self;

        if let Some(value) = metadata.get(THRESHOLD_KEY) {
            let threshold = value.as_f64().ok_or_else(|| InputError::InvalidOption {
                key: THRESHOLD_KEY.to_string(),
                reason: format!("expected a number, found {}", json_type(value)),
            })?;
            options.threshold = check_threshold(threshold)?;
        }

        if let Some(value) = metadata.get(SPLIT_SENTENCES_KEY) {
            options.split_sentences = match value {
                JsonValue::Bool(b) => *b,
                other => {
                    return Err(InputError::InvalidOption {
                        key: SPLIT_SENTENCES_KEY.to_string(),
                        reason: format!("expected a boolean, found {}", json_type(other)),
                    })
                }
            };
        }

        Ok(options)
    }
}

fn check_threshold(threshold: f64) -> Result<f64, InputError> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(InputError::InvalidOption {
            key: THRESHOLD_KEY.to_string(),
            reason: format!("must be between 0.0 and 1.0, got {}", threshold),
        });
    }
    Ok(threshold)
}
