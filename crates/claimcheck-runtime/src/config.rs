//! Verifier configuration.
//!
//! Loadable from JSON or YAML. Durations use human-readable strings
//! (`"4s"`, `"1h"`). Every field has a default, so `{}` is a valid config.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;

use claimcheck_core::{ValidationOptions, DEFAULT_THRESHOLD};

use crate::resilience::RetryPolicy;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where claims are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMode {
    /// Remote fact-check API
    #[default]
    Remote,

    /// On-device model. Not supported; requests fail immediately.
    Local,
}

/// Score cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: u64,

    #[serde(with = "duration_str")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Provider selection plus provider-specific options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Registered provider type, e.g. "bespoke"
    #[serde(rename = "type", default = "default_provider_type")]
    pub kind: String,

    /// Remaining keys, handed to the provider factory untouched
    #[serde(flatten)]
    pub options: serde_json::Map<String, JsonValue>,
}

fn default_provider_type() -> String {
    "bespoke".to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: default_provider_type(),
            options: serde_json::Map::new(),
        }
    }
}

impl ProviderSettings {
    /// Provider options as a JSON object, the shape factories expect.
    pub fn options_json(&self) -> JsonValue {
        JsonValue::Object(self.options.clone())
    }
}

/// Configuration for a [`ClaimVerifier`](crate::ClaimVerifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Minimum support score for a claim
    pub threshold: f64,

    /// Verify sentence by sentence
    pub split_sentences: bool,

    /// Upper bound on in-flight provider calls per validation
    pub max_concurrency: usize,

    pub inference: InferenceMode,

    pub retry: RetryPolicy,

    /// Absent means no caching
    pub cache: Option<CacheConfig>,

    pub provider: ProviderSettings,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            split_sentences: true,
            max_concurrency: 8,
            inference: InferenceMode::Remote,
            retry: RetryPolicy::default(),
            cache: None,
            provider: ProviderSettings::default(),
        }
    }
}

impl VerifierConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON value.
    pub fn from_json(value: &JsonValue) -> Result<Self, ConfigError> {
        let config = Self::deserialize(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validation_options()?;

        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        self.retry.validate().map_err(ConfigError::Invalid)?;

        if let Some(cache) = &self.cache {
            if cache.max_entries == 0 {
                return Err(ConfigError::Invalid(
                    "cache.max_entries must be at least 1".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Default per-call options derived from this config.
    pub fn validation_options(&self) -> Result<ValidationOptions, ConfigError> {
        ValidationOptions::new(self.threshold, self.split_sentences)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Serde adapter for `humantime` duration strings.
pub(crate) mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = VerifierConfig::from_json(&serde_json::json!({})).unwrap();
        assert_eq!(config, VerifierConfig::default());
        assert_eq!(config.provider.kind, "bespoke");
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.cache.is_none());
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
threshold: 0.7
split_sentences: false
max_concurrency: 4
retry:
  max_attempts: 5
  min_delay: 250ms
  max_delay: 2s
cache:
  max_entries: 100
  ttl: 10m
provider:
  type: bespoke
  base_url: https://staging.example
  timeout: 5s
"#;
        let config = VerifierConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.threshold, 0.7);
        assert!(!config.split_sentences);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.min_delay, Duration::from_millis(250));
        assert_eq!(config.retry.max_delay, Duration::from_secs(2));
        assert_eq!(config.cache.as_ref().unwrap().ttl, Duration::from_secs(600));
        assert_eq!(
            config.provider.options_json()["base_url"],
            "https://staging.example"
        );
        assert_eq!(config.provider.options_json()["timeout"], "5s");
    }

    #[test]
    fn test_local_inference_parses() {
        let config = VerifierConfig::from_json(&serde_json::json!({"inference": "local"})).unwrap();
        assert_eq!(config.inference, InferenceMode::Local);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for bad in [
            serde_json::json!({"threshold": 1.5}),
            serde_json::json!({"max_concurrency": 0}),
            serde_json::json!({"retry": {"max_attempts": 0}}),
            serde_json::json!({"retry": {"min_delay": "20s", "max_delay": "1s"}}),
            serde_json::json!({"cache": {"max_entries": 0}}),
        ] {
            assert!(
                matches!(VerifierConfig::from_json(&bad), Err(ConfigError::Invalid(_))),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_bad_duration_is_parse_error() {
        let err = VerifierConfig::from_json(&serde_json::json!({"retry": {"min_delay": "soon"}}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_round_trip_durations_are_human_readable() {
        let json = serde_json::to_value(VerifierConfig::default()).unwrap();
        assert_eq!(json["retry"]["min_delay"], "4s");
        assert_eq!(json["retry"]["max_delay"], "10s");
    }
}
