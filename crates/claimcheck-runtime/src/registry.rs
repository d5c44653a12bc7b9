//! Host-facing validator contract and the registry of named validators.
//!
//! Hosts look validators up by name (`claimcheck/bespoke_minicheck`) and
//! hand them a JSON configuration. The set of names is fixed when the
//! registry is built; nothing registers itself implicitly.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

use claimcheck_core::{Metadata, ValidationResult};

use crate::config::VerifierConfig;
use crate::providers::ProviderRegistry;
use crate::verifier::{ClaimVerifier, VerifierError};

/// Name of the Bespoke MiniCheck claim validator.
pub const BESPOKE_MINICHECK: &str = "claimcheck/bespoke_minicheck";

/// A validator a host can run on a value.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Registered name.
    fn name(&self) -> &str;

    /// Validate `value`. `metadata` carries per-call inputs such as
    /// reference contexts.
    async fn validate(
        &self,
        value: &str,
        metadata: &Metadata,
    ) -> Result<ValidationResult, VerifierError>;
}

#[async_trait]
impl Validator for ClaimVerifier {
    fn name(&self) -> &str {
        ClaimVerifier::name(self)
    }

    async fn validate(
        &self,
        value: &str,
        metadata: &Metadata,
    ) -> Result<ValidationResult, VerifierError> {
        ClaimVerifier::validate(self, value, metadata).await
    }
}

/// Builds a validator from its JSON configuration.
pub type ValidatorConstructor = fn(&JsonValue) -> Result<Arc<dyn Validator>, VerifierError>;

/// Validators available to a host, keyed by name.
#[derive(Default)]
pub struct ValidatorRegistry {
    constructors: BTreeMap<String, ValidatorConstructor>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in validator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(BESPOKE_MINICHECK, bespoke_minicheck);
        registry
    }

    /// Register `constructor` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, constructor: ValidatorConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Create the validator registered as `name`.
    pub fn create(
        &self,
        name: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn Validator>, VerifierError> {
        let constructor = self.constructors.get(name).ok_or_else(|| {
            VerifierError::NotConfigured(format!(
                "Unknown validator: '{}'. Available: {:?}",
                name,
                self.available()
            ))
        })?;

        constructor(config)
    }

    pub fn available(&self) -> Vec<&str> {
        self.constructors.keys().map(|s| s.as_str()).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.available())
            .finish()
    }
}

fn bespoke_minicheck(config: &JsonValue) -> Result<Arc<dyn Validator>, VerifierError> {
    let config = VerifierConfig::from_json(config).map_err(|e| VerifierError::Config(e.to_string()))?;
    let verifier = ClaimVerifier::from_config(&config, &ProviderRegistry::with_defaults())?;
    Ok(Arc::new(verifier.with_name(BESPOKE_MINICHECK)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_core::Outcome;
    use serde_json::json;

    struct AlwaysPass;

    #[async_trait]
    impl Validator for AlwaysPass {
        fn name(&self) -> &str {
            "test/always_pass"
        }

        async fn validate(
            &self,
            _value: &str,
            _metadata: &Metadata,
        ) -> Result<ValidationResult, VerifierError> {
            Ok(ValidationResult::pass(Vec::new()))
        }
    }

    fn always_pass(_config: &JsonValue) -> Result<Arc<dyn Validator>, VerifierError> {
        Ok(Arc::new(AlwaysPass))
    }

    #[tokio::test]
    async fn test_register_and_create() {
        let mut registry = ValidatorRegistry::new();
        registry.register("test/always_pass", always_pass);
        assert!(registry.has("test/always_pass"));

        let validator = registry.create("test/always_pass", &json!({})).unwrap();
        let result = validator.validate("anything", &Metadata::new()).await.unwrap();

        assert_eq!(validator.name(), "test/always_pass");
        assert_eq!(result.outcome, Outcome::Pass);
    }

    #[test]
    fn test_unknown_validator_lists_available() {
        let registry = ValidatorRegistry::with_defaults();

        match registry.create("claimcheck/unknown", &json!({})) {
            Err(VerifierError::NotConfigured(msg)) => {
                assert!(msg.contains("claimcheck/unknown"));
                assert!(msg.contains(BESPOKE_MINICHECK));
            }
            other => panic!("Expected NotConfigured, got {:?}", other.map(|v| v.name().to_string())),
        }
    }

    #[test]
    fn test_defaults() {
        let registry = ValidatorRegistry::with_defaults();
        assert_eq!(registry.available(), vec![BESPOKE_MINICHECK]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let registry = ValidatorRegistry::with_defaults();
        let err = registry
            .create(BESPOKE_MINICHECK, &json!({"threshold": "high"}))
            .map(|v| v.name().to_string())
            .unwrap_err();

        assert!(matches!(err, VerifierError::Config(_)));
    }

    #[cfg(feature = "bespoke")]
    #[test]
    fn test_bespoke_minicheck_from_config() {
        let registry = ValidatorRegistry::with_defaults();
        let validator = registry
            .create(
                BESPOKE_MINICHECK,
                &json!({"threshold": 0.7, "provider": {"api_key": "test-key"}}),
            )
            .unwrap();

        assert_eq!(validator.name(), BESPOKE_MINICHECK);
    }
}
