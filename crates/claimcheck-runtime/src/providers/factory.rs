//! Provider factories and the registry that maps backend names to them.
//!
//! ```ignore
//! let mut registry = ProviderRegistry::new();
//! registry.register(Arc::new(BespokeProviderFactory));
//!
//! let provider = registry.create("bespoke", &config)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{FactCheckProvider, ProviderError};

/// Builds providers of one type from JSON configuration.
pub trait ProviderFactory: Send + Sync {
    /// Unique identifier for this provider type, e.g. "bespoke".
    fn provider_type(&self) -> &'static str;

    /// Create a provider instance from its configuration.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn FactCheckProvider>, ProviderError>;

    /// Validate configuration without creating a provider.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;

    fn description(&self) -> &'static str {
        "Fact-check provider"
    }
}

/// Registry of available provider factories, keyed by provider type.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any factory of the same type.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories
            .insert(factory.provider_type().to_string(), factory);
    }

    /// Create a provider of `provider_type` from `config`.
    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn FactCheckProvider>, ProviderError> {
        self.factory(provider_type)?.create(config)
    }

    pub fn validate(&self, provider_type: &str, config: &JsonValue) -> Result<(), ProviderError> {
        self.factory(provider_type)?.validate_config(config)
    }

    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    pub fn has_provider(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    fn factory(&self, provider_type: &str) -> Result<&Arc<dyn ProviderFactory>, ProviderError> {
        self.factories.get(provider_type).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider type: '{}'. Available: {:?}",
                provider_type,
                self.available_types()
            ))
        })
    }

    /// Create a registry with all built-in providers registered.
    #[cfg(feature = "bespoke")]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::BespokeProviderFactory));
        registry
    }

    /// Create a registry with all built-in providers registered.
    #[cfg(not(feature = "bespoke"))]
    pub fn with_defaults() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FactCheckRequest;
    use async_trait::async_trait;
    use claimcheck_core::SupportScore;

    struct FixedProvider {
        name: String,
        score: f64,
    }

    #[async_trait]
    impl FactCheckProvider for FixedProvider {
        async fn score(&self, _request: FactCheckRequest<'_>) -> Result<SupportScore, ProviderError> {
            Ok(SupportScore::Probability(self.score))
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct FixedProviderFactory;

    impl ProviderFactory for FixedProviderFactory {
        fn provider_type(&self) -> &'static str {
            "fixed"
        }

        fn create(&self, config: &JsonValue) -> Result<Arc<dyn FactCheckProvider>, ProviderError> {
            self.validate_config(config)?;
            Ok(Arc::new(FixedProvider {
                name: config["name"].as_str().unwrap_or("fixed").to_string(),
                score: config["score"].as_f64().unwrap_or(1.0),
            }))
        }

        fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
            match config["score"].as_f64() {
                Some(s) if !(0.0..=1.0).contains(&s) => Err(ProviderError::NotConfigured(
                    "score must be a probability".to_string(),
                )),
                _ => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn test_register_and_create() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(FixedProviderFactory));
        assert!(registry.has_provider("fixed"));

        let provider = registry
            .create("fixed", &serde_json::json!({"name": "always-half", "score": 0.5}))
            .unwrap();
        assert_eq!(provider.name(), "always-half");

        let contexts = claimcheck_core::Contexts::single("ctx").unwrap();
        let score = provider
            .score(FactCheckRequest::new("claim", &contexts))
            .await
            .unwrap();
        assert_eq!(score, SupportScore::Probability(0.5));
    }

    #[test]
    fn test_unknown_provider_lists_available() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(FixedProviderFactory));

        match registry.create("unknown", &serde_json::json!({})) {
            Err(ProviderError::NotConfigured(msg)) => {
                assert!(msg.contains("Unknown provider type"));
                assert!(msg.contains("fixed"));
            }
            _ => panic!("Expected NotConfigured error"),
        }
    }

    #[test]
    fn test_validate_delegates_to_factory() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(FixedProviderFactory));

        assert!(registry.validate("fixed", &serde_json::json!({"score": 0.3})).is_ok());
        assert!(registry.validate("fixed", &serde_json::json!({"score": 3.0})).is_err());
        assert!(registry.validate("missing", &serde_json::json!({})).is_err());
    }

    #[cfg(feature = "bespoke")]
    #[test]
    fn test_defaults_include_bespoke() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.available_types(), vec!["bespoke"]);
    }
}
