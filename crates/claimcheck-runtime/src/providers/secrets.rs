//! Credential handling for fact-check providers.
//!
//! API keys are wrapped as soon as they are read so they cannot leak
//! through `Debug`/`Display` output or `tracing` fields. The raw value is
//! only reachable through [`ApiCredential::expose`], which providers call
//! when building the `Authorization` header.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Provider configuration (`api_key`)
    Config,
    /// Process environment (`*_API_KEY`)
    Environment,
    /// Passed in by the caller
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// An API key that refuses to be printed.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Read the credential from `env_var`.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        std::env::var(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .map_err(|_| {
                ProviderError::NotConfigured(format!(
                    "{} not set: configure '{}' environment variable",
                    name, env_var
                ))
            })
    }

    /// Read `config_key` from the provider config, else `env_var`.
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        if let Some(value) = config[config_key].as_str() {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        Self::from_env(env_var, name).map_err(|_| {
            ProviderError::NotConfigured(format!(
                "{} required: set '{}' in config or {} environment variable",
                name, config_key, env_var
            ))
        })
    }

    /// Whether a credential could be loaded, without loading it.
    pub fn is_available(config: &JsonValue, config_key: &str, env_var: &str) -> bool {
        config[config_key].as_str().is_some() || std::env::var(env_var).is_ok()
    }

    /// The raw secret. Call only where the value is sent on the wire.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().trim().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}
