//! Fact-check provider abstractions for claimcheck-runtime.
//!
//! This module defines the trait for remote scoring services and includes
//! the Bespoke Labs MiniCheck implementation.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use claimcheck_core::{Contexts, SupportScore};
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(feature = "bespoke")]
mod bespoke;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "bespoke")]
pub use bespoke::{BespokeProvider, BespokeProviderFactory, BESPOKE_API_KEY_ENV, BESPOKE_BASE_URL};

/// Errors from fact-check providers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("Authentication failed")]
    Auth,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether retrying the same call could succeed.
    ///
    /// Network failures, timeouts, rate limiting and 5xx responses are
    /// transient. Everything else is returned to the caller immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(_) | ProviderError::RateLimited { .. } | ProviderError::Timeout(_) => {
                true
            }
            ProviderError::Api { status, .. } => *status >= 500,
            ProviderError::Parse(_) | ProviderError::Auth | ProviderError::NotConfigured(_) => false,
        }
    }
}

/// One scoring call: a claim and the contexts it is checked against.
#[derive(Debug, Clone, Copy)]
pub struct FactCheckRequest<'a> {
    pub claim: &'a str,
    pub contexts: &'a Contexts,
}

impl<'a> FactCheckRequest<'a> {
    pub fn new(claim: &'a str, contexts: &'a Contexts) -> Self {
        Self { claim, contexts }
    }
}

/// Provider abstraction allows swapping fact-check backends.
///
/// Implementations must be safe to call concurrently: the verifier shares
/// one provider across every in-flight claim.
#[async_trait]
pub trait FactCheckProvider: Send + Sync {
    /// Score how well the contexts support the claim.
    async fn score(&self, request: FactCheckRequest<'_>) -> Result<SupportScore, ProviderError>;

    /// Check if provider is usable (credentials present, etc.).
    async fn health_check(&self) -> bool;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
