//! # claimcheck-runtime
//!
//! Remote claim verification on top of `claimcheck-core`.
//!
//! `claimcheck-core` decides what the claims are and how scores become a
//! verdict. This crate does the parts that touch the network:
//! - Scoring each claim against a fact-check provider (Bespoke MiniCheck)
//! - Bounded concurrent fan-out with retry on transient failures
//! - Optional score caching
//! - The named-validator registry hosts resolve validators through
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimcheck_runtime::{ValidatorRegistry, BESPOKE_MINICHECK};
//! use serde_json::json;
//!
//! claimcheck_runtime::init();
//!
//! let registry = ValidatorRegistry::with_defaults();
//! let validator = registry.create(BESPOKE_MINICHECK, &json!({"threshold": 0.5}))?;
//!
//! let metadata = json!({"contexts": ["Alex likes dogs, but not cats."]});
//! let result = validator
//!     .validate("Alex likes cats. Alex likes dogs.", metadata.as_object().unwrap())
//!     .await?;
//!
//! assert_eq!(result.fix_value.as_deref(), Some("Alex likes dogs."));
//! ```

pub mod cache;
pub mod config;
pub mod providers;
pub mod registry;
pub mod resilience;
pub mod verifier;

pub use cache::{ScoreCache, ScoreKey};
pub use config::{CacheConfig, ConfigError, InferenceMode, ProviderSettings, VerifierConfig};
pub use providers::{
    ApiCredential, CredentialSource, FactCheckProvider, FactCheckRequest, ProviderError,
    ProviderFactory, ProviderRegistry,
};
pub use registry::{Validator, ValidatorConstructor, ValidatorRegistry, BESPOKE_MINICHECK};
pub use resilience::RetryPolicy;
pub use verifier::{ClaimVerifier, VerifierError};

#[cfg(feature = "bespoke")]
pub use providers::{BespokeProvider, BespokeProviderFactory};

/// One-time process setup. Safe to call more than once.
///
/// Compiles the sentence splitter's patterns up front so the first
/// validation does not pay for it.
pub fn init() {
    claimcheck_core::claims::warm_up();
}

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
