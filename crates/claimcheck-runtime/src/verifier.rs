//! The claim verifier: split, score concurrently, aggregate.
//!
//! One validation runs in three phases:
//! - Resolve the request from the host metadata (deterministic, no I/O)
//! - Fan-out: score every claim with at most `max_concurrency` calls in flight
//! - Fan-in: aggregate once every claim has a score
//!
//! The first unrecoverable provider error aborts the validation. A failed
//! [`ValidationResult`] always means a claim was scored and found
//! unsupported, never that scoring went wrong.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use claimcheck_core::{
    AggregationError, Claim, Contexts, InputError, Metadata, ScoreResult, SupportScore,
    ValidationOptions, ValidationResult, VerificationRequest,
};

use crate::cache::{ScoreCache, ScoreKey};
use crate::config::{InferenceMode, VerifierConfig};
use crate::providers::{FactCheckProvider, FactCheckRequest, ProviderError, ProviderRegistry};
use crate::registry::BESPOKE_MINICHECK;
use crate::resilience::RetryPolicy;

/// Errors from a verification. None of these produce a `ValidationResult`.
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Fact-check failed for claim {claim_index}: {source}")]
    Provider {
        claim_index: usize,
        #[source]
        source: ProviderError,
    },

    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl VerifierError {
    /// Map a provider construction failure.
    fn setup(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => VerifierError::NotConfigured(msg),
            other => VerifierError::NotConfigured(other.to_string()),
        }
    }
}

/// Verifies that every claim in a text is supported by reference contexts.
///
/// Cheap to share: the provider and cache sit behind `Arc`s and nothing is
/// mutated during a validation.
pub struct ClaimVerifier {
    name: String,
    provider: Arc<dyn FactCheckProvider>,
    options: ValidationOptions,
    retry: RetryPolicy,
    max_concurrency: usize,
    inference: InferenceMode,
    cache: Option<Arc<ScoreCache>>,
}

impl ClaimVerifier {
    /// Create a verifier with default options around `provider`.
    pub fn new(provider: Arc<dyn FactCheckProvider>) -> Self {
        let defaults = VerifierConfig::default();
        Self {
            name: BESPOKE_MINICHECK.to_string(),
            provider,
            options: ValidationOptions::default(),
            retry: defaults.retry,
            max_concurrency: defaults.max_concurrency,
            inference: defaults.inference,
            cache: None,
        }
    }

    /// Build a verifier from configuration, creating the provider through
    /// `registry`.
    pub fn from_config(
        config: &VerifierConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, VerifierError> {
        config
            .validate()
            .map_err(|e| VerifierError::Config(e.to_string()))?;
        let options = config
            .validation_options()
            .map_err(|e| VerifierError::Config(e.to_string()))?;

        let provider = registry
            .create(&config.provider.kind, &config.provider.options_json())
            .map_err(VerifierError::setup)?;

        let mut verifier = Self::new(provider)
            .with_options(options)
            .with_retry(config.retry.clone())
            .with_max_concurrency(config.max_concurrency)
            .with_inference(config.inference);

        if let Some(cache) = &config.cache {
            verifier = verifier.with_cache(Arc::new(ScoreCache::from_config(cache)));
        }

        tracing::debug!(
            validator = %verifier.name,
            provider = verifier.provider.name(),
            max_concurrency = verifier.max_concurrency,
            cached = verifier.cache.is_some(),
            "Verifier configured"
        );

        Ok(verifier)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Default options; per-call metadata may override them.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_inference(mut self, inference: InferenceMode) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ScoreCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate `text` against the contexts and options in `metadata`.
    ///
    /// Input problems are reported before any network call is made.
    pub async fn validate(
        &self,
        text: &str,
        metadata: &Metadata,
    ) -> Result<ValidationResult, VerifierError> {
        let request = VerificationRequest::from_metadata(text, metadata, &self.options)?;
        self.verify(&request).await
    }

    /// Score and aggregate an already resolved request.
    pub async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<ValidationResult, VerifierError> {
        if self.inference == InferenceMode::Local {
            return Err(VerifierError::Unsupported(
                "local inference is not available; configure inference: remote".to_string(),
            ));
        }

        let scores = self.score_claims(request).await?;

        // Fan-in: only after every claim has been scored
        let result = claimcheck_core::aggregate(
            request,
            scores
                .into_iter()
                .map(|(index, score)| ScoreResult::new(index, score)),
        )?;

        tracing::info!(
            validator = %self.name,
            outcome = %result.outcome,
            claims = result.claims.len(),
            unsupported = result.unsupported().count(),
            "Validation complete"
        );

        Ok(result)
    }

    /// Fan-out over all claims, keyed by claim index.
    async fn score_claims(
        &self,
        request: &VerificationRequest,
    ) -> Result<BTreeMap<usize, SupportScore>, VerifierError> {
        // Boxed up front so the stream holds no borrowing closure
        let calls: Vec<BoxFuture<'_, Result<(usize, SupportScore), VerifierError>>> = request
            .claims
            .iter()
            .map(|claim| self.score_claim(claim, &request.contexts).boxed())
            .collect();

        let mut pending = stream::iter(calls).buffer_unordered(self.max_concurrency);

        let mut scores = BTreeMap::new();
        while let Some(scored) = pending.next().await {
            // Returning here drops the calls still in flight
            let (index, score) = scored?;
            scores.insert(index, score);
        }

        Ok(scores)
    }

    async fn score_claim(
        &self,
        claim: &Claim,
        contexts: &Contexts,
    ) -> Result<(usize, SupportScore), VerifierError> {
        let Some(cache) = &self.cache else {
            return Ok((claim.index, self.fetch_score(claim, contexts).await?));
        };

        let key = ScoreKey::new(&claim.text, contexts);
        if let Some(score) = cache.get(&key).await {
            tracing::debug!(claim_index = claim.index, "Score cache hit");
            return Ok((claim.index, score));
        }

        let score = self.fetch_score(claim, contexts).await?;
        cache.insert(key, score.clone()).await;
        Ok((claim.index, score))
    }

    async fn fetch_score(
        &self,
        claim: &Claim,
        contexts: &Contexts,
    ) -> Result<SupportScore, VerifierError> {
        let provider = &self.provider;
        let request = FactCheckRequest::new(&claim.text, contexts);

        let score = self
            .retry
            .run(claim.index, move || provider.score(request))
            .await
            .map_err(|source| VerifierError::Provider {
                claim_index: claim.index,
                source,
            })?;

        tracing::debug!(
            claim_index = claim.index,
            provider = provider.name(),
            score = ?score,
            "Claim scored"
        );

        Ok(score)
    }
}

impl std::fmt::Debug for ClaimVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimVerifier")
            .field("name", &self.name)
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .field("retry", &self.retry)
            .field("max_concurrency", &self.max_concurrency)
            .field("inference", &self.inference)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
