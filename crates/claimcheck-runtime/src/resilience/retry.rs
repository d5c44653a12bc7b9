//! Retry with exponential backoff around a single provider call.

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::config::duration_str;
use crate::providers::ProviderError;

/// How a failed provider call is retried.
///
/// Only errors for which [`ProviderError::is_transient`] holds are retried.
/// Delays start at `min_delay`, grow by `factor` per attempt and are capped
/// at `max_delay`. A rate-limit `retry_after` raises the next delay, still
/// capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first call
    pub max_attempts: usize,

    #[serde(with = "duration_str")]
    pub min_delay: Duration,

    #[serde(with = "duration_str")]
    pub max_delay: Duration,

    pub factor: f32,

    /// Randomize delays to spread out concurrent retries
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            factor: 2.0,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retry.max_attempts must be at least 1".to_string());
        }
        if self.min_delay > self.max_delay {
            return Err("retry.min_delay must not exceed retry.max_delay".to_string());
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err("retry.factor must be at least 1.0".to_string());
        }
        Ok(())
    }

    fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_attempts.saturating_sub(1));

        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }

    /// Next delay after `err`, given the scheduled `delay`.
    fn adjust_delay(&self, err: &ProviderError, delay: Duration) -> Duration {
        match err {
            ProviderError::RateLimited {
                retry_after: Some(retry_after),
            } => delay.max((*retry_after).min(self.max_delay)),
            _ => delay,
        }
    }

    /// Run `operation` under this policy.
    ///
    /// `claim_index` is only used to label retry events.
    pub async fn run<T, F, Fut>(&self, claim_index: usize, operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        operation
            .retry(self.backoff())
            .sleep(tokio::time::sleep)
            .when(ProviderError::is_transient)
            .adjust(|err: &ProviderError, delay: Option<Duration>| {
                delay.map(|d| self.adjust_delay(err, d))
            })
            .notify(|err: &ProviderError, delay: Duration| {
                tracing::warn!(
                    claim_index,
                    error = %err,
                    delay = ?delay,
                    "Fact-check call failed, retrying"
                );
            })
            .await
    }
}
