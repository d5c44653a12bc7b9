//! Resilience patterns for claimcheck-runtime.
//!
//! Currently a single concern: retrying transient provider failures with
//! exponential backoff.

mod retry;

pub use retry::RetryPolicy;
