//! # claimcheck-core
//!
//! Deterministic building blocks for claim verification.
//!
//! This crate answers everything about a verification that does not need
//! the network:
//! - Which claims does this text make?
//! - Are the context and options the caller supplied usable?
//! - Given a score per claim, does the text pass, and what is left of it
//!   if it does not?
//!
//! ## Key Guarantees
//!
//! 1. **No I/O**: Scoring happens elsewhere (see `claimcheck-runtime`)
//! 2. **Order-preserving**: Claims keep input order; the fix value does too
//! 3. **No partial verdicts**: Aggregation requires exactly one score per claim
//!
//! ## Example
//!
//! ```rust
//! use claimcheck_core::{aggregate, Contexts, ScoreResult, SupportScore, ValidationOptions, VerificationRequest};
//!
//! let request = VerificationRequest::new(
//!     "Alex likes cats. Alex likes dogs.",
//!     Contexts::single("Alex likes dogs, but not cats.").unwrap(),
//!     ValidationOptions::default(),
//! );
//!
//! let scores = vec![
//!     ScoreResult::new(1, SupportScore::Probability(0.95)),
//!     ScoreResult::new(0, SupportScore::Probability(0.03)),
//! ];
//!
//! let result = aggregate(&request, scores).unwrap();
//! assert_eq!(result.fix_value.as_deref(), Some("Alex likes dogs."));
//! ```

pub mod aggregator;
pub mod claims;
pub mod input;
pub mod request;
pub mod score;
pub mod types;

// Re-export main types at crate root
pub use aggregator::{AggregationError, Aggregator};
pub use claims::{join_claims, split_claims, Claim, SentenceSplitter};
pub use input::{Contexts, InputError, Metadata, ValidationOptions, DEFAULT_THRESHOLD};
pub use request::VerificationRequest;
pub use score::{ScoreResult, SupportScore};
pub use types::{ClaimVerdict, Outcome, ValidationResult, NOT_SUPPORTED_MESSAGE};

/// Aggregate scores for a resolved request using its threshold.
pub fn aggregate(
    request: &VerificationRequest,
    scores: impl IntoIterator<Item = ScoreResult>,
) -> Result<ValidationResult, AggregationError> {
    Aggregator::new(request.options.threshold()).aggregate(&request.claims, scores)
}
