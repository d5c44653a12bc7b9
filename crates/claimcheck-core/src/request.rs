//! A fully resolved verification request.

use serde::Serialize;

use crate::claims::{split_claims, Claim};
use crate::input::{Contexts, InputError, Metadata, ValidationOptions};

/// Everything needed to score and aggregate one text.
///
/// Built from the host's `(value, metadata)` pair; construction performs
/// all input validation, so a `VerificationRequest` is always well formed.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRequest {
    /// Claims extracted from the text, in input order
    pub claims: Vec<Claim>,

    /// Reference contexts
    pub contexts: Contexts,

    /// Effective options after metadata overrides
    pub options: ValidationOptions,
}

impl VerificationRequest {
    /// Build a request with explicit contexts and options.
    pub fn new(text: &str, contexts: Contexts, options: ValidationOptions) -> Self {
        Self {
            claims: split_claims(text, options.split_sentences()),
            contexts,
            options,
        }
    }

    /// Build a request from host metadata, applying overrides over `defaults`.
    ///
    /// Contexts are checked before anything else.
    pub fn from_metadata(
        text: &str,
        metadata: &Metadata,
        defaults: &ValidationOptions,
    ) -> Result<Self, InputError> {
        let contexts = Contexts::from_metadata(metadata)?;
        let options = defaults.with_overrides(metadata)?;
        Ok(Self::new(text, contexts, options))
    }
}
