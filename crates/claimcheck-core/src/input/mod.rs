//! Input resolution from host-supplied metadata.
//!
//! The host framework passes validation options as a loosely typed JSON
//! object. Everything here turns that object into typed values, or fails
//! with an [`InputError`] before any network traffic happens.

mod context;
mod options;

pub use context::{Contexts, CONTEXTS_KEY, CONTEXT_KEY};
pub use options::{ValidationOptions, DEFAULT_THRESHOLD, SPLIT_SENTENCES_KEY, THRESHOLD_KEY};

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Metadata supplied alongside the value being validated.
pub type Metadata = serde_json::Map<String, JsonValue>;

/// Errors from resolving validation input.
///
/// These are caller mistakes. They are never retried and never turned
/// into a fail verdict.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("context is required: set 'context' or 'contexts' in metadata")]
    MissingContext,

    #[error("context must not be empty")]
    EmptyContext,

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error("invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },
}

/// Human-readable JSON type name for error messages.
pub(crate) fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
