//! Reference contexts that claims are checked against.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{json_type, InputError, Metadata};

/// Metadata key for a single context string (or a list).
pub const CONTEXT_KEY: &str = "context";

/// Metadata key for a list of context strings.
pub const CONTEXTS_KEY: &str = "contexts";

/// A non-empty list of non-blank reference texts.
///
/// The only way to obtain one is through validation, so holding a
/// `Contexts` means the "context is required" check already passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Contexts(Vec<String>);

impl Contexts {
    /// Validate a list of contexts.
    pub fn new<I, S>(items: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() || items.iter().any(|c| c.trim().is_empty()) {
            return Err(InputError::EmptyContext);
        }
        Ok(Self(items))
    }

    /// Validate a single context.
    pub fn single(context: impl Into<String>) -> Result<Self, InputError> {
        Self::new([context.into()])
    }

    /// Resolve contexts from host metadata.
    ///
    /// `context` may be a string or an array of strings; `contexts` must be
    /// an array of strings. When both keys are present their entries are
    /// merged, `context` first.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, InputError> {
        let mut items = Vec::new();
        let mut found = false;

        for key in [CONTEXT_KEY, CONTEXTS_KEY] {
            if let Some(value) = metadata.get(key) {
                found = true;
                collect(key, value, &mut items)?;
            }
        }

        if !found {
            return Err(InputError::MissingContext);
        }

        Self::new(items)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for Contexts {
    type Error = InputError;

    fn try_from(items: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl From<Contexts> for Vec<String> {
    fn from(contexts: Contexts) -> Self {
        contexts.0
    }
}

fn collect(key: &str, value: &JsonValue, out: &mut Vec<String>) -> Result<(), InputError> {
    match value {
        JsonValue::String(s) if key == CONTEXT_KEY => {
            out.push(s.clone());
            Ok(())
        }
        JsonValue::Array(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                match entry {
                    JsonValue::String(s) => out.push(s.clone()),
                    other => {
                        return Err(InputError::InvalidContext(format!(
                            "'{}[{}]' must be a string, found {}",
                            key,
                            i,
                            json_type(other)
                        )))
                    }
                }
            }
            Ok(())
        }
        other if key == CONTEXT_KEY => Err(InputError::InvalidContext(format!(
            "'{}' must be a string or an array of strings, found {}",
            key,
            json_type(other)
        ))),
        other => Err(InputError::InvalidContext(format!(
            "'{}' must be an array of strings, found {}",
            key,
            json_type(other)
        ))),
    }
}
