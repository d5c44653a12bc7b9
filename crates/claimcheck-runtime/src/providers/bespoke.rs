//! Bespoke Labs MiniCheck provider.
//!
//! Calls the hosted `bespoke-minicheck` fact-check endpoint once per claim.
//!
//! ## Security
//!
//! The API key is held in an [`ApiCredential`] and only exposed when the
//! `Authorization` header is built. See the [`secrets`](super::secrets)
//! module for details.

use super::{
    factory::ProviderFactory,
    secrets::{ApiCredential, CredentialSource},
    FactCheckProvider, FactCheckRequest, ProviderError,
};
use async_trait::async_trait;
use claimcheck_core::SupportScore;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable name for the Bespoke Labs API key.
pub const BESPOKE_API_KEY_ENV: &str = "BESPOKE_API_KEY";

/// Default API host.
pub const BESPOKE_BASE_URL: &str = "https://api.bespokelabs.ai";

const FACTCHECK_PATH: &str = "/v0/argus/bespoke-minicheck";
const CREDENTIAL_NAME: &str = "Bespoke API key";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bespoke Labs MiniCheck provider.
///
/// Holds one `reqwest::Client`, which pools connections and is shared by
/// every concurrent call made through this provider.
pub struct BespokeProvider {
    credential: ApiCredential,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for BespokeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BespokeProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BespokeProvider {
    /// Create a provider with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::new(api_key, CredentialSource::Programmatic, CREDENTIAL_NAME);
        Self::build(credential, BESPOKE_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    /// Create from the `BESPOKE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(BESPOKE_API_KEY_ENV, CREDENTIAL_NAME)?;
        Self::build(credential, BESPOKE_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    /// Create from provider configuration with environment fallback.
    ///
    /// Recognized keys: `api_key`, `base_url`, `timeout` (e.g. `"30s"`).
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let credential =
            ApiCredential::from_config_or_env(config, "api_key", BESPOKE_API_KEY_ENV, CREDENTIAL_NAME)?;

        let base_url = config["base_url"]
            .as_str()
            .unwrap_or(BESPOKE_BASE_URL)
            .to_string();

        let timeout = match config["timeout"].as_str() {
            Some(raw) => humantime::parse_duration(raw).map_err(|e| {
                ProviderError::NotConfigured(format!("invalid timeout '{}': {}", raw, e))
            })?,
            None => DEFAULT_TIMEOUT,
        };

        Self::build(credential, base_url, timeout)
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build(
        credential: ApiCredential,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credential,
            base_url,
            timeout,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), FACTCHECK_PATH)
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

/// MiniCheck request body.
#[derive(Debug, Serialize)]
struct MinicheckRequest<'a> {
    claim: &'a str,
    context: ContextPayload<'a>,
}

/// A lone context goes out as a string, several as an array.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContextPayload<'a> {
    One(&'a str),
    Many(&'a [String]),
}

impl<'a> ContextPayload<'a> {
    fn from_contexts(contexts: &'a [String]) -> Self {
        match contexts {
            [only] => ContextPayload::One(only),
            many => ContextPayload::Many(many),
        }
    }
}

/// MiniCheck response body.
#[derive(Debug, Deserialize)]
struct MinicheckResponse {
    #[serde(default)]
    support_prob: Option<f64>,

    #[serde(default, alias = "scores")]
    support_probs: Option<Vec<f64>>,
}

impl MinicheckResponse {
    fn into_score(self) -> Result<SupportScore, ProviderError> {
        match (self.support_probs, self.support_prob) {
            (Some(per_context), _) => Ok(SupportScore::PerContext(per_context)),
            (None, Some(p)) => Ok(SupportScore::Probability(p)),
            (None, None) => Err(ProviderError::Parse(
                "response has neither 'support_prob' nor 'support_probs'".to_string(),
            )),
        }
    }
}

/// Pull a readable message out of an error body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<JsonValue>(body) {
        let candidates = [&json["detail"], &json["message"], &json["error"]["message"], &json["error"]];
        if let Some(msg) = candidates.iter().find_map(|v| v.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[async_trait]
impl FactCheckProvider for BespokeProvider {
    async fn score(&self, request: FactCheckRequest<'_>) -> Result<SupportScore, ProviderError> {
        let body = MinicheckRequest {
            claim: request.claim,
            context: ContextPayload::from_contexts(request.contexts.as_slice()),
        };

        // Only expose the credential here, at the point of use
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: MinicheckResponse = response.json().await.map_err(|e| self.transport_error(e))?;
        let score = parsed.into_score()?;

        tracing::trace!(provider = "bespoke", score = ?score, "MiniCheck response");
        Ok(score)
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        "bespoke"
    }
}

/// Factory for creating Bespoke providers from configuration.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "...",                             // Optional, falls back to BESPOKE_API_KEY env
///   "base_url": "https://api.bespokelabs.ai",     // Optional
///   "timeout": "30s"                              // Optional, per-request timeout
/// }
/// ```
pub struct BespokeProviderFactory;

impl ProviderFactory for BespokeProviderFactory {
    fn provider_type(&self) -> &'static str {
        "bespoke"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn FactCheckProvider>, ProviderError> {
        self.validate_config(config)?;
        Ok(Arc::new(BespokeProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !ApiCredential::is_available(config, "api_key", BESPOKE_API_KEY_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "Bespoke API key required: set 'api_key' in config or {} env",
                BESPOKE_API_KEY_ENV
            )));
        }

        if let Some(url) = config["base_url"].as_str() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProviderError::NotConfigured(
                    "base_url must start with http:// or https://".to_string(),
                ));
            }
        }

        if let Some(raw) = config["timeout"].as_str() {
            humantime::parse_duration(raw).map_err(|e| {
                ProviderError::NotConfigured(format!("invalid timeout '{}': {}", raw, e))
            })?;
        }

        Ok(())
    }

    fn description(&self) -> &'static str {
        "Bespoke Labs MiniCheck hosted fact-check API"
    }
}
