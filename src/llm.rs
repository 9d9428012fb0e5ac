//! LLM provider abstraction and the Gemini REST client.
//!
//! The service only ever needs one capability from a model: turn a prompt
//! string into a reply string. [`LlmProvider`] captures exactly that, which
//! keeps the HTTP handlers and the analysis service testable with a canned
//! implementation and keeps Gemini specifics in one place.
//!
//! ## Degraded Mode
//!
//! A missing `GEMINI_API_KEY` is not a startup failure. The server still
//! binds and serves the page; every analysis request is rejected with a
//! stable "API Key is not configured." error until the credential appears.
//! [`resolve_provider`] implements that policy.

use crate::config::ServiceConfig;
use crate::error::ClarityError;
use crate::pipeline::source::truncate_chars;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use urlencoding::encode;

/// Environment variable holding the Gemini API credential.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Characters of an upstream error body kept in the error detail.
const ERROR_BODY_SNIPPET_CHARS: usize = 300;

/// A text-in, text-out language model.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and return the raw reply text. Single attempt, no
    /// retries; implementations report any upstream failure as
    /// [`ClarityError::GenerationFailed`].
    async fn generate(&self, prompt: &str) -> Result<String, ClarityError>;

    /// Short provider label for logs.
    fn name(&self) -> &'static str;
}

// ── Gemini client ────────────────────────────────────────────────────────────

/// Client for the Google AI Studio `generateContent` REST endpoint.
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Build a client with a hard per-request timeout.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClarityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClarityError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Endpoint URL with the model and credential percent-encoded in.
    ///
    /// The key rides in the query string, so error paths must never echo the
    /// URL back to the caller.
    fn api_url(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            encode(&self.model),
            encode(&self.api_key)
        )
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ClarityError> {
        let start = Instant::now();
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        debug!(
            "Calling {} with a {}-char prompt",
            self.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(self.api_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_timeout() {
                    format!("request timed out after {}s", self.timeout_secs)
                } else {
                    e.without_url().to_string()
                };
                ClarityError::GenerationFailed { detail }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                format!(
                    "HTTP {status}: {}",
                    truncate_chars(body.trim(), ERROR_BODY_SNIPPET_CHARS)
                )
            };
            return Err(ClarityError::GenerationFailed { detail });
        }

        let reply: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ClarityError::GenerationFailed {
                    detail: format!("invalid reply JSON: {}", e.without_url()),
                })?;

        let text = reply_text(reply);
        if text.trim().is_empty() {
            return Err(ClarityError::GenerationFailed {
                detail: "model reply contained no text".to_string(),
            });
        }

        debug!(
            "{} replied with {} chars in {:?}",
            self.model,
            text.chars().count(),
            start.elapsed()
        );
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ── Reply shape ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

/// Text of the first candidate, with its parts concatenated in order.
///
/// A blocked or empty reply yields an empty string; the caller decides what
/// that means.
fn reply_text(reply: GenerateContentResponse) -> String {
    reply
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

// ── Provider resolution ──────────────────────────────────────────────────────

/// Resolve the provider the service should use.
///
/// An explicitly configured provider wins. Otherwise the `GEMINI_API_KEY`
/// environment variable is consulted; when it is unset or blank the service
/// runs in degraded mode with no provider at all.
pub fn resolve_provider(
    config: &ServiceConfig,
) -> Result<Option<Arc<dyn LlmProvider>>, ClarityError> {
    if let Some(provider) = &config.provider {
        return Ok(Some(provider.clone()));
    }

    match std::env::var(GEMINI_API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => {
            let client = GeminiClient::new(
                key,
                config.model.clone(),
                Duration::from_secs(config.llm_timeout_secs),
            )?;
            debug!("Using Gemini model '{}'", config.model);
            Ok(Some(Arc::new(client)))
        }
        _ => {
            warn!(
                "{} is not set; analysis requests will be rejected until it is provided",
                GEMINI_API_KEY_VAR
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedProvider;

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn generate(&self, _prompt: &str) -> Result<String, ClarityError> {
            Ok("{}".to_string())
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    #[test]
    fn api_url_embeds_model_and_key() {
        let client =
            GeminiClient::new("test-key", "gemini-1.5-flash", Duration::from_secs(5)).unwrap();
        let url = client.api_url();
        assert!(url.contains("/models/gemini-1.5-flash:generateContent"));
        assert!(url.ends_with("key=test-key"));
    }

    #[test]
    fn api_url_percent_encodes() {
        let client = GeminiClient::new("a b+c", "gemini-1.5-flash", Duration::from_secs(5)).unwrap();
        assert!(client.api_url().ends_with("key=a%20b%2Bc"));
    }

    #[test]
    fn debug_redacts_the_key() {
        let client =
            GeminiClient::new("super-secret", "gemini-1.5-flash", Duration::from_secs(5)).unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("super-secret"), "got: {dbg}");
    }

    #[test]
    fn reply_text_joins_parts_of_first_candidate() {
        let reply: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"summary\"" }, { "text": ": \"ok\"}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(reply_text(reply), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn reply_text_handles_missing_candidates() {
        let reply: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert_eq!(reply_text(reply), "");

        let reply: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [{}] })).unwrap();
        assert_eq!(reply_text(reply), "");
    }

    #[test]
    fn explicit_provider_wins_over_environment() {
        let config = ServiceConfig::builder()
            .provider(Arc::new(CannedProvider))
            .build()
            .unwrap();
        let provider = resolve_provider(&config).unwrap().unwrap();
        assert_eq!(provider.name(), "canned");
    }
}
