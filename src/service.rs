//! Analysis orchestration: credential gate, extraction, model call, reply
//! normalization.
//!
//! The service owns no per-request state. One instance is built at startup
//! and shared by every handler; the only long-lived resource is the provider
//! handle inside it. A service built without a provider still answers
//! requests, rejecting each one with `ServiceUnavailable` before any
//! extraction or network work happens.

use crate::config::ServiceConfig;
use crate::error::ClarityError;
use crate::llm::LlmProvider;
use crate::pipeline::normalize::normalize_reply;
use crate::pipeline::source::{self, ExtractionRequest};
use crate::prompts;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Characters of extracted text echoed back with each analysis.
const ECHO_CHARS: usize = 500;

/// Outcome of one analysis round-trip.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Verbatim model reply, before any cleanup.
    pub raw_model_reply: String,
    /// JSON candidate produced by [`normalize_reply`]. A string, not a parsed
    /// structure; clients own downstream parsing and validation.
    pub normalized_json: String,
    /// First 500 characters of the extracted text, with a trailing ellipsis
    /// when truncated.
    pub original_text_echo: String,
}

/// Everything a follow-up question needs; all three fields are required.
#[derive(Debug, Clone)]
pub struct FollowupContext {
    pub original_text: String,
    pub previous_analysis: String,
    pub question: String,
}

/// The orchestration core behind both HTTP endpoints.
pub struct AnalysisService {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl AnalysisService {
    /// Build the service from a finished configuration.
    ///
    /// A configuration without a provider yields a degraded service rather
    /// than an error; see the module docs.
    pub fn new(config: ServiceConfig) -> Self {
        if config.provider.is_none() {
            warn!("No LLM provider configured; analysis requests will be rejected");
        }
        Self {
            provider: config.provider,
        }
    }

    /// Check that a provider is configured, without doing any other work.
    ///
    /// The HTTP layer calls this before reading a request body, so a
    /// degraded service answers every request with the same error no matter
    /// what the payload holds.
    pub fn ensure_available(&self) -> Result<(), ClarityError> {
        if self.provider.is_none() {
            return Err(ClarityError::ServiceUnavailable);
        }
        Ok(())
    }

    /// Run one full analysis: extract, prompt, generate, normalize.
    pub async fn analyze(&self, request: ExtractionRequest) -> Result<AnalysisResult, ClarityError> {
        let start = Instant::now();

        // ── Step 1: Credential gate ──────────────────────────────────────────
        let provider = self
            .provider
            .as_ref()
            .ok_or(ClarityError::ServiceUnavailable)?;

        // ── Step 2: Extract bounded text ─────────────────────────────────────
        let document = source::extract(request).await?;

        // ── Step 3: Compose prompt, single model call ────────────────────────
        let prompt = prompts::compose_analysis(&document.text);
        let raw = provider.generate(&prompt).await?;

        // ── Step 4: Normalize the reply ──────────────────────────────────────
        let normalized = normalize_reply(&raw);

        info!(
            "Analyzed {:?} input ({} chars) in {:?}",
            document.kind,
            document.text.chars().count(),
            start.elapsed()
        );

        Ok(AnalysisResult {
            original_text_echo: echo(&document.text),
            raw_model_reply: raw,
            normalized_json: normalized,
        })
    }

    /// Answer one follow-up question against a previous analysis.
    ///
    /// Returns the normalized reply text; same failure taxonomy as the model
    /// step of [`analyze`](Self::analyze).
    pub async fn followup(&self, context: FollowupContext) -> Result<String, ClarityError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(ClarityError::ServiceUnavailable)?;

        require_field("original_text", &context.original_text)?;
        require_field("previous_analysis", &context.previous_analysis)?;
        require_field("question", &context.question)?;

        let prompt = prompts::compose_followup(
            &context.original_text,
            &context.previous_analysis,
            &context.question,
        );
        let raw = provider.generate(&prompt).await?;

        debug!("Follow-up answered in one round-trip");
        Ok(normalize_reply(&raw))
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn require_field(field: &'static str, value: &str) -> Result<(), ClarityError> {
    if value.trim().is_empty() {
        return Err(ClarityError::MissingField { field });
    }
    Ok(())
}

/// First [`ECHO_CHARS`] characters, with `...` appended when anything was
/// cut. Counted in characters so a multi-byte text never splits.
fn echo(text: &str) -> String {
    let mut chars = text.chars();
    let echoed: String = chars.by_ref().take(ECHO_CHARS).collect();
    if chars.next().is_some() {
        format!("{echoed}...")
    } else {
        echoed
    }
}
