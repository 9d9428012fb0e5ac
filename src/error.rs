//! Error types for the clarity-ai library.
//!
//! A single enum covers the whole request lifecycle: [`ClarityError`] is
//! returned by extraction, prompt generation, and the HTTP boundary alike.
//! There is no non-fatal channel: extraction and generation are each
//! all-or-nothing, so a request either produces a complete analysis or a
//! single error.
//!
//! Variant messages are user-facing: the HTTP layer serialises them verbatim
//! into the `{"error": ...}` response body that the front page displays.

use thiserror::Error;

/// All errors returned by the clarity-ai library.
#[derive(Debug, Error)]
pub enum ClarityError {
    // ── Request errors ────────────────────────────────────────────────────
    /// A required JSON field was absent or empty.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// Multipart body carried no usable file (no `file` field, or an empty
    /// filename).
    #[error("No file selected.")]
    NoFileSelected,

    /// The uploaded file's extension is not one we can extract text from.
    #[error("Unsupported file type: '{filename}'. Supported types: PDF, DOCX, TXT.")]
    UnsupportedFileType { filename: String },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// URL was syntactically valid but the GET failed: network error,
    /// timeout, or non-success status.
    #[error("Error fetching URL '{url}': {reason}")]
    FetchError { url: String, reason: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// A format parser rejected the content.
    #[error("Could not extract text from {kind} content: {detail}")]
    ExtractionFailure { kind: &'static str, detail: String },

    /// Extraction succeeded but produced fewer than 10 characters after
    /// trimming. Nothing that short is worth an analysis round-trip.
    #[error("Could not extract enough text to analyze (need at least 10 characters).")]
    InsufficientContent,

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No credential was present at startup; the service is degraded and
    /// every analysis request answers with this error.
    #[error("API Key is not configured.")]
    ServiceUnavailable,

    /// The model call failed: network, quota, or a malformed service reply.
    #[error("AI generation failed: {detail}")]
    GenerationFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
