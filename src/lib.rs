//! # clarity-ai
//!
//! Turn raw text, web pages, and documents into structured summaries,
//! action items, and deadlines using Gemini.
//!
//! ## Why this crate?
//!
//! Notes, emails, and meeting minutes bury the two things people actually
//! need: what to do and by when. This crate extracts bounded plain text from
//! whatever the user has (pasted text, a URL, a PDF/DOCX/TXT upload), sends
//! it to a language model with a fixed instruction template, and returns the
//! model's JSON analysis plus one optional follow-up round-trip. It ships as
//! a library and as a small axum web service around it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text / URL / file
//!  │
//!  ├─ 1. Source     classify the request, apply the 10-char / 8000-char bounds
//!  ├─ 2. Fetch      download the page, pick its main content      (URL only)
//!  ├─ 3. Document   parse PDF pages / DOCX paragraphs / TXT bytes (upload only)
//!  ├─ 4. Prompt     fixed template + extracted text
//!  ├─ 5. Generate   one Gemini call, no retries
//!  └─ 6. Normalize  strip fences, cut to the outermost {...}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clarity_ai::{AnalysisService, ExtractionRequest, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::builder().build()?;
//!     let provider = clarity_ai::llm::resolve_provider(&config)?;
//!
//!     let config = match provider {
//!         Some(p) => ServiceConfig::builder().provider(p).build()?,
//!         None => config,
//!     };
//!     let service = AnalysisService::new(config);
//!
//!     let text = "Meet John tomorrow at 3pm to discuss the budget report due Friday.";
//!     let result = service
//!         .analyze(ExtractionRequest::RawText(text.to_string()))
//!         .await?;
//!     println!("{}", result.normalized_json);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | Enables the `clarity` binary (clap + anyhow + tracing-subscriber + dotenvy) |
//!
//! Disable `server` when using only the library to avoid pulling in
//! binary-only deps:
//! ```toml
//! clarity-ai = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder, DEFAULT_MODEL};
pub use error::ClarityError;
pub use http::{create_router, AppState};
pub use llm::{GeminiClient, LlmProvider};
pub use pipeline::source::{ExtractedDocument, ExtractionRequest, SourceKind};
pub use service::{AnalysisResult, AnalysisService, FollowupContext};
