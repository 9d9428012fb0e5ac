//! Pipeline stages for turning an input source into analyzable plain text.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and keeps the
//! network-facing code (URL fetching) away from the pure parsing code
//! (document formats, reply cleanup).
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ fetch / document ──▶ (model call) ──▶ normalize
//! (classify)  (URL)   (upload)                     (JSON candidate)
//! ```
//!
//! 1. [`source`]: classify the request (raw text, URL, upload) and apply
//!    the shared length bounds
//! 2. [`fetch`]: download a page and extract its main content; the only
//!    stage with network I/O
//! 3. [`document`]: parse uploaded PDF/DOCX/TXT bytes into plain text
//! 4. [`normalize`]: textual cleanup of the model reply into a JSON
//!    candidate (fence stripping, brace extraction)
//!
//! The model call itself lives in [`crate::llm`]; the pipeline ends where
//! the prompt begins and resumes with the reply.

pub mod document;
pub mod fetch;
pub mod normalize;
pub mod source;
