//! Request classification and document bounds.
//!
//! ## Why reclassify raw text?
//!
//! The front page has one input box for both prose and links. A pasted URL
//! *is* text, but what the user wants analysed is the page behind it, so a
//! raw submission whose entire trimmed content parses as an absolute URL is
//! promoted to the URL path before any extraction happens. This is a policy
//! decision, not a fallback taken on error: a string that merely contains a
//! URL stays raw text.

use crate::error::ClarityError;
use crate::pipeline::{document, fetch};
use tracing::debug;
use url::Url;

/// Hard ceiling on extracted text, in characters (not bytes).
pub const MAX_CONTENT_CHARS: usize = 8_000;

/// Minimum trimmed length for content worth an analysis round-trip.
pub const MIN_CONTENT_CHARS: usize = 10;

/// One analysis input. Exactly one variant per request.
#[derive(Debug, Clone)]
pub enum ExtractionRequest {
    /// Free text pasted into the page.
    RawText(String),
    /// An absolute URL to fetch and scrape.
    Url(String),
    /// An uploaded file: original filename plus raw bytes.
    UploadedFile { name: String, bytes: Vec<u8> },
}

/// Where an extracted document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Url,
    Pdf,
    Docx,
    Txt,
}

/// Bounded plain text ready for prompting.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// At most [`MAX_CONTENT_CHARS`] characters; at least
    /// [`MIN_CONTENT_CHARS`] after trimming.
    pub text: String,
    /// Which extraction path produced the text.
    pub kind: SourceKind,
}

/// Produce a bounded plain-text document from any supported source.
///
/// Dispatches to the URL or file path as needed, then applies the one check
/// shared by every path: fewer than [`MIN_CONTENT_CHARS`] trimmed characters
/// is [`ClarityError::InsufficientContent`].
pub async fn extract(request: ExtractionRequest) -> Result<ExtractedDocument, ClarityError> {
    let document = match request {
        ExtractionRequest::RawText(text) => {
            let trimmed = text.trim();
            if is_absolute_url(trimmed) {
                debug!("Raw text reclassified as URL: {}", trimmed);
                fetch::extract_url(trimmed).await?
            } else {
                ExtractedDocument {
                    text: truncate_chars(trimmed, MAX_CONTENT_CHARS),
                    kind: SourceKind::Text,
                }
            }
        }
        ExtractionRequest::Url(url) => fetch::extract_url(url.trim()).await?,
        ExtractionRequest::UploadedFile { name, bytes } => document::extract_file(&name, &bytes)?,
    };

    if document.text.trim().chars().count() < MIN_CONTENT_CHARS {
        return Err(ClarityError::InsufficientContent);
    }

    Ok(document)
}

/// Check whether the whole trimmed input is a syntactically valid absolute
/// URL: a scheme plus a network location. Scheme-only forms like `mailto:`
/// have no host and stay raw text.
pub fn is_absolute_url(input: &str) -> bool {
    match Url::parse(input.trim()) {
        Ok(url) => url.has_host(),
        Err(_) => false,
    }
}

/// Truncate to at most `max_chars` characters without splitting a scalar.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}
