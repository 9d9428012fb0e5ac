//! Instruction templates sent to the model.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: the output contract (the JSON shapes the
//!    front page parses) is pinned in exactly one place.
//!
//! 2. **Testability**: unit tests can inspect composed prompts directly
//!    without calling a real model.
//!
//! User content is embedded verbatim: no escaping or delimiters are applied
//! to extracted text or follow-up fields. The templates pin the output shape
//! instead, and callers must treat the model reply as untrusted JSON either
//! way.

/// Instruction template for the initial analysis of a piece of text.
///
/// The reply contract: one JSON object with a `summary` sentence and
/// `action_items` / `deadlines` arrays (empty when nothing applies).
pub const MASTER_PROMPT: &str = r#"You are ClarityAI, an expert productivity assistant. Analyze the user's text and respond with ONLY a valid JSON object.

IMPORTANT: Your response must be ONLY valid JSON, no markdown, no explanations, no code blocks.

Format your response exactly like this:
{
  "summary": "A single sentence summary of the text",
  "action_items": ["task 1", "task 2"],
  "deadlines": ["deadline 1", "deadline 2"]
}

If there are no action items or deadlines, use empty arrays [].
"#;

/// Instruction template for a follow-up question about an earlier analysis.
///
/// The reply contract: one JSON object with a single `response` string.
pub const FOLLOWUP_PROMPT: &str = r#"You are ClarityAI, an expert productivity assistant. The user received an analysis of their text and is asking a follow-up question about it.

IMPORTANT: Your response must be ONLY valid JSON, no markdown, no explanations, no code blocks.

Format your response exactly like this:
{
  "response": "A clear, direct answer to the follow-up question"
}
"#;

/// Compose the outbound prompt for an initial analysis.
pub fn compose_analysis(text: &str) -> String {
    format!("{MASTER_PROMPT}User Text: {text}")
}

/// Compose the outbound prompt for a follow-up round-trip.
///
/// Fixed four-part concatenation: template, then the three labeled sections
/// in the order Original Text, Previous Analysis, Follow-up Question.
pub fn compose_followup(original_text: &str, previous_analysis: &str, question: &str) -> String {
    format!(
        "{FOLLOWUP_PROMPT}Original Text: {original_text}\n\nPrevious Analysis: {previous_analysis}\n\nFollow-up Question: {question}"
    )
}
