//! Normalization of raw model replies into a JSON candidate string.
//!
//! ## Why is normalization necessary?
//!
//! The analysis prompt demands "ONLY valid JSON", yet models routinely wrap
//! the object in Markdown fences or pad it with a sentence of preamble.
//! Rather than hard-failing on those replies, two cheap textual passes
//! recover the object: fence stripping and outermost-brace extraction. The
//! result is a *candidate*: this module never parses JSON and never
//! validates it, it only carves out the span most likely to be the object.
//! Callers return the candidate to the client untouched.

/// Reduce a raw model reply to its JSON candidate.
///
/// Passes (applied in order):
/// 1. Trim surrounding whitespace
/// 2. Strip a leading ```` ```json ```` or bare ```` ``` ```` fence marker,
///    and a trailing ```` ``` ```` fence marker
/// 3. Cut to the outermost `{ ... }` span when both braces exist in order;
///    otherwise keep the whole remainder
/// 4. Trim again
///
/// Running the passes a second time changes nothing, so replies that were
/// already clean come through untouched.
pub fn normalize_reply(raw: &str) -> String {
    let unfenced = strip_fences(raw.trim());
    let candidate = outer_object_span(unfenced);
    candidate.trim().to_string()
}

// ── Pass 1: fence stripping ──────────────────────────────────────────────────

fn strip_fences(input: &str) -> &str {
    let mut s = input;
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    }
    if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s
}

// ── Pass 2: outermost-brace extraction ───────────────────────────────────────

/// Slice from the first `{` to the last `}` inclusive, or the whole input
/// when the pair is missing or reversed.
///
/// Both delimiters are ASCII, so the byte offsets from `find`/`rfind` are
/// valid slice boundaries regardless of what sits between them.
fn outer_object_span(input: &str) -> &str {
    match (input.find('{'), input.rfind('}')) {
        (Some(open), Some(close)) if open < close => &input[open..=close],
        _ => input,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json_reply() {
        let raw = "```json\n{\"summary\": \"ok\"}\n```";
        assert_eq!(normalize_reply(raw), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn test_plain_fence_without_language_tag() {
        let raw = "```\n{\"action_items\": []}\n```";
        assert_eq!(normalize_reply(raw), "{\"action_items\": []}");
    }

    #[test]
    fn test_fence_with_surrounding_whitespace() {
        let raw = "   ```json\n{\"k\": \"v\"}\n```   \n";
        assert_eq!(normalize_reply(raw), "{\"k\": \"v\"}");
    }

    #[test]
    fn test_bare_json_untouched() {
        let raw = "{\"summary\": \"done\", \"deadlines\": []}";
        assert_eq!(normalize_reply(raw), raw);
    }

    #[test]
    fn test_preamble_and_trailer_discarded() {
        let raw = "Here is the analysis you asked for:\n{\"summary\": \"x\"}\nHope that helps!";
        assert_eq!(normalize_reply(raw), "{\"summary\": \"x\"}");
    }

    #[test]
    fn test_nested_objects_keep_outer_span() {
        let raw = "prefix {\"a\": {\"b\": 2}} suffix";
        assert_eq!(normalize_reply(raw), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn test_uppercase_fence_rescued_by_brace_pass() {
        // The fence pass only knows the lowercase marker, but the brace pass
        // still finds the object.
        let raw = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(normalize_reply(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_no_braces_passthrough() {
        assert_eq!(
            normalize_reply("  I cannot produce an analysis for that.  "),
            "I cannot produce an analysis for that."
        );
    }

    #[test]
    fn test_reversed_braces_passthrough() {
        assert_eq!(normalize_reply("} not an object {"), "} not an object {");
    }

    #[test]
    fn test_whitespace_only_reply() {
        assert_eq!(normalize_reply("   \n\t  "), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let samples = [
            "```json\n{\"summary\": \"ok\"}\n```",
            "```\n{\"a\": 1}\n```",
            "{\"plain\": true}",
            "preamble {\"x\": [1, 2]} trailer",
            "no json here",
            "} backwards {",
            "",
        ];
        for raw in samples {
            let once = normalize_reply(raw);
            let twice = normalize_reply(&once);
            assert_eq!(twice, once, "second pass changed: {raw:?}");
        }
    }
}
