//! URL fetch and main-content selection.
//!
//! ## Why a selector priority list?
//!
//! Article pages bury their substance under navigation, cookie banners, and
//! footers. Taking the whole document text spends the 8,000-char allowance
//! on boilerplate, so we walk a fixed priority list of content containers
//! (semantic tags first, then the class names common CMS templates use) and
//! take the first one holding any text. The whole-document fallback only
//! runs when nothing matched.

use crate::error::ClarityError;
use crate::pipeline::source::{truncate_chars, ExtractedDocument, SourceKind, MAX_CONTENT_CHARS};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for the content GET.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like identity; plenty of sites answer obvious bots with a 403 or
/// a consent stub instead of the article.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

/// Content containers tried in order; first element with non-empty text wins.
static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        "main",
        ".content",
        ".main-content",
        ".post-content",
        ".entry-content",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Fetch a URL and reduce the page to bounded plain text.
///
/// The client lives only for this call; nothing on the URL path outlives a
/// request.
pub async fn extract_url(url: &str) -> Result<ExtractedDocument, ClarityError> {
    info!("Fetching URL: {}", url);

    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ClarityError::FetchError {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ClarityError::FetchError {
                url: url.to_string(),
                reason: format!("timed out after {}s", FETCH_TIMEOUT.as_secs()),
            }
        } else {
            ClarityError::FetchError {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(ClarityError::FetchError {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ClarityError::FetchError {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let text = main_content_text(&body);
    debug!("Extracted {} chars from {}", text.chars().count(), url);

    Ok(ExtractedDocument {
        text: truncate_chars(&text, MAX_CONTENT_CHARS),
        kind: SourceKind::Url,
    })
}

/// Reduce an HTML document to readable plain text.
fn main_content_text(html: &str) -> String {
    let stripped = strip_tag_blocks(html, "script");
    let stripped = strip_tag_blocks(&stripped, "style");
    let stripped = strip_tag_blocks(&stripped, "noscript");
    let doc = Html::parse_document(&stripped);

    for selector in CONTENT_SELECTORS.iter() {
        for element in doc.select(selector) {
            let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() {
                return text;
            }
        }
    }

    // No content container matched; take everything.
    collapse_whitespace(&doc.root_element().text().collect::<Vec<_>>().join(" "))
}

/// Collapse runs of whitespace into single spaces: trim each line, split on
/// double-space boundaries, keep the non-empty chunks.
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop `<tag ...>…</tag>` blocks from markup before parsing.
///
/// Conservative, ASCII-case-insensitive scan: an opener without a matching
/// close tag stops stripping rather than guessing at the block's end.
fn strip_tag_blocks(html: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let lower = html.to_ascii_lowercase();

    let mut out = String::with_capacity(html.len());
    let mut i = 0usize;
    while let Some(offset) = lower[i..].find(&open) {
        let start = i + offset;
        let after_open = start + open.len();
        match lower[after_open..].find(&close) {
            Some(rel) => {
                out.push_str(&html[i..start]);
                i = after_open + rel + close.len();
            }
            None => break,
        }
    }
    out.push_str(&html[i..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_wins_over_page_chrome() {
        let html = r#"
            <html><body>
              <nav>Home About Contact</nav>
              <article><h1>Budget review</h1><p>Finish the report by Friday.</p></article>
              <footer>Copyright</footer>
            </body></html>
        "#;
        let text = main_content_text(html);
        assert!(text.contains("Budget review"));
        assert!(text.contains("Finish the report by Friday."));
        assert!(!text.contains("Home About"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn article_beats_class_based_containers() {
        let html = r#"
            <html><body>
              <div class="content">sidebar teaser</div>
              <article>the actual story</article>
            </body></html>
        "#;
        assert_eq!(main_content_text(html), "the actual story");
    }

    #[test]
    fn class_container_matches_when_no_semantic_tag() {
        let html = r#"
            <html><body>
              <div class="header">menu</div>
              <div class="post-content">release notes for version two</div>
            </body></html>
        "#;
        assert_eq!(main_content_text(html), "release notes for version two");
    }

    #[test]
    fn empty_container_falls_through_to_the_next() {
        let html = r#"
            <html><body>
              <article>   </article>
              <main>plan the launch</main>
            </body></html>
        "#;
        assert_eq!(main_content_text(html), "plan the launch");
    }

    #[test]
    fn whole_document_fallback() {
        let html = "<html><body><p>just a paragraph</p><p>another one</p></body></html>";
        assert_eq!(main_content_text(html), "just a paragraph another one");
    }

    #[test]
    fn scripts_and_styles_are_removed() {
        let html = r#"
            <html><head><style>.a { color: red; }</style></head>
            <body>
              <script>var tracking = "beacon";</script>
              <main>visible words</main>
              <noscript>enable javascript</noscript>
            </body></html>
        "#;
        let text = main_content_text(html);
        assert_eq!(text, "visible words");
    }

    #[test]
    fn strip_tag_blocks_is_case_insensitive() {
        let html = "before<SCRIPT>alert(1)</SCRIPT>after";
        assert_eq!(strip_tag_blocks(html, "script"), "beforeafter");
    }

    #[test]
    fn strip_tag_blocks_leaves_unclosed_openers() {
        let html = "before<script>never closed";
        assert_eq!(strip_tag_blocks(html, "script"), "before<script>never closed");
    }

    #[test]
    fn collapse_whitespace_joins_chunks() {
        let raw = "  Title  \n\n\n   first sentence.   second  sentence.  \n";
        assert_eq!(
            collapse_whitespace(raw),
            "Title first sentence. second sentence."
        );
    }

    #[test]
    fn collapse_whitespace_empty_input() {
        assert_eq!(collapse_whitespace("   \n \n\t "), "");
    }
}
