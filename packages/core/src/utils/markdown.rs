//! Inline markdown stripping for node labels
//!
//! Outline conversion turns headings and list items into nodes; their text
//! may still carry inline formatting, which is removed here so labels read as
//! plain text. Block-level markers are handled by the outline parser itself.

use regex::Regex;
use std::sync::LazyLock;

/// Inline patterns, applied in order
///
/// Images go before links (both use brackets) and bold before italic
/// (`**` would otherwise match as two `*`).
static INLINE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"!\[([^\]]*)\]\([^)]+\)").unwrap(), "$1"),
        (Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap(), "$1"),
        (Regex::new(r"`([^`]+)`").unwrap(), "$1"),
        (Regex::new(r"\*\*([^*]+)\*\*").unwrap(), "$1"),
        (Regex::new(r"__([^_]+)__").unwrap(), "$1"),
        (Regex::new(r"~~([^~]+)~~").unwrap(), "$1"),
        (Regex::new(r"\*([^*]+)\*").unwrap(), "$1"),
        (Regex::new(r"\b_([^_]+)_\b").unwrap(), "$1"),
        (Regex::new(r"<[^>]+>").unwrap(), ""),
    ]
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip inline markdown formatting, collapsing whitespace
///
/// ```
/// use mindmap_core::utils::strip_markdown;
///
/// assert_eq!(strip_markdown("**bold** text"), "bold text");
/// assert_eq!(strip_markdown("[link](http://example.com)"), "link");
/// ```
pub fn strip_markdown(content: &str) -> String {
    let mut result = content.to_string();

    for (pattern, replacement) in INLINE_PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }

    WHITESPACE_RE.replace_all(&result, " ").trim().to_string()
}
