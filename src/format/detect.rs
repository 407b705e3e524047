//! Description format detection
//!
//! Stored descriptions are untagged strings. `detect` classifies one as HTML,
//! structured-document JSON, Markdown or plain text with a fixed precedence:
//! HTML, then structured JSON, then Markdown, then plain text. A string that
//! is a valid structured document is never reported as HTML, even when its
//! text content contains markup.

use crate::document::{Document, Node};
use log::warn;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// The interpretation chosen for a raw description string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptionFormat {
    Html,
    StructuredJson,
    Markdown,
    PlainText,
}

impl DescriptionFormat {
    pub fn display_name(&self) -> &'static str {
        match self {
            DescriptionFormat::Html => "HTML",
            DescriptionFormat::StructuredJson => "Structured JSON",
            DescriptionFormat::Markdown => "Markdown",
            DescriptionFormat::PlainText => "Plain text",
        }
    }
}

impl fmt::Display for DescriptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

const OPEN_TAG_PATTERN: &str = r"<([a-zA-Z][a-zA-Z0-9]*)(?:\s[^<>]*)?>";
const CLOSE_TAG_PATTERN: &str = r"</([a-zA-Z][a-zA-Z0-9]*)\s*>";
const MARKDOWN_BLOCK_PATTERN: &str = r"(?m)^[ \t]{0,3}(?:#{1,6}(?:[ \t]|$)|[-*+][ \t]+\S|>|```|~~~)";
const MARKDOWN_INLINE_PATTERN: &str =
    r"\*\*[^*\n]+\*\*|__[^_\n]+__|~~[^~\n]+~~|`[^`\n]+`|\[[^\]\n]+\]\([^)\s]+\)|(?:^|[^\w*])\*[^*\s][^*\n]*\*(?:[^\w*]|$)|(?:^|[^\w_])_[^_\s][^_\n]*_(?:[^\w_]|$)";

static OPEN_TAG: OnceLock<Option<Regex>> = OnceLock::new();
static CLOSE_TAG: OnceLock<Option<Regex>> = OnceLock::new();
static MARKDOWN_BLOCK: OnceLock<Option<Regex>> = OnceLock::new();
static MARKDOWN_INLINE: OnceLock<Option<Regex>> = OnceLock::new();

/// Compile a pattern once; an invalid pattern degrades to "never matches".
fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Invalid detection pattern '{}': {}", pattern, e);
            None
        }
    })
    .as_ref()
}

// ─────────────────────────────────────────────────────────────────────────────
// Heuristics
// ─────────────────────────────────────────────────────────────────────────────

/// True when the string contains an opening tag with a matching closing tag
/// after it. A heuristic for "looks like markup", not a well-formedness check.
pub fn looks_like_html(raw: &str) -> bool {
    let (Some(open), Some(close)) = (
        cached(&OPEN_TAG, OPEN_TAG_PATTERN),
        cached(&CLOSE_TAG, CLOSE_TAG_PATTERN),
    ) else {
        return false;
    };

    let mut opened: HashSet<String> = HashSet::new();
    let mut events: Vec<(usize, bool, String)> = open
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((whole.start(), true, caps[1].to_ascii_lowercase()))
        })
        .chain(close.captures_iter(raw).filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((whole.start(), false, caps[1].to_ascii_lowercase()))
        }))
        .collect();
    events.sort_by_key(|(pos, _, _)| *pos);

    for (_, is_open, name) in events {
        if is_open {
            opened.insert(name);
        } else if opened.contains(&name) {
            return true;
        }
    }
    false
}

/// Parse `raw` as a structured document: a non-empty JSON array whose elements
/// are block objects with a string `type` and an array `children`.
pub fn parse_structured_json(raw: &str) -> Option<Document> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with('[') {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let elements = value.as_array()?;
    if elements.is_empty() {
        return None;
    }
    let shaped = elements.iter().all(|element| {
        element.get("type").is_some_and(serde_json::Value::is_string)
            && element.get("children").is_some_and(serde_json::Value::is_array)
    });
    if !shaped {
        return None;
    }
    let nodes: Vec<Node> = serde_json::from_value(value).ok()?;
    Some(Document::from_nodes(nodes))
}

/// True when some line carries a Markdown block marker or the text holds an
/// inline emphasis, code, strikethrough or link marker.
pub fn looks_like_markdown(raw: &str) -> bool {
    let block = cached(&MARKDOWN_BLOCK, MARKDOWN_BLOCK_PATTERN).is_some_and(|re| re.is_match(raw));
    block
        || cached(&MARKDOWN_INLINE, MARKDOWN_INLINE_PATTERN).is_some_and(|re| re.is_match(raw))
}

// ─────────────────────────────────────────────────────────────────────────────
// Detection
// ─────────────────────────────────────────────────────────────────────────────

/// Classify a raw description. Pure and deterministic.
pub fn detect(raw: &str) -> DescriptionFormat {
    classify(raw).0
}

/// Classify a raw description and keep the parsed document when it is JSON.
pub(crate) fn classify(raw: &str) -> (DescriptionFormat, Option<Document>) {
    let structured = parse_structured_json(raw);
    if structured.is_some() {
        return (DescriptionFormat::StructuredJson, structured);
    }
    if looks_like_html(raw) {
        return (DescriptionFormat::Html, None);
    }
    if looks_like_markdown(raw) {
        return (DescriptionFormat::Markdown, None);
    }
    (DescriptionFormat::PlainText, None)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // HTML
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_detect_html_paragraph() {
        assert_eq!(detect("<p>Hello</p>"), DescriptionFormat::Html);
    }

    #[test]
    fn test_detect_html_with_attributes_and_case() {
        assert_eq!(
            detect(r#"<DIV class="x">text</div>"#),
            DescriptionFormat::Html
        );
    }

    #[test]
    fn test_unpaired_tag_is_not_html() {
        assert_eq!(detect("use <br> for breaks"), DescriptionFormat::PlainText);
        assert_eq!(detect("a </p> b <p>"), DescriptionFormat::PlainText);
    }

    #[test]
    fn test_html_wins_over_markdown() {
        assert_eq!(detect("# Title\n<p>x</p>"), DescriptionFormat::Html);
    }

    #[test]
    fn test_html_that_is_not_json_is_html() {
        assert_eq!(detect("[<b>x</b>]"), DescriptionFormat::Html);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structured JSON
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_detect_structured_json() {
        let raw = r#"[{"type":"paragraph","children":[{"text":"hi"}]}]"#;
        assert_eq!(detect(raw), DescriptionFormat::StructuredJson);
    }

    #[test]
    fn test_structured_json_containing_markup_text() {
        let raw = r#"[{"type":"paragraph","children":[{"text":"<b>not html</b>"}]}]"#;
        assert_eq!(detect(raw), DescriptionFormat::StructuredJson);
    }

    #[test]
    fn test_json_with_wrong_shape_falls_through() {
        assert_eq!(detect(r#"[{"kind":"paragraph"}]"#), DescriptionFormat::PlainText);
        assert_eq!(detect("[1, 2, 3]"), DescriptionFormat::PlainText);
        assert_eq!(detect("[]"), DescriptionFormat::PlainText);
    }

    #[test]
    fn test_json_with_unknown_block_type_falls_through() {
        let raw = r#"[{"type":"table","children":[{"text":"x"}]}]"#;
        assert_eq!(detect(raw), DescriptionFormat::PlainText);
    }

    #[test]
    fn test_malformed_json_falls_through_to_markdown() {
        let raw = "[{\"type\": \"paragraph\", \n- broken";
        assert_eq!(detect(raw), DescriptionFormat::Markdown);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Markdown
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_detect_markdown_block_markers() {
        for raw in [
            "# Title",
            "intro\n## Section",
            "- item",
            "* item",
            "+ item",
            "> quoted",
            "```\ncode\n```",
        ] {
            assert_eq!(detect(raw), DescriptionFormat::Markdown, "input: {:?}", raw);
        }
    }

    #[test]
    fn test_detect_markdown_inline_markers() {
        for raw in [
            "this is **bold**",
            "this is *italic* text",
            "use `cargo`",
            "~~gone~~",
            "see [docs](https://example.com)",
        ] {
            assert_eq!(detect(raw), DescriptionFormat::Markdown, "input: {:?}", raw);
        }
    }

    #[test]
    fn test_hash_without_space_is_plain_text() {
        assert_eq!(detect("#hashtag note"), DescriptionFormat::PlainText);
    }

    #[test]
    fn test_hash_with_space_is_markdown() {
        // A literal "# " note is read as a heading.
        assert_eq!(detect("# not really a heading"), DescriptionFormat::Markdown);
    }

    #[test]
    fn test_arithmetic_is_not_emphasis() {
        assert_eq!(detect("2 * 3 * 4 = 24"), DescriptionFormat::PlainText);
        assert_eq!(detect("snake_case_name"), DescriptionFormat::PlainText);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plain text
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_detect_plain_text() {
        assert_eq!(detect("Fix the login bug"), DescriptionFormat::PlainText);
        assert_eq!(detect(""), DescriptionFormat::PlainText);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let raw = "- a\n<p>b</p>";
        let first = detect(raw);
        for _ in 0..10 {
            assert_eq!(detect(raw), first);
        }
    }
}
