//! Description formats
//!
//! Detection and conversion between the raw description encodings and the
//! structured document:
//! - `detect`: classify a raw string (HTML, structured JSON, Markdown, plain text)
//! - `from_html` / `to_html`: the HTML tag table in both directions
//! - `markdown`: Markdown rendered through comrak, then read as HTML
//! - `html`: the minimal markup reader the converters share

mod detect;
mod from_html;
pub mod html;
mod markdown;
mod to_html;

pub use detect::{detect, looks_like_html, looks_like_markdown, parse_structured_json, DescriptionFormat};
pub use from_html::html_to_document;
pub use markdown::{markdown_to_document, markdown_to_html};
pub use to_html::document_to_html;

use crate::config::MarkdownSettings;
use crate::document::Document;
use log::{debug, info};

/// A raw description after detection and conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDescription {
    pub format: DescriptionFormat,
    pub document: Document,
}

/// Detect the format of `raw` and convert it into a normalized document.
///
/// Never fails: malformed structured JSON falls through to the next format and
/// plain text becomes a single paragraph.
pub fn load_description(raw: &str, markdown: &MarkdownSettings) -> LoadedDescription {
    let (format, structured) = detect::classify(raw);
    debug!("Detected description format: {}", format);

    let document = match (format, structured) {
        (DescriptionFormat::StructuredJson, Some(document)) => document,
        (DescriptionFormat::Html, _) => html_to_document(raw),
        (DescriptionFormat::Markdown, _) => markdown_to_document(raw, markdown),
        _ if raw.is_empty() => Document::empty(),
        _ => Document::plain_text(raw),
    };

    info!("Loaded {} description ({} bytes)", format.display_name(), raw.len());
    LoadedDescription { format, document }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, HeadingLevel, Node};
    use crate::test_support::init_logging;

    fn load(raw: &str) -> LoadedDescription {
        init_logging();
        load_description(raw, &MarkdownSettings::default())
    }

    #[test]
    fn test_end_to_end_html_scenario() {
        let raw = "<h1>Title</h1><p>Hello <strong>world</strong></p>";
        let loaded = load(raw);
        assert_eq!(loaded.format, DescriptionFormat::Html);

        let blocks: Vec<_> = loaded.document.blocks().collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Heading(HeadingLevel::H1));
        assert_eq!(blocks[0].text(), "Title");
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);
        assert_eq!(blocks[1].children.len(), 2);
        match (&blocks[1].children[0], &blocks[1].children[1]) {
            (Node::Text(plain), Node::Text(bold)) => {
                assert_eq!(plain.text, "Hello ");
                assert!(plain.marks.is_empty());
                assert_eq!(bold.text, "world");
                assert!(bold.marks.bold);
            }
            other => panic!("unexpected children {:?}", other),
        }

        let html = document_to_html(&loaded.document);
        let h1 = html.find("<h1>").unwrap();
        let p = html.find("<p>").unwrap();
        let strong = html.find("<strong>world</strong>").unwrap();
        assert!(h1 < p && p < strong);
    }

    #[test]
    fn test_structured_json_is_loaded_as_is() {
        let raw = r#"[{"type":"heading-2","children":[{"text":"Notes"}]},{"type":"paragraph","children":[{"text":"a"},{"text":"b","italic":true}]}]"#;
        let loaded = load(raw);
        assert_eq!(loaded.format, DescriptionFormat::StructuredJson);
        assert_eq!(loaded.document.to_json().unwrap(), raw);
    }

    #[test]
    fn test_markdown_is_converted() {
        let loaded = load("## Steps\n\n- one\n- two");
        assert_eq!(loaded.format, DescriptionFormat::Markdown);
        assert_eq!(
            loaded.document.block_kinds(),
            vec![
                &BlockKind::Heading(HeadingLevel::H2),
                &BlockKind::BulletedList,
                &BlockKind::ListItem,
                &BlockKind::ListItem,
            ]
        );
    }

    #[test]
    fn test_plain_text_is_one_paragraph() {
        let loaded = load("Call the client <tomorrow>");
        assert_eq!(loaded.format, DescriptionFormat::PlainText);
        assert_eq!(loaded.document, Document::plain_text("Call the client <tomorrow>"));
    }

    #[test]
    fn test_empty_description_is_empty_document() {
        let loaded = load("");
        assert_eq!(loaded.format, DescriptionFormat::PlainText);
        assert!(loaded.document.is_empty());
    }

    #[test]
    fn test_corrupt_json_never_fails() {
        let loaded = load(r#"[{"type":"paragraph","children":[{"text":"cut"#);
        assert_eq!(loaded.format, DescriptionFormat::PlainText);
        assert_eq!(loaded.document.text(), r#"[{"type":"paragraph","children":[{"text":"cut"#);
    }

    #[test]
    fn test_plain_text_line_endings_survive_save_and_reload() {
        for raw in ["line one\r\nline two", "line one\rline two", "line one\nline two"] {
            let doc = load(raw).document;
            assert_eq!(doc.text(), "line one\nline two", "input: {:?}", raw);

            let saved = document_to_html(&doc);
            assert_eq!(saved, "<p>line one<br>line two</p>");
            let reloaded = load(&saved).document;
            assert_eq!(reloaded, doc, "input: {:?}", raw);
            assert_eq!(document_to_html(&reloaded), saved);
        }
    }

    #[test]
    fn test_every_format_round_trips_through_html() {
        for raw in [
            "<h1>Title</h1><p>Hello <strong>world</strong></p>",
            "# Heading\n\n*em* and **strong**\n\n> quote\n\n- [x] task",
            "plain words",
            "first\r\nsecond\r\n\r\nthird",
            "<div data-checked=\"true\">  indented</div>",
            r#"[{"type":"blockquote","align":"center","children":[{"text":"q"}]}]"#,
        ] {
            let doc = load(raw).document;
            let html = document_to_html(&doc);
            let back = html_to_document(&html);
            assert_eq!(back.block_kinds(), doc.block_kinds(), "input: {:?}", raw);
            assert_eq!(back.text(), doc.text(), "input: {:?}", raw);
            assert_eq!(document_to_html(&back), html, "input: {:?}", raw);
        }
    }
}
