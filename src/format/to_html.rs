//! Structured document to HTML serialization
//!
//! The output is the canonical persisted form of a description. Reading it
//! back with [`html_to_document`](super::html_to_document) yields the same
//! tree for every normalized document.

use super::html::escape_html;
use crate::document::{unix_line_endings, Block, BlockKind, Document, Mark, Node, TextRun};
use std::fmt::Write;

/// Serialize a document to an HTML fragment. Blocks are concatenated with no
/// separator.
pub fn document_to_html(doc: &Document) -> String {
    let mut out = String::new();
    for node in doc.children() {
        write_node(node, false, &mut out);
    }
    out
}

fn write_node(node: &Node, in_list: bool, out: &mut String) {
    match node {
        Node::Text(run) => write_run(run, out),
        Node::Block(block) => write_block(block, in_list, out),
    }
}

fn write_block(block: &Block, in_list: bool, out: &mut String) {
    if block.kind == BlockKind::Code {
        out.push_str("<pre");
        write_align(block, out);
        out.push_str("><code>");
        for node in &block.children {
            if let Node::Text(run) = node {
                out.push_str(&escape_html(&run.text));
            }
        }
        out.push_str("\n</code></pre>");
        return;
    }

    let tag = match &block.kind {
        BlockKind::Paragraph => "p".to_string(),
        BlockKind::Heading(level) => format!("h{}", level.as_u8()),
        BlockKind::BulletedList => "ul".to_string(),
        BlockKind::NumberedList => "ol".to_string(),
        BlockKind::ListItem => "li".to_string(),
        BlockKind::BlockQuote => "blockquote".to_string(),
        BlockKind::Link(_) => "a".to_string(),
        BlockKind::ChecklistItem { .. } if in_list => "li".to_string(),
        BlockKind::ChecklistItem { .. } => "div".to_string(),
        BlockKind::Code => "pre".to_string(),
    };

    let _ = write!(out, "<{}", tag);
    match &block.kind {
        BlockKind::Link(target) => {
            let _ = write!(out, " href=\"{}\"", escape_html(&target.href));
            if target.new_tab {
                out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
            }
        }
        BlockKind::ChecklistItem { checked } => {
            let _ = write!(out, " data-checked=\"{}\"", checked);
        }
        _ => {}
    }
    write_align(block, out);
    out.push('>');

    let children_in_list = block.kind.is_list();
    for child in &block.children {
        write_node(child, children_in_list, out);
    }
    let _ = write!(out, "</{}>", tag);
}

fn write_align(block: &Block, out: &mut String) {
    if let Some(align) = block.align {
        let _ = write!(out, " style=\"text-align: {}\"", align.as_str());
    }
}

/// Write a run with its marks nested in a fixed order; line breaks of any
/// style become `<br>`.
fn write_run(run: &TextRun, out: &mut String) {
    let marks: Vec<Mark> = Mark::ALL
        .into_iter()
        .filter(|mark| run.marks.has(*mark))
        .collect();

    for mark in &marks {
        let _ = write!(out, "<{}>", mark_tag(*mark));
    }
    let text = unix_line_endings(&run.text);
    let mut lines = text.split('\n');
    if let Some(first) = lines.next() {
        out.push_str(&escape_html(first));
    }
    for line in lines {
        out.push_str("<br>");
        out.push_str(&escape_html(line));
    }
    for mark in marks.iter().rev() {
        let _ = write!(out, "</{}>", mark_tag(*mark));
    }
}

fn mark_tag(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Underline => "u",
        Mark::Strikethrough => "s",
        Mark::Code => "code",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Align, HeadingLevel, LinkTarget, Marks};
    use crate::format::html_to_document;

    fn run(text: &str, marks: Marks) -> Node {
        Node::Text(TextRun::marked(text, marks))
    }

    #[test]
    fn test_paragraph_with_marks() {
        let doc = Document::from_blocks(vec![Block::new(
            BlockKind::Paragraph,
            vec![
                run("Hello ", Marks::default()),
                run("world", Marks::default().with(Mark::Bold).with(Mark::Italic)),
            ],
        )]);
        assert_eq!(
            document_to_html(&doc),
            "<p>Hello <strong><em>world</em></strong></p>"
        );
    }

    #[test]
    fn test_heading_and_alignment() {
        let doc = Document::from_blocks(vec![
            Block::with_text(BlockKind::Heading(HeadingLevel::H3), "Plan").aligned(Align::Right),
        ]);
        assert_eq!(
            document_to_html(&doc),
            r#"<h3 style="text-align: right">Plan</h3>"#
        );
    }

    #[test]
    fn test_lists_and_checklists() {
        let doc = Document::from_blocks(vec![
            Block::new(
                BlockKind::NumberedList,
                vec![
                    Block::with_text(BlockKind::ListItem, "one").into(),
                    Block::with_text(BlockKind::ChecklistItem { checked: true }, "two").into(),
                ],
            ),
            Block::with_text(BlockKind::ChecklistItem { checked: false }, "three"),
        ]);
        assert_eq!(
            document_to_html(&doc),
            concat!(
                r#"<ol><li>one</li><li data-checked="true">two</li></ol>"#,
                r#"<div data-checked="false">three</div>"#
            )
        );
    }

    #[test]
    fn test_link_new_tab() {
        let doc = Document::from_blocks(vec![Block::new(
            BlockKind::Paragraph,
            vec![Block::with_text(
                BlockKind::Link(LinkTarget::new("https://a.example/?x=1&y=2", true)),
                "docs",
            )
            .into()],
        )]);
        assert_eq!(
            document_to_html(&doc),
            r#"<p><a href="https://a.example/?x=1&amp;y=2" target="_blank" rel="noopener noreferrer">docs</a></p>"#
        );
    }

    #[test]
    fn test_escaping_and_breaks() {
        let doc = Document::plain_text("a < b & \"c\"\nnext");
        assert_eq!(
            document_to_html(&doc),
            "<p>a &lt; b &amp; &quot;c&quot;<br>next</p>"
        );
    }

    #[test]
    fn test_carriage_returns_become_breaks() {
        let doc = Document::from_blocks(vec![Block::paragraph("a\r\nb\rc")]);
        let html = document_to_html(&doc);
        assert_eq!(html, "<p>a<br>b<br>c</p>");
        assert_eq!(document_to_html(&html_to_document(&html)), html);
    }

    #[test]
    fn test_code_block() {
        let doc = Document::from_blocks(vec![Block::with_text(BlockKind::Code, "let x = 1;\nx < 2")]);
        assert_eq!(
            document_to_html(&doc),
            "<pre><code>let x = 1;\nx &lt; 2\n</code></pre>"
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(document_to_html(&Document::empty()), "<p></p>");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Round trip
    // ─────────────────────────────────────────────────────────────────────────

    fn rich_document() -> Document {
        Document::from_blocks(vec![
            Block::with_text(BlockKind::Heading(HeadingLevel::H2), "Sprint goals").aligned(Align::Center),
            Block::new(
                BlockKind::Paragraph,
                vec![
                    run("Ship ", Marks::default()),
                    run("the <editor>", Marks::default().with(Mark::Underline)),
                    run(" now\nplease", Marks::default().with(Mark::Strikethrough)),
                    Block::with_text(BlockKind::Link(LinkTarget::new("https://x.test", false)), "ref").into(),
                ],
            ),
            Block::new(
                BlockKind::BulletedList,
                vec![
                    Block::with_text(BlockKind::ListItem, "first").into(),
                    Block::new(
                        BlockKind::NumberedList,
                        vec![Block::with_text(BlockKind::ListItem, "nested").into()],
                    )
                    .into(),
                    Block::with_text(BlockKind::ChecklistItem { checked: true }, "done").into(),
                ],
            ),
            Block::with_text(BlockKind::BlockQuote, "quoted"),
            Block::with_text(BlockKind::Code, "  indented\n\ncode\n"),
            Block::with_text(BlockKind::ChecklistItem { checked: false }, "open"),
            Block::paragraph(""),
        ])
    }

    #[test]
    fn test_round_trip_preserves_tree() {
        let doc = rich_document();
        let html = document_to_html(&doc);
        assert_eq!(html_to_document(&html), doc);
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let html = document_to_html(&rich_document());
        let again = document_to_html(&html_to_document(&html));
        assert_eq!(html, again);
    }
}
