//! HTML to structured document conversion
//!
//! Walks the parsed markup tree and maps element names to block kinds and
//! marks through fixed tables. Elements outside the tables are transparent:
//! their structure is dropped and their text survives as plain runs.

use super::html::{parse_html, Element, HtmlNode};
use crate::document::{Align, Block, BlockKind, Document, HeadingLevel, LinkTarget, Mark, Marks, Node, TextRun};
use log::debug;

/// Formatting context inherited from enclosing elements.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    marks: Marks,
    in_pre: bool,
}

/// Convert an HTML fragment into a normalized document.
pub fn html_to_document(html: &str) -> Document {
    let dom = parse_html(html);
    let nodes = deserialize_all(&dom, Context::default());
    Document::from_nodes(nodes)
}

fn deserialize_all(nodes: &[HtmlNode], ctx: Context) -> Vec<Node> {
    nodes
        .iter()
        .flat_map(|node| deserialize(node, ctx))
        .collect()
}

fn deserialize(node: &HtmlNode, ctx: Context) -> Vec<Node> {
    match node {
        HtmlNode::Text(text) => {
            let text = if ctx.in_pre {
                text.clone()
            } else {
                text.replace("\r\n", " ").replace(['\n', '\r'], " ")
            };
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Node::Text(TextRun::marked(text, ctx.marks))]
            }
        }
        HtmlNode::Element(element) => deserialize_element(element, ctx),
    }
}

fn deserialize_element(element: &Element, ctx: Context) -> Vec<Node> {
    let name = element.name.as_str();

    if name == "br" {
        return vec![Node::Text(TextRun::marked("\n", ctx.marks))];
    }

    if let Some(mark) = mark_for_tag(name) {
        let mut inner = ctx;
        if !ctx.in_pre {
            inner.marks.set(mark, true);
        }
        return deserialize_all(&element.children, inner);
    }

    if name == "pre" {
        let inner = Context {
            marks: Marks::default(),
            in_pre: true,
        };
        let mut children = deserialize_all(&element.children, inner);
        strip_trailing_newline(&mut children);
        return vec![Node::Block(block_with_align(BlockKind::Code, element, children))];
    }

    if let Some(kind) = block_kind_for(element) {
        let mut children = deserialize_all(&element.children, ctx);
        if checked_attr(element).is_none() && checkbox_state(element).is_some() {
            trim_leading_whitespace(&mut children);
        }
        return vec![Node::Block(block_with_align(kind, element, children))];
    }

    debug!("Flattening unmapped element <{}>", name);
    deserialize_all(&element.children, ctx)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tag Tables
// ─────────────────────────────────────────────────────────────────────────────

fn mark_for_tag(name: &str) -> Option<Mark> {
    match name {
        "strong" | "b" => Some(Mark::Bold),
        "em" | "i" => Some(Mark::Italic),
        "u" => Some(Mark::Underline),
        "s" | "del" | "strike" => Some(Mark::Strikethrough),
        "code" => Some(Mark::Code),
        _ => None,
    }
}

fn block_kind_for(element: &Element) -> Option<BlockKind> {
    let kind = match element.name.as_str() {
        "a" => BlockKind::Link(LinkTarget::new(
            element.attr("href").unwrap_or_default(),
            element.attr("target") == Some("_blank"),
        )),
        "blockquote" => BlockKind::BlockQuote,
        "h1" => BlockKind::Heading(HeadingLevel::H1),
        "h2" => BlockKind::Heading(HeadingLevel::H2),
        "h3" => BlockKind::Heading(HeadingLevel::H3),
        "h4" => BlockKind::Heading(HeadingLevel::H4),
        "h5" => BlockKind::Heading(HeadingLevel::H5),
        "h6" => BlockKind::Heading(HeadingLevel::H6),
        "li" => match checklist_state(element) {
            Some(checked) => BlockKind::ChecklistItem { checked },
            None => BlockKind::ListItem,
        },
        "ol" => BlockKind::NumberedList,
        "ul" => BlockKind::BulletedList,
        "p" => BlockKind::Paragraph,
        "div" => BlockKind::ChecklistItem {
            checked: checked_attr(element)?,
        },
        _ => return None,
    };
    Some(kind)
}

/// `data-checked="true|false"` as written by the serializer.
fn checked_attr(element: &Element) -> Option<bool> {
    element.attr("data-checked").map(|value| value == "true")
}

/// Checklist state of a list item: an explicit `data-checked` attribute, or a
/// leading checkbox input as rendered for Markdown task lists.
fn checklist_state(element: &Element) -> Option<bool> {
    checked_attr(element).or_else(|| checkbox_state(element))
}

/// State of a checkbox `<input>` leading a list item.
fn checkbox_state(element: &Element) -> Option<bool> {
    if element.name != "li" {
        return None;
    }
    let first = element.children.iter().find(|child| match child {
        HtmlNode::Text(text) => !text.trim().is_empty(),
        HtmlNode::Element(_) => true,
    })?;
    match first {
        HtmlNode::Element(input)
            if input.name == "input" && input.attr("type") == Some("checkbox") =>
        {
            Some(input.has_attr("checked"))
        }
        _ => None,
    }
}

fn block_with_align(kind: BlockKind, element: &Element, children: Vec<Node>) -> Block {
    let mut block = Block::new(kind, children);
    if !block.kind.is_inline() {
        block.align = element.attr("style").and_then(text_align_from_style);
    }
    block
}

fn text_align_from_style(style: &str) -> Option<Align> {
    style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        if property.trim().eq_ignore_ascii_case("text-align") {
            Align::parse(value)
        } else {
            None
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Whitespace Fixups
// ─────────────────────────────────────────────────────────────────────────────

/// `<pre>` bodies end with the newline that closes the last line.
fn strip_trailing_newline(children: &mut [Node]) {
    if let Some(Node::Text(run)) = children.iter_mut().rev().find(|n| matches!(n, Node::Text(r) if !r.text.is_empty())) {
        if run.text.ends_with('\n') {
            run.text.pop();
        }
    }
}

/// Drop the space between a task-list checkbox and its label.
fn trim_leading_whitespace(children: &mut [Node]) {
    if let Some(Node::Text(run)) = children.iter_mut().find(|n| matches!(n, Node::Text(r) if !r.text.is_empty())) {
        let trimmed = run.text.trim_start().to_string();
        run.text = trimmed;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn top_blocks(doc: &Document) -> Vec<&Block> {
        doc.blocks().collect()
    }

    fn runs(block: &Block) -> Vec<&TextRun> {
        block
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Text(run) => Some(run),
                Node::Block(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_heading_and_paragraph_with_bold() {
        let doc = html_to_document("<h1>Title</h1><p>Hello <strong>world</strong></p>");
        let blocks = top_blocks(&doc);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Heading(HeadingLevel::H1));
        assert_eq!(blocks[0].text(), "Title");
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);

        let runs = runs(blocks[1]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Hello ");
        assert!(runs[0].marks.is_empty());
        assert_eq!(runs[1].text, "world");
        assert!(runs[1].marks.bold);
    }

    #[test]
    fn test_nested_marks_accumulate() {
        let doc = html_to_document("<p><em><u>both</u></em></p>");
        let block = top_blocks(&doc)[0];
        let run = runs(block)[0];
        assert!(run.marks.italic);
        assert!(run.marks.underline);
        assert!(!run.marks.bold);
    }

    #[test]
    fn test_mark_aliases() {
        let doc = html_to_document("<p><b>b</b><i>i</i><del>d</del><s>s</s><code>c</code></p>");
        let block = top_blocks(&doc)[0];
        let runs = runs(block);
        assert!(runs[0].marks.bold);
        assert!(runs[1].marks.italic);
        assert!(runs[2].marks.strikethrough);
        assert_eq!(runs[2].text, "ds");
        assert!(runs[3].marks.code);
    }

    #[test]
    fn test_lists() {
        let doc = html_to_document("<ul>\n<li>one</li>\n<li>two</li>\n</ul><ol><li>first</li></ol>");
        let blocks = top_blocks(&doc);
        assert_eq!(blocks[0].kind, BlockKind::BulletedList);
        assert_eq!(blocks[0].children.len(), 2);
        assert_eq!(blocks[1].kind, BlockKind::NumberedList);
        assert_eq!(blocks[1].text(), "first");
    }

    #[test]
    fn test_link_attributes() {
        let doc = html_to_document(r#"<p>see <a href="https://gauzy.co" target="_blank">site</a></p>"#);
        let block = top_blocks(&doc)[0];
        let link = block.children[1].as_block().unwrap();
        assert_eq!(
            link.kind,
            BlockKind::Link(LinkTarget::new("https://gauzy.co", true))
        );
        assert_eq!(link.text(), "site");
    }

    #[test]
    fn test_br_becomes_newline_in_run() {
        let doc = html_to_document("<p>line one<br>line two</p>");
        assert_eq!(doc.text(), "line one\nline two");
        assert_eq!(runs(top_blocks(&doc)[0]).len(), 1);
    }

    #[test]
    fn test_source_newlines_become_spaces() {
        let doc = html_to_document("<p>soft\nwrap</p>");
        assert_eq!(doc.text(), "soft wrap");
    }

    #[test]
    fn test_unknown_elements_keep_text() {
        let doc = html_to_document(r#"<table><tr><td>cell</td></tr></table><p><span class="x">kept</span></p>"#);
        let blocks = top_blocks(&doc);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[0].text(), "cell");
        assert_eq!(blocks[1].text(), "kept");
    }

    #[test]
    fn test_pre_becomes_code_block() {
        let doc = html_to_document("<pre><code>fn main() {\n    run();\n}\n</code></pre>");
        let block = top_blocks(&doc)[0];
        assert_eq!(block.kind, BlockKind::Code);
        assert_eq!(block.text(), "fn main() {\n    run();\n}");
        assert!(runs(block)[0].marks.is_empty());
    }

    #[test]
    fn test_alignment_from_style() {
        let doc = html_to_document(r#"<p style="color: red; text-align: center">c</p>"#);
        assert_eq!(top_blocks(&doc)[0].align, Some(Align::Center));
    }

    #[test]
    fn test_task_list_items_become_checklist_items() {
        let html = "<ul>\n<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> done</li>\n<li><input type=\"checkbox\" disabled=\"\" /> todo</li>\n</ul>";
        let doc = html_to_document(html);
        let list = top_blocks(&doc)[0];
        let items: Vec<&Block> = list.children.iter().filter_map(Node::as_block).collect();
        assert_eq!(items[0].kind, BlockKind::ChecklistItem { checked: true });
        assert_eq!(items[0].text(), "done");
        assert_eq!(items[1].kind, BlockKind::ChecklistItem { checked: false });
    }

    #[test]
    fn test_checklist_div() {
        let doc = html_to_document(r#"<div data-checked="false">water plants</div>"#);
        let block = top_blocks(&doc)[0];
        assert_eq!(block.kind, BlockKind::ChecklistItem { checked: false });
        assert_eq!(block.text(), "water plants");
    }

    #[test]
    fn test_checklist_keeps_leading_whitespace() {
        let doc = html_to_document(r#"<div data-checked="false">  x</div><ul><li data-checked="true"> y</li></ul>"#);
        let blocks = top_blocks(&doc);
        assert_eq!(blocks[0].text(), "  x");
        let item = blocks[1].children[0].as_block().unwrap();
        assert_eq!(item.kind, BlockKind::ChecklistItem { checked: true });
        assert_eq!(item.text(), " y");
    }

    #[test]
    fn test_blockquote_with_paragraphs() {
        let doc = html_to_document("<blockquote>\n<p>quoted</p>\n</blockquote>");
        let block = top_blocks(&doc)[0];
        assert_eq!(block.kind, BlockKind::BlockQuote);
        assert_eq!(block.text(), "quoted");
    }

    #[test]
    fn test_empty_input_is_empty_document() {
        assert!(html_to_document("").is_empty());
        assert!(html_to_document("<!-- only a comment -->").is_empty());
    }
}
