//! Flat span view of a text block
//!
//! Editing works on a text block's inline content as a flat list of spans,
//! each carrying its marks and optional link target. Offsets are counted in
//! chars. After an edit the spans are regrouped into runs and link blocks,
//! which is what keeps links from ever nesting.

use crate::document::{Block, BlockKind, LinkTarget, Marks, Node, TextRun};

/// A stretch of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub marks: Marks,
    pub link: Option<LinkTarget>,
}

impl Span {
    pub fn new(text: impl Into<String>, marks: Marks, link: Option<LinkTarget>) -> Self {
        Self {
            text: text.into(),
            marks,
            link,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Byte index of the `offset`-th char of `text`, clamped to its length.
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Flatten / Rebuild
// ─────────────────────────────────────────────────────────────────────────────

/// Flatten inline children into spans.
pub fn flatten(children: &[Node]) -> Vec<Span> {
    let mut spans = Vec::new();
    flatten_into(children, None, &mut spans);
    spans
}

fn flatten_into(children: &[Node], link: Option<&LinkTarget>, out: &mut Vec<Span>) {
    for child in children {
        match child {
            Node::Text(run) => out.push(Span::new(run.text.clone(), run.marks, link.cloned())),
            Node::Block(block) => {
                let inner = match &block.kind {
                    BlockKind::Link(target) => Some(target),
                    _ => link,
                };
                flatten_into(&block.children, inner, out);
            }
        }
    }
}

/// Regroup spans into runs and link blocks. Empty spans are dropped.
pub fn rebuild(spans: Vec<Span>) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    for span in spans.into_iter().filter(|span| !span.text.is_empty()) {
        let run = Node::Text(TextRun::marked(span.text, span.marks));
        match span.link {
            None => nodes.push(run),
            Some(target) => {
                if let Some(Node::Block(prev)) = nodes.last_mut() {
                    if prev.kind == BlockKind::Link(target.clone()) {
                        prev.children.push(run);
                        continue;
                    }
                }
                nodes.push(Node::Block(Block::new(BlockKind::Link(target), vec![run])));
            }
        }
    }
    nodes
}

/// Total length in chars.
pub fn char_len(spans: &[Span]) -> usize {
    spans.iter().map(Span::char_len).sum()
}

/// Concatenated text.
pub fn text(spans: &[Span]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Splitting and Range Edits
// ─────────────────────────────────────────────────────────────────────────────

/// Split the spans at a char offset.
pub fn split_at(spans: Vec<Span>, offset: usize) -> (Vec<Span>, Vec<Span>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut remaining = offset;
    for span in spans {
        let len = span.char_len();
        if remaining >= len {
            remaining -= len;
            left.push(span);
        } else if remaining == 0 {
            right.push(span);
        } else {
            let at = byte_index(&span.text, remaining);
            let (head, tail) = span.text.split_at(at);
            left.push(Span::new(head, span.marks, span.link.clone()));
            right.push(Span::new(tail, span.marks, span.link));
            remaining = 0;
        }
    }
    (left, right)
}

/// Split into the parts before `start`, inside `start..end` and after `end`.
pub fn split_range(spans: Vec<Span>, start: usize, end: usize) -> (Vec<Span>, Vec<Span>, Vec<Span>) {
    let (before, rest) = split_at(spans, start);
    let (inside, after) = split_at(rest, end.saturating_sub(start));
    (before, inside, after)
}

/// Remove the chars in `start..end`.
pub fn delete_range(spans: Vec<Span>, start: usize, end: usize) -> Vec<Span> {
    let (mut before, _, after) = split_range(spans, start, end);
    before.extend(after);
    before
}

/// Insert a span at a char offset.
pub fn insert(spans: Vec<Span>, offset: usize, span: Span) -> Vec<Span> {
    let (mut left, right) = split_at(spans, offset);
    left.push(span);
    left.extend(right);
    left
}

/// Apply `f` to every span covering `start..end`, splitting at the bounds.
pub fn update_range(
    spans: Vec<Span>,
    start: usize,
    end: usize,
    mut f: impl FnMut(&mut Span),
) -> Vec<Span> {
    let (mut before, mut inside, after) = split_range(spans, start, end);
    inside.iter_mut().for_each(&mut f);
    before.append(&mut inside);
    before.extend(after);
    before
}

/// Spans (or parts of spans) covering `start..end`.
pub fn slice(spans: &[Span], start: usize, end: usize) -> Vec<Span> {
    split_range(spans.to_vec(), start, end).1
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

/// Marks that text typed at `offset` inherits: those of the char before the
/// caret, or of the first char when the caret is at the block start.
pub fn marks_at(spans: &[Span], offset: usize) -> Marks {
    span_at(spans, offset).map(|span| span.marks).unwrap_or_default()
}

fn span_at(spans: &[Span], offset: usize) -> Option<&Span> {
    let mut position = 0;
    let non_empty = || spans.iter().filter(|span| !span.text.is_empty());
    for span in non_empty() {
        let len = span.char_len();
        if offset > position && offset <= position + len {
            return Some(span);
        }
        position += len;
    }
    non_empty().next()
}

/// The link whose text strictly contains `offset`, with its char range.
pub fn link_range_at(spans: &[Span], offset: usize) -> Option<(LinkTarget, usize, usize)> {
    let mut position = 0;
    let mut current: Option<(LinkTarget, usize)> = None;
    for span in spans {
        let len = span.char_len();
        match (&span.link, &current) {
            (Some(link), Some((open, _))) if link == open => {}
            _ => {
                if let Some((link, start)) = current.take() {
                    if start < offset && offset < position {
                        return Some((link, start, position));
                    }
                }
                current = span.link.clone().map(|link| (link, position));
            }
        }
        position += len;
    }
    match current {
        Some((link, start)) if start < offset && offset < position => Some((link, start, position)),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
