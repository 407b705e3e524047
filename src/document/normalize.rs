//! Tree normalization
//!
//! Every document that leaves a converter or the JSON reader passes through
//! here. After normalization:
//! - the root holds only non-inline blocks, and is never empty
//! - lists hold only list items, checklist items and nested lists
//! - text blocks hold only runs and links, with at least one run
//! - links hold only runs and never nest
//! - adjacent runs with equal marks are merged and empty runs dropped
//! - code blocks carry no marks

use super::model::{Block, BlockKind, Marks, Node, TextRun};

/// Normalize the top level of a document.
pub fn normalize_top_level(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::new();
    let mut pending_inline = Vec::new();

    for node in nodes {
        if node.is_inline() {
            pending_inline.push(node);
            continue;
        }
        flush_inline_into(&mut out, &mut pending_inline, BlockKind::Paragraph);
        if let Node::Block(block) = node {
            out.push(Node::Block(normalize_block_at_top(block)));
        }
    }
    flush_inline_into(&mut out, &mut pending_inline, BlockKind::Paragraph);

    if out.is_empty() {
        out.push(Node::Block(Block::paragraph("")));
    }
    out
}

fn normalize_block_at_top(block: Block) -> Block {
    if block.kind == BlockKind::ListItem {
        let item = normalize_text_block(block);
        Block::new(BlockKind::BulletedList, vec![Node::Block(item)])
    } else if block.kind.is_list() {
        normalize_list(block)
    } else {
        normalize_text_block(block)
    }
}

/// Wrap buffered inline nodes into a new block unless they are only whitespace.
fn flush_inline_into(out: &mut Vec<Node>, pending: &mut Vec<Node>, kind: BlockKind) {
    if pending.is_empty() {
        return;
    }
    let nodes = std::mem::take(pending);
    if is_blank_inline(&nodes) {
        return;
    }
    out.push(Node::Block(normalize_text_block(Block::new(kind, nodes))));
}

fn is_blank_inline(nodes: &[Node]) -> bool {
    nodes.iter().all(|node| match node {
        Node::Text(run) => run.text.trim().is_empty(),
        Node::Block(_) => false,
    })
}

fn normalize_list(list: Block) -> Block {
    let Block {
        kind,
        align,
        children,
    } = list;

    let mut items = Vec::new();
    let mut pending_inline = Vec::new();
    for child in children {
        if child.is_inline() {
            pending_inline.push(child);
            continue;
        }
        flush_inline_into(&mut items, &mut pending_inline, BlockKind::ListItem);
        if let Node::Block(mut block) = child {
            if block.kind.is_list() {
                items.push(Node::Block(normalize_list(block)));
            } else {
                if !block.kind.is_list_entry() {
                    block.kind = BlockKind::ListItem;
                }
                items.push(Node::Block(normalize_text_block(block)));
            }
        }
    }
    flush_inline_into(&mut items, &mut pending_inline, BlockKind::ListItem);

    if items.is_empty() {
        items.push(Node::Block(Block::with_text(BlockKind::ListItem, "")));
    }
    Block {
        kind,
        align,
        children: items,
    }
}

/// Normalize a block whose children must be inline content.
pub fn normalize_text_block(block: Block) -> Block {
    let Block {
        kind,
        align,
        children,
    } = block;

    let mut inline = Vec::new();
    flatten_inline(children, &mut inline);
    let mut children = merge_runs(inline);

    if kind == BlockKind::Code {
        strip_marks(&mut children);
    }
    if children.is_empty() {
        children.push(Node::Text(TextRun::plain("")));
    }
    Block {
        kind,
        align,
        children,
    }
}

/// Pull inline content out of `children`, flattening nested structural blocks.
///
/// Nested blocks contribute their inline content separated by a newline;
/// whitespace-only text between them is dropped.
fn flatten_inline(children: Vec<Node>, out: &mut Vec<Node>) {
    let has_structural_children = children.iter().any(|node| !node.is_inline());

    for child in children {
        match child {
            Node::Text(run) => {
                if has_structural_children && run.text.trim().is_empty() {
                    continue;
                }
                out.push(Node::Text(run));
            }
            Node::Block(block) if block.kind.is_inline() => {
                if let Some(link) = normalize_link(block) {
                    out.push(link);
                }
            }
            Node::Block(block) => {
                let mut nested = Vec::new();
                flatten_inline(block.children, &mut nested);
                if nested.is_empty() {
                    continue;
                }
                if !out.is_empty() {
                    out.push(Node::Text(TextRun::plain("\n")));
                }
                out.extend(nested);
            }
        }
    }
}

fn normalize_link(link: Block) -> Option<Node> {
    let mut runs = Vec::new();
    collect_runs(link.children, &mut runs);
    let children = merge_runs(runs.into_iter().map(Node::Text).collect());
    if children.is_empty() {
        return None;
    }
    Some(Node::Block(Block {
        kind: link.kind,
        align: None,
        children,
    }))
}

fn collect_runs(nodes: Vec<Node>, out: &mut Vec<TextRun>) {
    for node in nodes {
        match node {
            Node::Text(run) => out.push(run),
            Node::Block(block) => collect_runs(block.children, out),
        }
    }
}

/// Merge adjacent runs with equal marks and adjacent links with equal targets;
/// drop empty runs.
fn merge_runs(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(run) if run.text.is_empty() => {}
            Node::Text(run) => {
                if let Some(Node::Text(prev)) = out.last_mut() {
                    if prev.marks == run.marks {
                        prev.text.push_str(&run.text);
                        continue;
                    }
                }
                out.push(Node::Text(run));
            }
            Node::Block(block) => {
                if let Some(Node::Block(prev)) = out.last_mut() {
                    if prev.kind == block.kind {
                        let mut combined = std::mem::take(&mut prev.children);
                        combined.extend(block.children);
                        prev.children = merge_runs(combined);
                        continue;
                    }
                }
                out.push(Node::Block(block));
            }
        }
    }
    out
}

fn strip_marks(nodes: &mut Vec<Node>) {
    let mut runs = Vec::new();
    collect_runs(std::mem::take(nodes), &mut runs);
    let plain = runs
        .into_iter()
        .map(|run| {
            Node::Text(TextRun {
                text: run.text,
                marks: Marks::default(),
            })
        })
        .collect();
    *nodes = merge_runs(plain);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
