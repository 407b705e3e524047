//! Cursor-addressed editing of a structured document
//!
//! `DocumentEditor` owns a document plus a selection and applies the
//! primitive edits: insert, delete backward, split, delete selection and the
//! list lift/wrap moves the commands and shortcuts are built from. Every
//! mutation goes through `write_spans` or a structural helper, and bumps the
//! edit version the session uses for dirty tracking.

use super::spans::{self, Span};
use crate::document::{normalize_text_block, Block, BlockKind, Document, Marks, Node, Path};
use crate::error::{Error, Result};
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Positions
// ─────────────────────────────────────────────────────────────────────────────

/// A caret position: a text block and a char offset within it.
///
/// Text blocks never contain each other, so ordering by path then offset is
/// document order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub block: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(block: Path, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor and focus of a selection; collapsed when they are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn caret(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The selection bounds in document order.
    pub fn ordered(&self) -> (&Point, &Point) {
        if self.anchor <= self.focus {
            (&self.anchor, &self.focus)
        } else {
            (&self.focus, &self.anchor)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DocumentEditor {
    document: Document,
    selection: Selection,
    /// Marks for the next insertion, set by toggling a mark at a caret
    pending_marks: Option<Marks>,
    version: u64,
}

impl DocumentEditor {
    pub fn new(document: Document) -> Self {
        let selection = Selection::caret(Point::new(first_text_block(&document), 0));
        Self {
            document,
            selection,
            pending_marks: None,
            version: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The caret is the selection focus.
    pub fn caret(&self) -> &Point {
        &self.selection.focus
    }

    /// Incremented on every document change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pending_marks(&self) -> Option<Marks> {
        self.pending_marks
    }

    pub(super) fn set_pending_marks(&mut self, marks: Option<Marks>) {
        self.pending_marks = marks;
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.validate(&selection.anchor)?;
        self.validate(&selection.focus)?;
        self.selection = selection;
        self.pending_marks = None;
        Ok(())
    }

    pub fn set_caret(&mut self, point: Point) -> Result<()> {
        self.set_selection(Selection::caret(point))
    }

    /// Place the caret at the end of the last text block.
    pub fn move_to_end(&mut self) {
        let point = self.end_point();
        self.selection = Selection::caret(point);
        self.pending_marks = None;
    }

    pub fn select_all(&mut self) {
        let start = Point::new(first_text_block(&self.document), 0);
        let end = self.end_point();
        self.selection = Selection::new(start, end);
        self.pending_marks = None;
    }

    /// Swap in a whole new document and put the caret at its start.
    pub fn replace_document(&mut self, document: Document) {
        self.selection = Selection::caret(Point::new(first_text_block(&document), 0));
        self.document = document;
        self.pending_marks = None;
        self.touch();
    }

    /// The text block holding the caret.
    pub fn current_block(&self) -> Option<&Block> {
        self.document.block(&self.caret().block)
    }

    /// Text from the start of the caret's block up to the caret.
    pub fn text_before_caret(&self) -> String {
        let caret = self.caret();
        let text = self
            .document
            .block(&caret.block)
            .map(Block::text)
            .unwrap_or_default();
        let end = spans::byte_index(&text, caret.offset);
        text[..end].to_string()
    }

    /// True when the block at `path` sits directly inside a list.
    pub fn in_list(&self, path: &[usize]) -> bool {
        path.split_last()
            .and_then(|(_, parent)| self.document.block(parent))
            .is_some_and(|parent| parent.kind.is_list())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Primitive Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert text at the caret, replacing any selection.
    ///
    /// Inserted text takes the pending marks, or the marks of the char before
    /// the caret, and joins a link when typed strictly inside one.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.delete_selection()?;

        let point = self.caret().clone();
        let is_code = self.text_block(&point.block)?.kind == BlockKind::Code;
        let current = self.spans_at(&point.block)?;
        let marks = if is_code {
            Marks::default()
        } else {
            self.pending_marks
                .unwrap_or_else(|| spans::marks_at(&current, point.offset))
        };
        let link = spans::link_range_at(&current, point.offset).map(|(link, _, _)| link);

        let updated = spans::insert(current, point.offset, Span::new(text, marks, link));
        self.write_spans(&point.block, updated)?;
        self.selection = Selection::caret(Point::new(
            point.block,
            point.offset + text.chars().count(),
        ));
        self.pending_marks = None;
        self.touch();
        Ok(())
    }

    /// Backspace. Returns `false` when there was nothing to delete.
    ///
    /// At the start of a list entry the entry leaves its list; at the start
    /// of any other non-paragraph block the block becomes a paragraph; at the
    /// start of a paragraph it merges into the previous text block.
    pub fn delete_backward(&mut self) -> Result<bool> {
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }
        let point = self.caret().clone();
        self.validate(&point)?;

        if point.offset > 0 {
            let updated = spans::delete_range(
                self.spans_at(&point.block)?,
                point.offset - 1,
                point.offset,
            );
            self.write_spans(&point.block, updated)?;
            self.selection = Selection::caret(Point::new(point.block, point.offset - 1));
            self.touch();
            return Ok(true);
        }

        if self.in_list(&point.block) {
            let path = self.lift_out_of_list(&point.block, BlockKind::Paragraph)?;
            self.selection = Selection::caret(Point::new(path, 0));
            self.touch();
            return Ok(true);
        }

        if self.text_block(&point.block)?.kind != BlockKind::Paragraph {
            self.set_block_kind(&point.block, BlockKind::Paragraph)?;
            self.touch();
            return Ok(true);
        }

        let paths = self.document.text_block_paths();
        let previous = paths
            .iter()
            .position(|path| *path == point.block)
            .and_then(|index| index.checked_sub(1))
            .map(|index| paths[index].clone());
        let Some(previous) = previous else {
            return Ok(false);
        };

        let mut merged = self.spans_at(&previous)?;
        let offset = spans::char_len(&merged);
        merged.extend(self.spans_at(&point.block)?);
        self.remove_node(&point.block)?;
        self.prune_empty_lists();
        self.write_spans(&previous, merged)?;
        self.selection = Selection::caret(Point::new(previous, offset));
        self.touch();
        Ok(true)
    }

    /// Delete the selected content, joining the first and last blocks.
    /// Returns `false` for a collapsed selection.
    pub fn delete_selection(&mut self) -> Result<bool> {
        if self.selection.is_collapsed() {
            return Ok(false);
        }
        let (start, end) = self.selection.ordered();
        let (start, end) = (start.clone(), end.clone());
        self.validate(&start)?;
        self.validate(&end)?;

        if start.block == end.block {
            let updated = spans::delete_range(self.spans_at(&start.block)?, start.offset, end.offset);
            self.write_spans(&start.block, updated)?;
        } else {
            let (mut joined, _) = spans::split_at(self.spans_at(&start.block)?, start.offset);
            let (_, tail) = spans::split_at(self.spans_at(&end.block)?, end.offset);
            joined.extend(tail);

            let doomed: Vec<Path> = self
                .document
                .text_block_paths()
                .into_iter()
                .filter(|path| *path > start.block && *path <= end.block)
                .collect();
            for path in doomed.iter().rev() {
                self.remove_node(path)?;
            }
            self.prune_empty_lists();
            self.write_spans(&start.block, joined)?;
        }

        debug!("Deleted selection {:?}..{:?}", start, end);
        self.selection = Selection::caret(start);
        self.touch();
        Ok(true)
    }

    /// Split the caret's block in two (Enter). The new block continues the
    /// current kind, except headings continue as paragraphs and checklist
    /// items start unchecked.
    pub fn split_block(&mut self) -> Result<()> {
        self.delete_selection()?;
        let point = self.caret().clone();
        let block = self.text_block(&point.block)?;
        let align = block.align;
        let next_kind = match &block.kind {
            BlockKind::Heading(_) => BlockKind::Paragraph,
            BlockKind::ChecklistItem { .. } => BlockKind::ChecklistItem { checked: false },
            other => other.clone(),
        };

        let (left, right) = spans::split_at(self.spans_at(&point.block)?, point.offset);
        self.write_spans(&point.block, left)?;

        let mut next = Block::new(next_kind, spans::rebuild(right));
        next.align = align;
        let next_path = self.insert_after(&point.block, normalize_text_block(next))?;

        self.selection = Selection::caret(Point::new(next_path, 0));
        self.pending_marks = None;
        self.touch();
        Ok(())
    }

    /// Move the caret's list entry out of its list as a paragraph. Returns
    /// `false` when the caret is not in a list.
    pub fn exit_list(&mut self) -> Result<bool> {
        let path = self.caret().block.clone();
        if !self.in_list(&path) {
            return Ok(false);
        }
        let new_path = self.lift_out_of_list(&path, BlockKind::Paragraph)?;
        let offset = self.caret().offset;
        self.selection = Selection::caret(Point::new(new_path, offset));
        self.touch();
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub(super) fn touch(&mut self) {
        self.version += 1;
    }

    /// Replace the selection without validation, for paths produced by edits.
    pub(super) fn place(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub(super) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn end_point(&self) -> Point {
        let path = self
            .document
            .text_block_paths()
            .pop()
            .unwrap_or_else(|| vec![0]);
        let offset = self.text_len(&path).unwrap_or(0);
        Point::new(path, offset)
    }

    fn validate(&self, point: &Point) -> Result<()> {
        let len = self.text_len(&point.block)?;
        if point.offset > len {
            return Err(Error::InvalidLocation(format!(
                "offset {} past end of block {:?} ({} chars)",
                point.offset, point.block, len
            )));
        }
        Ok(())
    }

    pub(super) fn text_block(&self, path: &[usize]) -> Result<&Block> {
        self.document
            .block(path)
            .filter(|block| block.kind.is_text_block())
            .ok_or_else(|| Error::InvalidLocation(format!("no text block at {:?}", path)))
    }

    pub(super) fn text_len(&self, path: &[usize]) -> Result<usize> {
        Ok(self.text_block(path)?.text().chars().count())
    }

    pub(super) fn spans_at(&self, path: &[usize]) -> Result<Vec<Span>> {
        Ok(spans::flatten(&self.text_block(path)?.children))
    }

    /// Rebuild a text block's inline content from spans and renormalize it.
    pub(super) fn write_spans(&mut self, path: &[usize], spans: Vec<Span>) -> Result<()> {
        let block = self
            .document
            .block_mut(path)
            .filter(|block| block.kind.is_text_block())
            .ok_or_else(|| Error::InvalidLocation(format!("no text block at {:?}", path)))?;
        block.children = spans::rebuild(spans);
        let taken = std::mem::replace(block, Block::paragraph(""));
        *block = normalize_text_block(taken);
        Ok(())
    }

    pub(super) fn set_block_kind(&mut self, path: &[usize], kind: BlockKind) -> Result<()> {
        let block = self
            .document
            .block_mut(path)
            .ok_or_else(|| Error::InvalidLocation(format!("no block at {:?}", path)))?;
        block.kind = kind;
        let taken = std::mem::replace(block, Block::paragraph(""));
        *block = normalize_text_block(taken);
        Ok(())
    }

    /// Insert `block` as the next sibling of the node at `path`.
    pub(super) fn insert_after(&mut self, path: &[usize], block: Block) -> Result<Path> {
        let (&index, parent) = path
            .split_last()
            .ok_or_else(|| Error::InvalidLocation("empty path".to_string()))?;
        let siblings = self
            .document
            .children_at_mut(parent)
            .ok_or_else(|| Error::InvalidLocation(format!("no parent at {:?}", parent)))?;
        let at = (index + 1).min(siblings.len());
        siblings.insert(at, Node::Block(block));
        let mut new_path = parent.to_vec();
        new_path.push(at);
        Ok(new_path)
    }

    pub(super) fn remove_node(&mut self, path: &[usize]) -> Result<Node> {
        let (&index, parent) = path
            .split_last()
            .ok_or_else(|| Error::InvalidLocation("empty path".to_string()))?;
        let siblings = self
            .document
            .children_at_mut(parent)
            .filter(|siblings| index < siblings.len())
            .ok_or_else(|| Error::InvalidLocation(format!("no node at {:?}", path)))?;
        Ok(siblings.remove(index))
    }

    /// Drop lists left without entries; keep the root renderable.
    pub(super) fn prune_empty_lists(&mut self) {
        prune_lists(&mut self.document.children);
        if self.document.children.is_empty() {
            self.document.children.push(Node::Block(Block::paragraph("")));
        }
    }

    /// Move the list entry at `path` out of its list, splitting the list
    /// around it. At the top level the entry becomes `kind`; inside a nested
    /// list it keeps its kind and joins the enclosing list.
    pub(super) fn lift_out_of_list(&mut self, path: &[usize], kind: BlockKind) -> Result<Path> {
        let invalid = || Error::InvalidLocation(format!("no list entry at {:?}", path));
        let (&item_index, list_path) = path.split_last().ok_or_else(invalid)?;
        let (&list_index, container_path) = list_path.split_last().ok_or_else(invalid)?;
        let container_is_list = self
            .document
            .block(container_path)
            .is_some_and(|block| block.kind.is_list());

        let list = self
            .document
            .block_mut(list_path)
            .filter(|list| list.kind.is_list() && item_index < list.children.len())
            .ok_or_else(invalid)?;
        let list_kind = list.kind.clone();
        let tail = list.children.split_off(item_index + 1);
        let item = list.children.pop().ok_or_else(invalid)?;
        let list_emptied = list.children.is_empty();

        let Node::Block(mut item) = item else {
            return Err(invalid());
        };
        if !container_is_list {
            item.kind = kind;
        }
        let item = normalize_text_block(item);

        let container = self
            .document
            .children_at_mut(container_path)
            .ok_or_else(invalid)?;
        let mut at = list_index + 1;
        container.insert(at, Node::Block(item));
        if !tail.is_empty() {
            container.insert(at + 1, Node::Block(Block::new(list_kind, tail)));
        }
        if list_emptied {
            container.remove(list_index);
            at -= 1;
        }

        let mut new_path = container_path.to_vec();
        new_path.push(at);
        debug!("Lifted list entry {:?} to {:?}", path, new_path);
        Ok(new_path)
    }

    /// Wrap the text block at `path` into a new list of `list_kind` and
    /// return the path of the wrapped entry.
    pub(super) fn wrap_in_list(&mut self, path: &[usize], list_kind: BlockKind) -> Result<Path> {
        let invalid = || Error::InvalidLocation(format!("no text block at {:?}", path));
        let node = self.document.node_mut(path).ok_or_else(invalid)?;
        let Node::Block(block) = node else {
            return Err(invalid());
        };
        let mut item = std::mem::replace(block, Block::paragraph(""));
        if !item.kind.is_list_entry() {
            item.kind = BlockKind::ListItem;
        }
        *node = Node::Block(Block::new(list_kind, vec![Node::Block(item)]));

        let mut new_path = path.to_vec();
        new_path.push(0);
        Ok(new_path)
    }

    /// Text blocks covered by the selection, each with its selected char range.
    pub(super) fn selected_ranges(&self) -> Result<Vec<(Path, usize, usize)>> {
        let (start, end) = self.selection.ordered();
        if start.block == end.block {
            return Ok(vec![(start.block.clone(), start.offset, end.offset)]);
        }
        let mut ranges = Vec::new();
        for path in self.document.text_block_paths() {
            if path < start.block || path > end.block {
                continue;
            }
            let len = self.text_len(&path)?;
            let from = if path == start.block { start.offset } else { 0 };
            let to = if path == end.block { end.offset } else { len };
            ranges.push((path, from, to));
        }
        Ok(ranges)
    }
}

fn first_text_block(document: &Document) -> Path {
    document
        .text_block_paths()
        .into_iter()
        .next()
        .unwrap_or_else(|| vec![0])
}

fn prune_lists(nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
        if let Node::Block(block) = node {
            if block.kind.is_list() {
                prune_lists(&mut block.children);
            }
        }
    }
    nodes.retain(|node| match node {
        Node::Block(block) => !(block.kind.is_list() && block.children.is_empty()),
        Node::Text(_) => true,
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
