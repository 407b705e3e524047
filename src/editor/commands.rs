//! Formatting commands
//!
//! Toolbar-level operations on the current selection: mark and block
//! toggles, alignment, links, checklist state, emoji and fragment insertion.

use super::document_editor::{DocumentEditor, Point, Selection};
use super::spans::{self, Span};
use crate::document::{Align, BlockKind, Document, LinkTarget, Mark, Node};
use crate::error::{Error, Result};
use log::debug;

impl DocumentEditor {
    // ─────────────────────────────────────────────────────────────────────────
    // Marks
    // ─────────────────────────────────────────────────────────────────────────

    /// True when every selected char carries `mark`. At a caret, reports the
    /// marks the next insertion would get.
    pub fn is_mark_active(&self, mark: Mark) -> bool {
        if self.selection().is_collapsed() {
            if let Some(pending) = self.pending_marks() {
                return pending.has(mark);
            }
            let caret = self.caret();
            return self
                .spans_at(&caret.block)
                .map(|current| spans::marks_at(&current, caret.offset).has(mark))
                .unwrap_or(false);
        }
        let Ok(ranges) = self.selected_ranges() else {
            return false;
        };
        let mut selected = ranges.iter().flat_map(|(path, start, end)| {
            self.spans_at(path)
                .map(|current| spans::slice(&current, *start, *end))
                .unwrap_or_default()
        });
        let mut any = false;
        let all = selected.all(|span| {
            any = true;
            span.marks.has(mark)
        });
        any && all
    }

    /// Toggle `mark` over the selection, or for the next insertion when the
    /// selection is collapsed. Code blocks take no marks; returns `false` there.
    pub fn toggle_mark(&mut self, mark: Mark) -> Result<bool> {
        if self.current_block().is_some_and(|b| b.kind == BlockKind::Code) {
            return Ok(false);
        }
        let enable = !self.is_mark_active(mark);

        if self.selection().is_collapsed() {
            let caret = self.caret().clone();
            let mut marks = self
                .pending_marks()
                .unwrap_or_else(|| {
                    self.spans_at(&caret.block)
                        .map(|current| spans::marks_at(&current, caret.offset))
                        .unwrap_or_default()
                });
            marks.set(mark, enable);
            self.set_pending_marks(Some(marks));
            return Ok(true);
        }

        for (path, start, end) in self.selected_ranges()? {
            let updated = spans::update_range(self.spans_at(&path)?, start, end, |span| {
                span.marks.set(mark, enable)
            });
            self.write_spans(&path, updated)?;
        }
        debug!("Toggled {:?} {}", mark, if enable { "on" } else { "off" });
        self.touch();
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Blocks
    // ─────────────────────────────────────────────────────────────────────────

    /// Toggle the caret's block to `kind`.
    ///
    /// - list kinds wrap the block into a list, switch the kind of the
    ///   enclosing list, or lift the entry out when the list already has `kind`
    /// - a list item wraps a top-level block into a bulleted list, turns a
    ///   checklist entry back into a list item, or leaves the list
    /// - a checklist toggle inside a list flips the entry between list item and
    ///   checklist item
    /// - any other kind lifts the entry out of every list first, then sets the
    ///   kind, or resets to a paragraph when the block already has it
    ///
    /// Links are inline and rejected without touching the document.
    pub fn toggle_block(&mut self, kind: BlockKind) -> Result<()> {
        if kind.is_inline() {
            return Err(Error::InvalidLocation(format!(
                "{} cannot replace a text block",
                kind
            )));
        }
        let caret = self.caret().clone();
        let current = self.text_block(&caret.block)?.kind.clone();
        let in_list = self.in_list(&caret.block);
        let Some((_, parent)) = caret.block.split_last() else {
            return Err(Error::InvalidLocation("empty caret path".to_string()));
        };
        let parent = parent.to_vec();

        let path = if kind.is_list() {
            if in_list {
                let list_kind = self.text_block_parent_kind(&parent);
                if list_kind.as_ref() == Some(&kind) {
                    self.lift_out_of_list(&caret.block, BlockKind::Paragraph)?
                } else {
                    if let Some(list) = self.document_mut().block_mut(&parent) {
                        list.kind = kind.clone();
                    }
                    caret.block.clone()
                }
            } else {
                self.wrap_in_list(&caret.block, kind.clone())?
            }
        } else if kind == BlockKind::ListItem {
            if !in_list {
                self.wrap_in_list(&caret.block, BlockKind::BulletedList)?
            } else if current == BlockKind::ListItem {
                self.lift_out_of_list(&caret.block, BlockKind::Paragraph)?
            } else {
                self.set_block_kind(&caret.block, BlockKind::ListItem)?;
                caret.block.clone()
            }
        } else if in_list && matches!(kind, BlockKind::ChecklistItem { .. }) {
            let next = if matches!(current, BlockKind::ChecklistItem { .. }) {
                BlockKind::ListItem
            } else {
                BlockKind::ChecklistItem { checked: false }
            };
            self.set_block_kind(&caret.block, next)?;
            caret.block.clone()
        } else {
            let mut path = caret.block.clone();
            while self.in_list(&path) {
                path = self.lift_out_of_list(&path, BlockKind::Paragraph)?;
            }
            let next = if same_kind(&current, &kind) {
                BlockKind::Paragraph
            } else {
                kind.clone()
            };
            self.set_block_kind(&path, next)?;
            path
        };

        debug!("Toggled block {} -> {:?}", current, path);
        let offset = caret.offset.min(self.text_len(&path)?);
        self.place(Selection::caret(Point::new(path, offset)));
        self.touch();
        Ok(())
    }

    fn text_block_parent_kind(&self, parent: &[usize]) -> Option<BlockKind> {
        self.document().block(parent).map(|block| block.kind.clone())
    }

    /// Set (or clear) the alignment of every selected text block.
    pub fn set_align(&mut self, align: Option<Align>) -> Result<()> {
        for (path, _, _) in self.selected_ranges()? {
            if let Some(block) = self.document_mut().block_mut(&path) {
                block.align = align;
            }
        }
        self.touch();
        Ok(())
    }

    /// Flip the checked state of the caret's checklist item. Returns `false`
    /// when the caret is not in one.
    pub fn toggle_checked(&mut self) -> Result<bool> {
        let path = self.caret().block.clone();
        let Some(block) = self.document_mut().block_mut(&path) else {
            return Ok(false);
        };
        let BlockKind::ChecklistItem { checked } = block.kind else {
            return Ok(false);
        };
        block.kind = BlockKind::ChecklistItem { checked: !checked };
        self.touch();
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Links
    // ─────────────────────────────────────────────────────────────────────────

    /// The link around the caret, if any.
    pub fn link_at_caret(&self) -> Option<LinkTarget> {
        let caret = self.caret();
        let current = self.spans_at(&caret.block).ok()?;
        spans::link_range_at(&current, caret.offset).map(|(link, _, _)| link)
    }

    /// Link the selection to `target`, replacing any link it overlaps. At a
    /// caret, the link around the caret is removed first and `text` (or the
    /// href) is inserted as a new link.
    pub fn insert_link(&mut self, target: LinkTarget, text: Option<&str>) -> Result<()> {
        if self.selection().is_collapsed() {
            let caret = self.caret().clone();
            let mut current = self.spans_at(&caret.block)?;
            if let Some((_, start, end)) = spans::link_range_at(&current, caret.offset) {
                current = spans::update_range(current, start, end, |span| span.link = None);
            }
            let label = text.filter(|t| !t.is_empty()).unwrap_or(target.href.as_str()).to_string();
            let marks = spans::marks_at(&current, caret.offset);
            let len = label.chars().count();
            let updated = spans::insert(
                current,
                caret.offset,
                Span::new(label, marks, Some(target.clone())),
            );
            self.write_spans(&caret.block, updated)?;
            self.place(Selection::caret(Point::new(caret.block, caret.offset + len)));
        } else {
            for (path, start, end) in self.selected_ranges()? {
                let current = self.spans_at(&path)?;
                let (start, end) = widen_to_links(&current, start, end);
                let updated = spans::update_range(current, start, end, |span| {
                    span.link = Some(target.clone())
                });
                self.write_spans(&path, updated)?;
            }
        }
        debug!("Inserted link to {}", target.href);
        self.touch();
        Ok(())
    }

    /// Unwrap the link around the caret, or every link touching the selection.
    /// Returns `false` when there was no link.
    pub fn remove_link(&mut self) -> Result<bool> {
        let ranges = if self.selection().is_collapsed() {
            let caret = self.caret().clone();
            let current = self.spans_at(&caret.block)?;
            match spans::link_range_at(&current, caret.offset) {
                Some((_, start, end)) => vec![(caret.block, start, end)],
                None => return Ok(false),
            }
        } else {
            self.selected_ranges()?
        };

        let mut removed = false;
        for (path, start, end) in ranges {
            let current = self.spans_at(&path)?;
            let (start, end) = widen_to_links(&current, start, end);
            let updated = spans::update_range(current, start, end, |span| {
                removed |= span.link.take().is_some();
            });
            self.write_spans(&path, updated)?;
        }
        if removed {
            self.touch();
        }
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Insertion
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert an emoji at the caret as plain text.
    pub fn insert_emoji(&mut self, emoji: &str) -> Result<()> {
        let plain = Some(Default::default());
        self.set_pending_marks(plain);
        self.insert_text(emoji)
    }

    /// Insert a converted fragment at the caret.
    ///
    /// A fragment that is a single paragraph is inserted inline. Otherwise its
    /// blocks replace the caret's block when that block is empty, or go after
    /// the caret's top-level block, splitting it at the caret when it is a
    /// top-level text block.
    pub fn insert_fragment(&mut self, fragment: Document) -> Result<()> {
        self.delete_selection()?;
        let nodes = fragment.into_children();

        if let [Node::Block(only)] = nodes.as_slice() {
            if only.kind == BlockKind::Paragraph {
                let caret = self.caret().clone();
                let pasted = spans::flatten(&only.children);
                let len = spans::char_len(&pasted);
                let (mut left, right) = spans::split_at(self.spans_at(&caret.block)?, caret.offset);
                left.extend(pasted);
                left.extend(right);
                self.write_spans(&caret.block, left)?;
                self.place(Selection::caret(Point::new(caret.block, caret.offset + len)));
                self.touch();
                return Ok(());
            }
        }

        let caret = self.caret().clone();
        let Some(&top) = caret.block.first() else {
            return Err(Error::InvalidLocation("empty caret path".to_string()));
        };
        let count = nodes.len();
        let current_empty = self.text_len(&caret.block)? == 0;

        let insert_at = if caret.block.len() == 1 && current_empty {
            self.document_mut().children.remove(top);
            top
        } else if caret.block.len() == 1 && caret.offset > 0 && caret.offset < self.text_len(&caret.block)? {
            self.split_block()?;
            top + 1
        } else if caret.block.len() == 1 && caret.offset == 0 {
            top
        } else {
            top + 1
        };

        let children = &mut self.document_mut().children;
        for (i, node) in nodes.into_iter().enumerate() {
            children.insert(insert_at + i, node);
        }

        let last_top = insert_at + count.saturating_sub(1);
        let end = self
            .document()
            .text_block_paths()
            .into_iter()
            .rev()
            .find(|path| path.first() == Some(&last_top))
            .unwrap_or_else(|| vec![last_top]);
        let offset = self.text_len(&end).unwrap_or(0);
        self.place(Selection::caret(Point::new(end, offset)));
        self.touch();
        Ok(())
    }
}

/// Blocks with the same kind, ignoring checklist state.
fn same_kind(a: &BlockKind, b: &BlockKind) -> bool {
    match (a, b) {
        (BlockKind::ChecklistItem { .. }, BlockKind::ChecklistItem { .. }) => true,
        _ => a == b,
    }
}

/// Grow `start..end` to cover any link it overlaps, so links are replaced or
/// removed whole rather than split.
fn widen_to_links(current: &[Span], start: usize, end: usize) -> (usize, usize) {
    let mut position = 0;
    let (mut from, mut to) = (start, end);
    let mut runs: Vec<(&LinkTarget, usize, usize)> = Vec::new();
    for span in current {
        let len = span.char_len();
        if let Some(link) = &span.link {
            match runs.last_mut() {
                Some((open, _, run_end)) if *open == link && *run_end == position => *run_end += len,
                _ => runs.push((link, position, position + len)),
            }
        }
        position += len;
    }
    for (_, run_start, run_end) in runs {
        let overlaps = run_start < end.max(start + 1) && start < run_end;
        if overlaps {
            from = from.min(run_start);
            to = to.max(run_end);
        }
    }
    (from, to)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
