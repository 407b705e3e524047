//! Live Markdown-style block shortcuts
//!
//! When a trigger key is pressed in a paragraph, the text between the block
//! start and the caret is matched against a fixed list of prefixes. A match
//! deletes the marker and restyles the block in one edit, before the trigger
//! character would have been inserted.

use super::document_editor::{DocumentEditor, Point, Selection};
use super::spans;
use crate::document::{BlockKind, HeadingLevel};
use crate::error::Result;
use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

/// The structural change a shortcut applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Heading(HeadingLevel),
    BulletedList,
    BlockQuote,
}

/// A recognised prefix: what to apply and how many chars of marker to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutMatch {
    pub shortcut: Shortcut,
    pub marker_len: usize,
}

#[derive(Debug, Clone, Copy)]
enum PatternKind {
    Heading,
    Bullet,
    Quote,
}

/// Checked in order; the first match wins. `marker` is the text to remove.
const PATTERNS: &[(PatternKind, &str)] = &[
    (PatternKind::Heading, r"^(?P<marker>#{1,6} +)\S"),
    (PatternKind::Heading, r"^(?P<marker>#{1,6})$"),
    (PatternKind::Bullet, r"^(?P<marker>[-*+] +)\S"),
    (PatternKind::Bullet, r"^(?P<marker>[-*+])$"),
    (PatternKind::Quote, r"^(?P<marker>> +)\S"),
    (PatternKind::Quote, r"^(?P<marker>>)$"),
];

fn compiled_patterns() -> &'static [(PatternKind, Regex)] {
    static COMPILED: OnceLock<Vec<(PatternKind, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|(kind, pattern)| match Regex::new(pattern) {
                Ok(re) => Some((*kind, re)),
                Err(e) => {
                    warn!("Invalid shortcut pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect()
    })
}

/// Match the text before the caret against the shortcut prefixes.
pub fn match_shortcut(text_before_caret: &str) -> Option<ShortcutMatch> {
    let (kind, marker) = compiled_patterns().iter().find_map(|(kind, re)| {
        let marker = re.captures(text_before_caret)?.name("marker")?;
        Some((*kind, marker.as_str()))
    })?;

    let shortcut = match kind {
        PatternKind::Heading => {
            let hashes = marker.trim_end().len();
            Shortcut::Heading(HeadingLevel::new(u8::try_from(hashes).ok()?)?)
        }
        PatternKind::Bullet => Shortcut::BulletedList,
        PatternKind::Quote => Shortcut::BlockQuote,
    };
    Some(ShortcutMatch {
        shortcut,
        marker_len: marker.chars().count(),
    })
}

impl DocumentEditor {
    /// Apply a shortcut if the caret sits in a top-level paragraph behind a
    /// recognised prefix. Returns the applied shortcut.
    pub fn try_shortcut(&mut self) -> Result<Option<Shortcut>> {
        if !self.selection().is_collapsed() {
            return Ok(None);
        }
        let point = self.caret().clone();
        let is_paragraph = self
            .current_block()
            .is_some_and(|block| block.kind == BlockKind::Paragraph);
        if !is_paragraph || self.in_list(&point.block) {
            return Ok(None);
        }
        let Some(found) = match_shortcut(&self.text_before_caret()) else {
            return Ok(None);
        };

        let remaining = spans::delete_range(self.spans_at(&point.block)?, 0, found.marker_len);
        self.write_spans(&point.block, remaining)?;
        let offset = point.offset - found.marker_len;

        let path = match found.shortcut {
            Shortcut::Heading(level) => {
                self.set_block_kind(&point.block, BlockKind::Heading(level))?;
                point.block
            }
            Shortcut::BlockQuote => {
                self.set_block_kind(&point.block, BlockKind::BlockQuote)?;
                point.block
            }
            Shortcut::BulletedList => self.wrap_in_list(&point.block, BlockKind::BulletedList)?,
        };

        debug!("Applied shortcut {:?} at {:?}", found.shortcut, path);
        self.place(Selection::caret(Point::new(path, offset)));
        self.touch();
        Ok(Some(found.shortcut))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
