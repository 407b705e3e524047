//! Editor settings for taskpad
//!
//! This module defines the `EditorSettings` struct that holds the
//! user-configurable options of a description editor session, with serde
//! support for the JSON the host supplies.

use crate::error::{Error, ResultExt};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Markdown Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown extensions enabled when converting Markdown descriptions and pastes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownSettings {
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable GitHub Flavored Markdown tables (flattened to text on import)
    pub tables: bool,
}

impl Default for MarkdownSettings {
    fn default() -> Self {
        Self {
            strikethrough: true,
            tasklist: true,
            autolink: true,
            tables: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Click-Outside Policy
// ─────────────────────────────────────────────────────────────────────────────

/// What a click outside the editor does while there are unsaved edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutsideClickPolicy {
    /// Discard edits and restore the last saved content
    #[default]
    Cancel,
    /// Ask the host to confirm before discarding
    Confirm,
    /// Keep edits; outside clicks do nothing
    Ignore,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Options of a description editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Markdown conversion extensions
    pub markdown: MarkdownSettings,
    /// Whether typed `#`, `-` and `>` prefixes become structure
    pub shortcuts_enabled: bool,
    /// Whether Markdown-like pastes are converted to structure
    pub convert_markdown_paste: bool,
    /// Behaviour of clicks outside the editor while dirty
    pub outside_click: OutsideClickPolicy,
    /// Delay before deferred effects fire after save or cancel
    pub settle_delay_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            markdown: MarkdownSettings::default(),
            shortcuts_enabled: true,
            convert_markdown_paste: true,
            outside_click: OutsideClickPolicy::default(),
            settle_delay_ms: 150,
        }
    }
}

impl EditorSettings {
    pub const MAX_SETTLE_DELAY_MS: u64 = 1000;

    /// Clamp values into their valid ranges.
    pub fn sanitize(&mut self) {
        self.settle_delay_ms = self.settle_delay_ms.min(Self::MAX_SETTLE_DELAY_MS);
    }

    /// Parse settings from JSON, filling missing fields with defaults and
    /// clamping out-of-range values.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: EditorSettings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Settings from host JSON. Malformed input logs a warning and yields
    /// the defaults.
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json_sanitized(json)
            .map_err(Error::from)
            .unwrap_or_warn_default(Self::default(), "Invalid editor settings")
    }

    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.settle_delay_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
