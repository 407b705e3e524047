//! Markdown conversion using comrak
//!
//! Markdown is never converted to the structured document directly: it is
//! rendered to HTML and read back through the HTML deserializer, so both
//! paths share one tag table.

use super::from_html::html_to_document;
use crate::config::MarkdownSettings;
use crate::document::Document;
use comrak::{markdown_to_html as render_markdown, Options};
use log::debug;

impl MarkdownSettings {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;

        // Raw HTML inside Markdown is escaped rather than passed through.
        options.render.unsafe_ = false;

        options
    }
}

/// Render Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str, settings: &MarkdownSettings) -> String {
    render_markdown(markdown, &settings.to_comrak_options())
}

/// Convert Markdown to a structured document via HTML.
pub fn markdown_to_document(markdown: &str, settings: &MarkdownSettings) -> Document {
    let html = markdown_to_html(markdown, settings);
    debug!("Rendered {} bytes of Markdown to {} bytes of HTML", markdown.len(), html.len());
    html_to_document(&html)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
