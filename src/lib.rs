//! taskpad - task description editing core
//!
//! Loads a task description stored as HTML, Markdown, structured JSON or
//! plain text into one structured document, edits it with live Markdown-style
//! shortcuts, and serializes it back to HTML on save. Time-report export
//! lives alongside.
//!
//! - `format`: detection and conversion of raw descriptions
//! - `document`: the structured document tree and its JSON form
//! - `editor`: editing commands, key handling and the save/cancel session
//! - `export`: time-report rows and renderers
//! - `config`: editor preferences supplied by the host

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod format;

pub use document::Document;
pub use editor::{DescriptionStore, DocumentEditor, EditorSession};
pub use error::{Error, Result};
pub use format::{document_to_html, load_description, DescriptionFormat};
