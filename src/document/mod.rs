//! Structured document model
//!
//! This module defines the tree that the editor works on: blocks, text runs,
//! marks and links, together with its JSON form and the normalization pass
//! that keeps every document renderable.

mod json;
mod model;
mod normalize;

pub use model::{
    unix_line_endings, Align, Block, BlockKind, Document, HeadingLevel, LinkTarget, Mark, Marks,
    Node, Path, TextRun,
};
pub use normalize::normalize_text_block;
