//! Editor module for taskpad
//!
//! This module contains the structured document editor: caret and selection
//! addressing, formatting commands, live block shortcuts, key and paste
//! handling, click-outside subscriptions, and the per-task editor session.

mod commands;
mod document_editor;
mod input;
mod pointer;
mod session;
mod shortcuts;
mod spans;

pub use document_editor::{DocumentEditor, Point, Selection};
pub use input::{Key, KeyOutcome, PasteOutcome};
pub use pointer::{OutsideClick, OutsideClickSubscription, PointerHub, Region};
pub use session::{
    DescriptionStore, EditorSession, OutsideClickOutcome, SaveTicket, SessionEffect, SessionState,
};
pub use shortcuts::{match_shortcut, Shortcut, ShortcutMatch};
pub use spans::Span;
