//! Editor session state
//!
//! One `EditorSession` per task. It owns the document being edited, the last
//! saved baseline, and the save/cancel lifecycle:
//!
//! - clean: the document matches the baseline
//! - dirty: edits since the baseline (any change bumps the editor version)
//! - saving: a save handed to the store and not yet finished
//!
//! A failed save leaves the document untouched and the session dirty. Cancel
//! replaces the whole document with the baseline. Settle delays after save
//! and cancel are modelled as deferred effects the host polls for.

use super::document_editor::DocumentEditor;
use super::input::{Key, KeyOutcome, PasteOutcome};
use super::pointer::{OutsideClickSubscription, PointerHub, Region};
use crate::config::{EditorSettings, OutsideClickPolicy};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::format::{document_to_html, load_description, DescriptionFormat};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Collaborators
// ─────────────────────────────────────────────────────────────────────────────

/// Remote storage for task descriptions.
pub trait DescriptionStore {
    /// Raw description as last saved, in whatever format it was written.
    fn fetch_description(&self, task_id: &str) -> Result<String>;

    /// Persist a description serialized as HTML.
    fn save_description(&self, task_id: &str, html: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Clean,
    Dirty,
    Saving,
}

/// A save handed out by `begin_save`, completed by `finish_save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub task_id: String,
    pub html: String,
    document: Document,
    version: u64,
}

/// Deferred work the host runs once its time has come.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Give up input focus after the on-screen keyboard has settled
    ReleaseFocus,
}

/// What processing pending outside clicks did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutsideClickOutcome {
    NoClick,
    /// The session was clean; nothing to do
    Clean,
    Cancelled,
    /// A discard confirmation is now pending
    ConfirmationRequested,
    Ignored,
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor Session
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EditorSession {
    task_id: String,
    format: DescriptionFormat,
    editor: DocumentEditor,
    /// Document as last saved (or as fetched)
    baseline: Document,
    /// Editor version that matches the baseline
    saved_version: u64,
    saving: bool,
    last_error: Option<Error>,
    pending_discard: bool,
    settings: EditorSettings,
    outside_clicks: Option<OutsideClickSubscription>,
    effects: Vec<(Instant, SessionEffect)>,
}

impl EditorSession {
    /// Fetch the task's description and open a clean session on it.
    pub fn open(store: &dyn DescriptionStore, task_id: &str, settings: EditorSettings) -> Result<Self> {
        let raw = store.fetch_description(task_id)?;
        Ok(Self::from_raw(task_id, &raw, settings))
    }

    /// Open a clean session on an already fetched raw description.
    pub fn from_raw(task_id: &str, raw: &str, settings: EditorSettings) -> Self {
        let loaded = load_description(raw, &settings.markdown);
        info!(
            "Opened editor session for task '{}' ({} description)",
            task_id,
            loaded.format.display_name()
        );
        let editor = DocumentEditor::new(loaded.document.clone());
        Self {
            task_id: task_id.to_string(),
            format: loaded.format,
            saved_version: editor.version(),
            editor,
            baseline: loaded.document,
            saving: false,
            last_error: None,
            pending_discard: false,
            settings,
            outside_clicks: None,
            effects: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Format the description was stored in when the session opened.
    pub fn format(&self) -> DescriptionFormat {
        self.format
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    pub fn baseline(&self) -> &Document {
        &self.baseline
    }

    pub fn editor(&self) -> &DocumentEditor {
        &self.editor
    }

    /// Direct access for commands; every change marks the session dirty.
    pub fn editor_mut(&mut self) -> &mut DocumentEditor {
        &mut self.editor
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn is_dirty(&self) -> bool {
        self.editor.version() != self.saved_version
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn state(&self) -> SessionState {
        if self.saving {
            SessionState::Saving
        } else if self.is_dirty() {
            SessionState::Dirty
        } else {
            SessionState::Clean
        }
    }

    /// The error of the last failed save, kept until the next save attempt.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn pending_discard(&self) -> bool {
        self.pending_discard
    }

    /// Current content serialized as it would be saved.
    pub fn to_html(&self) -> String {
        document_to_html(self.editor.document())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: Key) -> Result<KeyOutcome> {
        self.editor.handle_key(key, &self.settings)
    }

    pub fn type_text(&mut self, text: &str) -> Result<()> {
        self.editor.type_text(text, &self.settings)
    }

    pub fn paste(&mut self, text: &str) -> Result<PasteOutcome> {
        self.editor.paste_text(text, &self.settings)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize the document and mark a save in flight. A second save while
    /// one is pending is rejected.
    pub fn begin_save(&mut self) -> Result<SaveTicket> {
        if self.saving {
            return Err(Error::SaveInProgress);
        }
        let document = self.editor.document().clone();
        let ticket = SaveTicket {
            task_id: self.task_id.clone(),
            html: document_to_html(&document),
            document,
            version: self.editor.version(),
        };
        self.saving = true;
        self.last_error = None;
        debug!("Saving task '{}' at version {}", self.task_id, ticket.version);
        Ok(ticket)
    }

    /// Complete a save with the store's result.
    ///
    /// On success the ticket's document becomes the baseline; edits made
    /// while the save was in flight keep the session dirty. On failure the
    /// document is left exactly as it is and the error is returned and kept.
    pub fn finish_save(&mut self, ticket: SaveTicket, result: Result<()>, now: Instant) -> Result<()> {
        if !self.saving {
            return Err(Error::Application("no save in progress".to_string()));
        }
        self.saving = false;

        match result {
            Ok(()) => {
                self.baseline = ticket.document;
                self.saved_version = ticket.version;
                self.pending_discard = false;
                info!("Saved description for task '{}'", self.task_id);
                self.schedule(now, SessionEffect::ReleaseFocus);
                Ok(())
            }
            Err(err) => {
                let message = match err {
                    Error::Save { message, .. } => message,
                    other => other.to_string(),
                };
                warn!("Save failed for task '{}': {}", self.task_id, message);
                self.last_error = Some(Error::Save {
                    task_id: ticket.task_id.clone(),
                    message: message.clone(),
                });
                Err(Error::Save {
                    task_id: ticket.task_id,
                    message,
                })
            }
        }
    }

    /// Save through `store` and wait for the result.
    pub fn save(&mut self, store: &dyn DescriptionStore, now: Instant) -> Result<()> {
        let ticket = self.begin_save()?;
        let result = store.save_description(&ticket.task_id, &ticket.html);
        self.finish_save(ticket, result, now)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cancel and Discard
    // ─────────────────────────────────────────────────────────────────────────

    /// Throw away every edit and restore the baseline document. Rejected
    /// while a save is in flight.
    pub fn cancel(&mut self, now: Instant) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInProgress);
        }
        self.restore_baseline(now);
        Ok(())
    }

    fn restore_baseline(&mut self, now: Instant) {
        self.editor.replace_document(self.baseline.clone());
        self.saved_version = self.editor.version();
        self.pending_discard = false;
        debug!("Cancelled edits for task '{}'", self.task_id);
        self.schedule(now, SessionEffect::ReleaseFocus);
    }

    /// Accept a pending discard raised by an outside click.
    pub fn confirm_discard(&mut self, now: Instant) -> Result<bool> {
        if !self.pending_discard {
            return Ok(false);
        }
        self.cancel(now)?;
        Ok(true)
    }

    /// Keep editing after a discard prompt.
    pub fn dismiss_discard(&mut self) {
        self.pending_discard = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Outside Clicks
    // ─────────────────────────────────────────────────────────────────────────

    /// Subscribe to clicks outside the editor's region, replacing any
    /// previous subscription.
    pub fn attach_pointer(&mut self, hub: &PointerHub, region: Region) {
        self.outside_clicks = Some(hub.subscribe(region));
    }

    /// Release the outside-click subscription.
    pub fn detach_pointer(&mut self) {
        self.outside_clicks = None;
    }

    /// Follow the editor to a new on-screen region after a layout change.
    pub fn set_editor_region(&self, region: Region) {
        if let Some(subscription) = &self.outside_clicks {
            subscription.set_region(region);
        }
    }

    /// Apply the outside-click policy to clicks received since the last call.
    pub fn process_outside_clicks(&mut self, now: Instant) -> OutsideClickOutcome {
        let clicked = self
            .outside_clicks
            .as_ref()
            .is_some_and(|subscription| !subscription.drain().is_empty());
        if !clicked {
            return OutsideClickOutcome::NoClick;
        }
        if !self.is_dirty() || self.saving {
            return OutsideClickOutcome::Clean;
        }

        match self.settings.outside_click {
            OutsideClickPolicy::Cancel => {
                info!("Click outside discarded edits for task '{}'", self.task_id);
                self.restore_baseline(now);
                OutsideClickOutcome::Cancelled
            }
            OutsideClickPolicy::Confirm => {
                self.pending_discard = true;
                OutsideClickOutcome::ConfirmationRequested
            }
            OutsideClickPolicy::Ignore => OutsideClickOutcome::Ignored,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deferred Effects
    // ─────────────────────────────────────────────────────────────────────────

    fn schedule(&mut self, now: Instant, effect: SessionEffect) {
        let due = now + self.settings.settle_delay();
        self.effects.push((due, effect));
    }

    /// Time until the next deferred effect is due, if any is scheduled.
    pub fn next_effect_in(&self, now: Instant) -> Option<Duration> {
        self.effects
            .iter()
            .map(|(due, _)| due.saturating_duration_since(now))
            .min()
    }

    /// Remove and return the effects due at `now`, in scheduling order.
    pub fn take_due_effects(&mut self, now: Instant) -> Vec<SessionEffect> {
        let (due, pending): (Vec<_>, Vec<_>) = self
            .effects
            .drain(..)
            .partition(|(when, _)| *when <= now);
        self.effects = pending;
        due.into_iter().map(|(_, effect)| effect).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
