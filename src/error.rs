//! Centralized error handling for taskpad
//!
//! This module provides a unified error type that covers all error scenarios
//! in the crate: malformed JSON payloads, description fetch/save
//! collaborators, editor addressing, and report export.

use log::warn;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Parse Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Settings or a structured document could not be parsed
    Parse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Collaborator Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The fetch collaborator could not supply a description
    Fetch { task_id: String, message: String },

    /// The save collaborator rejected or failed to persist a description
    Save { task_id: String, message: String },

    /// A save was requested while another one is still pending
    SaveInProgress,

    // ─────────────────────────────────────────────────────────────────────────
    // Editor and Export Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A caret or selection points outside the document
    InvalidLocation(String),

    /// Rendering a report failed
    Export(String),

    /// Generic application error with a message
    Application(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { message, .. } => write!(f, "Invalid JSON: {}", message),

            Error::Fetch { task_id, message } => {
                write!(f, "Failed to fetch description for task '{}': {}", task_id, message)
            }
            Error::Save { task_id, message } => {
                write!(f, "Failed to save description for task '{}': {}", task_id, message)
            }
            Error::SaveInProgress => write!(f, "A save is already in progress"),

            Error::InvalidLocation(msg) => write!(f, "Invalid editor location: {}", msg),
            Error::Export(msg) => write!(f, "Export failed: {}", msg),
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::Fetch { .. }
            | Error::Save { .. }
            | Error::SaveInProgress
            | Error::InvalidLocation(_)
            | Error::Export(_)
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
