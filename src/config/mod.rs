//! Configuration module for taskpad
//!
//! Editor preferences handed over by the host as JSON. Nothing is read from
//! or written to disk.

mod settings;

pub use settings::*;
