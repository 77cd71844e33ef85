//! Core error types for overseer-core.
//!
//! This module defines the error hierarchy using thiserror. Validation
//! violations are not errors: they are returned as data by
//! [`crate::validate::validate`] and only gate export.

use std::path::PathBuf;
use thiserror::Error;

use crate::validate::ValidationError;

/// Core error type for overseer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected model operations
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Structural decode failures
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Session snapshot failures
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Export gated by validation
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by policy model operations.
///
/// A rejected operation leaves the model unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Pin name collides (case-insensitively) with another pin in the same list
    #[error("A pin named '{name}' already exists in this list")]
    DuplicatePinName { name: String },

    /// Pin name is blank
    #[error("Pin name is required")]
    EmptyPinName,

    /// Position outside the collection
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    /// Account variant not permitted in the current mode
    #[error("{account} accounts are not available in {mode} mode")]
    AccountNotAllowed {
        account: &'static str,
        mode: &'static str,
    },

    /// Secondary tiles only belong on the Start list
    #[error("Browser site tiles cannot be pinned to the taskbar")]
    TileOnTaskbar,

    /// Entry flagged as a dependency, or a helper executable
    #[error("'{value}' cannot be used as the auto-launch application")]
    NotAutoLaunchCandidate { value: String },

    /// The application is already pinned to the target list
    #[error("'{value}' is already pinned")]
    AlreadyPinned { value: String },
}

/// Structural errors that reject a document outright.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The byte stream is not well-formed XML
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    /// Root element is not an assigned access configuration
    #[error("Unexpected root element '{found}', expected AssignedAccessConfiguration")]
    UnexpectedRoot { found: String },

    /// No root element at all
    #[error("Document is empty")]
    Empty,
}

/// Session snapshot errors. All of them are fatal.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Not valid JSON, or the payload does not match the model
    #[error("Invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// `schemaVersion` absent
    #[error("Snapshot has no schemaVersion")]
    MissingVersion,

    /// `schemaVersion` present but not understood
    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(String),

    /// Envelope present, payload absent
    #[error("Snapshot payload missing")]
    MissingPayload,
}

/// Export errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// Validation failed and no override was given
    #[error("Configuration has {} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not name a configuration field
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Configuration directory could not be determined or created
    #[error("Configuration directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
