//! Core error types for routinely-core.
//!
//! This module defines the error hierarchy using thiserror. Session errors
//! are local and recoverable: a failed operation leaves the session exactly
//! as it was before the call.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for routinely-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Routine session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog errors (templates, day categories, locations)
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Errors raised by a routine session or its coordinator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Cursor is past the end of the queue
    #[error("No current habit: the routine has no step at the cursor")]
    NoCurrentHabit,

    /// `go_to` called with an index outside the queue
    #[error("Index {index} out of range for queue of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The session was already finished
    #[error("Session already finalized")]
    AlreadyFinalized,

    /// No session has been started
    #[error("No active routine session")]
    NoActiveSession,

    /// A template nests conditional habits deeper than allowed
    #[error("Conditional habit '{habit_id}' is nested {depth} levels deep (max {max})")]
    BranchTooDeep {
        habit_id: String,
        depth: usize,
        max: usize,
    },

    /// The answer names an option the conditional habit does not have
    #[error("Habit '{habit_id}' has no option '{option_id}'")]
    UnknownOption { habit_id: String, option_id: String },

    /// An answer was given for a habit that asks no question
    #[error("Habit '{habit_id}' is not a conditional habit")]
    NotConditional { habit_id: String },
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Catalog lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No template with the given id or name
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    /// Two catalog entries share an id
    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
