//! Error types for devterm.

use std::io;

/// Failure kinds of the virtual filesystem.
///
/// The payload is the path or name the operation was given, so the rendered
/// message points at the offending entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid name: '{0}'")]
    InvalidName(String),
}

/// Errors produced by the devterm shell and its services.
#[derive(Debug, thiserror::Error)]
pub enum DevtermError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("Invalid mode: {name}. Available: {available}")]
    InvalidMode { name: String, available: String },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Argument validation failure inside a handler; rendered verbatim.
    #[error("{0}")]
    Usage(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DevtermError {
    /// Shorthand for a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DevtermError>;
