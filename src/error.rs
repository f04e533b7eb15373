//! Centralized error types for autoblog.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the autoblog library.
#[derive(Error, Debug)]
pub enum AutoblogError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Missing or invalid configuration (credentials, directories, server).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The secure connection or login to the mail server failed.
    #[error("Connection to '{server}' failed: {reason}")]
    Connection { server: String, reason: String },

    /// A mailbox command (select, search, fetch, store) failed.
    #[error("Mailbox {command} failed: {reason}")]
    Mailbox {
        command: &'static str,
        reason: String,
    },

    /// A MIME decoding error.
    #[error("MIME decoding error: {0}")]
    MimeError(String),

    /// The HTML body could not be converted to text.
    #[error("Text conversion failed: {0}")]
    Conversion(String),
}

/// Convenience alias for `Result<T, AutoblogError>`.
pub type Result<T> = std::result::Result<T, AutoblogError>;

impl AutoblogError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `Mailbox` variant for the named protocol command.
    pub fn mailbox(command: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Mailbox {
            command,
            reason: reason.to_string(),
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `AutoblogError::io`).
impl From<std::io::Error> for AutoblogError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
