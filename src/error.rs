// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for redirecthunter
//!
//! Per-target failures never escape a trace: the tracer turns them into the
//! result's `error` string. The variants here surface from construction,
//! configuration and the outer I/O layers.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for redirecthunter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error, reported before any tracing starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// Header could not be parsed or encoded
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Wordlist could not be read or was empty
    #[error("Wordlist {path:?}: {reason}")]
    Wordlist { path: PathBuf, reason: String },

    /// Operation was cancelled through the run's cancellation token
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a wordlist error
    pub fn wordlist(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Wordlist {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::InvalidHeader { .. } | Error::Wordlist { .. }
        )
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Check if the transport may retry after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Http(e) => !e.is_builder() && !e.is_redirect(),
            Error::Io(_) => true,
            _ => false,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            match err {
                Error::Config(inner) => Error::Config(format!("{}: {}", msg, inner)),
                other => Error::Other(format!("{}: {}", msg, other)),
            }
        })
    }
}
