//! Error types for the selector.
//!
//! `SelectorError` covers the conditions that abort a run. Per-candidate
//! conditions (missing repositories, rate limiting, flaky connections) never
//! surface here; they are carried by [`crate::types::RejectReason`] and
//! [`crate::retry::AttemptFailure`] and only ever reject a single candidate.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the selector library.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// Candidate table could not be read or holds no data.
    #[error("Malformed candidate table {}: {reason}", .path.display())]
    MalformedInput { path: PathBuf, reason: String },

    /// Input list does not exist.
    #[error("Input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Output directory could not be created.
    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Progress ledger could not be read or written.
    #[error("Progress ledger {} is unusable: {source}", .path.display())]
    Ledger {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The clone command could not be started.
    #[error("Failed to run git clone for {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for selector operations.
pub type Result<T> = std::result::Result<T, SelectorError>;
