//! Error types for quillnotes.

use thiserror::Error;

/// Result type alias using quillnotes' Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for quillnotes operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(uuid::Uuid),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Search operation failed
    #[error("Search error: {0}")]
    Search(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

/// Why a capability-gated operation did not produce a value.
///
/// Optional-enhancement paths (query parsing, embedding generation, chat
/// completion) never surface an [`Error`] to their callers. They return
/// [`Gated`] instead, and callers pattern-match on the reason to pick a
/// fallback strategy. `ConfigAbsent` is a steady state, not a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// No API credential was configured at startup. Permanent for the
    /// lifetime of the process.
    #[error("AI features are not configured")]
    ConfigAbsent,

    /// The provider call failed (network, quota, HTTP status).
    #[error("Provider call failed: {0}")]
    Provider(String),

    /// The provider responded but the payload could not be interpreted.
    #[error("Provider response could not be parsed: {0}")]
    Parse(String),
}

/// Result alias for capability-gated operations.
pub type Gated<T> = std::result::Result<T, Degradation>;
