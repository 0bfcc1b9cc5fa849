//! Error types for docdex.

use thiserror::Error;

/// Result type alias using docdex's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for docdex operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(uuid::Uuid),

    /// Blob store transport failure (unreachable store, partial read)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Extraction engine failure (malformed input, engine crash, unreadable content)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// No extraction path exists for the file's mime class
    #[error("Unsupported format for extraction: {0}")]
    UnsupportedFormat(String),

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
