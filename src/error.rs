//! Error types for blobpipe

use thiserror::Error;

/// Result type alias for blobpipe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blobpipe operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Event contains no records")]
    EmptyEvent,

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Transactional work panicked: {0}")]
    Fault(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn not_found(bucket: &str, key: &str) -> Self {
        Error::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    /// Whether this error means the blob does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
