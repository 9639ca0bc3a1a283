//! Storage-specific error types and conversions

use thiserror::Error;

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by object stores and asset repositories
#[derive(Debug, Error)]
pub enum StoreError {
    /// Object or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filesystem or transport failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Bucket or object name is empty or would escape its bucket
    #[error("Invalid object name: {0}")]
    InvalidObjectName(String),

    /// Store-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(err.to_string()),
            _ => StoreError::Io(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<smart_gallery_core::GalleryError> for StoreError {
    fn from(err: smart_gallery_core::GalleryError) -> Self {
        StoreError::InvalidObjectName(err.to_string())
    }
}
