//! Error types for Smart Gallery domain operations

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, GalleryError>;

/// Main error type for domain operations
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resolution string could not be parsed
    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for GalleryError {
    fn from(err: serde_json::Error) -> Self {
        GalleryError::Serialization(err.to_string())
    }
}
