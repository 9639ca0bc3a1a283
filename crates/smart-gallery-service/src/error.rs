//! Service-layer error types
//!
//! Only failures that abort an ingestion surface here. Degraded stages
//! (metadata, thumbnail, vision) fall back to defaults inside the pipeline.

use thiserror::Error;

/// Result type alias for service operations
pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Service-layer error types
#[derive(Error, Debug)]
pub enum IngestError {
    /// The submitted image buffer was empty
    #[error("Image is empty")]
    EmptyImage,

    /// The original image could not be stored
    #[error("Failed to upload original image: {0}")]
    OriginalUpload(String),

    /// The asset record could not be saved or removed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Internal service error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// Whether the caller's input caused the failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, IngestError::EmptyImage | IngestError::NotFound(_))
    }
}

impl From<smart_gallery_core::GalleryError> for IngestError {
    fn from(err: smart_gallery_core::GalleryError) -> Self {
        IngestError::Internal(err.to_string())
    }
}
