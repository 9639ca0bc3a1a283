//! Media processing error types

use thiserror::Error;

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors surfaced by the media stages
///
/// Metadata extraction never returns these; it degrades to empty fields.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Input buffer was empty
    #[error("Empty image buffer")]
    EmptyInput,

    /// Source image could not be decoded (unsupported or corrupt)
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Resized output would exceed the pixel cap
    #[error("Thumbnail of {width}x{height} exceeds {max_pixels} pixels")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    /// Output image could not be encoded
    #[error("Image encode error: {0}")]
    Encode(String),
}

impl MediaError {
    /// Whether the source image itself was unusable
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, MediaError::EmptyInput | MediaError::Decode(_))
    }
}
