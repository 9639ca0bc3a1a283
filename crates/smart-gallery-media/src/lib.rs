//! Media processing for Smart Gallery
//!
//! This crate holds the CPU-bound stages of the ingestion pipeline:
//! - **exif**: reading the embedded metadata block (via `kamadak-exif`) into
//!   [`CaptureMetadata`](smart_gallery_core::CaptureMetadata)
//! - **thumbnail**: fixed-width, aspect-preserving JPEG thumbnails
//!
//! Neither stage performs I/O; both operate on an in-memory byte buffer.

pub mod error;
pub mod exif;
pub mod thumbnail;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

// Re-exports for convenience
pub use error::{MediaError, MediaResult};
pub use crate::exif::{MetadataExtractor, TagNameTable};
pub use thumbnail::{ThumbnailConfig, ThumbnailGenerator, ThumbnailImage};

/// Guess the MIME type of an encoded image from its leading bytes
pub fn guess_content_type(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data).ok().map(|format| format.to_mime_type())
}
