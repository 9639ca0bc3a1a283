//! Embedded image metadata (EXIF)
//!
//! Decoding is done by `kamadak-exif`, which locates the TIFF-structured
//! block inside JPEG, PNG, HEIF, WebP or bare TIFF data. Fields are looked up
//! by name through an injected [`TagNameTable`].
//!
//! - [`tag_names`] maps tag names to `exif::Tag` values
//! - [`extractor`] turns the decoded fields into `CaptureMetadata`

pub mod extractor;
pub mod tag_names;

pub use extractor::MetadataExtractor;
pub use tag_names::TagNameTable;

/// Signature that precedes the TIFF header in JPEG APP1 segments
pub const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";
