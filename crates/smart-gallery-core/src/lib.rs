//! Core domain models and types for Smart Gallery
//!
//! This crate contains the data structures and pure domain logic of the
//! ingestion pipeline: capture metadata, tag derivation and merging, storage
//! references and the final ingested asset record.

pub mod asset;
pub mod error;
pub mod metadata;
pub mod storage;
pub mod tags;
pub mod types;

// Re-exports for convenience
pub use asset::{IngestedAsset, IngestedAssetBuilder};
pub use error::{GalleryError, Result};
pub use metadata::{Aperture, CaptureMetadata, Resolution};
pub use storage::{object_name_from_path, StorageLocation};
pub use tags::{derive_tags, merge_tags, split_tags, Season, TagSet, TimeOfDay};
pub use types::{AssetId, RawImage};
