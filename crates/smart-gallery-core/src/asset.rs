//! The ingested asset record
//!
//! An [`IngestedAsset`] is the terminal output of one ingestion: references to
//! the stored original and thumbnail, the capture metadata in its stored
//! string form and the merged tag string. It is built once and never mutated
//! by the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GalleryError, Result};
use crate::metadata::CaptureMetadata;
use crate::types::AssetId;

/// Final record of one ingested image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestedAsset {
    /// Unique identifier for this asset
    pub id: AssetId,

    /// File name the image was submitted with
    pub file_name: String,

    /// Reference to the stored original
    pub url: String,

    /// Reference to the stored thumbnail, or the original when no thumbnail
    /// could be produced or stored
    pub thumbnail_url: String,

    /// Merged, comma-separated tags
    pub tags: String,

    /// Camera model, empty when unknown
    pub camera_model: String,

    /// Capture time as `YYYY-MM-DD HH:MM:SS`, empty when unknown
    pub shooting_time: String,

    /// `WxH`, or `unknown`
    pub resolution: String,

    /// `f/x.y`, or `-`
    pub aperture: String,

    /// ISO value, or `-`
    pub iso: String,

    /// Timestamp when the asset was ingested
    pub created_at: DateTime<Utc>,
}

impl IngestedAsset {
    /// Create a builder for constructing an asset
    pub fn builder(file_name: impl Into<String>, url: impl Into<String>) -> IngestedAssetBuilder {
        IngestedAssetBuilder::new(file_name, url)
    }

    /// Validate the asset
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(GalleryError::Validation(
                "Original reference cannot be empty".to_string(),
            ));
        }
        if self.thumbnail_url.is_empty() {
            return Err(GalleryError::Validation(
                "Thumbnail reference cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the thumbnail reference points at the original
    pub fn uses_original_as_thumbnail(&self) -> bool {
        self.thumbnail_url == self.url
    }

    /// Iterate over the individual tags
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        crate::tags::split_tags(&self.tags)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl fmt::Display for IngestedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{}]", self.file_name, self.id, self.tags)
    }
}

/// Builder for IngestedAsset
pub struct IngestedAssetBuilder {
    id: Option<AssetId>,
    file_name: String,
    url: String,
    thumbnail_url: Option<String>,
    tags: String,
    metadata: CaptureMetadata,
    created_at: Option<DateTime<Utc>>,
}

impl IngestedAssetBuilder {
    /// Create a new builder
    pub fn new(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            file_name: file_name.into(),
            url: url.into(),
            thumbnail_url: None,
            tags: String::new(),
            metadata: CaptureMetadata::default(),
            created_at: None,
        }
    }

    /// Set a specific ID (useful for testing)
    pub fn id(mut self, id: AssetId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the thumbnail reference; defaults to the original reference
    pub fn thumbnail_url(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(thumbnail_url.into());
        self
    }

    /// Set the merged tag string
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Set the capture metadata
    pub fn metadata(mut self, metadata: CaptureMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the creation timestamp
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Build the asset with validation
    pub fn build(self) -> Result<IngestedAsset> {
        let thumbnail_url = self.thumbnail_url.unwrap_or_else(|| self.url.clone());

        let asset = IngestedAsset {
            id: self.id.unwrap_or_default(),
            file_name: self.file_name,
            url: self.url,
            thumbnail_url,
            tags: self.tags,
            camera_model: self.metadata.camera_model_display(),
            shooting_time: self.metadata.shooting_time_display(),
            resolution: self.metadata.resolution_display(),
            aperture: self.metadata.aperture_display(),
            iso: self.metadata.iso_display(),
            created_at: self.created_at.unwrap_or_else(Utc::now),
        };

        asset.validate()?;
        Ok(asset)
    }
}
