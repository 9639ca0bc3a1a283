//! Ingestion service
//!
//! This module provides the pipeline that turns one uploaded image into a
//! stored [`IngestedAsset`]: vision tagging, metadata extraction and
//! thumbnail generation run concurrently, then the objects are stored and the
//! record is saved.

use bytes::Bytes;
use smart_gallery_core::{
    derive_tags, merge_tags, object_name_from_path, split_tags, AssetId, CaptureMetadata,
    IngestedAsset, RawImage, StorageLocation,
};
use smart_gallery_media::{
    guess_content_type, MetadataExtractor, ThumbnailConfig, ThumbnailGenerator, ThumbnailImage,
};
use smart_gallery_store::{AssetRepository, ObjectStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{IngestError, IngestResult};
use crate::vision::VisionTagger;

/// Default bucket for originals and thumbnails
pub const DEFAULT_BUCKET: &str = "images";

/// Content type used when the original's format cannot be guessed
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Orchestrates the ingestion pipeline
pub struct IngestionService {
    vision: Arc<dyn VisionTagger>,
    objects: Arc<dyn ObjectStore>,
    repository: Arc<dyn AssetRepository>,
    extractor: Arc<MetadataExtractor>,
    thumbnails: Arc<ThumbnailGenerator>,
    bucket: String,
}

impl IngestionService {
    /// Create a service with the standard extractor and default thumbnails
    pub fn new(
        vision: Arc<dyn VisionTagger>,
        objects: Arc<dyn ObjectStore>,
        repository: Arc<dyn AssetRepository>,
    ) -> Self {
        Self {
            vision,
            objects,
            repository,
            extractor: Arc::new(MetadataExtractor::default()),
            thumbnails: Arc::new(ThumbnailGenerator::default()),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }

    /// Use a specific metadata extractor
    pub fn with_extractor(mut self, extractor: MetadataExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Use specific thumbnail settings
    pub fn with_thumbnail_config(mut self, config: ThumbnailConfig) -> Self {
        self.thumbnails = Arc::new(ThumbnailGenerator::new(config));
        self
    }

    /// Store objects in `bucket`
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Run the full pipeline for one image
    ///
    /// Metadata, thumbnail and vision failures degrade to defaults. Only an
    /// empty image, a failed original upload or a failed save abort.
    #[instrument(skip(self, image), fields(file_name = %image.file_name(), size = image.len()))]
    pub async fn ingest(&self, image: RawImage) -> IngestResult<IngestedAsset> {
        if image.is_empty() {
            return Err(IngestError::EmptyImage);
        }
        let data = image.bytes().clone();

        let (vision_tag, metadata, thumbnail) = tokio::join!(
            self.vision.describe(&data),
            self.extract_metadata(data.clone()),
            self.generate_thumbnail(data.clone()),
        );
        debug!(vision_tag = %vision_tag, "Analysis stages finished");

        let derived = derive_tags(&metadata);
        let tags = merge_tags("", split_tags(vision_tag.as_text()).chain(derived.iter()));

        let object_id = Uuid::new_v4();
        let original_name = format!("{}{}", object_id, image.extension());
        let thumbnail_name = format!("thumb-{}.jpg", object_id);

        let content_type = guess_content_type(&data).unwrap_or(FALLBACK_CONTENT_TYPE);
        let original = self
            .objects
            .put(&self.bucket, &original_name, data.clone(), content_type)
            .await
            .map_err(|e| IngestError::OriginalUpload(e.to_string()))?;
        info!(path = %original.path, "Stored original");

        let thumbnail_location = match thumbnail {
            Some(thumb) => self.store_thumbnail(&thumbnail_name, thumb).await,
            None => None,
        };
        let thumbnail_url = thumbnail_location
            .as_ref()
            .map(|location| location.path.clone())
            .unwrap_or_else(|| original.path.clone());

        let mut uploaded = vec![original.clone()];
        uploaded.extend(thumbnail_location);

        let asset = match IngestedAsset::builder(image.file_name(), original.path.clone())
            .thumbnail_url(thumbnail_url)
            .tags(tags)
            .metadata(metadata)
            .build()
        {
            Ok(asset) => asset,
            Err(err) => {
                self.discard_objects(&uploaded).await;
                return Err(err.into());
            }
        };

        match self.repository.save(asset).await {
            Ok(saved) => {
                info!(asset_id = %saved.id, tags = %saved.tags, "Ingested image");
                Ok(saved)
            }
            Err(err) => {
                warn!(error = %err, "Failed to save asset record");
                self.discard_objects(&uploaded).await;
                Err(IngestError::Persistence(err.to_string()))
            }
        }
    }

    /// Remove an asset's stored objects and its record
    ///
    /// Object deletion failures are logged; a missing record is an error.
    #[instrument(skip(self), fields(asset_id = %id))]
    pub async fn remove(&self, id: &AssetId) -> IngestResult<IngestedAsset> {
        let asset = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| IngestError::Persistence(e.to_string()))?
            .ok_or_else(|| IngestError::NotFound(id.to_string()))?;

        let mut paths = vec![asset.url.as_str()];
        if !asset.uses_original_as_thumbnail() {
            paths.push(asset.thumbnail_url.as_str());
        }

        for path in paths {
            let Some(object_name) = object_name_from_path(path) else {
                warn!(path, "Stored reference has no object name");
                continue;
            };
            if let Err(err) = self.objects.delete(&self.bucket, object_name).await {
                warn!(object_name, error = %err, "Failed to delete object");
            }
        }

        self.repository.delete(id).await.map_err(|e| {
            if e.is_not_found() {
                IngestError::NotFound(id.to_string())
            } else {
                IngestError::Persistence(e.to_string())
            }
        })?;

        info!("Removed asset");
        Ok(asset)
    }

    async fn extract_metadata(&self, data: Bytes) -> CaptureMetadata {
        let extractor = Arc::clone(&self.extractor);
        match tokio::task::spawn_blocking(move || extractor.extract(&data)).await {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(error = %err, "Metadata extraction task failed");
                CaptureMetadata::default()
            }
        }
    }

    async fn generate_thumbnail(&self, data: Bytes) -> Option<ThumbnailImage> {
        let thumbnails = Arc::clone(&self.thumbnails);
        match tokio::task::spawn_blocking(move || thumbnails.generate(&data)).await {
            Ok(Ok(thumbnail)) => Some(thumbnail),
            Ok(Err(err)) => {
                warn!(error = %err, "Thumbnail generation failed, using original");
                None
            }
            Err(err) => {
                warn!(error = %err, "Thumbnail task failed, using original");
                None
            }
        }
    }

    async fn store_thumbnail(&self, name: &str, thumbnail: ThumbnailImage) -> Option<StorageLocation> {
        let content_type = thumbnail.content_type();
        match self
            .objects
            .put(&self.bucket, name, thumbnail.bytes, content_type)
            .await
        {
            Ok(location) => Some(location),
            Err(err) => {
                warn!(error = %err, "Thumbnail upload failed, using original");
                None
            }
        }
    }

    async fn discard_objects(&self, locations: &[StorageLocation]) {
        for location in locations {
            if let Err(err) = self
                .objects
                .delete(&location.bucket, &location.object_name)
                .await
            {
                warn!(path = %location.path, error = %err, "Failed to discard uploaded object");
            }
        }
    }
}
