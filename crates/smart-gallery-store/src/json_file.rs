//! JSON-file asset repository
//!
//! Each record is one pretty-printed JSON document at `<dir>/<id>.json`.

use async_trait::async_trait;
use smart_gallery_core::{AssetId, IngestedAsset};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::{StoreError, StoreResult};
use crate::repository::AssetRepository;

/// Asset repository storing one JSON file per record
#[derive(Debug, Clone)]
pub struct JsonFileAssetRepository {
    dir: PathBuf,
}

impl JsonFileAssetRepository {
    /// Create a repository in `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &AssetId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

#[async_trait]
impl AssetRepository for JsonFileAssetRepository {
    #[instrument(skip(self, asset), fields(asset_id = %asset.id))]
    async fn save(&self, asset: IngestedAsset) -> StoreResult<IngestedAsset> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_vec_pretty(&asset)?;
        let path = self.record_path(&asset.id);
        tokio::fs::write(&path, json).await?;

        debug!(path = %path.display(), "Saved asset record");
        Ok(asset)
    }

    #[instrument(skip(self), fields(asset_id = %id))]
    async fn find_by_id(&self, id: &AssetId) -> StoreResult<Option<IngestedAsset>> {
        let bytes = match tokio::fs::read(self.record_path(id)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    #[instrument(skip(self), fields(asset_id = %id))]
    async fn delete(&self, id: &AssetId) -> StoreResult<()> {
        match tokio::fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
