//! Repository trait abstractions for asset records
//!
//! This module defines the AssetRepository trait that abstracts persistence of
//! ingested asset records, plus an in-memory implementation.

use async_trait::async_trait;
use smart_gallery_core::{AssetId, IngestedAsset};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{StoreError, StoreResult};

/// Repository trait for asset record persistence
///
/// Implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Persist an asset record, replacing any record with the same ID
    ///
    /// # Returns
    /// * `Ok(IngestedAsset)` - The stored record
    /// * `Err(StoreError)` - For storage errors
    async fn save(&self, asset: IngestedAsset) -> StoreResult<IngestedAsset>;

    /// Find an asset by its unique ID
    ///
    /// # Returns
    /// * `Ok(Some(IngestedAsset))` - The asset if found
    /// * `Ok(None)` - If no asset with that ID exists
    async fn find_by_id(&self, id: &AssetId) -> StoreResult<Option<IngestedAsset>>;

    /// Delete an asset record by ID
    ///
    /// # Returns
    /// * `Err(StoreError::NotFound)` - If the asset doesn't exist
    async fn delete(&self, id: &AssetId) -> StoreResult<()>;
}

/// Asset repository held in process memory
#[derive(Debug, Default)]
pub struct InMemoryAssetRepository {
    assets: RwLock<HashMap<AssetId, IngestedAsset>>,
}

impl InMemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn count(&self) -> usize {
        self.assets.read().await.len()
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    #[instrument(skip(self, asset), fields(asset_id = %asset.id))]
    async fn save(&self, asset: IngestedAsset) -> StoreResult<IngestedAsset> {
        self.assets.write().await.insert(asset.id, asset.clone());
        debug!("Saved asset record");
        Ok(asset)
    }

    async fn find_by_id(&self, id: &AssetId) -> StoreResult<Option<IngestedAsset>> {
        Ok(self.assets.read().await.get(id).cloned())
    }

    #[instrument(skip(self), fields(asset_id = %id))]
    async fn delete(&self, id: &AssetId) -> StoreResult<()> {
        self.assets
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(file_name: &str) -> IngestedAsset {
        IngestedAsset::builder(file_name, format!("/minio/images/{}", file_name))
            .tags("sky,camera:X")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryAssetRepository::new();
        let asset = sample("a.jpg");

        let saved = repo.save(asset.clone()).await.unwrap();
        assert_eq!(saved, asset);

        let found = repo.find_by_id(&asset.id).await.unwrap();
        assert_eq!(found, Some(asset));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repo = InMemoryAssetRepository::new();
        assert!(repo.find_by_id(&AssetId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryAssetRepository::new();
        let asset = sample("b.png");
        repo.save(asset.clone()).await.unwrap();

        repo.delete(&asset.id).await.unwrap();
        assert_eq!(repo.count().await, 0);

        let err = repo.delete(&asset.id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
