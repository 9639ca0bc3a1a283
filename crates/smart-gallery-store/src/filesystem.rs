//! Filesystem-backed object store
//!
//! Objects are written to `<root>/<bucket>/<name>`. The reported path uses
//! the configured public prefix, not the filesystem location.

use async_trait::async_trait;
use bytes::Bytes;
use smart_gallery_core::StorageLocation;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::StoreResult;
use crate::object_store::{public_path, validate_object_name, ObjectStore, DEFAULT_PUBLIC_PREFIX};

/// Object store writing each object to its own file
#[derive(Debug, Clone)]
pub struct FileSystemObjectStore {
    root: PathBuf,
    public_prefix: String,
}

impl FileSystemObjectStore {
    /// Create a store rooted at `root`; directories are created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_string(),
        }
    }

    /// Set the first segment of reported paths
    pub fn public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of an object
    pub fn object_path(&self, bucket: &str, object_name: &str) -> PathBuf {
        self.root.join(bucket).join(object_name)
    }
}

#[async_trait]
impl ObjectStore for FileSystemObjectStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(
        &self,
        bucket: &str,
        object_name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StoreResult<StorageLocation> {
        validate_object_name(bucket, object_name)?;

        let bucket_dir = self.root.join(bucket);
        tokio::fs::create_dir_all(&bucket_dir).await?;

        let file = bucket_dir.join(object_name);
        tokio::fs::write(&file, &data).await?;
        debug!(file = %file.display(), "Wrote object");

        let path = public_path(&self.public_prefix, bucket, object_name);
        Ok(StorageLocation::new(bucket, object_name, path)?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, bucket: &str, object_name: &str) -> StoreResult<()> {
        validate_object_name(bucket, object_name)?;

        let file = self.object_path(bucket, object_name);
        tokio::fs::remove_file(&file).await?;
        debug!(file = %file.display(), "Removed object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = FileSystemObjectStore::new(dir.path());

        let location = store
            .put("images", "abc.jpg", Bytes::from_static(b"jpeg-bytes"), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(location.path, "/minio/images/abc.jpg");
        let written = std::fs::read(dir.path().join("images").join("abc.jpg")).unwrap();
        assert_eq!(written, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let dir = TempDir::new().unwrap();
        let store = FileSystemObjectStore::new(dir.path()).public_prefix("static");

        let location = store
            .put("thumbs", "t.jpg", Bytes::from_static(b"x"), "image/jpeg")
            .await
            .unwrap();
        assert_eq!(location.path, "/static/thumbs/t.jpg");
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileSystemObjectStore::new(dir.path());
        store
            .put("images", "gone.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();

        store.delete("images", "gone.png").await.unwrap();
        assert!(!store.object_path("images", "gone.png").exists());

        let err = store.delete("images", "gone.png").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = FileSystemObjectStore::new(dir.path());

        let err = store
            .put("..", "x.jpg", Bytes::from_static(b"x"), "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidObjectName(_)));
    }
}
