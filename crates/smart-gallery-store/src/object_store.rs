//! Object store abstraction for image bytes
//!
//! An object store accepts named byte blobs per bucket and reports back the
//! public path of each stored object, `/<public_prefix>/<bucket>/<name>`.

use async_trait::async_trait;
use bytes::Bytes;
use smart_gallery_core::StorageLocation;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{StoreError, StoreResult};

/// Default first segment of reported object paths
pub const DEFAULT_PUBLIC_PREFIX: &str = "minio";

/// Stores and removes image objects
///
/// Implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `bucket/object_name`, replacing any existing object
    ///
    /// # Returns
    /// * `Ok(StorageLocation)` - Location whose `path` is the public reference
    /// * `Err(StoreError::InvalidObjectName)` - If the name is empty or unsafe
    async fn put(
        &self,
        bucket: &str,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<StorageLocation>;

    /// Remove `bucket/object_name`
    ///
    /// # Returns
    /// * `Err(StoreError::NotFound)` - If no such object exists
    async fn delete(&self, bucket: &str, object_name: &str) -> StoreResult<()>;
}

/// Reject empty names and names that would leave the bucket
pub fn validate_object_name(bucket: &str, object_name: &str) -> StoreResult<()> {
    for (kind, value) in [("bucket", bucket), ("object", object_name)] {
        if value.is_empty()
            || value == "."
            || value == ".."
            || value.contains('/')
            || value.contains('\\')
        {
            return Err(StoreError::InvalidObjectName(format!(
                "{} name '{}'",
                kind, value
            )));
        }
    }
    Ok(())
}

/// Public path of an object: `/<prefix>/<bucket>/<name>`
pub fn public_path(prefix: &str, bucket: &str, object_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("/{}/{}", bucket, object_name)
    } else {
        format!("/{}/{}/{}", prefix, bucket, object_name)
    }
}

/// One object held by [`InMemoryObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Object store that keeps everything in process memory
#[derive(Debug)]
pub struct InMemoryObjectStore {
    public_prefix: String,
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::with_public_prefix(DEFAULT_PUBLIC_PREFIX)
    }

    pub fn with_public_prefix(prefix: impl Into<String>) -> Self {
        Self {
            public_prefix: prefix.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch a stored object
    pub async fn get(&self, bucket: &str, object_name: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), object_name.to_string()))
            .cloned()
    }

    pub async fn contains(&self, bucket: &str, object_name: &str) -> bool {
        self.get(bucket, object_name).await.is_some()
    }

    /// Number of stored objects across all buckets
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Names of all objects in `bucket`, sorted
    pub async fn object_names(&self, bucket: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(
        &self,
        bucket: &str,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StoreResult<StorageLocation> {
        validate_object_name(bucket, object_name)?;

        let path = public_path(&self.public_prefix, bucket, object_name);
        self.objects.write().await.insert(
            (bucket.to_string(), object_name.to_string()),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        debug!(path = %path, "Stored object in memory");
        Ok(StorageLocation::new(bucket, object_name, path)?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, bucket: &str, object_name: &str) -> StoreResult<()> {
        validate_object_name(bucket, object_name)?;

        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), object_name.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", bucket, object_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_path() {
        assert_eq!(public_path("minio", "images", "a.jpg"), "/minio/images/a.jpg");
        assert_eq!(public_path("/cdn/", "images", "a.jpg"), "/cdn/images/a.jpg");
        assert_eq!(public_path("", "images", "a.jpg"), "/images/a.jpg");
    }

    #[test]
    fn test_validate_object_name() {
        assert!(validate_object_name("images", "a.jpg").is_ok());
        assert!(validate_object_name("", "a.jpg").is_err());
        assert!(validate_object_name("images", "").is_err());
        assert!(validate_object_name("images", "..").is_err());
        assert!(validate_object_name("images", "a/b.jpg").is_err());
        assert!(validate_object_name("images", "a\\b.jpg").is_err());
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryObjectStore::new();
        let location = store
            .put("images", "abc.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        assert_eq!(location.path, "/minio/images/abc.png");
        assert_eq!(location.object_name, "abc.png");

        let object = store.get("images", "abc.png").await.unwrap();
        assert_eq!(object.data, Bytes::from_static(b"png"));
        assert_eq!(object.content_type, "image/png");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let store = InMemoryObjectStore::with_public_prefix("cdn");
        store.put("b", "x", Bytes::from_static(b"1"), "a/b").await.unwrap();
        let location = store.put("b", "x", Bytes::from_static(b"2"), "a/b").await.unwrap();

        assert_eq!(location.path, "/cdn/b/x");
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("b", "x").await.unwrap().data, Bytes::from_static(b"2"));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryObjectStore::new();
        store.put("images", "a", Bytes::new(), "x/y").await.unwrap();
        store.put("images", "b", Bytes::new(), "x/y").await.unwrap();
        store.put("other", "a", Bytes::new(), "x/y").await.unwrap();

        store.delete("images", "a").await.unwrap();
        assert_eq!(store.object_names("images").await, vec!["b".to_string()]);
        assert!(store.contains("other", "a").await);

        let err = store.delete("images", "a").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_put_rejects_unsafe_name() {
        let store = InMemoryObjectStore::new();
        let err = store
            .put("images", "../escape", Bytes::new(), "x/y")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidObjectName(_)));
        assert!(store.is_empty().await);
    }
}
