//! Storage references for stored image objects
//!
//! The object store hands back a path for every object it accepts. The
//! pipeline keeps that path on the asset record and later derives the object
//! name back from it when the objects are removed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GalleryError, Result};

/// Location of one stored object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageLocation {
    /// Bucket the object lives in
    pub bucket: String,
    /// Object name inside the bucket
    pub object_name: String,
    /// Path reported by the store, used as the public reference
    pub path: String,
}

impl StorageLocation {
    /// Create a new storage location with validation
    ///
    /// # Errors
    /// Returns an error if any component is empty or the object name
    /// contains a path separator
    pub fn new(
        bucket: impl Into<String>,
        object_name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Self> {
        let location = Self {
            bucket: bucket.into(),
            object_name: object_name.into(),
            path: path.into(),
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(GalleryError::Validation(
                "Bucket name cannot be empty".to_string(),
            ));
        }
        if self.object_name.is_empty() {
            return Err(GalleryError::Validation(
                "Object name cannot be empty".to_string(),
            ));
        }
        if self.object_name.contains('/') {
            return Err(GalleryError::Validation(format!(
                "Object name must not contain '/': {}",
                self.object_name
            )));
        }
        if self.path.is_empty() {
            return Err(GalleryError::Validation(
                "Storage path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Object name encoded in a stored path (its last segment)
///
/// Returns `None` for an empty path or one ending in a separator.
pub fn object_name_from_path(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|name| !name.is_empty())
}
