//! Core type definitions

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use ulid::Ulid;

/// Asset identifier using ULID (Universally Unique Lexicographically Sortable Identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Ulid);

impl AssetId {
    /// Generate a new AssetId
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Create AssetId from a ULID
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Get the underlying ULID
    pub fn as_ulid(&self) -> &Ulid {
        &self.0
    }

    /// Parse from string
    pub fn from_string(s: &str) -> Result<Self, String> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| format!("Invalid AssetId: {}", e))
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetId::from_string(s)
    }
}

/// An uploaded image as received from the caller
///
/// The buffer is read once and shared read-only by every pipeline stage.
/// Cloning only bumps a reference count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    bytes: Bytes,
    file_name: String,
}

impl RawImage {
    /// Create a raw image from its bytes and the submitted file name
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
        }
    }

    /// The image bytes
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The file name the image was submitted with
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Lower-cased extension of the submitted file name, with the leading dot
    ///
    /// Returns an empty string when the name has no extension or the
    /// extension contains anything but ASCII letters and digits.
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_generation() {
        let id1 = AssetId::new();
        let id2 = AssetId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_asset_id_string_conversion() {
        let id = AssetId::new();
        let id_str = id.to_string();
        let parsed = AssetId::from_string(&id_str).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_asset_id_invalid() {
        assert!("not-a-ulid".parse::<AssetId>().is_err());
    }

    #[test]
    fn test_raw_image_extension() {
        assert_eq!(RawImage::new(vec![1u8], "holiday.JPG").extension(), ".jpg");
        assert_eq!(RawImage::new(vec![1u8], "scan.tar.png").extension(), ".png");
        assert_eq!(RawImage::new(vec![1u8], "noext").extension(), "");
    }

    #[test]
    fn test_raw_image_extension_drops_unsafe_characters() {
        assert_eq!(RawImage::new(vec![1u8], "photo.j\\pg").extension(), "");
        assert_eq!(RawImage::new(vec![1u8], "photo.jp g").extension(), "");
        assert_eq!(RawImage::new(vec![1u8], "photo.jpg?x=1").extension(), "");
        assert_eq!(RawImage::new(vec![1u8], "照片.图片").extension(), "");
        assert_eq!(RawImage::new(vec![1u8], "IMG_01.HEIC").extension(), ".heic");
    }

    #[test]
    fn test_raw_image_clone_shares_buffer() {
        let image = RawImage::new(vec![1u8, 2, 3], "a.jpg");
        let copy = image.clone();
        assert_eq!(image.bytes().as_ptr(), copy.bytes().as_ptr());
        assert_eq!(copy.len(), 3);
        assert!(!copy.is_empty());
    }
}
