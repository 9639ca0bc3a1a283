//! Tag name to tag mapping

use ::exif::Tag;
use std::collections::HashMap;

/// Lookup table from tag name to `exif::Tag`
///
/// The table is built explicitly and handed to the extractor, so callers can
/// register vendor names without any process-wide state. A tag carries its
/// own directory context (`Tiff` for IFD0, `Exif` for the capture
/// sub-directory).
#[derive(Debug, Clone, Default)]
pub struct TagNameTable {
    tags: HashMap<String, Tag>,
}

impl TagNameTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard names used by the extractor
    pub fn standard() -> Self {
        Self::new()
            .with("Model", Tag::Model)
            .with("DateTimeOriginal", Tag::DateTimeOriginal)
            .with("FNumber", Tag::FNumber)
            .with("ISOSpeedRatings", Tag::PhotographicSensitivity)
            .with("PhotographicSensitivity", Tag::PhotographicSensitivity)
            .with("ISOSpeed", Tag::ISOSpeed)
    }

    /// Register a name, replacing any previous tag for it
    pub fn with(mut self, name: impl Into<String>, tag: Tag) -> Self {
        self.insert(name, tag);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, tag: Tag) {
        self.tags.insert(name.into(), tag);
    }

    /// Tag registered under `name`
    pub fn tag(&self, name: &str) -> Option<Tag> {
        self.tags.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
