//! Tag sets, metadata-derived tags and tag merging
//!
//! Tags are stored on the asset record as one comma-separated string. Inside
//! the pipeline they live in a [`TagSet`]: ordered, trimmed, non-empty and
//! free of exact duplicates, with the first occurrence winning.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::metadata::{CaptureMetadata, Resolution};

/// Separator used when rendering a tag set to its stored form
pub const TAG_SEPARATOR: char = ',';

/// Pixel count from which a resolution counts as high
const HIGH_RESOLUTION_PIXELS: u64 = 8_000_000;

/// Pixel count from which a resolution counts as medium
const MEDIUM_RESOLUTION_PIXELS: u64 = 2_000_000;

/// Ordered set of distinct, non-blank tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
    tags: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag
    ///
    /// The tag is trimmed first. Blank tags and tags already present are
    /// ignored. Returns whether the tag was added.
    pub fn push(&mut self, tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || self.seen.contains(tag) {
            return false;
        }
        self.seen.insert(tag.to_string());
        self.tags.push(tag.to_string());
        true
    }

    /// Append every tag of an iterator, in order
    pub fn extend<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.push(tag);
        }
    }

    /// Parse a stored comma-separated tag string
    pub fn parse(joined: &str) -> Self {
        split_tags(joined).collect()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.seen.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    /// Render to the stored comma-separated form
    pub fn join(&self) -> String {
        self.tags.join(&TAG_SEPARATOR.to_string())
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tags
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.tags
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

/// Split a stored tag string into its raw entries
///
/// Only the ASCII comma separates entries; other punctuation stays inside a
/// tag. Entries are not trimmed or filtered here; [`TagSet`] does that.
pub fn split_tags(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(TAG_SEPARATOR)
}

/// Merge additional tags into an existing comma-separated tag string
///
/// Existing tags come first in their original order, then the new ones.
/// The first occurrence of a tag wins and blank entries are dropped.
pub fn merge_tags<I, S>(existing: &str, extra: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut merged = TagSet::parse(existing);
    merged.extend(extra);
    merged.join()
}

/// Period of the day a photo was taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Dawn,
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket an hour of the day (0-23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=7 => TimeOfDay::Dawn,
            8..=10 => TimeOfDay::Morning,
            11..=12 => TimeOfDay::Midday,
            13..=17 => TimeOfDay::Afternoon,
            18..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Midday => "midday",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meteorological season, northern hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Bucket a month number (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn orientation(resolution: &Resolution) -> &'static str {
    use std::cmp::Ordering;

    match resolution.width.cmp(&resolution.height) {
        Ordering::Greater => "landscape",
        Ordering::Less => "portrait",
        Ordering::Equal => "square",
    }
}

fn resolution_class(resolution: &Resolution) -> &'static str {
    let pixels = resolution.pixels();
    if pixels >= HIGH_RESOLUTION_PIXELS {
        "high"
    } else if pixels >= MEDIUM_RESOLUTION_PIXELS {
        "medium"
    } else {
        "low"
    }
}

/// Derive searchable tags from capture metadata
///
/// Rules are applied in a fixed order (camera, time, resolution); a rule
/// whose input is missing contributes nothing.
pub fn derive_tags(metadata: &CaptureMetadata) -> TagSet {
    let mut tags = TagSet::new();

    if let Some(model) = metadata.camera_model.as_deref().map(str::trim) {
        if !model.is_empty() {
            tags.push(format!("camera:{}", model));
        }
    }

    if let Some(time) = metadata.shooting_time {
        tags.push(format!("time:{}", TimeOfDay::from_hour(time.hour())));
        tags.push(format!("month:{}", time.month()));
        tags.push(format!("season:{}", Season::from_month(time.month())));
    }

    if let Some(resolution) = metadata.resolution.filter(Resolution::is_usable) {
        tags.push(format!("orientation:{}", orientation(&resolution)));
        tags.push(format!("resolution:{}", resolution_class(&resolution)));
    }

    tags
}
