//! Capture metadata extracted from an image
//!
//! Every field is an explicit optional. The record-level string forms
//! (`*_display` / `Display`) keep the sentinels the gallery has always stored:
//! an empty string for camera and time, `unknown` for the resolution and `-`
//! for aperture and ISO.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GalleryError, Result};

/// Sentinel stored when the pixel dimensions could not be read
pub const UNKNOWN_RESOLUTION: &str = "unknown";

/// Sentinel stored when aperture or sensitivity are absent
pub const MISSING_VALUE: &str = "-";

/// Format of the shooting time as stored on the asset record
pub const SHOOTING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether both dimensions are non-zero
    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (width, height) = trimmed
            .split_once('x')
            .ok_or_else(|| GalleryError::InvalidResolution(s.to_string()))?;

        let width = width
            .trim()
            .parse::<u32>()
            .map_err(|_| GalleryError::InvalidResolution(s.to_string()))?;
        let height = height
            .trim()
            .parse::<u32>()
            .map_err(|_| GalleryError::InvalidResolution(s.to_string()))?;

        Ok(Self { width, height })
    }
}

/// Aperture as an f-number
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aperture(f64);

impl Aperture {
    /// Build from the rational stored in the metadata block
    ///
    /// Returns `None` when the denominator is zero.
    pub fn from_rational(numerator: u32, denominator: u32) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        Some(Self(f64::from(numerator) / f64::from(denominator)))
    }

    pub fn f_number(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Aperture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f/{:.1}", self.0)
    }
}

/// Structured capture metadata of one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Device model name, NUL padding already removed
    pub camera_model: Option<String>,

    /// Original capture time as recorded by the device (no timezone)
    pub shooting_time: Option<NaiveDateTime>,

    /// Pixel dimensions read from the image header
    pub resolution: Option<Resolution>,

    /// Aperture f-number
    pub aperture: Option<Aperture>,

    /// Sensitivity (ISO)
    pub iso: Option<u32>,
}

impl CaptureMetadata {
    /// Whether no field carries a value
    pub fn is_empty(&self) -> bool {
        self.camera_model.is_none()
            && self.shooting_time.is_none()
            && self.resolution.is_none()
            && self.aperture.is_none()
            && self.iso.is_none()
    }

    pub fn camera_model_display(&self) -> String {
        self.camera_model.clone().unwrap_or_default()
    }

    pub fn shooting_time_display(&self) -> String {
        self.shooting_time
            .map(|t| t.format(SHOOTING_TIME_FORMAT).to_string())
            .unwrap_or_default()
    }

    pub fn resolution_display(&self) -> String {
        self.resolution
            .map(|r| r.to_string())
            .unwrap_or_else(|| UNKNOWN_RESOLUTION.to_string())
    }

    pub fn aperture_display(&self) -> String {
        self.aperture
            .map(|a| a.to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_string())
    }

    pub fn iso_display(&self) -> String {
        self.iso
            .map(|iso| iso.to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_string())
    }
}
