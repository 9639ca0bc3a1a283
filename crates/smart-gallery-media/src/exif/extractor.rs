//! Capture metadata extraction

use ::exif::{Exif, Field, In, Reader, Value};
use chrono::NaiveDateTime;
use image::ImageReader;
use std::io::Cursor;
use tracing::{debug, instrument};

use smart_gallery_core::{Aperture, CaptureMetadata, Resolution};

use super::tag_names::TagNameTable;
use super::EXIF_HEADER;

/// Timestamp layout used by `DateTimeOriginal`
const EXIF_DATE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Sensitivity names, primary first
const SENSITIVITY_NAMES: [&str; 2] = ["ISOSpeedRatings", "ISOSpeed"];

/// Reads capture metadata from an encoded image
///
/// Extraction never fails: every field that cannot be read is left empty.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    tags: TagNameTable,
}

impl MetadataExtractor {
    /// Create an extractor over the given tag table
    pub fn new(tags: TagNameTable) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &TagNameTable {
        &self.tags
    }

    /// Extract everything available from `data`
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub fn extract(&self, data: &[u8]) -> CaptureMetadata {
        let mut metadata = CaptureMetadata {
            resolution: read_dimensions(data),
            ..Default::default()
        };

        let Some(exif) = read_exif(data) else {
            return metadata;
        };

        metadata.camera_model = self.camera_model(&exif);
        metadata.shooting_time = self.shooting_time(&exif);
        metadata.aperture = self.aperture(&exif);
        metadata.iso = self.sensitivity(&exif);

        debug!(?metadata, "Extracted capture metadata");
        metadata
    }

    fn field<'a>(&self, exif: &'a Exif, name: &str) -> Option<&'a Field> {
        let tag = self.tags.tag(name)?;
        exif.get_field(tag, In::PRIMARY)
    }

    fn camera_model(&self, exif: &Exif) -> Option<String> {
        self.field(exif, "Model")
            .and_then(first_ascii)
            .filter(|model| !model.is_empty())
    }

    fn shooting_time(&self, exif: &Exif) -> Option<NaiveDateTime> {
        let raw = self.field(exif, "DateTimeOriginal").and_then(first_ascii)?;

        match NaiveDateTime::parse_from_str(&raw, EXIF_DATE_TIME_FORMAT) {
            Ok(time) => Some(time),
            Err(err) => {
                debug!(raw = %raw, error = %err, "Unparseable DateTimeOriginal");
                None
            }
        }
    }

    fn aperture(&self, exif: &Exif) -> Option<Aperture> {
        match &self.field(exif, "FNumber")?.value {
            Value::Rational(values) => values
                .first()
                .and_then(|f| Aperture::from_rational(f.num, f.denom)),
            _ => None,
        }
    }

    fn sensitivity(&self, exif: &Exif) -> Option<u32> {
        SENSITIVITY_NAMES
            .iter()
            .find_map(|name| self.field(exif, name).and_then(|f| f.value.get_uint(0)))
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(TagNameTable::standard())
    }
}

/// Decode the metadata block
///
/// The container parser runs first. When it finds nothing, the buffer is
/// searched for an `Exif\0\0` signature and the TIFF data after it is decoded
/// directly.
fn read_exif(data: &[u8]) -> Option<Exif> {
    let reader = Reader::new();
    let err = match reader.read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => return Some(exif),
        Err(err) => err,
    };

    let Some(start) = data
        .windows(EXIF_HEADER.len())
        .position(|window| window == EXIF_HEADER)
    else {
        debug!(error = %err, "No embedded metadata block");
        return None;
    };

    match reader.read_raw(data[start + EXIF_HEADER.len()..].to_vec()) {
        Ok(exif) => Some(exif),
        Err(raw_err) => {
            debug!(error = %err, raw_error = %raw_err, "Failed to decode metadata block");
            None
        }
    }
}

/// First string of an ASCII field, NUL padding removed
fn first_ascii(field: &Field) -> Option<String> {
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|part| String::from_utf8_lossy(part).trim_end_matches('\0').to_string()),
        _ => None,
    }
}

/// Pixel dimensions from the image header only
fn read_dimensions(data: &[u8]) -> Option<Resolution> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok((width, height)) => Some(Resolution::new(width, height)),
        Err(err) => {
            debug!(error = %err, "Could not read image dimensions");
            None
        }
    }
}
