//! In-memory test images and metadata blocks
//!
//! Available to this crate's tests and, through the `test-support` feature,
//! to downstream test suites.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use crate::exif::EXIF_HEADER;

fn gradient(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(image)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .expect("in-memory encode cannot fail");
    buffer.into_inner()
}

/// PNG image of the given size without metadata
pub fn png_image(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

/// JPEG image of the given size without metadata
pub fn jpeg_image(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

/// JPEG image carrying `tiff` in an APP1 segment directly after SOI
pub fn jpeg_with_exif(width: u32, height: u32, tiff: &[u8]) -> Vec<u8> {
    let jpeg = jpeg_image(width, height);
    let segment_len = u16::try_from(2 + EXIF_HEADER.len() + tiff.len()).expect("APP1 segment too large");

    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// PNG image carrying `tiff` in an `eXIf` chunk after IHDR
pub fn png_with_exif(width: u32, height: u32, tiff: &[u8]) -> Vec<u8> {
    let png = png_image(width, height);
    // signature (8) + IHDR chunk (4 + 4 + 13 + 4)
    let after_ihdr = 8 + 25;

    let mut chunk = Vec::with_capacity(tiff.len() + 12);
    chunk.extend_from_slice(&(tiff.len() as u32).to_be_bytes());
    chunk.extend_from_slice(b"eXIf");
    chunk.extend_from_slice(tiff);
    let crc = crc32(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    let mut out = Vec::with_capacity(png.len() + chunk.len());
    out.extend_from_slice(&png[..after_ihdr]);
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[after_ihdr..]);
    out
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

struct RawEntry {
    tag: u16,
    type_code: u16,
    count: u32,
    data: Vec<u8>,
}

/// Builder for TIFF-structured metadata blocks
///
/// IFD0 holds `Model` first, then `ExifIfdPointer` when any capture field is
/// set. The sub-directory follows IFD0 directly; out-of-line values follow
/// the sub-directory.
pub struct ExifBuilder {
    big_endian: bool,
    model: Option<String>,
    date_time_original: Option<String>,
    f_number: Option<(u32, u32)>,
    iso_speed_ratings: Option<u16>,
    iso_speed: Option<u32>,
}

impl ExifBuilder {
    fn new(big_endian: bool) -> Self {
        Self {
            big_endian,
            model: None,
            date_time_original: None,
            f_number: None,
            iso_speed_ratings: None,
            iso_speed: None,
        }
    }

    pub fn little_endian() -> Self {
        Self::new(false)
    }

    pub fn big_endian() -> Self {
        Self::new(true)
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// `YYYY:MM:DD HH:MM:SS`
    pub fn date_time_original(mut self, value: &str) -> Self {
        self.date_time_original = Some(value.to_string());
        self
    }

    pub fn f_number(mut self, numerator: u32, denominator: u32) -> Self {
        self.f_number = Some((numerator, denominator));
        self
    }

    pub fn iso_speed_ratings(mut self, iso: u16) -> Self {
        self.iso_speed_ratings = Some(iso);
        self
    }

    pub fn iso_speed(mut self, iso: u32) -> Self {
        self.iso_speed = Some(iso);
        self
    }

    fn u16_bytes(&self, v: u16) -> [u8; 2] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn u32_bytes(&self, v: u32) -> [u8; 4] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn ascii(tag: u16, text: &str) -> RawEntry {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        RawEntry {
            tag,
            type_code: 2,
            count: data.len() as u32,
            data,
        }
    }

    fn exif_entries(&self) -> Vec<RawEntry> {
        let mut entries = Vec::new();
        if let Some(dt) = &self.date_time_original {
            entries.push(Self::ascii(0x9003, dt));
        }
        if let Some((num, den)) = self.f_number {
            let mut data = self.u32_bytes(num).to_vec();
            data.extend_from_slice(&self.u32_bytes(den));
            entries.push(RawEntry {
                tag: 0x829D,
                type_code: 5,
                count: 1,
                data,
            });
        }
        if let Some(iso) = self.iso_speed_ratings {
            entries.push(RawEntry {
                tag: 0x8827,
                type_code: 3,
                count: 1,
                data: self.u16_bytes(iso).to_vec(),
            });
        }
        if let Some(iso) = self.iso_speed {
            entries.push(RawEntry {
                tag: 0x8833,
                type_code: 4,
                count: 1,
                data: self.u32_bytes(iso).to_vec(),
            });
        }
        entries
    }

    fn ifd_len(count: usize) -> usize {
        2 + count * 12 + 4
    }

    fn write_ifd(
        &self,
        out: &mut Vec<u8>,
        entries: &[RawEntry],
        data_offset: &mut usize,
        overflow: &mut Vec<u8>,
    ) {
        out.extend_from_slice(&self.u16_bytes(entries.len() as u16));
        for entry in entries {
            out.extend_from_slice(&self.u16_bytes(entry.tag));
            out.extend_from_slice(&self.u16_bytes(entry.type_code));
            out.extend_from_slice(&self.u32_bytes(entry.count));
            if entry.data.len() <= 4 {
                let mut inline = entry.data.clone();
                inline.resize(4, 0);
                out.extend_from_slice(&inline);
            } else {
                out.extend_from_slice(&self.u32_bytes(*data_offset as u32));
                overflow.extend_from_slice(&entry.data);
                *data_offset += entry.data.len();
            }
        }
        out.extend_from_slice(&self.u32_bytes(0));
    }

    /// Serialize the block
    pub fn build(self) -> Vec<u8> {
        let exif_entries = self.exif_entries();
        let has_pointer = !exif_entries.is_empty();

        let root_count = usize::from(self.model.is_some()) + usize::from(has_pointer);
        let exif_offset = 8 + Self::ifd_len(root_count);
        let exif_len = if exif_entries.is_empty() {
            0
        } else {
            Self::ifd_len(exif_entries.len())
        };
        let mut data_offset = exif_offset + exif_len;

        let mut root_entries = Vec::new();
        if let Some(model) = &self.model {
            root_entries.push(Self::ascii(0x0110, model));
        }
        if has_pointer {
                        root_entries.push(RawEntry {
                tag: 0x8769,
                type_code: 4,
                count: 1,
                data: self.u32_bytes(exif_offset as u32).to_vec(),
            });
        }

        let mut out = Vec::new();
        out.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        out.extend_from_slice(&self.u16_bytes(42));
        out.extend_from_slice(&self.u32_bytes(8));

        let mut overflow = Vec::new();
        self.write_ifd(&mut out, &root_entries, &mut data_offset, &mut overflow);
        if !exif_entries.is_empty() {
            self.write_ifd(&mut out, &exif_entries, &mut data_offset, &mut overflow);
        }

        out.extend_from_slice(&overflow);
        out
    }
}
