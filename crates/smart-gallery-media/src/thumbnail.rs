//! Thumbnail generation
//!
//! Thumbnails have a fixed width and a height that keeps the source aspect
//! ratio. The output is always JPEG, whatever the input format.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, instrument};

use crate::error::{MediaError, MediaResult};

/// Content type of every generated thumbnail
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// Default thumbnail width in pixels
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 400;

/// Default JPEG quality
pub const DEFAULT_THUMBNAIL_QUALITY: u8 = 80;

/// Default cap on thumbnail pixels (4096 x 4096)
pub const DEFAULT_MAX_THUMBNAIL_PIXELS: u64 = 16_777_216;

/// Thumbnail settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailConfig {
    /// Target width in pixels
    pub width: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
    /// Largest output accepted, in pixels
    pub max_pixels: u64,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_THUMBNAIL_WIDTH,
            quality: DEFAULT_THUMBNAIL_QUALITY,
            max_pixels: DEFAULT_MAX_THUMBNAIL_PIXELS,
        }
    }
}

impl ThumbnailConfig {
    /// Set the target width
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the JPEG quality
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Set the output pixel cap
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Height that keeps the aspect ratio of a `width` x `height` source
    pub fn target_height(&self, width: u32, height: u32) -> u32 {
        if width == 0 {
            return 1;
        }
        let scaled = (u64::from(height) * u64::from(self.width) + u64::from(width) / 2) / u64::from(width);
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    }
}

/// Encoded thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

impl ThumbnailImage {
    pub fn content_type(&self) -> &'static str {
        THUMBNAIL_CONTENT_TYPE
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Produces JPEG thumbnails from encoded images
#[derive(Debug, Clone, Default)]
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    /// Decode `data`, resize it to the configured width and encode as JPEG
    ///
    /// Smaller sources are scaled up. A target larger than the configured
    /// pixel cap is rejected before any resampling.
    #[instrument(skip(self, data), fields(len = data.len(), width = self.config.width))]
    pub fn generate(&self, data: &[u8]) -> MediaResult<ThumbnailImage> {
        if data.is_empty() {
            return Err(MediaError::EmptyInput);
        }

        let source = image::load_from_memory(data).map_err(|e| MediaError::Decode(e.to_string()))?;
        let width = self.config.width.max(1);
        let height = self.config.target_height(source.width(), source.height());

        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.config.max_pixels {
            return Err(MediaError::TooLarge {
                width,
                height,
                max_pixels: self.config.max_pixels,
            });
        }

        let resized = source.resize_exact(width, height, FilterType::Lanczos3);
        let bytes = self.encode_jpeg(&resized)?;

        debug!(width, height, size = bytes.len(), "Generated thumbnail");

        Ok(ThumbnailImage {
            bytes: Bytes::from(bytes),
            width,
            height,
        })
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> MediaResult<Vec<u8>> {
        let rgb = image.to_rgb8();
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.config.quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| MediaError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}
