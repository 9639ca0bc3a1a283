//! Command-line configuration
//!
//! This module handles hierarchical configuration loading from multiple sources:
//! - Default configuration file
//! - Environment-specific configuration file
//! - Environment variables
//! - Command-line arguments (applied by the caller)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use smart_gallery_media::thumbnail::DEFAULT_MAX_THUMBNAIL_PIXELS;
use smart_gallery_media::ThumbnailConfig;
use smart_gallery_service::vision::{
    VisionConfig, DEFAULT_VISION_ENDPOINT, DEFAULT_VISION_MODEL, DEFAULT_VISION_PROMPT,
};
use smart_gallery_service::DEFAULT_BUCKET;
use smart_gallery_store::DEFAULT_PUBLIC_PREFIX;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "SMART_GALLERY";

/// Full configuration of the command-line tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Object storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Asset record settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Vision API settings
    #[serde(default)]
    pub vision: VisionSettings,

    /// Thumbnail settings
    #[serde(default)]
    pub thumbnail: ThumbnailSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory objects are written under
    #[serde(default = "default_storage_root")]
    pub root_dir: PathBuf,

    /// Bucket for originals and thumbnails
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// First segment of reported object paths
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data/objects")
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_public_prefix() -> String {
    DEFAULT_PUBLIC_PREFIX.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_storage_root(),
            bucket: default_bucket(),
            public_prefix: default_public_prefix(),
        }
    }
}

/// Asset record configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding one JSON file per asset
    #[serde(default = "default_catalog_dir")]
    pub dir: PathBuf,
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("data/catalog")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dir: default_catalog_dir(),
        }
    }
}

/// Vision API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionSettings {
    /// Call the vision API at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Chat-completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token; vision tagging is disabled without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Instruction sent with each image
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Bound on one vision call in seconds
    #[serde(default = "default_vision_timeout")]
    pub timeout_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_VISION_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_VISION_MODEL.to_string()
}

fn default_prompt() -> String {
    DEFAULT_VISION_PROMPT.to_string()
}

fn default_vision_timeout() -> u64 {
    60
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            prompt: default_prompt(),
            timeout_seconds: default_vision_timeout(),
        }
    }
}

impl VisionSettings {
    pub fn to_vision_config(&self) -> VisionConfig {
        VisionConfig {
            enabled: self.enabled,
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            prompt: self.prompt.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

/// Thumbnail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailSettings {
    /// Target width in pixels
    #[serde(default = "default_thumbnail_width")]
    pub width: u32,

    /// JPEG quality (1-100)
    #[serde(default = "default_thumbnail_quality")]
    pub quality: u8,

    /// Largest thumbnail accepted, in pixels; larger targets keep the original
    #[serde(default = "default_thumbnail_max_pixels")]
    pub max_pixels: u64,
}

fn default_thumbnail_width() -> u32 {
    400
}

fn default_thumbnail_quality() -> u8 {
    80
}

fn default_thumbnail_max_pixels() -> u64 {
    DEFAULT_MAX_THUMBNAIL_PIXELS
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            width: default_thumbnail_width(),
            quality: default_thumbnail_quality(),
            max_pixels: default_thumbnail_max_pixels(),
        }
    }
}

impl ThumbnailSettings {
    pub fn to_thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig::default()
            .with_width(self.width)
            .with_quality(self.quality)
            .with_max_pixels(self.max_pixels)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting
    #[serde(default)]
    pub json_format: bool,

    /// Include thread IDs
    #[serde(default)]
    pub include_thread_ids: bool,

    /// Include target module
    #[serde(default = "default_true")]
    pub include_target: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            include_thread_ids: false,
            include_target: true,
        }
    }
}

impl GalleryConfig {
    /// Load configuration from files and environment
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default configuration file (`<config_dir>/default.toml`)
    /// 2. Environment-specific file (`<config_dir>/<environment>.toml`)
    /// 3. Environment variables (`SMART_GALLERY_*`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed or fails validation
    pub fn load(config_dir: impl Into<PathBuf>, environment: &str) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();

        let config = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", environment))).required(false))
            // e.g. SMART_GALLERY_VISION__API_KEY=...
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the deserializer cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::Message("storage.bucket cannot be empty".to_string()));
        }
        if self.thumbnail.width == 0 {
            return Err(ConfigError::Message("thumbnail.width must be positive".to_string()));
        }
        if !(1..=100).contains(&self.thumbnail.quality) {
            return Err(ConfigError::Message(format!(
                "thumbnail.quality must be between 1 and 100, got {}",
                self.thumbnail.quality
            )));
        }
        if self.thumbnail.max_pixels == 0 {
            return Err(ConfigError::Message("thumbnail.max_pixels must be positive".to_string()));
        }
        if self.vision.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "vision.timeout_seconds must be positive".to_string(),
            ));
        }
        url::Url::parse(&self.vision.endpoint).map_err(|e| {
            ConfigError::Message(format!("Invalid vision.endpoint '{}': {}", self.vision.endpoint, e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GalleryConfig::default();
        assert_eq!(config.storage.bucket, "images");
        assert_eq!(config.storage.public_prefix, "minio");
        assert_eq!(config.thumbnail.width, 400);
        assert_eq!(config.thumbnail.quality, 80);
        assert_eq!(config.thumbnail.max_pixels, 16_777_216);
        assert_eq!(config.vision.timeout_seconds, 60);
        assert_eq!(config.vision.model, "glm-4v-flash");
        assert!(config.vision.api_key.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_layers_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
            [storage]
            bucket = "photos"

            [thumbnail]
            width = 320
            "#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("staging.toml"),
            r#"
            [thumbnail]
            quality = 90

            [vision]
            timeout_seconds = 15
            "#,
        )
        .unwrap();

        let config = GalleryConfig::load(dir.path(), "staging").unwrap();
        assert_eq!(config.storage.bucket, "photos");
        assert_eq!(config.thumbnail.width, 320);
        assert_eq!(config.thumbnail.quality, 90);
        assert_eq!(config.vision.timeout_seconds, 15);
        assert_eq!(config.catalog.dir, PathBuf::from("data/catalog"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[thumbnail]\nquality = 0\n",
        )
        .unwrap();

        assert!(GalleryConfig::load(dir.path(), "development").is_err());
    }

    #[test]
    fn test_validate_thumbnail_pixel_cap() {
        let mut config = GalleryConfig::default();
        config.thumbnail.max_pixels = 0;
        assert!(config.validate().is_err());

        config.thumbnail.max_pixels = 1_000_000;
        assert_eq!(config.thumbnail.to_thumbnail_config().max_pixels, 1_000_000);
    }

    #[test]
    fn test_validate_endpoint() {
        let mut config = GalleryConfig::default();
        config.vision.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversions() {
        let config = GalleryConfig::default();
        let vision = config.vision.to_vision_config();
        assert_eq!(vision.timeout, Duration::from_secs(60));
        assert!(vision.active_api_key().is_none());

        let thumbnail = config.thumbnail.to_thumbnail_config();
        assert_eq!(thumbnail, ThumbnailConfig::default());
    }
}
