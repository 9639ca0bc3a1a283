//! Smart Gallery command-line tool
//!
//! Main entry point for ingesting images into the gallery and removing them
//! again. Objects are written to the filesystem object store and asset
//! records to the JSON-file catalog configured in `config/`.

mod config;
mod telemetry;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use smart_gallery_core::{AssetId, RawImage};
use smart_gallery_media::MetadataExtractor;
use smart_gallery_service::{build_vision_tagger, IngestionService};
use smart_gallery_store::{FileSystemObjectStore, JsonFileAssetRepository};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use config::GalleryConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long, env = "SMART_GALLERY_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development")]
    environment: String,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest image files and print each resulting asset as JSON
    Ingest {
        /// Image files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Remove an asset's stored objects and record
    Remove {
        /// Asset ID (ULID)
        asset_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = GalleryConfig::load(&args.config_dir, &args.environment)
        .with_context(|| format!("Failed to load configuration from {}", args.config_dir.display()))?;
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    telemetry::init_with_config(telemetry::TelemetryConfig::from(&config.logging));

    info!("Environment: {}", args.environment);
    info!("Object store: {}", config.storage.root_dir.display());
    info!("Catalog: {}", config.catalog.dir.display());
    info!(
        "Vision: {}",
        describe_vision(config.vision.enabled, config.vision.api_key.as_deref())
    );

    let service = build_service(&config)?;

    match args.command {
        Command::Ingest { files } => ingest_files(&service, &files).await,
        Command::Remove { asset_id } => {
            let id = AssetId::from_string(&asset_id).map_err(|e| anyhow!(e))?;
            let asset = service
                .remove(&id)
                .await
                .with_context(|| format!("Failed to remove asset {}", id))?;
            println!("{}", serde_json::to_string(&asset)?);
            Ok(())
        }
    }
}

/// Wire the pipeline from configuration
fn build_service(config: &GalleryConfig) -> Result<IngestionService> {
    let vision = build_vision_tagger(&config.vision.to_vision_config())
        .context("Failed to create vision client")?;

    let objects = FileSystemObjectStore::new(&config.storage.root_dir)
        .public_prefix(config.storage.public_prefix.clone());
    let repository = JsonFileAssetRepository::new(&config.catalog.dir);

    Ok(
        IngestionService::new(vision, Arc::new(objects), Arc::new(repository))
            .with_bucket(config.storage.bucket.clone())
            .with_extractor(MetadataExtractor::default())
            .with_thumbnail_config(config.thumbnail.to_thumbnail_config()),
    )
}

/// Ingest every file; keeps going after a failure and reports it at the end
async fn ingest_files(service: &IngestionService, files: &[PathBuf]) -> Result<()> {
    let mut failed = 0usize;

    for file in files {
        match ingest_file(service, file).await {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!(file = %file.display(), "{:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed to ingest", failed, files.len());
    }
    Ok(())
}

async fn ingest_file(service: &IngestionService, file: &Path) -> Result<String> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let asset = service.ingest(RawImage::new(bytes, file_name)).await?;
    Ok(serde_json::to_string(&asset)?)
}

/// Describe the vision setup for logging without revealing the key
fn describe_vision(enabled: bool, api_key: Option<&str>) -> String {
    match api_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(_) if !enabled => "disabled".to_string(),
        Some(key) => format!("enabled (key {})", mask_secret(key)),
        None => "disabled (no API key)".to_string(),
    }
}

/// Keep the first four characters of a secret
fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "***".to_string()
    } else {
        format!("{}***", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefgh"), "abcd***");
        assert_eq!(mask_secret("abc"), "***");
    }

    #[test]
    fn test_describe_vision() {
        assert_eq!(describe_vision(true, None), "disabled (no API key)");
        assert_eq!(describe_vision(true, Some("  ")), "disabled (no API key)");
        assert_eq!(describe_vision(false, Some("secret-key")), "disabled");
        assert_eq!(describe_vision(true, Some("secret-key")), "enabled (key secr***)");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["smart-gallery", "ingest", "a.jpg", "b.png"]).unwrap();
        match args.command {
            Command::Ingest { files } => assert_eq!(files.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Args::try_parse_from(["smart-gallery", "ingest"]).is_err());

        let args = Args::try_parse_from(["smart-gallery", "remove", "01ARZ3NDEKTSV4RRFFQ69G5FAV"]).unwrap();
        assert!(matches!(args.command, Command::Remove { .. }));
    }

    #[tokio::test]
    async fn test_ingest_file_with_filesystem_stores() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = GalleryConfig::default();
        config.storage.root_dir = dir.path().join("objects");
        config.catalog.dir = dir.path().join("catalog");

        let service = build_service(&config).unwrap();

        let input = dir.path().join("notes.txt");
        std::fs::write(&input, b"plain text, not an image").unwrap();

        let json = ingest_file(&service, &input).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["file_name"], "notes.txt");
        assert_eq!(value["tags"], "unrecognized");
        assert_eq!(value["thumbnail_url"], value["url"]);

        let stored = std::fs::read_dir(dir.path().join("objects").join("images")).unwrap().count();
        assert_eq!(stored, 1);
    }
}
