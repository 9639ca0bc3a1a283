//! Service layer for Smart Gallery
//!
//! This crate provides the ingestion pipeline that sits between the media
//! stages and the storage layer.
//!
//! # Architecture
//!
//! - **IngestionService**: runs vision tagging, metadata extraction and
//!   thumbnail generation concurrently, stores the objects and saves the
//!   asset record; also removes assets again
//! - **VisionTagger**: the vision model seam, implemented by
//!   [`ChatVisionClient`] (streaming chat-completions API) and
//!   [`DisabledVisionTagger`]
//!
//! # Example
//!
//! ```rust,no_run
//! use smart_gallery_core::RawImage;
//! use smart_gallery_service::{build_vision_tagger, IngestionService, VisionConfig};
//! use smart_gallery_store::{InMemoryAssetRepository, InMemoryObjectStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let vision = build_vision_tagger(&VisionConfig::default().with_api_key("key"))?;
//! let service = IngestionService::new(
//!     vision,
//!     Arc::new(InMemoryObjectStore::new()),
//!     Arc::new(InMemoryAssetRepository::new()),
//! );
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! let asset = service.ingest(RawImage::new(bytes, "photo.jpg")).await?;
//! println!("{}", asset.tags);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ingestion;
pub mod vision;

// Re-export main types for convenience
pub use error::{IngestError, IngestResult};
pub use ingestion::{IngestionService, DEFAULT_BUCKET};
pub use vision::{
    build_vision_tagger, clean_response_text, delta_stream, parse_sse_line, ChatVisionClient,
    DisabledVisionTagger, SseEvent, VisionConfig, VisionTag, VisionTagger,
};
