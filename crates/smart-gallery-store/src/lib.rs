//! Storage layer for Smart Gallery
//!
//! This crate provides the two external collaborators of the ingestion
//! pipeline:
//! - [`ObjectStore`]: stores original and thumbnail bytes and reports their
//!   public paths
//! - [`AssetRepository`]: persists the final asset records
//!
//! Each comes with an in-memory implementation for tests and embedding, and a
//! filesystem-backed one for the command-line tool.
//!
//! # Example
//!
//! ```rust,no_run
//! use smart_gallery_store::{FileSystemObjectStore, JsonFileAssetRepository};
//!
//! let objects = FileSystemObjectStore::new("/var/lib/gallery/objects").public_prefix("minio");
//! let records = JsonFileAssetRepository::new("/var/lib/gallery/catalog");
//! ```

pub mod error;
pub mod filesystem;
pub mod json_file;
pub mod object_store;
pub mod repository;

// Re-exports for convenience
pub use error::{StoreError, StoreResult};
pub use filesystem::FileSystemObjectStore;
pub use json_file::JsonFileAssetRepository;
pub use object_store::{
    public_path, validate_object_name, InMemoryObjectStore, ObjectStore, StoredObject,
    DEFAULT_PUBLIC_PREFIX,
};
pub use repository::{AssetRepository, InMemoryAssetRepository};
