//! End-to-end ingestion tests against a mocked vision API

mod common;

use common::{TestGallery, VISION_PATH};
use smart_gallery_core::{AssetId, RawImage};
use smart_gallery_media::fixtures::{jpeg_image, jpeg_with_exif, png_image, ExifBuilder};
use smart_gallery_service::{ChatVisionClient, IngestError, IngestionService, VisionConfig};
use smart_gallery_store::{
    AssetRepository, FileSystemObjectStore, JsonFileAssetRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn canon_photo() -> Vec<u8> {
    let tiff = ExifBuilder::little_endian()
        .model("Canon EOS R5")
        .date_time_original("2024:07:14 18:45:00")
        .f_number(28, 10)
        .iso_speed_ratings(400)
        .build();
    jpeg_with_exif(64, 48, &tiff)
}

#[tokio::test]
async fn test_ingest_photo_with_exif_and_vision_tags() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["Sun", "set，beach。"]).await;

    let asset = gallery
        .service
        .ingest(RawImage::new(canon_photo(), "IMG_0001.JPG"))
        .await
        .unwrap();

    assert_eq!(asset.file_name, "IMG_0001.JPG");
    assert_eq!(
        asset.tags,
        "Sunset,beach,camera:Canon EOS R5,time:evening,month:7,season:summer,\
         orientation:landscape,resolution:low"
    );
    assert_eq!(asset.camera_model, "Canon EOS R5");
    assert_eq!(asset.shooting_time, "2024-07-14 18:45:00");
    assert_eq!(asset.resolution, "64x48");
    assert_eq!(asset.aperture, "f/2.8");
    assert_eq!(asset.iso, "400");

    assert!(asset.url.starts_with("/minio/images/"));
    assert!(asset.url.ends_with(".jpg"));
    assert!(asset.thumbnail_url.starts_with("/minio/images/thumb-"));
    assert!(!asset.uses_original_as_thumbnail());

    // original and thumbnail
    assert_eq!(gallery.objects.len().await, 2);
    let thumb_name = asset.thumbnail_url.rsplit('/').next().unwrap();
    let thumb = gallery.objects.get("images", thumb_name).await.unwrap();
    assert_eq!(thumb.content_type, "image/jpeg");
    let decoded = image::load_from_memory(&thumb.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (400, 300));

    let saved = gallery.repository.find_by_id(&asset.id).await.unwrap();
    assert_eq!(saved, Some(asset));
}

#[tokio::test]
async fn test_vision_service_error_becomes_placeholder_tag() {
    let gallery = TestGallery::new().await;
    gallery.answer_with_status(500).await;

    let asset = gallery
        .service
        .ingest(RawImage::new(png_image(30, 60), "portrait.png"))
        .await
        .unwrap();

    assert_eq!(asset.tags, "ai-service-error,orientation:portrait,resolution:low");
    assert_eq!(asset.camera_model, "");
    assert_eq!(asset.shooting_time, "");
    assert_eq!(asset.resolution, "30x60");
    assert_eq!(asset.aperture, "-");
    assert_eq!(asset.iso, "-");
}

#[tokio::test]
async fn test_empty_answer_is_unrecognized() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["  ", "。"]).await;

    let asset = gallery
        .service
        .ingest(RawImage::new(png_image(8, 8), "square.png"))
        .await
        .unwrap();

    assert_eq!(asset.tags, "unrecognized,orientation:square,resolution:low");
}

#[tokio::test]
async fn test_undecodable_upload_reuses_original_as_thumbnail() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["document"]).await;

    let asset = gallery
        .service
        .ingest(RawImage::new(b"%PDF-1.7 not an image".to_vec(), "scan.pdf"))
        .await
        .unwrap();

    assert_eq!(asset.thumbnail_url, asset.url);
    assert!(asset.url.ends_with(".pdf"));
    assert_eq!(asset.tags, "document");
    assert_eq!(asset.resolution, "unknown");
    assert_eq!(gallery.objects.len().await, 1);
}

#[tokio::test]
async fn test_extreme_aspect_ratio_keeps_original_as_thumbnail() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["line"]).await;

    let asset = gallery
        .service
        .ingest(RawImage::new(png_image(1, 20_000), "strip.png"))
        .await
        .unwrap();

    assert_eq!(asset.thumbnail_url, asset.url);
    assert_eq!(asset.resolution, "1x20000");
    assert_eq!(asset.tags, "line,orientation:portrait,resolution:low");
    assert_eq!(gallery.objects.len().await, 1);
}

#[tokio::test]
async fn test_odd_file_name_extension_is_dropped() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["cup"]).await;

    let asset = gallery
        .service
        .ingest(RawImage::new(jpeg_image(12, 12), "photo.j\\pg"))
        .await
        .unwrap();

    assert_eq!(asset.file_name, "photo.j\\pg");
    let object_name = asset.url.rsplit('/').next().unwrap();
    assert!(!object_name.contains('.'));
    assert!(gallery.objects.contains("images", object_name).await);
}

#[tokio::test]
async fn test_empty_upload_is_rejected_without_side_effects() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["nothing"]).await;

    let err = gallery
        .service
        .ingest(RawImage::new(Vec::new(), "empty.jpg"))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::EmptyImage));
    assert!(gallery.objects.is_empty().await);
    assert_eq!(gallery.repository.count().await, 0);
    assert!(gallery.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_slow_vision_api_becomes_network_error_tag() {
    let gallery = TestGallery::with_timeout(Duration::from_millis(300)).await;
    gallery
        .answer_after(Duration::from_secs(3), &["too late"])
        .await;

    let asset = gallery
        .service
        .ingest(RawImage::new(jpeg_image(20, 10), "slow.jpg"))
        .await
        .unwrap();

    assert_eq!(asset.tags, "network-error,orientation:landscape,resolution:low");
    assert_eq!(gallery.objects.len().await, 2);
}

#[tokio::test]
async fn test_concurrent_ingests_are_independent() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["cat"]).await;

    let (a, b, c) = tokio::join!(
        gallery.service.ingest(RawImage::new(png_image(10, 10), "a.png")),
        gallery.service.ingest(RawImage::new(jpeg_image(10, 20), "b.jpg")),
        gallery.service.ingest(RawImage::new(canon_photo(), "c.jpg")),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_ne!(a.id, b.id);
    assert_ne!(b.id, c.id);
    assert_ne!(a.url, c.url);
    assert!(b.tags.starts_with("cat,orientation:portrait"));
    assert!(c.tags.contains("camera:Canon EOS R5"));

    assert_eq!(gallery.objects.len().await, 6);
    assert_eq!(gallery.repository.count().await, 3);
    assert_eq!(gallery.server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_remove_deletes_objects_and_record() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["tree"]).await;

    let asset = gallery
        .service
        .ingest(RawImage::new(png_image(16, 12), "tree.png"))
        .await
        .unwrap();
    assert_eq!(gallery.objects.len().await, 2);

    let removed = gallery.service.remove(&asset.id).await.unwrap();
    assert_eq!(removed.id, asset.id);
    assert!(gallery.objects.is_empty().await);
    assert_eq!(gallery.repository.count().await, 0);

    let err = gallery.service.remove(&asset.id).await.unwrap_err();
    assert!(matches!(err, IngestError::NotFound(_)));

    let err = gallery.service.remove(&AssetId::new()).await.unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_filesystem_stores_round_trip() {
    let gallery = TestGallery::new().await;
    gallery.answer_with(&["mountain"]).await;

    let dir = TempDir::new().unwrap();
    let objects = FileSystemObjectStore::new(dir.path().join("objects"));
    let repository = Arc::new(JsonFileAssetRepository::new(dir.path().join("catalog")));

    let config = VisionConfig::default()
        .with_endpoint(format!("{}{}", gallery.server.uri(), VISION_PATH))
        .with_timeout(Duration::from_secs(5));
    let vision = ChatVisionClient::new(config, "integration-key").unwrap();

    let service = IngestionService::new(Arc::new(vision), Arc::new(objects), repository.clone())
        .with_bucket("photos");

    let asset = service
        .ingest(RawImage::new(canon_photo(), "peak.jpeg"))
        .await
        .unwrap();

    assert!(asset.url.starts_with("/minio/photos/"));
    assert!(asset.url.ends_with(".jpeg"));
    assert!(asset.tags.starts_with("mountain,camera:Canon EOS R5"));

    let bucket_dir = dir.path().join("objects").join("photos");
    assert_eq!(std::fs::read_dir(&bucket_dir).unwrap().count(), 2);

    let record = dir.path().join("catalog").join(format!("{}.json", asset.id));
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&record).unwrap()).unwrap();
    assert_eq!(json["file_name"], "peak.jpeg");
    assert_eq!(json["iso"], "400");

    let loaded = repository.find_by_id(&asset.id).await.unwrap().unwrap();
    assert_eq!(loaded.tags, asset.tags);

    service.remove(&asset.id).await.unwrap();
    assert_eq!(std::fs::read_dir(&bucket_dir).unwrap().count(), 0);
    assert!(!record.exists());
}
