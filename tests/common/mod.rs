//! Shared helpers for the ingestion integration tests

#![allow(dead_code)]

use serde_json::json;
use smart_gallery_service::{ChatVisionClient, IngestionService, VisionConfig};
use smart_gallery_store::{InMemoryAssetRepository, InMemoryObjectStore};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VISION_PATH: &str = "/api/paas/v4/chat/completions";

/// Event-stream body carrying one delta frame per entry
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::new();
    for delta in deltas {
        let frame = json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": delta}}]});
        body.push_str(&format!("data: {}\n\n", frame));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

/// Gallery wired to in-memory stores and a mocked vision API
pub struct TestGallery {
    pub server: MockServer,
    pub objects: Arc<InMemoryObjectStore>,
    pub repository: Arc<InMemoryAssetRepository>,
    pub service: IngestionService,
}

impl TestGallery {
    pub async fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5)).await
    }

    pub async fn with_timeout(timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let objects = Arc::new(InMemoryObjectStore::new());
        let repository = Arc::new(InMemoryAssetRepository::new());

        let config = VisionConfig::default()
            .with_endpoint(format!("{}{}", server.uri(), VISION_PATH))
            .with_api_key("integration-key")
            .with_timeout(timeout);
        let vision = ChatVisionClient::new(config, "integration-key").expect("vision client");

        let service = IngestionService::new(Arc::new(vision), objects.clone(), repository.clone());

        Self {
            server,
            objects,
            repository,
            service,
        }
    }

    /// Answer every vision request with the given deltas
    pub async fn answer_with(&self, deltas: &[&str]) {
        Mock::given(method("POST"))
            .and(path(VISION_PATH))
            .and(header("authorization", "Bearer integration-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse_body(deltas), "text/event-stream"),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer every vision request with a bare status code
    pub async fn answer_with_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(VISION_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer only after `delay`
    pub async fn answer_after(&self, delay: Duration, deltas: &[&str]) {
        Mock::given(method("POST"))
            .and(path(VISION_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(sse_body(deltas), "text/event-stream")
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }
}
