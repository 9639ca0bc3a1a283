//! Vision tagging client
//!
//! Sends the image to a chat-completions style vision model and asks for a
//! single descriptive keyword. The model answers as a server-sent event
//! stream; the deltas are concatenated, cleaned and returned as a
//! [`VisionTag`]. Every failure maps to a placeholder tag, never to an error.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestError, IngestResult};

/// Default chat-completions endpoint
pub const DEFAULT_VISION_ENDPOINT: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";

/// Default vision model
pub const DEFAULT_VISION_MODEL: &str = "glm-4v-flash";

/// Default instruction sent with the image
pub const DEFAULT_VISION_PROMPT: &str = "Analyze this picture and extract the single keyword that best \
describes its content (for example: landscape). Reply with the keyword only, without any explanation.";

/// Default bound on one vision call
pub const DEFAULT_VISION_TIMEOUT: Duration = Duration::from_secs(60);

/// Wrapper markers some models put around their answer
const BOX_MARKERS: [&str; 2] = ["<|begin_of_box|>", "<|end_of_box|>"];

/// Outcome of one vision call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionTag {
    /// Cleaned model answer
    Recognized(String),
    /// The model answered with nothing usable
    Unrecognized,
    /// The request could not be built
    RequestFailed,
    /// Connection failure, transport error or timeout
    NetworkError,
    /// The API answered with a non-success status
    ServiceError { status: u16 },
}

impl VisionTag {
    /// Text stored as the AI tag
    pub fn as_text(&self) -> &str {
        match self {
            VisionTag::Recognized(text) => text,
            VisionTag::Unrecognized => "unrecognized",
            VisionTag::RequestFailed => "ai-request-failed",
            VisionTag::NetworkError => "network-error",
            VisionTag::ServiceError { .. } => "ai-service-error",
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, VisionTag::Recognized(_))
    }
}

impl fmt::Display for VisionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

/// Produces a descriptive tag for an image
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisionTagger: Send + Sync {
    /// Describe the encoded image; failures become placeholder tags
    async fn describe(&self, image: &[u8]) -> VisionTag;
}

/// Vision client settings
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub enabled: bool,
    pub endpoint: String,
    /// Bearer token; no token disables the client
    pub api_key: Option<String>,
    pub model: String,
    pub prompt: String,
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_VISION_MODEL.to_string(),
            prompt: DEFAULT_VISION_PROMPT.to_string(),
            timeout: DEFAULT_VISION_TIMEOUT,
        }
    }
}

impl VisionConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API key, if the client is enabled and a non-blank key is configured
    pub fn active_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| self.enabled && !key.is_empty())
    }
}

/// Build the tagger the configuration asks for
///
/// Without an active API key this is a [`DisabledVisionTagger`].
pub fn build_vision_tagger(config: &VisionConfig) -> IngestResult<Arc<dyn VisionTagger>> {
    match config.active_api_key() {
        Some(key) => {
            let key = key.to_string();
            Ok(Arc::new(ChatVisionClient::new(config.clone(), key)?))
        }
        None => {
            info!("Vision tagging disabled: no API key configured");
            Ok(Arc::new(DisabledVisionTagger))
        }
    }
}

/// Tagger used when no vision API is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledVisionTagger;

#[async_trait]
impl VisionTagger for DisabledVisionTagger {
    async fn describe(&self, _image: &[u8]) -> VisionTag {
        debug!("Vision tagging disabled");
        VisionTag::Unrecognized
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    #[serde(default)]
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// One meaningful server-sent event line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Content delta of the first choice
    Delta(String),
    /// `data: [DONE]`
    Done,
}

/// Interpret one line of the event stream
///
/// Blank lines, `:` comments, non-data fields and malformed payloads yield
/// `None`.
pub fn parse_sse_line(line: &str) -> Option<SseEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return Some(SseEvent::Done);
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .map(SseEvent::Delta),
        Err(err) => {
            debug!(error = %err, "Skipping malformed stream frame");
            None
        }
    }
}

/// Lazy stream of content deltas read line by line from a response body
///
/// Ends at `[DONE]`, at end of body, or at the first transport error.
pub fn delta_stream<S, E>(body: S) -> impl Stream<Item = String>
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    let reader = StreamReader::new(
        body.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err)),
    );

    stream::unfold(Some(reader.lines()), |state| async move {
        let mut lines = state?;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_sse_line(&line) {
                    Some(SseEvent::Delta(text)) => return Some((text, Some(lines))),
                    Some(SseEvent::Done) => return None,
                    None => continue,
                },
                Ok(None) => return None,
                Err(err) => {
                    warn!(error = %err, "Vision stream interrupted");
                    return None;
                }
            }
        }
    })
}

/// Clean the concatenated model answer
pub fn clean_response_text(raw: &str) -> String {
    let mut text = raw.trim().replace('。', "").replace('，', ",");
    for marker in BOX_MARKERS {
        text = text.replace(marker, "");
    }
    text.trim().to_string()
}

/// Streaming chat-completions vision client
#[derive(Debug, Clone)]
pub struct ChatVisionClient {
    client: reqwest::Client,
    config: VisionConfig,
    api_key: String,
}

impl ChatVisionClient {
    /// Create a client with its own HTTP connection pool
    pub fn new(config: VisionConfig, api_key: impl Into<String>) -> IngestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IngestError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    fn data_url(image: &[u8]) -> String {
        let mime = smart_gallery_media::guess_content_type(image).unwrap_or("image/jpeg");
        format!("data:{};base64,{}", mime, BASE64.encode(image))
    }

    async fn request_tag(&self, image: &[u8]) -> VisionTag {
        let request = ChatRequest {
            model: &self.config.model,
            stream: true,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: Self::data_url(image),
                        },
                    },
                    ContentPart::Text {
                        text: &self.config.prompt,
                    },
                ],
            }],
        };

        let response = match self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if err.is_builder() => {
                warn!(error = %err, "Failed to build vision request");
                return VisionTag::RequestFailed;
            }
            Err(err) => {
                warn!(error = %err, "Vision API unreachable");
                return VisionTag::NetworkError;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Vision API returned an error");
            return VisionTag::ServiceError {
                status: status.as_u16(),
            };
        }

        let raw: String = delta_stream(Box::pin(response.bytes_stream()))
            .collect::<Vec<_>>()
            .await
            .concat();

        let text = clean_response_text(&raw);
        if text.is_empty() {
            VisionTag::Unrecognized
        } else {
            info!(tag = %text, "Vision model recognized image");
            VisionTag::Recognized(text)
        }
    }
}

#[async_trait]
impl VisionTagger for ChatVisionClient {
    #[instrument(skip(self, image), fields(size = image.len(), model = %self.config.model))]
    async fn describe(&self, image: &[u8]) -> VisionTag {
        match tokio::time::timeout(self.config.timeout, self.request_tag(image)).await {
            Ok(tag) => tag,
            Err(_) => {
                warn!(timeout = ?self.config.timeout, "Vision call timed out");
                VisionTag::NetworkError
            }
        }
    }
}
