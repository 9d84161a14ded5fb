//! Gemini REST API Client for Media Generation
//!
//! Provides REST API integration for:
//! - Image generation from a prompt (`generateContent`)
//! - Image editing with an inline source image (`generateContent`)
//! - Video generation from an image (`predictLongRunning` + operation polling)
//!
//! # Authentication
//!
//! Every request carries the API key in the `x-goog-api-key` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use skillswap_studio::{
    require_prompt, ImageConfig, MediaGenerator, MediaRef, StudioError, StudioResult, VideoConfig,
};

// =============================================================================
// Constants
// =============================================================================

/// Gemini REST API base URL
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model for prompt-to-image generation
const IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

/// Model for image editing
const EDIT_MODEL: &str = "gemini-2.5-flash-image";

/// Model for image-to-video generation
const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur in the Gemini REST client.
#[derive(Debug, Clone, Error)]
pub enum GeminiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// API returned error
    #[error("Gemini API error: {code} {status} - {message}")]
    ApiError {
        /// HTTP-style code
        code: i64,
        /// Status name, e.g. `INVALID_ARGUMENT`
        status: String,
        /// Human-readable message
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Response held no media
    #[error("No media in response: {0}")]
    NoMedia(String),

    /// WebSocket transport failure
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl From<GeminiError> for StudioError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Timeout => StudioError::Timeout("Gemini request timed out".to_string()),
            GeminiError::NoMedia(msg) => StudioError::NoMedia(msg),
            other => StudioError::Backend(other.to_string()),
        }
    }
}

// =============================================================================
// Gemini REST Client
// =============================================================================

/// Gemini REST API client for media generation.
pub struct GeminiRestClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: String,
    /// Base URL, overridable for tests and proxies
    base_url: String,
}

impl GeminiRestClient {
    /// Create a new client against the public endpoint.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// Point the client at another base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, GeminiError> {
        let response = timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            request.header("x-goog-api-key", &self.api_key).send(),
        )
        .await
        .map_err(|_| GeminiError::Timeout)?
        .map_err(|e| GeminiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GeminiError::ParseError(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }

        Ok(body)
    }

    async fn post_json(&self, url: &str, payload: &Value) -> Result<String, GeminiError> {
        self.send(self.client.post(url).json(payload)).await
    }

    /// Call `generateContent` and pull the first inline media part.
    async fn generate_content(&self, model: &str, payload: &Value) -> Result<MediaRef, GeminiError> {
        let url = self.model_url(model, "generateContent");
        let body = self.post_json(&url, payload).await?;
        let response: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::ParseError(e.to_string()))?;
        first_inline_media(&response)
    }

    // =========================================================================
    // Video API
    // =========================================================================

    async fn start_video(&self, payload: &Value) -> Result<Operation, GeminiError> {
        let url = self.model_url(VIDEO_MODEL, "predictLongRunning");
        let body = self.post_json(&url, payload).await?;
        serde_json::from_str(&body).map_err(|e| GeminiError::ParseError(e.to_string()))
    }

    async fn poll_operation(&self, name: &str) -> Result<Operation, GeminiError> {
        let url = format!("{}/{}", self.base_url, name);
        let body = self.send(self.client.get(&url)).await?;
        serde_json::from_str(&body).map_err(|e| GeminiError::ParseError(e.to_string()))
    }

    async fn download(&self, uri: &str) -> Result<MediaRef, GeminiError> {
        let response = self
            .client
            .get(uri)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| GeminiError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeminiError::RequestFailed(format!(
                "video download returned HTTP {}",
                response.status()
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("video/mp4")
            .to_string();
        let bytes = response.bytes().await.map_err(|e| GeminiError::RequestFailed(e.to_string()))?;

        Ok(MediaRef::new(mime_type, bytes.to_vec()))
    }
}

#[async_trait]
impl MediaGenerator for GeminiRestClient {
    async fn generate_image(&self, prompt: &str, config: &ImageConfig) -> StudioResult<MediaRef> {
        let prompt = require_prompt(prompt)?;
        info!(model = IMAGE_MODEL, aspect_ratio = %config.aspect_ratio, "Generating image");

        let media = self.generate_content(IMAGE_MODEL, &image_request(prompt, config)).await?;
        debug!(bytes = media.bytes.len(), "Image generated");
        Ok(media)
    }

    async fn edit_image(&self, image: &MediaRef, prompt: &str) -> StudioResult<MediaRef> {
        let prompt = require_prompt(prompt)?;
        info!(model = EDIT_MODEL, input_bytes = image.bytes.len(), "Editing image");

        let media = self.generate_content(EDIT_MODEL, &edit_request(image, prompt)).await?;
        Ok(media)
    }

    async fn generate_video(
        &self,
        image: &MediaRef,
        prompt: &str,
        config: &VideoConfig,
    ) -> StudioResult<MediaRef> {
        let prompt = require_prompt(prompt)?;
        info!(model = VIDEO_MODEL, resolution = %config.resolution, "Starting video generation");

        let mut operation = self.start_video(&video_request(image, prompt, config)).await?;
        let mut polls = 0;

        while !operation.done {
            if polls >= config.max_polls {
                warn!(operation = %operation.name, polls, "Video generation did not finish");
                return Err(StudioError::Timeout(format!(
                    "video operation {} still running after {} polls",
                    operation.name, polls
                )));
            }
            tokio::time::sleep(config.poll_interval).await;
            operation = self.poll_operation(&operation.name).await?;
            polls += 1;
            debug!(operation = %operation.name, polls, done = operation.done, "Polled video operation");
        }

        let uri = operation.video_uri()?;
        let video = self.download(&uri).await?;
        info!(bytes = video.bytes.len(), polls, "Video generated");
        Ok(video)
    }
}

// =============================================================================
// Request builders
// =============================================================================

fn image_request(prompt: &str, config: &ImageConfig) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"],
            "imageConfig": {
                "aspectRatio": config.aspect_ratio.as_str(),
                "imageSize": config.size.as_str(),
            },
        },
        "tools": [{ "googleSearch": {} }],
    })
}

fn edit_request(image: &MediaRef, prompt: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "inlineData": { "mimeType": image.mime_type, "data": image.to_base64() } },
                { "text": prompt },
            ],
        }],
    })
}

fn video_request(image: &MediaRef, prompt: &str, config: &VideoConfig) -> Value {
    json!({
        "instances": [{
            "prompt": prompt,
            "image": {
                "bytesBase64Encoded": image.to_base64(),
                "mimeType": image.mime_type,
            },
        }],
        "parameters": {
            "aspectRatio": config.aspect_ratio.as_str(),
            "resolution": config.resolution,
            "sampleCount": 1,
        },
    })
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// Error payload returned by the API and attached to failed operations.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Status code
    #[serde(default)]
    pub code: i64,
    /// Status name
    #[serde(default)]
    pub status: String,
    /// Message
    #[serde(default)]
    pub message: String,
}

fn parse_error_body(http_status: u16, body: &str) -> GeminiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => GeminiError::ApiError {
            code: envelope.error.code,
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => GeminiError::RequestFailed(format!("HTTP {}: {}", http_status, body)),
    }
}

/// Response of `generateContent`.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    /// Candidates, best first
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One generated candidate.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    /// Content parts
    pub content: Option<Content>,
}

/// Content of a candidate or a live model turn.
#[derive(Debug, Deserialize)]
pub struct Content {
    /// Text and media parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text part
    pub text: Option<String>,
    /// Inline media part
    pub inline_data: Option<InlineData>,
}

/// Base64 media embedded in a response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

fn first_inline_media(response: &GenerateContentResponse) -> Result<MediaRef, GeminiError> {
    let inline = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.iter().find_map(|p| p.inline_data.as_ref()))
        .ok_or_else(|| GeminiError::NoMedia("first candidate has no inline data".to_string()))?;

    MediaRef::from_base64(inline.mime_type.clone(), &inline.data)
        .map_err(|e| GeminiError::ParseError(e.to_string()))
}

/// Long-running operation.
#[derive(Debug, Deserialize)]
pub struct Operation {
    /// Resource name used for polling
    pub name: String,
    /// Set once the operation has finished
    #[serde(default)]
    pub done: bool,
    /// Result payload
    #[serde(default)]
    pub response: Option<Value>,
    /// Failure payload
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl Operation {
    /// Download URI of the first generated video.
    pub fn video_uri(&self) -> Result<String, GeminiError> {
        if let Some(err) = &self.error {
            return Err(GeminiError::ApiError {
                code: err.code,
                status: err.status.clone(),
                message: err.message.clone(),
            });
        }

        self.response
            .as_ref()
            .and_then(|r| r.pointer("/generateVideoResponse/generatedSamples/0/video/uri"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GeminiError::NoMedia(format!("operation {} has no video", self.name)))
    }
}

// =============================================================================
// Tests
// =============================================================================
