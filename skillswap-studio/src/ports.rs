//! AI studio port definitions.
//!
//! Ports define what the marketplace may ask of a generative backend.
//! Adapters (Gemini, stub) implement them; nothing in the marketplace core
//! depends on these traits.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};
use crate::session::LiveSession;

/// Microphone sample rate expected by the live backend.
pub const INPUT_SAMPLE_RATE: u32 = 16_000;
/// Sample rate of audio produced by the live backend.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;

// =============================================================================
// Media Generation Port
// =============================================================================

/// Port for image and video generation.
///
/// Implementations:
/// - `StubStudio` - deterministic output for tests and offline use
/// - `GeminiRestClient` - Gemini REST API
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    /// Generate an image from a text prompt.
    async fn generate_image(&self, prompt: &str, config: &ImageConfig) -> StudioResult<MediaRef>;

    /// Edit an existing image following a text instruction.
    async fn edit_image(&self, image: &MediaRef, prompt: &str) -> StudioResult<MediaRef>;

    /// Animate an image into a short video.
    ///
    /// Generation is long-running; implementations poll until the backend
    /// reports completion or `config.max_polls` is exhausted.
    async fn generate_video(
        &self,
        image: &MediaRef,
        prompt: &str,
        config: &VideoConfig,
    ) -> StudioResult<MediaRef>;
}

/// Reject blank prompts before any backend call.
pub fn require_prompt(prompt: &str) -> StudioResult<&str> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(StudioError::InvalidInput("prompt must not be empty".to_string()));
    }
    Ok(trimmed)
}

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[default]
    Square,
    /// 16:9
    Landscape,
    /// 9:16
    Portrait,
    /// 21:9
    Ultrawide,
}

impl AspectRatio {
    /// Ratio as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Ultrawide => "21:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Landscape),
            "9:16" => Ok(AspectRatio::Portrait),
            "21:9" => Ok(AspectRatio::Ultrawide),
            other => Err(StudioError::InvalidInput(format!("unknown aspect ratio: {other}"))),
        }
    }
}

/// Output resolution class for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    /// 1K
    #[default]
    OneK,
    /// 2K
    TwoK,
    /// 4K
    FourK,
}

impl ImageSize {
    /// Size as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }
}

impl FromStr for ImageSize {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(ImageSize::OneK),
            "2K" => Ok(ImageSize::TwoK),
            "4K" => Ok(ImageSize::FourK),
            other => Err(StudioError::InvalidInput(format!("unknown image size: {other}"))),
        }
    }
}

/// Image generation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Resolution class
    pub size: ImageSize,
}

/// Video generation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConfig {
    /// Backend resolution label
    pub resolution: String,
    /// Aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Delay between operation polls
    pub poll_interval: Duration,
    /// Polls before giving up
    pub max_polls: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            resolution: "720p".to_string(),
            aspect_ratio: AspectRatio::Landscape,
            poll_interval: Duration::from_secs(5),
            max_polls: 120,
        }
    }
}

/// Generated or uploaded media held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

impl MediaRef {
    /// Wrap raw bytes.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Decode a base64 payload as returned by the backend.
    pub fn from_base64(mime_type: impl Into<String>, data: &str) -> StudioResult<Self> {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| StudioError::InvalidInput(format!("invalid base64 payload: {e}")))?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> StudioResult<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| StudioError::InvalidInput("not a data URL".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StudioError::InvalidInput("data URL has no payload".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| StudioError::InvalidInput("data URL is not base64".to_string()))?;

        Self::from_base64(mime_type, payload)
    }

    /// Base64 of the bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Render as a data URL, the form stored in `Listing::media_url` and avatars.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

// =============================================================================
// Live Voice Port
// =============================================================================

/// Port for real-time voice conversations.
#[async_trait]
pub trait LiveVoice: Send + Sync {
    /// Open a session; audio flows until `LiveSession::close`.
    async fn open_session(&self, config: &LiveConfig) -> StudioResult<LiveSession>;
}

/// Live session options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveConfig {
    /// Prebuilt voice name
    pub voice: String,
    /// Persona given to the assistant
    pub system_instruction: String,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            voice: "Zephyr".to_string(),
            system_instruction:
                "You are a helpful campus assistant. Keep responses concise and friendly."
                    .to_string(),
        }
    }
}

/// Mono 16-bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    /// Samples per second
    pub sample_rate: u32,
    /// Signed 16-bit samples
    pub samples: Vec<i16>,
}

impl AudioChunk {
    /// Wrap samples at the given rate.
    pub fn new(sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    /// Convert float samples in [-1, 1] to 16-bit PCM, clamping overshoot.
    pub fn from_f32(sample_rate: u32, input: &[f32]) -> Self {
        let samples = input
            .iter()
            .map(|s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect();
        Self::new(sample_rate, samples)
    }

    /// Little-endian byte encoding.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Decode little-endian bytes; a trailing odd byte is dropped.
    pub fn from_le_bytes(sample_rate: u32, bytes: &[u8]) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(sample_rate, samples)
    }

    /// MIME type announcing this chunk's rate.
    pub fn mime_type(&self) -> String {
        format!("audio/pcm;rate={}", self.sample_rate)
    }

    /// Playback length.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Something the assistant sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveOutput {
    /// Speech to play
    Audio(AudioChunk),
    /// User spoke over the assistant; drop queued playback
    Interrupted,
    /// Assistant finished its turn
    TurnComplete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let media = MediaRef::new("image/png", vec![0x89, b'P', b'N', b'G']);
        let url = media.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(MediaRef::from_data_url(&url).unwrap(), media);
    }

    #[test]
    fn test_data_url_rejects_plain_urls() {
        assert!(MediaRef::from_data_url("https://example.com/a.png").is_err());
        assert!(MediaRef::from_data_url("data:image/png,raw").is_err());
    }

    #[test]
    fn test_audio_chunk_pcm_encoding() {
        let chunk = AudioChunk::from_f32(INPUT_SAMPLE_RATE, &[0.0, 1.0, -1.0, 2.0]);
        assert_eq!(chunk.samples, vec![0, 32767, -32767, 32767]);

        let bytes = chunk.to_le_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(AudioChunk::from_le_bytes(INPUT_SAMPLE_RATE, &bytes), chunk);
        assert_eq!(chunk.mime_type(), "audio/pcm;rate=16000");
    }

    #[test]
    fn test_audio_duration() {
        let chunk = AudioChunk::new(OUTPUT_SAMPLE_RATE, vec![0; 12_000]);
        assert_eq!(chunk.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_config_parsing() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
        assert_eq!("2k".parse::<ImageSize>().unwrap(), ImageSize::TwoK);
        assert!("3:2".parse::<AspectRatio>().is_err());
        assert!(require_prompt("   ").is_err());
    }
}
