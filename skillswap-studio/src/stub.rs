//! Stub implementations for testing.
//!
//! These implementations simulate the generative backend without making
//! real API calls. Used when no API key is configured.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{StudioError, StudioResult};
use crate::ports::{
    require_prompt, AudioChunk, ImageConfig, LiveConfig, LiveOutput, LiveVoice, MediaGenerator,
    MediaRef, VideoConfig, OUTPUT_SAMPLE_RATE,
};
use crate::session::{LiveSession, SessionIo};

/// Smallest valid PNG: a single transparent pixel.
const PIXEL_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

// =============================================================================
// Stub Studio
// =============================================================================

/// Stub backend.
///
/// Images come back as a one-pixel PNG, videos as the prompt bytes tagged
/// `video/mp4`. Live sessions echo microphone audio back at the output rate.
#[derive(Default)]
pub struct StubStudio {
    requests: AtomicUsize,
    fail_next: AtomicBool,
}

impl StubStudio {
    /// Create a new stub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of generation requests served.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Configure the next generation request to fail.
    pub fn set_fail_next(&self, fail: bool) {
        self.fail_next.store(fail, Ordering::SeqCst);
    }

    fn begin(&self) -> StudioResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StudioError::Backend("simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaGenerator for StubStudio {
    async fn generate_image(&self, prompt: &str, config: &ImageConfig) -> StudioResult<MediaRef> {
        let prompt = require_prompt(prompt)?;
        self.begin()?;

        debug!(prompt, aspect_ratio = %config.aspect_ratio, size = config.size.as_str(), "Stub image");
        Ok(MediaRef::new("image/png", PIXEL_PNG.to_vec()))
    }

    async fn edit_image(&self, image: &MediaRef, prompt: &str) -> StudioResult<MediaRef> {
        let prompt = require_prompt(prompt)?;
        if image.bytes.is_empty() {
            return Err(StudioError::InvalidInput("image is empty".to_string()));
        }
        self.begin()?;

        debug!(prompt, input_bytes = image.bytes.len(), "Stub image edit");
        Ok(MediaRef::new("image/png", PIXEL_PNG.to_vec()))
    }

    async fn generate_video(
        &self,
        image: &MediaRef,
        prompt: &str,
        config: &VideoConfig,
    ) -> StudioResult<MediaRef> {
        let prompt = require_prompt(prompt)?;
        if image.bytes.is_empty() {
            return Err(StudioError::InvalidInput("image is empty".to_string()));
        }
        self.begin()?;

        debug!(prompt, resolution = %config.resolution, "Stub video");
        Ok(MediaRef::new("video/mp4", prompt.as_bytes().to_vec()))
    }
}

#[async_trait]
impl LiveVoice for StubStudio {
    async fn open_session(&self, config: &LiveConfig) -> StudioResult<LiveSession> {
        info!(voice = %config.voice, "Opening stub live session");
        Ok(LiveSession::spawn(echo))
    }
}

/// Echo each input chunk as output audio, then end the turn.
async fn echo(mut io: SessionIo) {
    loop {
        tokio::select! {
            chunk = io.input.recv() => {
                let Some(chunk) = chunk else {
                    return;
                };
                let reply = AudioChunk::new(OUTPUT_SAMPLE_RATE, chunk.samples);
                if io.output.send(LiveOutput::Audio(reply)).await.is_err() {
                    return;
                }
                if io.output.send(LiveOutput::TurnComplete).await.is_err() {
                    return;
                }
            }
            _ = io.cancel.cancelled() => {
                debug!("Stub live session cancelled");
                return;
            }
        }
    }
}
