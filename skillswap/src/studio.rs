//! AI studio commands: backend selection and file plumbing.

use std::path::Path;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use skillswap_connectors::{GeminiLiveClient, GeminiRestClient};
use skillswap_studio::{
    AudioChunk, LiveConfig, LiveOutput, LiveVoice, MediaGenerator, MediaRef, StubStudio,
    VideoConfig, INPUT_SAMPLE_RATE,
};

use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Samples per uploaded chunk, matching a 4096-frame capture buffer.
const LIVE_CHUNK_SAMPLES: usize = 4096;

/// How long to wait for the assistant before giving up on a reply.
const LIVE_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace period after a completed turn once all input has been sent.
const LIVE_SETTLE_TIMEOUT: Duration = Duration::from_millis(500);

/// The generative backends for this run.
pub struct StudioBackend {
    /// Image and video generation
    pub media: Box<dyn MediaGenerator>,
    /// Live voice
    pub voice: Box<dyn LiveVoice>,
}

impl StudioBackend {
    /// Gemini when a key is configured, otherwise the offline stub.
    pub fn from_config(config: &Config) -> Self {
        match (&config.gemini_api_key, config.use_gemini()) {
            (Some(key), true) => {
                info!("Using Gemini studio backend");
                Self {
                    media: Box::new(GeminiRestClient::new(key.clone())),
                    voice: Box::new(GeminiLiveClient::new(key.clone())),
                }
            },
            _ => {
                warn!("No Gemini API key configured; studio commands use the offline stub");
                Self::stub()
            },
        }
    }

    /// Offline backend.
    pub fn stub() -> Self {
        Self {
            media: Box::new(StubStudio::new()),
            voice: Box::new(StubStudio::new()),
        }
    }
}

/// MIME type guessed from a file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        _ => "image/png",
    }
}

/// Read a media file from disk.
pub async fn read_media(path: &Path) -> CliResult<MediaRef> {
    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(CliError::InvalidArgument(format!("{} is empty", path.display())));
    }
    Ok(MediaRef::new(mime_for(path), bytes))
}

/// Write media to disk.
pub async fn write_media(path: &Path, media: &MediaRef) -> CliResult<()> {
    tokio::fs::write(path, &media.bytes).await?;
    info!(path = %path.display(), mime_type = %media.mime_type, bytes = media.bytes.len(), "Wrote media");
    Ok(())
}

/// Animate an image file and write the video.
pub async fn animate(
    backend: &StudioBackend,
    input: &Path,
    prompt: &str,
    out: &Path,
) -> CliResult<MediaRef> {
    let image = read_media(input).await?;
    let video = backend.media.generate_video(&image, prompt, &VideoConfig::default()).await?;
    write_media(out, &video).await?;
    Ok(video)
}

/// Run one voice exchange from a PCM file and write the reply.
///
/// Returns the number of reply samples written. Ctrl-C ends the exchange
/// early and keeps whatever audio has arrived.
pub async fn converse(backend: &StudioBackend, input: &Path, out: &Path) -> CliResult<usize> {
    let bytes = tokio::fs::read(input).await?;
    let audio = AudioChunk::from_le_bytes(INPUT_SAMPLE_RATE, &bytes);
    if audio.samples.is_empty() {
        return Err(CliError::InvalidArgument(format!("{} holds no audio", input.display())));
    }

    let stop = CancellationToken::new();
    let ctrl_c = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let reply = exchange(backend.voice.as_ref(), audio, stop).await?;

    let reply_bytes = reply.to_le_bytes();
    tokio::fs::write(out, &reply_bytes).await?;
    info!(path = %out.display(), samples = reply.samples.len(), "Wrote live reply");
    Ok(reply.samples.len())
}

/// Stream `audio` into a new session and collect the assistant's speech.
pub async fn exchange(
    voice: &dyn LiveVoice,
    audio: AudioChunk,
    stop: CancellationToken,
) -> CliResult<AudioChunk> {
    let mut session = voice.open_session(&LiveConfig::default()).await?;
    let sender = session.audio_sender();

    let chunks: Vec<AudioChunk> = audio
        .samples
        .chunks(LIVE_CHUNK_SAMPLES)
        .map(|c| AudioChunk::new(audio.sample_rate, c.to_vec()))
        .collect();
    let feeder = tokio::spawn(async move {
        for chunk in chunks {
            if sender.send(chunk).await.is_err() {
                break;
            }
        }
    });

    let mut reply: Vec<i16> = Vec::new();
    let mut sample_rate = skillswap_studio::OUTPUT_SAMPLE_RATE;
    let mut turn_start = 0;
    let mut idle = LIVE_IDLE_TIMEOUT;

    loop {
        let output = tokio::select! {
            output = timeout(idle, session.next_output()) => output,
            _ = stop.cancelled() => {
                info!("Live exchange stopped by user");
                break;
            }
        };

        match output {
            Ok(Some(LiveOutput::Audio(chunk))) => {
                sample_rate = chunk.sample_rate;
                reply.extend(chunk.samples);
            },
            Ok(Some(LiveOutput::Interrupted)) => reply.truncate(turn_start),
            Ok(Some(LiveOutput::TurnComplete)) => {
                turn_start = reply.len();
                if feeder.is_finished() {
                    idle = LIVE_SETTLE_TIMEOUT;
                }
            },
            Ok(None) => break,
            Err(_) => break,
        }
    }

    feeder.abort();
    session.close().await;
    Ok(AudioChunk::new(sample_rate, reply))
}
