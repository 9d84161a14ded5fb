//! Gemini Live WebSocket Client
//!
//! Connects to the bidirectional streaming endpoint for real-time voice.
//! Microphone audio goes up as base64 16 kHz PCM; the assistant answers
//! with base64 24 kHz PCM inside `serverContent` messages.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message as WebSocketMessage, WebSocketStream};
use tracing::{debug, error, info, warn};

use skillswap_studio::{
    AudioChunk, LiveConfig, LiveOutput, LiveSession, LiveVoice, SessionIo, StudioResult,
    OUTPUT_SAMPLE_RATE,
};

use crate::gemini_rest::{Content, GeminiError};

/// Type alias for the WebSocket stream (with auto TLS).
type WsStream = WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Gemini Live WebSocket URL (API key appended as `key`).
const GEMINI_LIVE_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Native-audio model
const LIVE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-12-2025";

/// Time allowed for the server to acknowledge setup.
const SETUP_TIMEOUT_SECS: u64 = 15;

// =============================================================================
// Protocol messages
// =============================================================================

/// First message on a new connection.
fn setup_message(config: &LiveConfig) -> Value {
    json!({
        "setup": {
            "model": format!("models/{LIVE_MODEL}"),
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": config.voice } },
                },
            },
            "systemInstruction": { "parts": [{ "text": config.system_instruction }] },
        }
    })
}

/// Realtime input carrying one chunk of microphone audio.
fn audio_message(chunk: &AudioChunk) -> Value {
    json!({
        "realtimeInput": {
            "mediaChunks": [{
                "mimeType": chunk.mime_type(),
                "data": STANDARD.encode(chunk.to_le_bytes()),
            }],
        }
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    setup_complete: Option<Value>,
    server_content: Option<ServerContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    model_turn: Option<Content>,
    #[serde(default)]
    interrupted: bool,
    #[serde(default)]
    turn_complete: bool,
}

/// What a server frame means for the session.
#[derive(Debug, PartialEq, Eq)]
enum ServerEvent {
    SetupComplete,
    Outputs(Vec<LiveOutput>),
}

/// Decode one server frame.
fn parse_server_message(text: &str) -> Result<ServerEvent, GeminiError> {
    let message: ServerMessage =
        serde_json::from_str(text).map_err(|e| GeminiError::ParseError(e.to_string()))?;

    if message.setup_complete.is_some() {
        return Ok(ServerEvent::SetupComplete);
    }

    let mut outputs = Vec::new();
    if let Some(content) = message.server_content {
        if content.interrupted {
            outputs.push(LiveOutput::Interrupted);
        }

        if let Some(turn) = content.model_turn {
            for inline in turn.parts.into_iter().filter_map(|p| p.inline_data) {
                let bytes = STANDARD
                    .decode(inline.data.trim())
                    .map_err(|e| GeminiError::ParseError(format!("invalid audio payload: {e}")))?;
                outputs.push(LiveOutput::Audio(AudioChunk::from_le_bytes(
                    OUTPUT_SAMPLE_RATE,
                    &bytes,
                )));
            }
        }

        if content.turn_complete {
            outputs.push(LiveOutput::TurnComplete);
        }
    }

    Ok(ServerEvent::Outputs(outputs))
}

/// Text payload of a frame; the server sends JSON as text or binary.
fn frame_text(msg: WebSocketMessage) -> Option<String> {
    match msg {
        WebSocketMessage::Text(text) => Some(text),
        WebSocketMessage::Binary(bytes) => String::from_utf8(bytes).ok(),
        _ => None,
    }
}

// =============================================================================
// Gemini Live Client
// =============================================================================

/// Gemini Live client.
pub struct GeminiLiveClient {
    api_key: String,
    url: String,
}

impl GeminiLiveClient {
    /// Create a new client against the public endpoint.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            url: GEMINI_LIVE_URL.to_string(),
        }
    }

    /// Point the client at another WebSocket URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Connect, send setup and wait for the acknowledgement.
    async fn connect(&self, config: &LiveConfig) -> Result<WsStream, GeminiError> {
        let url = format!("{}?key={}", self.url, self.api_key);
        info!(url = %self.url, model = LIVE_MODEL, "Connecting to Gemini Live");

        let (mut ws_stream, _) =
            connect_async(&url).await.map_err(|e| GeminiError::WebSocket(e.to_string()))?;

        ws_stream
            .send(WebSocketMessage::Text(setup_message(config).to_string()))
            .await
            .map_err(|e| GeminiError::WebSocket(e.to_string()))?;

        timeout(Duration::from_secs(SETUP_TIMEOUT_SECS), async {
            while let Some(frame) = ws_stream.next().await {
                let frame = frame.map_err(|e| GeminiError::WebSocket(e.to_string()))?;
                if let WebSocketMessage::Close(reason) = &frame {
                    return Err(GeminiError::WebSocket(format!("closed during setup: {reason:?}")));
                }
                let Some(text) = frame_text(frame) else {
                    continue;
                };
                if parse_server_message(&text)? == ServerEvent::SetupComplete {
                    return Ok(());
                }
            }
            Err(GeminiError::WebSocket("stream ended during setup".to_string()))
        })
        .await
        .map_err(|_| GeminiError::Timeout)??;

        info!(voice = %config.voice, "Gemini Live session ready");
        Ok(ws_stream)
    }
}

#[async_trait]
impl LiveVoice for GeminiLiveClient {
    async fn open_session(&self, config: &LiveConfig) -> StudioResult<LiveSession> {
        let ws_stream = self.connect(config).await?;
        Ok(LiveSession::spawn(move |io| run_session(ws_stream, io)))
    }
}

/// Pump audio up and assistant output down until either side stops.
async fn run_session(ws_stream: WsStream, mut io: SessionIo) {
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            chunk = io.input.recv() => {
                let Some(chunk) = chunk else {
                    debug!("Live input closed");
                    break;
                };
                let frame = WebSocketMessage::Text(audio_message(&chunk).to_string());
                if let Err(e) = sink.send(frame).await {
                    error!(error = %e, "Failed to send audio");
                    break;
                }
            }
            frame = stream.next() => {
                let frame = match frame {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => {
                        error!(error = %e, "Error reading from Gemini Live");
                        break;
                    }
                    None => {
                        warn!("Gemini Live stream ended");
                        break;
                    }
                };
                if let WebSocketMessage::Close(reason) = &frame {
                    info!(?reason, "Gemini Live closed the session");
                    break;
                }
                let Some(text) = frame_text(frame) else {
                    continue;
                };
                match parse_server_message(&text) {
                    Ok(ServerEvent::Outputs(outputs)) => {
                        for output in outputs {
                            if io.output.send(output).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(ServerEvent::SetupComplete) => {}
                    Err(e) => warn!(error = %e, "Skipping unreadable server message"),
                }
            }
            _ = io.cancel.cancelled() => {
                info!("Live session cancelled");
                break;
            }
        }
    }

    if let Err(e) = sink.send(WebSocketMessage::Close(None)).await {
        debug!(error = %e, "Close frame not delivered");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_studio::INPUT_SAMPLE_RATE;

    #[test]
    fn test_setup_message_carries_voice_and_persona() {
        let config = LiveConfig::default();
        let setup = setup_message(&config);

        assert_eq!(setup["setup"]["model"], format!("models/{LIVE_MODEL}"));
        assert_eq!(
            setup["setup"]["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Zephyr"
        );
        assert_eq!(
            setup["setup"]["systemInstruction"]["parts"][0]["text"],
            config.system_instruction
        );
    }

    #[test]
    fn test_audio_message_is_base64_pcm() {
        let chunk = AudioChunk::new(INPUT_SAMPLE_RATE, vec![1, -1]);
        let msg = audio_message(&chunk);
        let media = &msg["realtimeInput"]["mediaChunks"][0];

        assert_eq!(media["mimeType"], "audio/pcm;rate=16000");
        assert_eq!(media["data"], STANDARD.encode([0x01, 0x00, 0xFF, 0xFF]));
    }

    #[test]
    fn test_parse_setup_complete() {
        assert_eq!(
            parse_server_message(r#"{"setupComplete": {}}"#).unwrap(),
            ServerEvent::SetupComplete
        );
    }

    #[test]
    fn test_parse_model_turn_audio() {
        let data = STANDARD.encode([0x10, 0x00, 0x20, 0x00]);
        let text = format!(
            r#"{{"serverContent": {{"modelTurn": {{"parts": [{{"inlineData": {{"mimeType": "audio/pcm;rate=24000", "data": "{data}"}}}}]}}, "turnComplete": true}}}}"#
        );

        let event = parse_server_message(&text).unwrap();
        assert_eq!(
            event,
            ServerEvent::Outputs(vec![
                LiveOutput::Audio(AudioChunk::new(OUTPUT_SAMPLE_RATE, vec![16, 32])),
                LiveOutput::TurnComplete,
            ])
        );
    }

    #[test]
    fn test_parse_interruption() {
        let event = parse_server_message(r#"{"serverContent": {"interrupted": true}}"#).unwrap();
        assert_eq!(event, ServerEvent::Outputs(vec![LiveOutput::Interrupted]));
    }

    #[test]
    fn test_parse_unknown_message_is_empty() {
        let event = parse_server_message(r#"{"usageMetadata": {"totalTokenCount": 10}}"#).unwrap();
        assert_eq!(event, ServerEvent::Outputs(vec![]));
        assert!(parse_server_message("not json").is_err());
    }

    #[test]
    fn test_frame_text_accepts_binary_json() {
        let frame = WebSocketMessage::Binary(br#"{"setupComplete":{}}"#.to_vec());
        assert_eq!(frame_text(frame).as_deref(), Some(r#"{"setupComplete":{}}"#));
        assert!(frame_text(WebSocketMessage::Ping(vec![])).is_none());
    }
}
