//! AI studio error types.

use thiserror::Error;

/// Errors that can occur when calling a generative backend.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Bad caller input (empty prompt, malformed data URL)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No backend configured (missing API key)
    #[error("AI features unavailable: {0}")]
    Unavailable(String),

    /// Transport or HTTP failure talking to the backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend answered but the payload had no usable media
    #[error("No media in response: {0}")]
    NoMedia(String),

    /// Long-running generation did not finish in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The live session was closed or its task ended
    #[error("Live session closed")]
    SessionClosed,
}

/// Result type for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;
