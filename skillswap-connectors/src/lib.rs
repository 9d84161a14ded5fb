//! SkillSwap AI Connectors
//!
//! Adapters for the Gemini API (REST + WebSocket).
//! Normalizes Gemini payloads to the studio's media and audio types.

#![warn(clippy::all)]

// Public modules
pub mod gemini_live;
pub mod gemini_rest;

// Re-exports
pub use gemini_live::GeminiLiveClient;
pub use gemini_rest::{GeminiError, GeminiRestClient, GEMINI_API_URL};
