//! SkillSwap AI Studio
//!
//! Generative side features: image and video generation for listing media
//! and avatars, plus a real-time voice assistant.
//!
//! # Architecture
//!
//! ```text
//! CLI → MediaGenerator / LiveVoice (ports) → adapter (Gemini, stub)
//! ```
//!
//! The marketplace core never calls into this crate. A failing or missing
//! backend disables the studio features only.
//!
//! # Example
//!
//! ```rust,ignore
//! use skillswap_studio::{ImageConfig, MediaGenerator, StubStudio};
//!
//! let studio = StubStudio::new();
//! let image = studio.generate_image("a chemistry kit", &ImageConfig::default()).await?;
//! println!("{}", image.to_data_url());
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod ports;
pub mod session;
pub mod stub;

pub use error::{StudioError, StudioResult};
pub use ports::{
    require_prompt, AspectRatio, AudioChunk, ImageConfig, ImageSize, LiveConfig, LiveOutput,
    LiveVoice, MediaGenerator, MediaRef, VideoConfig, INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE,
};
pub use session::{AudioSender, LiveSession, SessionIo};
pub use stub::StubStudio;
