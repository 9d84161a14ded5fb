//! SkillSwap command-line client.
//!
//! One-shot CLI over the marketplace services and the AI studio.
//!
//! # Architecture
//!
//! ```text
//! CLI → Session (snapshot in local storage) → Marketplace → Store
//!                                       ↘ Studio → Gemini / stub
//! ```
//!
//! # Components
//!
//! - **Cli**: clap command definitions
//! - **Commands**: dispatch and text rendering
//! - **Session**: loads and saves the marketplace snapshot per invocation
//! - **Studio**: picks the generative backend and moves media to and from disk
//! - **Config**: environment-based configuration

#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod studio;

pub use cli::{Cli, Command, StudioCommand};
pub use commands::execute;
pub use config::{Config, Environment};
pub use error::{CliError, CliResult};
pub use session::Session;
pub use studio::StudioBackend;
