//! SkillSwap CLI
//!
//! # Usage
//!
//! ```bash
//! skillswap login sarah@mit.edu
//! skillswap feed --type material -q chemistry
//! skillswap propose l3 --offer l5
//! ```
//!
//! # Environment Variables
//!
//! - `SKILLSWAP_ENV`: Environment (test, development, production)
//! - `SKILLSWAP_DATA_DIR`: Local storage directory (default: .skillswap)
//! - `SKILLSWAP_STORAGE_QUOTA_BYTES`: Per-value storage budget
//! - `SKILLSWAP_LOG_JSON`: Emit JSON log lines
//! - `GEMINI_API_KEY` / `API_KEY`: Enables the Gemini studio backend

use clap::Parser;
use skillswap::{commands, Cli, Config};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    // Logs go to stderr; stdout carries command output
    let filter = EnvFilter::from_default_env().add_directive("skillswap=info".parse()?);
    if config.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    let cli = Cli::parse();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        data_dir = %config.data_dir.display(),
        "SkillSwap CLI"
    );

    let output = commands::execute(&config, cli.command).await?;
    println!("{output}");

    Ok(())
}
