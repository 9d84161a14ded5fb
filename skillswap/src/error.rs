//! CLI error types.

use skillswap_domain::DomainError;
use skillswap_engine::EngineError;
use skillswap_store::StoreError;
use skillswap_studio::StudioError;
use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// Domain error (bad argument value)
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Engine error
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// AI studio error
    #[error("Studio error: {0}")]
    Studio(#[from] StudioError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed command argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
