//! CLI configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use skillswap_store::DEFAULT_QUOTA_BYTES;

use crate::error::{CliError, CliResult};

/// Default directory for the local key-value store.
pub const DEFAULT_DATA_DIR: &str = ".skillswap";

// =============================================================================
// Configuration
// =============================================================================

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (test, development, production)
    pub environment: Environment,
    /// Directory holding one file per storage key
    pub data_dir: PathBuf,
    /// Per-value byte budget of the local storage
    pub storage_quota_bytes: usize,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Gemini API key; studio commands use the stub without one
    pub gemini_api_key: Option<String>,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment (uses stubs)
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> CliResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = env::var("SKILLSWAP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()?;

        let data_dir = env::var("SKILLSWAP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let storage_quota_bytes = match env::var("SKILLSWAP_STORAGE_QUOTA_BYTES") {
            Ok(val) => val.parse::<usize>().map_err(|_| {
                CliError::Config(format!("Invalid SKILLSWAP_STORAGE_QUOTA_BYTES: {}", val))
            })?,
            Err(_) => DEFAULT_QUOTA_BYTES,
        };

        let log_json = env::var("SKILLSWAP_LOG_JSON")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            environment,
            data_dir,
            storage_quota_bytes,
            log_json,
            gemini_api_key,
        })
    }

    /// Create test configuration rooted at `data_dir`.
    pub fn test(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            environment: Environment::Test,
            data_dir: data_dir.into(),
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
            log_json: false,
            gemini_api_key: None,
        }
    }

    /// Whether studio commands should call the real backend.
    pub fn use_gemini(&self) -> bool {
        self.environment != Environment::Test && self.gemini_api_key.is_some()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
            log_json: false,
            gemini_api_key: None,
        }
    }
}

impl FromStr for Environment {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(CliError::Config(format!(
                "Invalid SKILLSWAP_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.data_dir, PathBuf::from(".skillswap"));
        assert_eq!(config.storage_quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_test_config_never_uses_gemini() {
        let mut config = Config::test("/tmp/skillswap-test");
        config.gemini_api_key = Some("key".to_string());

        assert_eq!(config.environment, Environment::Test);
        assert!(!config.use_gemini());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Dev".parse::<Environment>().unwrap(), Environment::Development);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("no"));
    }
}
