//! Local key-value storage
//!
//! A single-device string store with browser-like semantics: one value per
//! key and a per-value size quota. `FileStorage` keeps one file per key in a
//! data directory; `MemoryStorage` backs tests.

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Serialized active user
pub const USER_KEY: &str = "skillswap_user";

/// `"light"` or `"dark"`
pub const THEME_KEY: &str = "skillswap_theme";

/// Marketplace snapshot kept between CLI invocations
pub const SESSION_KEY: &str = "skillswap_session";

/// Default per-value quota (5 MiB)
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Key-value persistence port
#[async_trait]
pub trait LocalStorage: Send + Sync {
    /// Read a value
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, failing with `QuotaExceeded` when it is too large
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value; deleting a missing key is not an error
    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

fn check_quota(key: &str, value: &str, quota: usize) -> Result<(), StoreError> {
    if value.len() > quota {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            quota,
        });
    }
    Ok(())
}

// =============================================================================
// File Storage
// =============================================================================

/// One file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota_bytes: usize,
}

impl FileStorage {
    /// Storage rooted at `dir` with the default quota
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }

    /// Override the per-value quota
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl LocalStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        check_quota(key, value, self.quota_bytes)?;

        tokio::fs::create_dir_all(&self.dir).await?;

        // Write-then-rename so a crash never leaves a half-written value
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(key, bytes = value.len(), "Stored item");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-memory storage for tests
#[derive(Debug)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
    quota_bytes: usize,
}

impl MemoryStorage {
    /// Empty storage with the default quota
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    /// Empty storage with a custom quota
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota_bytes,
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or_default()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        let items = self.items.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        check_quota(key, value, self.quota_bytes)?;
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;
        items.remove(key);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
