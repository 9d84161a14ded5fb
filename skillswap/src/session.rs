//! Session snapshot load/save.
//!
//! Each CLI invocation rebuilds the marketplace from the `skillswap_session`
//! value, runs one command and writes the snapshot back. A missing snapshot
//! starts from the sample catalogue.

use std::sync::Arc;

use tracing::{debug, info, warn};

use skillswap_engine::{seed_store, Marketplace};
use skillswap_store::{FileStorage, LocalStorage, MarketplaceSnapshot, MemoryStore, SESSION_KEY};

use crate::config::Config;
use crate::error::CliResult;

/// One CLI session over the local data directory.
pub struct Session {
    /// Marketplace services
    pub market: Marketplace<MemoryStore, FileStorage>,
    store: Arc<MemoryStore>,
    storage: Arc<FileStorage>,
}

impl Session {
    /// Load the saved session, or seed a fresh one, and restore the active user.
    pub async fn open(config: &Config) -> CliResult<Self> {
        let storage =
            Arc::new(FileStorage::new(&config.data_dir).with_quota(config.storage_quota_bytes));

        let store = match load_snapshot(storage.as_ref()).await {
            Some(snapshot) => {
                debug!(
                    users = snapshot.users.len(),
                    listings = snapshot.listings.len(),
                    trades = snapshot.trades.len(),
                    "Loaded session snapshot"
                );
                Arc::new(MemoryStore::from_snapshot(snapshot))
            },
            None => {
                let store = Arc::new(MemoryStore::new());
                seed_store(store.as_ref()).await?;
                info!(data_dir = %config.data_dir.display(), "Started new session");
                store
            },
        };

        let market = Marketplace::new(store.clone(), storage.clone());
        market.profile.restore().await?;

        Ok(Self {
            market,
            store,
            storage,
        })
    }

    /// Persist the marketplace state for the next invocation.
    ///
    /// A snapshot over the storage quota is dropped with a warning; the
    /// command that produced it has already succeeded.
    pub async fn save(&self) -> CliResult<bool> {
        let snapshot = self.store.snapshot()?;
        let json = serde_json::to_string(&snapshot).map_err(skillswap_store::StoreError::from)?;

        match self.storage.set_item(SESSION_KEY, &json).await {
            Ok(()) => {
                debug!(bytes = json.len(), "Saved session snapshot");
                Ok(true)
            },
            Err(e) if e.is_quota_exceeded() => {
                warn!(error = %e, "Storage quota hit; session changes will not persist");
                Ok(false)
            },
            Err(e) => Err(e.into()),
        }
    }
}

async fn load_snapshot(storage: &FileStorage) -> Option<MarketplaceSnapshot> {
    let raw = match storage.get_item(SESSION_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Failed to read session snapshot");
            return None;
        },
    };

    match serde_json::from_str::<MarketplaceSnapshot>(&raw) {
        Ok(snapshot) if !snapshot.is_empty() => Some(snapshot),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Discarding unreadable session snapshot");
            None
        },
    }
}
