//! All marketplace services wired to one store.

use std::sync::Arc;

use skillswap_store::{LocalStorage, Store};

use crate::feed::FeedEngine;
use crate::listings::ListingService;
use crate::profile::ProfileService;
use crate::trades::TradeEngine;

/// The services of one session, sharing a store and a local storage.
pub struct Marketplace<S: Store, L: LocalStorage> {
    store: Arc<S>,
    /// Listing posting and lookup
    pub listings: ListingService<S>,
    /// Active user and theme
    pub profile: ProfileService<S, L>,
    /// Filtered feed
    pub feed: FeedEngine<S>,
    /// Trade lifecycle
    pub trades: TradeEngine<S>,
}

impl<S: Store, L: LocalStorage> Marketplace<S, L> {
    /// Wire every service to `store` and `storage`.
    pub fn new(store: Arc<S>, storage: Arc<L>) -> Self {
        Self {
            listings: ListingService::new(store.clone()),
            profile: ProfileService::new(store.clone(), storage),
            feed: FeedEngine::new(store.clone()),
            trades: TradeEngine::new(store.clone()),
            store,
        }
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
