//! Feed Engine: the searchable view over all listings.

use std::sync::Arc;

use tracing::debug;

use skillswap_domain::{feed, Listing, TypeFilter, UserId};
use skillswap_store::Store;

use crate::error::EngineResult;

/// Reads listings from the store and applies the feed filter.
pub struct FeedEngine<S: Store> {
    store: Arc<S>,
}

impl<S: Store> FeedEngine<S> {
    /// Create a new feed engine.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All matching listings, newest first.
    pub async fn feed(&self, type_filter: TypeFilter, query: &str) -> EngineResult<Vec<Listing>> {
        let listings = self.store.listings().list_all().await?;
        let matched = feed::filter(&listings, type_filter, query);

        debug!(
            ?type_filter,
            query,
            total = listings.len(),
            matched = matched.len(),
            "Feed filtered"
        );

        Ok(matched)
    }

    /// Listings the user can offer in return for a swap.
    pub async fn tradable_items(&self, user_id: &UserId) -> EngineResult<Vec<Listing>> {
        Ok(self.store.listings().list_by_owner(user_id).await?)
    }
}
