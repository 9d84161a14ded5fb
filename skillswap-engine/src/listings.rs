//! Listing Service: posting offers and keeping owner fields in sync.

use std::sync::Arc;

use tracing::{debug, info};

use skillswap_domain::{Listing, ListingDraft, ListingId, User, UserId};
use skillswap_store::Store;

use crate::error::{EngineError, EngineResult};

/// Creates and reads listings on behalf of their owners.
pub struct ListingService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> ListingService<S> {
    /// Create a new listing service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Post a new listing for `owner`.
    ///
    /// The draft is validated before the store is touched; the new listing
    /// is prepended, so it shows first in the feed.
    pub async fn create(&self, owner: &User, draft: ListingDraft) -> EngineResult<Listing> {
        let listing = Listing::from_draft(draft, owner)?;

        self.store.listings().create(&listing).await?;

        info!(
            listing_id = %listing.id,
            user_id = %owner.id,
            listing_type = %listing.listing_type,
            title = %listing.title,
            "Listing posted"
        );

        Ok(listing)
    }

    /// Find a listing by id.
    pub async fn find(&self, id: &ListingId) -> EngineResult<Listing> {
        self.store
            .listings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("listing", id.as_str()))
    }

    /// Listings owned by a user, newest first.
    pub async fn list_by_owner(&self, user_id: &UserId) -> EngineResult<Vec<Listing>> {
        let listings = self.store.listings().list_by_owner(user_id).await?;
        debug!(%user_id, count = listings.len(), "Listed owner listings");
        Ok(listings)
    }

    /// Copy the user's current name and avatar onto all of their listings.
    pub async fn sync_owner_fields(&self, user: &User) -> EngineResult<usize> {
        let (name, avatar) = user.display_fields();
        let touched = self.store.listings().sync_owner_fields(&user.id, name, avatar).await?;
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_domain::ListingType;
    use skillswap_store::MemoryStore;

    fn service() -> ListingService<MemoryStore> {
        ListingService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields_without_mutation() {
        let service = service();
        let owner = User::from_email("sarah@mit.edu").unwrap();
        let draft = ListingDraft::new(ListingType::Skill, "", "desc", "Math");

        let result = service.create(&owner, draft).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert!(service.list_by_owner(&owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let service = service();
        let owner = User::from_email("sarah@mit.edu").unwrap();
        let draft = ListingDraft::new(ListingType::Skill, "Calc Help", "Series", "Math")
            .with_tags("calculus, exam prep");

        let listing = service.create(&owner, draft).await.unwrap();
        let found = service.find(&listing.id).await.unwrap();
        assert_eq!(found.tags, vec!["calculus", "exam prep"]);
        assert_eq!(found.user_name, owner.name);
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let result = service().find(&ListingId::new("l-missing")).await;
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }
}
