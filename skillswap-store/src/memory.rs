//! In-memory store implementation
//!
//! The single-device store the marketplace runs on.
//! Each operation takes the lock once, so every mutation is atomic.

use crate::error::StoreError;
use crate::repository::{ListingRepository, Store, TradeRepository, UserRepository};
use crate::snapshot::MarketplaceSnapshot;
use async_trait::async_trait;
use skillswap_domain::{Listing, ListingId, Trade, TradeId, TradeStatus, User, UserId};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// In-memory store
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    /// Newest first
    listings: RwLock<Vec<Listing>>,
    /// Newest first
    trades: RwLock<Vec<Trade>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::LockPoisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::LockPoisoned)
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            listings: RwLock::new(Vec::new()),
            trades: RwLock::new(Vec::new()),
        }
    }

    /// Rebuild a store from a saved snapshot
    pub fn from_snapshot(snapshot: MarketplaceSnapshot) -> Self {
        Self {
            users: RwLock::new(snapshot.users),
            listings: RwLock::new(snapshot.listings),
            trades: RwLock::new(snapshot.trades),
        }
    }

    /// Copy the full contents out for persistence
    pub fn snapshot(&self) -> Result<MarketplaceSnapshot, StoreError> {
        Ok(MarketplaceSnapshot {
            users: read(&self.users)?.clone(),
            listings: read(&self.listings)?.clone(),
            trades: read(&self.trades)?.clone(),
        })
    }

    /// Get the number of listings
    pub fn listing_count(&self) -> usize {
        self.listings.read().map(|l| l.len()).unwrap_or_default()
    }

    /// Get the number of trades
    pub fn trade_count(&self) -> usize {
        self.trades.read().map(|t| t.len()).unwrap_or_default()
    }

    /// Clear all data (useful for test setup)
    pub fn clear(&self) -> Result<(), StoreError> {
        write(&self.users)?.clear();
        write(&self.listings)?.clear();
        write(&self.trades)?.clear();
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Listing Repository Implementation
// =============================================================================

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn create(&self, listing: &Listing) -> Result<(), StoreError> {
        let mut listings = write(&self.listings)?;
        if listings.iter().any(|l| l.id == listing.id) {
            return Err(StoreError::duplicate("listing", listing.id.as_str()));
        }
        listings.insert(0, listing.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, StoreError> {
        let listings = read(&self.listings)?;
        Ok(listings.iter().find(|l| &l.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(read(&self.listings)?.clone())
    }

    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, StoreError> {
        let listings = read(&self.listings)?;
        Ok(listings.iter().filter(|l| l.is_owned_by(user_id)).cloned().collect())
    }

    async fn sync_owner_fields(
        &self,
        user_id: &UserId,
        name: &str,
        avatar: &str,
    ) -> Result<usize, StoreError> {
        let mut listings = write(&self.listings)?;
        let mut touched = 0;
        for listing in listings.iter_mut().filter(|l| l.is_owned_by(user_id)) {
            listing.apply_owner_fields(name, avatar);
            touched += 1;
        }
        debug!(%user_id, touched, "Synced owner fields");
        Ok(touched)
    }
}

// =============================================================================
// User Repository Implementation
// =============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut users = write(&self.users)?;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let users = read(&self.users)?;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = read(&self.users)?;
        let email = email.trim();
        Ok(users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(read(&self.users)?.clone())
    }
}

// =============================================================================
// Trade Repository Implementation
// =============================================================================

#[async_trait]
impl TradeRepository for MemoryStore {
    async fn create(&self, trade: &Trade) -> Result<(), StoreError> {
        let mut trades = write(&self.trades)?;
        if trades.iter().any(|t| t.id == trade.id) {
            return Err(StoreError::duplicate("trade", trade.id.as_str()));
        }
        trades.insert(0, trade.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TradeId) -> Result<Option<Trade>, StoreError> {
        let trades = read(&self.trades)?;
        Ok(trades.iter().find(|t| &t.id == id).cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Trade>, StoreError> {
        let trades = read(&self.trades)?;
        Ok(trades.iter().filter(|t| t.involves(user_id)).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Trade>, StoreError> {
        Ok(read(&self.trades)?.clone())
    }

    async fn compare_and_set_status(
        &self,
        id: &TradeId,
        expected: TradeStatus,
        new_status: TradeStatus,
    ) -> Result<Trade, StoreError> {
        let mut trades = write(&self.trades)?;
        let trade = trades
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::not_found("trade", id.as_str()))?;

        if trade.status != expected {
            return Err(StoreError::Conflict {
                id: id.to_string(),
                expected,
                actual: trade.status,
            });
        }

        trade.status = new_status;
        Ok(trade.clone())
    }
}

// =============================================================================
// Store Implementation
// =============================================================================

impl Store for MemoryStore {
    fn listings(&self) -> &dyn ListingRepository {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn trades(&self) -> &dyn TradeRepository {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_domain::{ListingDraft, ListingType};

    fn create_test_user(id: &str, name: &str) -> User {
        let mut user = User::from_email(&format!("{}@campus.edu", name.to_lowercase())).unwrap();
        user.id = UserId::new(id);
        user.name = name.to_string();
        user
    }

    fn create_test_listing(owner: &User, title: &str) -> Listing {
        let draft = ListingDraft::new(ListingType::Skill, title, "A session", "Math");
        Listing::from_draft(draft, owner).unwrap()
    }

    fn create_test_trade(store_listing_a: &Listing, store_listing_b: &Listing) -> Trade {
        Trade::propose(
            store_listing_b.user_id.clone(),
            store_listing_a.user_id.clone(),
            store_listing_b.id.clone(),
            store_listing_a.id.clone(),
        )
        .unwrap()
    }

    // Listing Repository Tests
    #[tokio::test]
    async fn test_listing_create_prepends() {
        let store = MemoryStore::new();
        let owner = create_test_user("u1", "Sarah");
        let first = create_test_listing(&owner, "First");
        let second = create_test_listing(&owner, "Second");

        ListingRepository::create(&store, &first).await.unwrap();
        ListingRepository::create(&store, &second).await.unwrap();

        let all = ListingRepository::list_all(&store).await.unwrap();
        assert_eq!(all[0].title, "Second");
        assert_eq!(all[1].title, "First");
    }

    #[tokio::test]
    async fn test_listing_duplicate_id_rejected() {
        let store = MemoryStore::new();
        let owner = create_test_user("u1", "Sarah");
        let listing = create_test_listing(&owner, "Once");

        ListingRepository::create(&store, &listing).await.unwrap();
        let result = ListingRepository::create(&store, &listing).await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        assert_eq!(store.listing_count(), 1);
    }

    #[tokio::test]
    async fn test_list_by_owner_filters() {
        let store = MemoryStore::new();
        let sarah = create_test_user("u1", "Sarah");
        let david = create_test_user("u2", "David");

        ListingRepository::create(&store, &create_test_listing(&sarah, "A")).await.unwrap();
        ListingRepository::create(&store, &create_test_listing(&david, "B")).await.unwrap();
        ListingRepository::create(&store, &create_test_listing(&sarah, "C")).await.unwrap();

        let mine = store.list_by_owner(&sarah.id).await.unwrap();
        let titles: Vec<&str> = mine.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);
    }

    #[tokio::test]
    async fn test_sync_owner_fields_only_touches_owner() {
        let store = MemoryStore::new();
        let sarah = create_test_user("u1", "Sarah");
        let david = create_test_user("u2", "David");

        ListingRepository::create(&store, &create_test_listing(&sarah, "A")).await.unwrap();
        ListingRepository::create(&store, &create_test_listing(&sarah, "B")).await.unwrap();
        ListingRepository::create(&store, &create_test_listing(&david, "C")).await.unwrap();

        let touched = store.sync_owner_fields(&sarah.id, "Sarah L.", "new-avatar").await.unwrap();
        assert_eq!(touched, 2);

        for listing in ListingRepository::list_all(&store).await.unwrap() {
            if listing.is_owned_by(&sarah.id) {
                assert_eq!(listing.user_name, "Sarah L.");
                assert_eq!(listing.user_avatar, "new-avatar");
            } else {
                assert_eq!(listing.user_name, "David");
                assert_eq!(listing.user_avatar, david.avatar);
            }
        }
    }

    // User Repository Tests
    #[tokio::test]
    async fn test_user_save_replaces_and_finds_by_email() {
        let store = MemoryStore::new();
        let mut user = create_test_user("u1", "Sarah");
        UserRepository::save(&store, &user).await.unwrap();

        user.branch = "Physics".to_string();
        UserRepository::save(&store, &user).await.unwrap();

        let all = UserRepository::list_all(&store).await.unwrap();
        assert_eq!(all.len(), 1);

        let found = store.find_by_email("SARAH@campus.edu").await.unwrap().unwrap();
        assert_eq!(found.branch, "Physics");
    }

    // Trade Repository Tests
    #[tokio::test]
    async fn test_trade_compare_and_set() {
        let store = MemoryStore::new();
        let sarah = create_test_user("u1", "Sarah");
        let david = create_test_user("u2", "David");
        let trade = create_test_trade(&create_test_listing(&sarah, "A"), &create_test_listing(&david, "B"));
        TradeRepository::create(&store, &trade).await.unwrap();

        let updated = store
            .compare_and_set_status(&trade.id, TradeStatus::Pending, TradeStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.status, TradeStatus::Accepted);

        let stale = store
            .compare_and_set_status(&trade.id, TradeStatus::Pending, TradeStatus::Rejected)
            .await;
        assert!(matches!(
            stale,
            Err(StoreError::Conflict { actual: TradeStatus::Accepted, .. })
        ));
    }

    #[tokio::test]
    async fn test_trade_compare_and_set_not_found() {
        let store = MemoryStore::new();
        let result = store
            .compare_and_set_status(&TradeId::new("t-missing"), TradeStatus::Pending, TradeStatus::Accepted)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_trade_find_by_user() {
        let store = MemoryStore::new();
        let sarah = create_test_user("u1", "Sarah");
        let david = create_test_user("u2", "David");
        let trade = create_test_trade(&create_test_listing(&sarah, "A"), &create_test_listing(&david, "B"));
        TradeRepository::create(&store, &trade).await.unwrap();

        assert_eq!(store.find_by_user(&sarah.id).await.unwrap().len(), 1);
        assert_eq!(store.find_by_user(&david.id).await.unwrap().len(), 1);
        assert!(store.find_by_user(&UserId::new("u3")).await.unwrap().is_empty());
    }

    // Store Tests
    #[tokio::test]
    async fn test_snapshot_round_trip_keeps_order() {
        let store = MemoryStore::new();
        let sarah = create_test_user("u1", "Sarah");
        UserRepository::save(&store, &sarah).await.unwrap();
        ListingRepository::create(&store, &create_test_listing(&sarah, "A")).await.unwrap();
        ListingRepository::create(&store, &create_test_listing(&sarah, "B")).await.unwrap();

        let restored = MemoryStore::from_snapshot(store.snapshot().unwrap());
        let titles: Vec<String> = ListingRepository::list_all(&restored)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert!(UserRepository::find_by_id(&restored, &sarah.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_clear() {
        let store = MemoryStore::new();
        let sarah = create_test_user("u1", "Sarah");
        ListingRepository::create(&store, &create_test_listing(&sarah, "A")).await.unwrap();
        assert_eq!(store.listing_count(), 1);

        store.clear().unwrap();
        assert_eq!(store.listing_count(), 0);
        assert_eq!(store.trade_count(), 0);
    }
}
