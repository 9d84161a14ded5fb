//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the domain.
//! Engines receive them injected; `MemoryStore` is the shipped implementation.

use crate::error::StoreError;
use async_trait::async_trait;
use skillswap_domain::{Listing, ListingId, Trade, TradeId, TradeStatus, User, UserId};

/// Repository for Listing entities
///
/// Listings are kept newest first: `create` prepends.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Prepend a new listing; fails on a duplicate id
    async fn create(&self, listing: &Listing) -> Result<(), StoreError>;

    /// Find a listing by ID
    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>, StoreError>;

    /// All listings, newest first
    async fn list_all(&self) -> Result<Vec<Listing>, StoreError>;

    /// All listings owned by a user, in store order
    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, StoreError>;

    /// Rewrite the denormalized owner fields on every listing of `user_id`
    ///
    /// Returns the number of listings touched.
    async fn sync_owner_fields(
        &self,
        user_id: &UserId,
        name: &str,
        avatar: &str,
    ) -> Result<usize, StoreError>;
}

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Save a user (insert or replace)
    async fn save(&self, user: &User) -> Result<(), StoreError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Find a user by email, case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// All known users, in insertion order
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}

/// Repository for Trade entities
///
/// Trades are kept newest first and never deleted.
#[async_trait]
pub trait TradeRepository: Send + Sync {
    /// Prepend a new trade; fails on a duplicate id
    async fn create(&self, trade: &Trade) -> Result<(), StoreError>;

    /// Find a trade by ID
    async fn find_by_id(&self, id: &TradeId) -> Result<Option<Trade>, StoreError>;

    /// Trades where the user is requester or provider, newest first
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Trade>, StoreError>;

    /// All trades, newest first
    async fn list_all(&self) -> Result<Vec<Trade>, StoreError>;

    /// Set the status only if it still equals `expected`
    ///
    /// Returns the updated trade, `NotFound` on a missing id and `Conflict`
    /// when the stored status differs from `expected`.
    async fn compare_and_set_status(
        &self,
        id: &TradeId,
        expected: TradeStatus,
        new_status: TradeStatus,
    ) -> Result<Trade, StoreError>;
}

/// Combined store interface
pub trait Store: Send + Sync {
    /// Get listing repository
    fn listings(&self) -> &dyn ListingRepository;

    /// Get user repository
    fn users(&self) -> &dyn UserRepository;

    /// Get trade repository
    fn trades(&self) -> &dyn TradeRepository;
}
