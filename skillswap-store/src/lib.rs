//! SkillSwap Storage Layer
//!
//! Provides persistence for users, listings and trades, plus the local
//! key-value storage the active profile and theme live in.
//!
//! # Architecture
//!
//! - **Repository traits**: Define the storage interface (ports)
//! - **In-memory store**: The single-device implementation, snapshot-able
//! - **Local storage**: Browser-style key-value store with a size quota
//!
//! # Usage
//!
//! ```rust
//! use skillswap_store::{MemoryStore, Store};
//! use skillswap_domain::{Listing, ListingDraft, ListingType, User};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     let owner = User::from_email("sarah@mit.edu").unwrap();
//!
//!     let draft = ListingDraft::new(ListingType::Skill, "Calc Help", "Series", "Math");
//!     let listing = Listing::from_draft(draft, &owner).unwrap();
//!     store.listings().create(&listing).await.unwrap();
//!
//!     let mine = store.listings().list_by_owner(&owner.id).await.unwrap();
//!     println!("Listings: {}", mine.len());
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
mod repository;
mod snapshot;
mod storage;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
pub use repository::{ListingRepository, Store, TradeRepository, UserRepository};
pub use snapshot::MarketplaceSnapshot;
pub use storage::{
    FileStorage, LocalStorage, MemoryStorage, DEFAULT_QUOTA_BYTES, SESSION_KEY, THEME_KEY,
    USER_KEY,
};
