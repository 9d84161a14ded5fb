//! SkillSwap Engine Layer
//!
//! Marketplace services over the repository ports: posting listings,
//! the active profile, the searchable feed and the trade lifecycle.
//! Storage is injected; every service shares one `Arc` to the store.

#![warn(clippy::all)]

pub mod error;
pub mod feed;
pub mod listings;
pub mod marketplace;
pub mod profile;
pub mod seed;
pub mod trades;

pub use error::{EngineError, EngineResult};
pub use feed::FeedEngine;
pub use listings::ListingService;
pub use marketplace::Marketplace;
pub use profile::{ProfileService, ProfileUpdate};
pub use seed::{sample_listings, sample_users, seed_store};
pub use trades::{TradeEngine, TradeView};
