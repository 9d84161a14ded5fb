//! SkillSwap Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains entities, value objects, the trade state machine and feed matching.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod entities;
pub mod feed;
pub mod signup;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{parse_tags, Listing, ListingDraft, Trade, User};
pub use feed::SearchQuery;
pub use value_objects::{
    DomainError, ListingId, ListingType, SessionMode, SkillLevel, Theme, TradeAction, TradeId,
    TradeRole, TradeStatus, TypeFilter, UserId,
};
