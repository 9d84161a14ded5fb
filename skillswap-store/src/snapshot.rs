//! Serializable copy of the whole marketplace

use serde::{Deserialize, Serialize};
use skillswap_domain::{Listing, Trade, User};

/// Every user, listing and trade, in store order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
    /// Newest first
    #[serde(default)]
    pub listings: Vec<Listing>,
    /// Newest first
    #[serde(default)]
    pub trades: Vec<Trade>,
}

impl MarketplaceSnapshot {
    /// True when nothing has been stored yet
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.listings.is_empty() && self.trades.is_empty()
    }
}
