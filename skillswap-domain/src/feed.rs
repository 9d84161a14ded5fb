//! Feed matching
//!
//! Plain filtering over listings: a type filter plus a case-insensitive
//! substring search across title, description and tags. No ranking;
//! output order is input order.

use crate::entities::Listing;
use crate::value_objects::TypeFilter;

/// Normalized search query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery(Option<String>);

impl SearchQuery {
    /// Build from raw user input; whitespace-only input matches everything.
    /// Any other input is matched as typed, apart from case.
    pub fn new(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(raw.to_lowercase()))
        }
    }

    /// True when the query places no constraint
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Check a listing against the query
    pub fn matches(&self, listing: &Listing) -> bool {
        let Some(needle) = &self.0 else {
            return true;
        };

        listing.title.to_lowercase().contains(needle)
            || listing.description.to_lowercase().contains(needle)
            || listing.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// Check a single listing against the type filter and query
pub fn matches(listing: &Listing, type_filter: TypeFilter, query: &SearchQuery) -> bool {
    type_filter.admits(listing.listing_type) && query.matches(listing)
}

/// Return the listings that match, preserving input order
pub fn filter(listings: &[Listing], type_filter: TypeFilter, query: &str) -> Vec<Listing> {
    let query = SearchQuery::new(query);
    listings
        .iter()
        .filter(|listing| matches(listing, type_filter, &query))
        .cloned()
        .collect()
}
