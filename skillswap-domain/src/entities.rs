//! Domain Entities for SkillSwap
//!
//! Users, their listings and the trades between them.
//! All entities have identity; only `Trade` has a lifecycle.

use crate::value_objects::{
    DomainError, ListingId, ListingType, SessionMode, SkillLevel, TradeId, TradeRole, TradeStatus,
    UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// User
// =============================================================================

/// A student on the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub college: String,
    pub branch: String,
    pub year: String,
    pub avatar: String,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    pub reputation: f64,
    #[serde(default)]
    pub trades_completed: u32,
}

impl User {
    /// Fields copied onto every listing the user owns
    pub fn display_fields(&self) -> (&str, &str) {
        (&self.name, &self.avatar)
    }
}

// =============================================================================
// Listing
// =============================================================================

/// A posted offer of a skill session or study material
///
/// `user_name` and `user_avatar` are denormalized copies of the owner's
/// current display fields and must be resynced on every profile update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_avatar: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<SkillLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SessionMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl Listing {
    /// Build a listing owned by `owner` from a validated draft
    ///
    /// # Errors
    /// Returns `DomainError::Validation` if the draft misses a required field
    pub fn from_draft(draft: ListingDraft, owner: &User) -> Result<Self, DomainError> {
        draft.validate()?;

        let (level, duration) = match draft.listing_type {
            ListingType::Skill => (
                Some(draft.level.unwrap_or(SkillLevel::Intermediate)),
                Some(draft.duration.unwrap_or_else(|| ListingDraft::DEFAULT_DURATION.to_string())),
            ),
            ListingType::Material => (draft.level, draft.duration),
        };

        Ok(Self {
            id: ListingId::generate(),
            user_id: owner.id.clone(),
            user_name: owner.name.clone(),
            user_avatar: owner.avatar.clone(),
            listing_type: draft.listing_type,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category.trim().to_string(),
            level,
            mode: draft.mode,
            duration,
            tags: draft.tags,
            created_at: Utc::now(),
            media_url: draft.media_url,
        })
    }

    /// Check ownership
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Overwrite the denormalized owner fields
    pub fn apply_owner_fields(&mut self, name: &str, avatar: &str) {
        self.user_name = name.to_string();
        self.user_avatar = avatar.to_string();
    }
}

/// Caller-supplied fields for a new listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub listing_type: ListingType,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub level: Option<SkillLevel>,
    pub mode: Option<SessionMode>,
    pub duration: Option<String>,
    pub media_url: Option<String>,
}

impl ListingDraft {
    const DEFAULT_DURATION: &'static str = "1 Hour";

    /// Draft with the required fields; optional ones left empty
    pub fn new(
        listing_type: ListingType,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            listing_type,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            tags: Vec::new(),
            level: None,
            mode: None,
            duration: None,
            media_url: None,
        }
    }

    /// Set tags from a comma-separated string
    pub fn with_tags(mut self, raw: &str) -> Self {
        self.tags = parse_tags(raw);
        self
    }

    /// Title, description and category must be non-empty
    pub fn validate(&self) -> Result<(), DomainError> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(format!("missing {}", missing.join(", "))))
        }
    }
}

/// Split a comma-separated tag list, trimming and dropping empties
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Trade
// =============================================================================

/// A one-for-one swap proposal between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: TradeId,
    pub requester_id: UserId,
    pub provider_id: UserId,
    /// Listing the requester offers (owned by the requester)
    pub requester_item_id: ListingId,
    /// Listing the requester wants (owned by the provider)
    pub provider_item_id: ListingId,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    /// Create a new pending trade
    ///
    /// # Errors
    /// Returns `DomainError::SelfTrade` if both sides are the same user
    pub fn propose(
        requester_id: UserId,
        provider_id: UserId,
        requester_item_id: ListingId,
        provider_item_id: ListingId,
    ) -> Result<Self, DomainError> {
        if requester_id == provider_id {
            return Err(DomainError::SelfTrade(requester_id));
        }

        Ok(Self {
            id: TradeId::generate(),
            requester_id,
            provider_id,
            requester_item_id,
            provider_item_id,
            status: TradeStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Role of `user_id` on this trade, if they are a party to it
    pub fn role_of(&self, user_id: &UserId) -> Option<TradeRole> {
        if &self.provider_id == user_id {
            Some(TradeRole::Provider)
        } else if &self.requester_id == user_id {
            Some(TradeRole::Requester)
        } else {
            None
        }
    }

    /// Check whether the user is either party
    pub fn involves(&self, user_id: &UserId) -> bool {
        self.role_of(user_id).is_some()
    }

    /// Listing the given role hands over
    pub fn item_given_by(&self, role: TradeRole) -> &ListingId {
        match role {
            TradeRole::Requester => &self.requester_item_id,
            TradeRole::Provider => &self.provider_item_id,
        }
    }

    /// Listing the given role receives
    pub fn item_received_by(&self, role: TradeRole) -> &ListingId {
        match role {
            TradeRole::Requester => &self.provider_item_id,
            TradeRole::Provider => &self.requester_item_id,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
