//! Value Objects for the SkillSwap domain
//!
//! Identifiers, enumerations and the trade status state machine.
//! All value objects are immutable and cheap to clone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Domain errors for validation and state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A required field is missing or malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Email does not look like `local@domain.tld`
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// The transition table has no edge between the two states
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: TradeStatus,
        /// Requested status
        to: TradeStatus,
    },

    /// The edge exists but the acting role may not take it
    #[error("{role} may not move a trade from {from} to {to}")]
    ActorNotPermitted {
        /// Role of the acting user on the trade
        role: TradeRole,
        /// Current status
        from: TradeStatus,
        /// Requested status
        to: TradeStatus,
    },

    /// Requester and provider are the same user
    #[error("User {0} cannot trade with themself")]
    SelfTrade(UserId),

    /// Unrecognised textual value for an enumeration
    #[error("Unknown {kind}: {value}")]
    UnknownValue {
        /// Which enumeration was being parsed
        kind: &'static str,
        /// The rejected input
        value: String,
    },
}

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a fresh, time-ordered identifier
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), Uuid::now_v7()))
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }
    };
}

string_id!(
    /// Unique identifier for a User
    UserId,
    "u"
);

string_id!(
    /// Unique identifier for a Listing
    ListingId,
    "l"
);

string_id!(
    /// Unique identifier for a Trade
    TradeId,
    "t"
);

// =============================================================================
// Listing enumerations
// =============================================================================

/// What a listing offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    /// A tutoring or skill session
    Skill,
    /// Study material (notes, kits, books)
    Material,
}

impl ListingType {
    /// Wire name, as stored in JSON
    pub fn name(&self) -> &'static str {
        match self {
            ListingType::Skill => "SKILL",
            ListingType::Material => "MATERIAL",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SKILL" => Ok(ListingType::Skill),
            "MATERIAL" => Ok(ListingType::Material),
            _ => Err(DomainError::UnknownValue {
                kind: "listing type",
                value: s.to_string(),
            }),
        }
    }
}

/// Experience level of a skill session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    /// Entry level
    Beginner,
    /// Default level for new skill listings
    Intermediate,
    /// Expert level
    Advanced,
}

impl FromStr for SkillLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            _ => Err(DomainError::UnknownValue {
                kind: "skill level",
                value: s.to_string(),
            }),
        }
    }
}

/// How a skill session is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// Remote session
    Online,
    /// In-person session
    Offline,
}

impl FromStr for SessionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(SessionMode::Online),
            "offline" => Ok(SessionMode::Offline),
            _ => Err(DomainError::UnknownValue {
                kind: "session mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Feed type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeFilter {
    /// Every listing type
    #[default]
    All,
    /// Skill sessions only
    Skill,
    /// Materials only
    Material,
}

impl TypeFilter {
    /// Check whether a listing type passes this filter
    pub fn admits(&self, listing_type: ListingType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Skill => listing_type == ListingType::Skill,
            TypeFilter::Material => listing_type == ListingType::Material,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(TypeFilter::All),
            "SKILL" | "SKILLS" => Ok(TypeFilter::Skill),
            "MATERIAL" | "MATERIALS" => Ok(TypeFilter::Material),
            _ => Err(DomainError::UnknownValue {
                kind: "type filter",
                value: s.to_string(),
            }),
        }
    }
}

/// UI colour theme, persisted under `skillswap_theme`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Default theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl Theme {
    /// Stored value
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Parse a stored value; anything unrecognised falls back to light
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Trade State Machine
// =============================================================================

/// Which side of a trade a user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeRole {
    /// Proposed the swap and offers `requester_item_id`
    Requester,
    /// Owns the wanted listing `provider_item_id`
    Provider,
}

impl fmt::Display for TradeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeRole::Requester => f.write_str("requester"),
            TradeRole::Provider => f.write_str("provider"),
        }
    }
}

/// Who may take a given edge of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permission {
    ProviderOnly,
    EitherParty,
}

impl Permission {
    fn allows(self, role: TradeRole) -> bool {
        match self {
            Permission::ProviderOnly => role == TradeRole::Provider,
            Permission::EitherParty => true,
        }
    }
}

/// Trade lifecycle
///
/// ```text
/// PENDING ──accept──▶ ACCEPTED ──complete──▶ COMPLETED
///    │
///    └──reject──▶ REJECTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    /// Proposed, waiting for the provider
    Pending,
    /// Provider agreed to the swap
    Accepted,
    /// Provider declined (terminal)
    Rejected,
    /// Swap happened (terminal)
    Completed,
}

impl TradeStatus {
    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "PENDING",
            TradeStatus::Accepted => "ACCEPTED",
            TradeStatus::Rejected => "REJECTED",
            TradeStatus::Completed => "COMPLETED",
        }
    }

    /// No transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Rejected | TradeStatus::Completed)
    }

    /// The single transition table
    fn permission(from: TradeStatus, to: TradeStatus) -> Option<Permission> {
        match (from, to) {
            (TradeStatus::Pending, TradeStatus::Accepted) => Some(Permission::ProviderOnly),
            (TradeStatus::Pending, TradeStatus::Rejected) => Some(Permission::ProviderOnly),
            (TradeStatus::Accepted, TradeStatus::Completed) => Some(Permission::EitherParty),
            _ => None,
        }
    }

    /// Validate a transition for the acting role and return the new status
    ///
    /// # Errors
    /// - `DomainError::InvalidTransition` if the table has no such edge
    /// - `DomainError::ActorNotPermitted` if the role may not take the edge
    pub fn transition(self, to: TradeStatus, role: TradeRole) -> Result<TradeStatus, DomainError> {
        let permission = Self::permission(self, to)
            .ok_or(DomainError::InvalidTransition { from: self, to })?;

        if !permission.allows(role) {
            return Err(DomainError::ActorNotPermitted {
                role,
                from: self,
                to,
            });
        }

        Ok(to)
    }

    /// Actions the given role may take from this status
    pub fn available_actions(&self, role: TradeRole) -> Vec<TradeAction> {
        TradeAction::ALL
            .into_iter()
            .filter(|action| self.transition(action.target(), role).is_ok())
            .collect()
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TradeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(TradeStatus::Pending),
            "ACCEPTED" => Ok(TradeStatus::Accepted),
            "REJECTED" => Ok(TradeStatus::Rejected),
            "COMPLETED" => Ok(TradeStatus::Completed),
            _ => Err(DomainError::UnknownValue {
                kind: "trade status",
                value: s.to_string(),
            }),
        }
    }
}

/// User-facing trade actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    /// PENDING → ACCEPTED
    Accept,
    /// PENDING → REJECTED
    Reject,
    /// ACCEPTED → COMPLETED
    Complete,
}

impl TradeAction {
    const ALL: [TradeAction; 3] = [TradeAction::Accept, TradeAction::Reject, TradeAction::Complete];

    /// Status this action moves a trade to
    pub fn target(&self) -> TradeStatus {
        match self {
            TradeAction::Accept => TradeStatus::Accepted,
            TradeAction::Reject => TradeStatus::Rejected,
            TradeAction::Complete => TradeStatus::Completed,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Accept => f.write_str("accept"),
            TradeAction::Reject => f.write_str("reject"),
            TradeAction::Complete => f.write_str("complete"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_can_accept_and_reject_pending() {
        assert_eq!(
            TradeStatus::Pending.transition(TradeStatus::Accepted, TradeRole::Provider),
            Ok(TradeStatus::Accepted)
        );
        assert_eq!(
            TradeStatus::Pending.transition(TradeStatus::Rejected, TradeRole::Provider),
            Ok(TradeStatus::Rejected)
        );
    }

    #[test]
    fn test_requester_cannot_accept_own_proposal() {
        let err = TradeStatus::Pending
            .transition(TradeStatus::Accepted, TradeRole::Requester)
            .unwrap_err();
        assert!(matches!(err, DomainError::ActorNotPermitted { role: TradeRole::Requester, .. }));
    }

    #[test]
    fn test_either_party_can_complete() {
        for role in [TradeRole::Requester, TradeRole::Provider] {
            assert_eq!(
                TradeStatus::Accepted.transition(TradeStatus::Completed, role),
                Ok(TradeStatus::Completed)
            );
        }
    }

    #[test]
    fn test_terminal_states_reject_every_transition() {
        let all = [
            TradeStatus::Pending,
            TradeStatus::Accepted,
            TradeStatus::Rejected,
            TradeStatus::Completed,
        ];
        for from in [TradeStatus::Rejected, TradeStatus::Completed] {
            assert!(from.is_terminal());
            for to in all {
                let err = from.transition(to, TradeRole::Provider).unwrap_err();
                assert_eq!(err, DomainError::InvalidTransition { from, to });
            }
        }
    }

    #[test]
    fn test_pending_cannot_skip_to_completed() {
        let err = TradeStatus::Pending
            .transition(TradeStatus::Completed, TradeRole::Provider)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[test]
    fn test_available_actions_per_role() {
        assert_eq!(
            TradeStatus::Pending.available_actions(TradeRole::Provider),
            vec![TradeAction::Accept, TradeAction::Reject]
        );
        assert!(TradeStatus::Pending.available_actions(TradeRole::Requester).is_empty());
        assert_eq!(
            TradeStatus::Accepted.available_actions(TradeRole::Requester),
            vec![TradeAction::Complete]
        );
        assert!(TradeStatus::Completed.available_actions(TradeRole::Provider).is_empty());
    }

    #[test]
    fn test_status_serializes_as_wire_name() {
        let json = serde_json::to_string(&TradeStatus::Accepted).unwrap();
        assert_eq!(json, "\"ACCEPTED\"");
        let parsed: TradeStatus = serde_json::from_str("\"REJECTED\"").unwrap();
        assert_eq!(parsed, TradeStatus::Rejected);
    }

    #[test]
    fn test_type_filter_admits() {
        assert!(TypeFilter::All.admits(ListingType::Skill));
        assert!(TypeFilter::Material.admits(ListingType::Material));
        assert!(!TypeFilter::Material.admits(ListingType::Skill));
        assert_eq!("materials".parse::<TypeFilter>().unwrap(), TypeFilter::Material);
    }

    #[test]
    fn test_theme_toggle_and_fallback() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::parse_or_default("dark"), Theme::Dark);
        assert_eq!(Theme::parse_or_default("sepia"), Theme::Light);
    }

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let a = TradeId::generate();
        let b = TradeId::generate();
        assert!(a.as_str().starts_with("t-"));
        assert_ne!(a, b);
    }
}
