//! Engine error types.

use skillswap_domain::{DomainError, ListingId, TradeId, TradeRole, TradeStatus, UserId};
use skillswap_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the marketplace services.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or malformed input, rejected before any mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lookup miss
    #[error("{entity_type} not found: {id}")]
    NotFound {
        /// user, listing or trade
        entity_type: String,
        /// Requested id
        id: String,
    },

    /// No edge between the two statuses
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: TradeStatus,
        /// Requested status
        to: TradeStatus,
    },

    /// The edge exists but not for this role
    #[error("The {role} may not move a trade from {from} to {to}")]
    ActorNotPermitted {
        /// Role of the acting user
        role: TradeRole,
        /// Current status
        from: TradeStatus,
        /// Requested status
        to: TradeStatus,
    },

    /// Actor is not a party to the trade, or not the profile owner
    #[error("User {user_id} is not allowed to act on {target}")]
    Unauthorized {
        /// Acting user
        user_id: UserId,
        /// What they tried to act on
        target: String,
    },

    /// A listing in a proposal does not belong to the expected user
    #[error("Listing {listing_id} is not owned by {expected_owner}")]
    OwnershipMismatch {
        /// Offending listing
        listing_id: ListingId,
        /// Who should own it
        expected_owner: UserId,
    },

    /// Requester and provider are the same user
    #[error("User {0} cannot trade with themself")]
    SelfTrade(UserId),

    /// Operation needs a signed-in user
    #[error("No active user")]
    NoActiveUser,

    /// Store error
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Domain error without a dedicated mapping
    #[error("Domain error: {0}")]
    Domain(DomainError),
}

impl EngineError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Trade lookup miss
    pub fn trade_not_found(id: &TradeId) -> Self {
        Self::not_found("trade", id.as_str())
    }
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => EngineError::Validation(msg),
            DomainError::InvalidEmail(email) => {
                EngineError::Validation(format!("invalid email address: {email}"))
            },
            DomainError::InvalidTransition { from, to } => {
                EngineError::InvalidTransition { from, to }
            },
            DomainError::ActorNotPermitted { role, from, to } => {
                EngineError::ActorNotPermitted { role, from, to }
            },
            DomainError::SelfTrade(user_id) => EngineError::SelfTrade(user_id),
            other => EngineError::Domain(other),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity_type, id } => EngineError::NotFound { entity_type, id },
            StoreError::Domain(domain) => domain.into(),
            other => EngineError::Store(other),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
