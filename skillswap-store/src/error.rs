//! Storage layer errors

use skillswap_domain::TradeStatus;
use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity (user, listing, trade)
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Duplicate entity (id already taken)
    #[error("Duplicate entity: {entity_type} with id {id}")]
    Duplicate {
        /// Type of entity
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Compare-and-swap lost: the stored status moved under us
    #[error("Conflicting update on trade {id}: expected {expected}, found {actual}")]
    Conflict {
        /// Trade ID
        id: String,
        /// Status the caller based its decision on
        expected: TradeStatus,
        /// Status actually stored
        actual: TradeStatus,
    },

    /// Local storage refused a value larger than its quota
    #[error("Storage quota exceeded for key {key}: {size} bytes > {quota} bytes")]
    QuotaExceeded {
        /// Storage key
        key: String,
        /// Size of the rejected value
        size: usize,
        /// Configured quota
        quota: usize,
    },

    /// Storage key outside the allowed alphabet
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(String),

    /// A writer panicked while holding a lock
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Domain error passthrough
    #[error("Domain error: {0}")]
    Domain(#[from] skillswap_domain::DomainError),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a duplicate error
    pub fn duplicate(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// True for the soft, non-fatal persistence failure
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
