//! Domain errors for the willcircle engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors surfaced by services and ports.
///
/// The taxonomy distinguishes caller mistakes (`Validation`,
/// `Authorization`, `InvalidStateTransition`) from transient store
/// failures (`StoreUnavailable`), which the scheduler retries on its
/// next tick and member-facing callers may retry themselves.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Will not found: {0}")]
    WillNotFound(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Transient errors are safe to retry without operator intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
