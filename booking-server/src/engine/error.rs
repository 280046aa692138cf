//! Reservation engine errors

use thiserror::Error;

use crate::db::repository::RepoError;
use shared::models::ResourceKind;

/// Errors surfaced by reservation operations.
///
/// None of these is fatal to the process: the caller decides between
/// re-prompting, retrying, or abandoning the operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before any store call; recoverable by re-prompting
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The session lacks the required role; never retried automatically
    #[error("Operation requires an administrator session")]
    Unauthorized,

    /// Another booking already holds the slot. Carries the resource so the
    /// caller can phrase the conflict (clubhouse slots host events, field
    /// slots host bookings).
    #[error("Slot on {resource_id} is already taken")]
    SlotTaken {
        resource_id: String,
        kind: ResourceKind,
    },

    /// The target booking vanished, usually removed concurrently by
    /// another administrator
    #[error("Booking not found: {0}")]
    NotFound(String),

    /// The store did not answer within the configured bound; transient,
    /// safe to retry
    #[error("Booking store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other store failure
    #[error("Booking store error: {0}")]
    Store(String),
}

impl EngineError {
    /// Operator-facing phrasing of a slot conflict.
    pub fn user_message(&self) -> String {
        match self {
            Self::SlotTaken {
                kind: ResourceKind::Clubhouse,
                ..
            } => "An event is already scheduled in this slot".to_string(),
            Self::SlotTaken { .. } => "The field is already booked in this slot".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<RepoError> for EngineError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => Self::NotFound(msg),
            RepoError::Validation(msg) => Self::InvalidInput(msg),
            // Duplicate is mapped at the call site, where the resource is known
            RepoError::Duplicate(msg) | RepoError::Database(msg) => Self::Store(msg),
        }
    }
}
