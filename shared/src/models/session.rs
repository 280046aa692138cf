//! Session Model

use serde::{Deserialize, Serialize};

/// Authorization state of one connected client.
///
/// Ephemeral and client-local; never persisted as domain data. Every
/// mutating engine call takes the current session explicitly and
/// re-validates it, so there is no ambient global session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Session {
    /// Not authenticated
    Absent,
    /// Shared read-only observer; may only view bookings
    ReadOnly,
    /// Named administrator; may reserve, annotate and release
    Admin { name: String },
}

impl Session {
    pub fn admin(name: impl Into<String>) -> Self {
        Self::Admin { name: name.into() }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Admin identity, if this is an admin session
    pub fn admin_name(&self) -> Option<&str> {
        match self {
            Self::Admin { name } => Some(name),
            _ => None,
        }
    }
}
