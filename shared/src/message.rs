//! Sync messages
//!
//! The booking store pushes a full snapshot of all live bookings to every
//! subscriber on each committed mutation. Clients replace their local
//! mirror with the snapshot; they never merge into it.

use serde::{Deserialize, Serialize};

use crate::models::Booking;

/// Which mutation produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    NoteUpdated,
    Deleted,
}

/// A consistent snapshot of all live bookings, ordered by
/// (date, hour, resource_id) ascending.
///
/// `version` increases monotonically per server instance; a client that
/// receives a version lower than the one it already holds discards the
/// snapshot as stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSnapshot {
    pub version: u64,
    pub action: SyncAction,
    /// Id of the booking the mutation touched
    pub booking_id: String,
    pub bookings: Vec<Booking>,
}
