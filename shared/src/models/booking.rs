//! Booking Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One reserved hour on one resource on one date.
///
/// The logical key (resource_id, date, hour) is unique among all live
/// bookings; `id` is the store-assigned record identity and is distinct
/// from the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Store-assigned record id (UUID)
    pub id: String,
    pub resource_id: String,
    /// Calendar day, no time component
    pub date: NaiveDate,
    /// Hour of day; must be one of the configured operating hours
    pub hour: u8,
    /// Borrower name, non-empty after trimming
    pub name: String,
    /// Borrower contact, optional
    #[serde(default)]
    pub phone: Option<String>,
    /// Operator note; mutable independently of the rest, last write wins
    #[serde(default)]
    pub note: String,
    /// Store-assigned creation timestamp (epoch millis, informational)
    pub created_at: i64,
}

/// Create booking payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreate {
    pub resource_id: String,
    pub date: NaiveDate,
    pub hour: u8,
    pub name: String,
    pub phone: Option<String>,
}
