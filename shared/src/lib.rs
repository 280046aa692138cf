//! Shared types for the Veritas booking system
//!
//! Domain models and sync message types used by both the booking server
//! and its connected clients.

pub mod message;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use message::{BookingSnapshot, SyncAction};
pub use models::{Booking, BookingCreate, Resource, ResourceKind, Session};
