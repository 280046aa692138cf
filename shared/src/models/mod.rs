//! Domain models

pub mod booking;
pub mod resource;
pub mod session;

pub use booking::{Booking, BookingCreate};
pub use resource::{Resource, ResourceKind};
pub use session::Session;
