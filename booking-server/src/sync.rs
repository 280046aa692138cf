//! Snapshot synchronization
//!
//! Every successful mutation publishes a full snapshot of the live booking
//! set on a broadcast bus. Connected clients hold a [`ClientMirror`] and
//! replace it wholesale on each snapshot; nothing is merged incrementally,
//! so a mirror can never drift from the store by missing one delta.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use tokio::sync::broadcast;

use shared::message::{BookingSnapshot, SyncAction};
use shared::models::Booking;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast bus carrying versioned full snapshots to every subscriber.
#[derive(Clone)]
pub struct SyncBus {
    tx: broadcast::Sender<BookingSnapshot>,
    version: Arc<AtomicU64>,
}

impl Default for SyncBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            tx,
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingSnapshot> {
        self.tx.subscribe()
    }

    /// Publish the post-mutation state of the whole booking set.
    ///
    /// Versions are strictly monotonic per bus; subscribers use them to
    /// drop stale snapshots that arrive out of order.
    pub fn publish(
        &self,
        action: SyncAction,
        booking_id: impl Into<String>,
        bookings: Vec<Booking>,
    ) -> u64 {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = BookingSnapshot {
            version,
            action,
            booking_id: booking_id.into(),
            bookings,
        };
        tracing::debug!(
            version,
            action = ?snapshot.action,
            count = snapshot.bookings.len(),
            "Publishing booking snapshot"
        );
        // Send fails only when no subscriber is connected, which is fine.
        let _ = self.tx.send(snapshot);
        version
    }

    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

/// Client-side replica of the booking set.
///
/// Purely a view cache: lookups against it answer display questions, but
/// reservation decisions are made by the store, never by this mirror.
#[derive(Debug, Default, Clone)]
pub struct ClientMirror {
    version: u64,
    bookings: Vec<Booking>,
}

impl ClientMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirror contents with an incoming snapshot.
    ///
    /// Returns `false` (leaving the mirror untouched) when the snapshot is
    /// not newer than what the mirror already holds.
    pub fn apply(&mut self, snapshot: BookingSnapshot) -> bool {
        if snapshot.version <= self.version {
            return false;
        }
        self.version = snapshot.version;
        self.bookings = snapshot.bookings;
        true
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Forget everything. Called after the subscription lagged or dropped;
    /// the next snapshot (whatever its version) becomes the new baseline.
    pub fn reset(&mut self) {
        self.version = 0;
        self.bookings.clear();
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Occupant of a single slot, if any
    pub fn slot(&self, resource_id: &str, date: NaiveDate, hour: u8) -> Option<&Booking> {
        self.bookings
            .iter()
            .find(|b| b.resource_id == resource_id && b.date == date && b.hour == hour)
    }

    /// All mirrored bookings for one day
    pub fn for_day(&self, date: NaiveDate) -> Vec<&Booking> {
        self.bookings.iter().filter(|b| b.date == date).collect()
    }
}
