//! Reservation Engine
//!
//! The single authority for mutating the booking set. Every mutating
//! operation takes the caller's [`Session`] explicitly and re-validates it,
//! so a session demoted by the identity provider is rejected even when the
//! client still believes it is an administrator. Uniqueness is enforced by
//! the store's atomic conditional insert, never by a local-mirror check.

pub mod error;

pub use error::EngineError;

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::auth::SessionService;
use crate::core::Config;
use crate::db::repository::{BookingRepository, RepoError, RepoResult};
use crate::sync::SyncBus;
use crate::utils::validation;
use shared::message::SyncAction;
use shared::models::{Booking, BookingCreate, Resource, Session};

/// Parameters of one reservation attempt.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub resource_id: String,
    pub date: NaiveDate,
    pub hour: u8,
    pub name: String,
    pub phone: Option<String>,
}

/// Outcome of a release. A booking that was already gone is reported as
/// satisfied, not as a failure; deleting twice must never look like
/// corruption to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    AlreadyGone,
}

#[derive(Clone)]
pub struct ReservationEngine {
    repo: BookingRepository,
    bus: SyncBus,
    sessions: SessionService,
    resources: Vec<Resource>,
    open_hours: Vec<u8>,
    store_timeout: Duration,
}

impl ReservationEngine {
    pub fn new(
        config: &Config,
        repo: BookingRepository,
        bus: SyncBus,
        sessions: SessionService,
    ) -> Self {
        Self {
            repo,
            bus,
            sessions,
            resources: config.resources.clone(),
            open_hours: config.open_hours.clone(),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }

    /// Reserve a slot for a borrower.
    ///
    /// Past dates are deliberately accepted: keeping operators from
    /// back-dating is a front-end courtesy, while the only hard invariant
    /// here is slot uniqueness.
    pub async fn reserve(
        &self,
        session: &Session,
        request: ReserveRequest,
    ) -> Result<Booking, EngineError> {
        self.require_admin(session)?;

        let name = validation::normalized_name(&request.name).ok_or_else(|| {
            EngineError::InvalidInput("Borrower name must be non-empty and reasonably short".into())
        })?;
        if !self.open_hours.contains(&request.hour) {
            return Err(EngineError::InvalidInput(format!(
                "{}:00 is outside the operating hours",
                request.hour
            )));
        }
        let resource = self
            .resources
            .iter()
            .find(|r| r.id == request.resource_id)
            .ok_or_else(|| {
                EngineError::InvalidInput(format!("Unknown resource: {}", request.resource_id))
            })?;

        let create = BookingCreate {
            resource_id: request.resource_id,
            date: request.date,
            hour: request.hour,
            name,
            phone: validation::normalized_phone(request.phone.as_deref()),
        };

        let booking = match self.bounded(self.repo.create_if_absent(create)).await? {
            Ok(booking) => booking,
            Err(RepoError::Duplicate(_)) => {
                return Err(EngineError::SlotTaken {
                    resource_id: resource.id.clone(),
                    kind: resource.kind,
                });
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            booking_id = %booking.id,
            resource = %booking.resource_id,
            date = %booking.date,
            hour = booking.hour,
            admin = session.admin_name().unwrap_or("?"),
            "Booking created"
        );
        self.broadcast(SyncAction::Created, &booking.id).await;
        Ok(booking)
    }

    /// Overwrite the operator note on a booking. Last write wins; no other
    /// field is touched.
    pub async fn annotate(
        &self,
        session: &Session,
        booking_id: &str,
        note: &str,
    ) -> Result<Booking, EngineError> {
        self.require_admin(session)?;

        let note = note.trim();
        if note.len() > validation::MAX_NOTE_LEN {
            return Err(EngineError::InvalidInput(format!(
                "Note is too long ({} chars, max {})",
                note.len(),
                validation::MAX_NOTE_LEN
            )));
        }

        let booking = self
            .bounded(self.repo.update_note(booking_id, note))
            .await?
            .map_err(EngineError::from)?;

        info!(booking_id = %booking.id, "Booking note updated");
        self.broadcast(SyncAction::NoteUpdated, &booking.id).await;
        Ok(booking)
    }

    /// Remove a booking. Idempotent: releasing an id that is already gone
    /// reports [`ReleaseOutcome::AlreadyGone`].
    pub async fn release(
        &self,
        session: &Session,
        booking_id: &str,
    ) -> Result<ReleaseOutcome, EngineError> {
        self.require_admin(session)?;

        let existed = self
            .bounded(self.repo.delete(booking_id))
            .await?
            .map_err(EngineError::from)?;
        if !existed {
            return Ok(ReleaseOutcome::AlreadyGone);
        }

        info!(booking_id = %booking_id, "Booking released");
        self.broadcast(SyncAction::Deleted, booking_id).await;
        Ok(ReleaseOutcome::Released)
    }

    /// Current bookings matching the optional predicates, ordered by
    /// (date, hour, resource) ascending. Open to both roles; no field is
    /// redacted for read-only observers.
    pub async fn query(
        &self,
        session: &Session,
        resource_id: Option<String>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Booking>, EngineError> {
        if !session.is_authenticated() {
            return Err(EngineError::Unauthorized);
        }
        self.bounded(self.repo.find_filtered(resource_id, date))
            .await?
            .map_err(EngineError::from)
    }

    /// Subscribe to the snapshot stream fed by every committed mutation.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<shared::BookingSnapshot> {
        self.bus.subscribe()
    }

    fn require_admin(&self, session: &Session) -> Result<(), EngineError> {
        if session.is_admin() && self.sessions.is_live(session) {
            Ok(())
        } else {
            Err(EngineError::Unauthorized)
        }
    }

    /// Fan the post-mutation state out to every subscriber. The mutation is
    /// already committed at this point, so a snapshot read failure is logged
    /// rather than turned into a caller-visible error.
    async fn broadcast(&self, action: SyncAction, booking_id: &str) {
        match self.bounded(self.repo.find_all()).await {
            Ok(Ok(bookings)) => {
                self.bus.publish(action, booking_id, bookings);
            }
            Ok(Err(e)) => warn!("Snapshot broadcast skipped, store read failed: {e}"),
            Err(e) => warn!("Snapshot broadcast skipped: {e}"),
        }
    }

    /// Bound any store call by the configured timeout. A call that does not
    /// resolve in time surfaces as [`EngineError::StoreUnavailable`] instead
    /// of hanging the caller.
    async fn bounded<T>(
        &self,
        operation: impl Future<Output = RepoResult<T>>,
    ) -> Result<RepoResult<T>, EngineError> {
        tokio::time::timeout(self.store_timeout, operation)
            .await
            .map_err(|_| EngineError::StoreUnavailable("store call timed out".to_string()))
    }
}

#[cfg(test)]
mod tests;
