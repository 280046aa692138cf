//! Booking Repository
//!
//! Authoritative access to the booking table. `create_if_absent` is the
//! single point of mutual exclusion in the system: the CREATE commits
//! under the UNIQUE slot index, so concurrent reservations of the same
//! (resource, date, hour) resolve to exactly one winner.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::{Booking, BookingCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Projection used by every read: the surreal record id stays internal,
/// `booking_id` is the identity clients see.
const FIELDS: &str = "booking_id AS id, resource_id, date, hour, name, phone, note, created_at";

#[derive(Clone)]
pub struct BookingRepository {
    base: BaseRepository,
}

impl BookingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a booking iff no live booking holds the same
    /// (resource_id, date, hour). Atomic: the UNIQUE index rejects the
    /// loser of a race inside the store itself.
    ///
    /// Returns [`RepoError::Duplicate`] when the slot is already taken.
    pub async fn create_if_absent(&self, data: BookingCreate) -> RepoResult<Booking> {
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            resource_id: data.resource_id,
            date: data.date,
            hour: data.hour,
            name: data.name,
            phone: data.phone,
            note: String::new(),
            created_at: Utc::now().timestamp_millis(),
        };

        let response = self
            .base
            .db()
            .query(
                "CREATE type::thing('booking', $id) CONTENT { \
                    booking_id: $id, resource_id: $resource_id, date: $date, hour: $hour, \
                    name: $name, phone: $phone, note: $note, created_at: $created_at \
                } RETURN NONE",
            )
            .bind(("id", booking.id.clone()))
            .bind(("resource_id", booking.resource_id.clone()))
            .bind(("date", booking.date))
            .bind(("hour", booking.hour))
            .bind(("name", booking.name.clone()))
            .bind(("phone", booking.phone.clone()))
            .bind(("note", booking.note.clone()))
            .bind(("created_at", booking.created_at))
            .await?;

        match response.check() {
            Ok(_) => Ok(booking),
            Err(e) => Err(classify_create_error(e, &booking)),
        }
    }

    /// All live bookings, ordered by (date, hour, resource_id) ascending.
    pub async fn find_all(&self) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query(format!(
                "SELECT {FIELDS} FROM booking ORDER BY date, hour, resource_id"
            ))
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// Live bookings matching the optional predicates, same ordering as
    /// [`find_all`](Self::find_all).
    pub async fn find_filtered(
        &self,
        resource_id: Option<String>,
        date: Option<NaiveDate>,
    ) -> RepoResult<Vec<Booking>> {
        let mut conditions: Vec<&str> = Vec::new();
        if resource_id.is_some() {
            conditions.push("resource_id = $resource_id");
        }
        if date.is_some() {
            conditions.push("date = $date");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let mut query = self.base.db().query(format!(
            "SELECT {FIELDS} FROM booking{where_clause} ORDER BY date, hour, resource_id"
        ));
        if let Some(rid) = resource_id {
            query = query.bind(("resource_id", rid));
        }
        if let Some(d) = date {
            query = query.bind(("date", d));
        }

        let bookings: Vec<Booking> = query.await?.take(0)?;
        Ok(bookings)
    }

    /// Find booking by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query(format!("SELECT {FIELDS} FROM type::thing('booking', $id)"))
            .bind(("id", id.to_string()))
            .await?
            .take(0)?;
        Ok(bookings.into_iter().next())
    }

    /// Overwrite the operator note. Touches no other field; last write wins.
    ///
    /// Fails with [`RepoError::NotFound`] when the booking no longer exists
    /// (UPDATE on a missing record matches nothing — it never resurrects one).
    pub async fn update_note(&self, id: &str, note: &str) -> RepoResult<Booking> {
        let updated: Vec<String> = self
            .base
            .db()
            .query("UPDATE type::thing('booking', $id) SET note = $note RETURN VALUE booking_id")
            .bind(("id", id.to_string()))
            .bind(("note", note.to_string()))
            .await?
            .take(0)?;

        if updated.is_empty() {
            return Err(RepoError::NotFound(format!("Booking {id} not found")));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Booking {id} not found")))
    }

    /// Hard delete a booking. Returns whether a record was actually there,
    /// so callers can report an idempotent second delete as already gone.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let existed = self.find_by_id(id).await?.is_some();
        self.base
            .db()
            .query("DELETE type::thing('booking', $id)")
            .bind(("id", id.to_string()))
            .await?
            .check()?;
        Ok(existed)
    }
}

/// The embedded driver reports a UNIQUE index violation only through the
/// error text, so duplicates are classified by string matching.
fn classify_create_error(e: surrealdb::Error, booking: &Booking) -> RepoError {
    let msg = e.to_string();
    if msg.contains("already contains") || msg.contains("already exists") {
        RepoError::Duplicate(format!(
            "Slot {} {} {}:00 is already booked",
            booking.resource_id, booking.date, booking.hour
        ))
    } else {
        RepoError::Database(msg)
    }
}
