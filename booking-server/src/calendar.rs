//! Calendar navigation
//!
//! Pure date arithmetic for the week view: the 7-day window containing a
//! reference date (Monday first), week paging, and past/current slot
//! classification. No state, no suspension points.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

/// Calendar errors
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Whether a slot lies in the past or not, relative to wall-clock time.
///
/// Used only to disable mutation in presentation layers; the engine itself
/// accepts past dates because uniqueness is the only hard invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotClass {
    Past,
    CurrentOrFuture,
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(input: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| CalendarError::InvalidDate(input.to_string()))
}

/// Monday..Sunday of the ISO week containing `reference`.
///
/// Monday is always first, regardless of locale.
pub fn week_window(reference: NaiveDate) -> [NaiveDate; 7] {
    let monday = reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Offset `reference` by `delta_weeks` whole weeks. Used to page the week view.
pub fn shift_week(reference: NaiveDate, delta_weeks: i64) -> NaiveDate {
    reference + Duration::days(7 * delta_weeks)
}

/// Classify a slot against `now`.
///
/// A slot is `Past` if its date is strictly before today, or its date is
/// today and its hour is strictly before the current hour. Comparison is
/// by calendar day only, except for today's hours where the wall-clock
/// hour counts.
pub fn classify(date: NaiveDate, hour: u8, now: NaiveDateTime) -> SlotClass {
    let today = now.date();
    if date < today || (date == today && (hour as u32) < now.hour()) {
        SlotClass::Past
    } else {
        SlotClass::CurrentOrFuture
    }
}
