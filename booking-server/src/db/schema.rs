//! Schema definitions
//!
//! The booking table is SCHEMAFULL. The UNIQUE index on
//! (resource_id, date, hour) is what makes `reserve` an atomic conditional
//! insert: under a race between two administrators, the store accepts
//! exactly one CREATE and rejects the other. No client-side check is ever
//! the guard.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::repository::{RepoError, RepoResult};

const BOOKING_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS booking SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS booking_id ON TABLE booking TYPE string;
DEFINE FIELD IF NOT EXISTS resource_id ON TABLE booking TYPE string;
DEFINE FIELD IF NOT EXISTS date ON TABLE booking TYPE string;
DEFINE FIELD IF NOT EXISTS hour ON TABLE booking TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE booking TYPE string;
DEFINE FIELD IF NOT EXISTS phone ON TABLE booking TYPE option<string>;
DEFINE FIELD IF NOT EXISTS note ON TABLE booking TYPE string;
DEFINE FIELD IF NOT EXISTS created_at ON TABLE booking TYPE int;
DEFINE INDEX IF NOT EXISTS idx_booking_slot ON TABLE booking \
    COLUMNS resource_id, date, hour UNIQUE;
";

/// Apply the schema. Idempotent; runs on every startup.
pub async fn apply(db: &Surreal<Db>) -> RepoResult<()> {
    db.query(BOOKING_DDL)
        .await?
        .check()
        .map_err(|e| RepoError::Database(format!("Schema definition failed: {e}")))?;
    tracing::debug!("Booking schema applied");
    Ok(())
}
