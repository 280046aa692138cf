//! Database Module
//!
//! Embedded SurrealDB holding the authoritative booking replica.

pub mod repository;
pub mod schema;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use repository::{RepoError, RepoResult};

const NAMESPACE: &str = "veritas";
const DATABASE: &str = "bookings";

/// Database service — owns the embedded SurrealDB instance
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the on-disk database under `work_dir/database` and apply the schema.
    pub async fn new(work_dir: &str) -> RepoResult<Self> {
        let db_path = Path::new(work_dir).join("database");
        std::fs::create_dir_all(&db_path)
            .map_err(|e| RepoError::Database(format!("Failed to create database dir: {e}")))?;

        let db = Surreal::new::<RocksDb>(db_path.to_string_lossy().as_ref()).await?;
        Self::prepare(db).await
    }

    /// Open an in-memory database. Used by tests and one-shot tooling.
    pub async fn open_in_memory() -> RepoResult<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> RepoResult<Self> {
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        schema::apply(&db).await?;
        tracing::info!("Database ready (ns={NAMESPACE}, db={DATABASE})");
        Ok(Self { db })
    }
}
