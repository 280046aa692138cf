//! Server state - wires every service together
//!
//! All fields are cheap to clone: services share their internals through
//! `Arc`, so handing a `ServerState` to a task copies references, not data.

use std::sync::Arc;

use anyhow::Context;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{HttpIdentityProvider, IdentityProvider, SessionService};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::BookingRepository;
use crate::engine::ReservationEngine;
use crate::sync::SyncBus;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub sessions: SessionService,
    pub engine: ReservationEngine,
    pub bus: SyncBus,
}

impl ServerState {
    /// Initialize the full service stack against the on-disk database and
    /// the HTTP identity provider named by the configuration.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let provider = Arc::new(HttpIdentityProvider::new(config.provider_url.clone()));
        Self::initialize_with_provider(config, provider, false).await
    }

    /// Initialize against an explicit provider and, optionally, an
    /// in-memory database. Used by tests and one-shot tooling.
    pub async fn initialize_with_provider(
        config: &Config,
        provider: Arc<dyn IdentityProvider>,
        in_memory: bool,
    ) -> anyhow::Result<Self> {
        let db_service = if in_memory {
            DbService::open_in_memory().await
        } else {
            DbService::new(&config.work_dir).await
        }
        .context("Failed to initialize database")?;
        let db = db_service.db;

        let sessions = SessionService::new(config, provider);
        let bus = SyncBus::new();
        let engine = ReservationEngine::new(
            config,
            BookingRepository::new(db.clone()),
            bus.clone(),
            sessions.clone(),
        );

        Ok(Self {
            config: config.clone(),
            db,
            sessions,
            engine,
            bus,
        })
    }

    /// Start background tasks. Currently only the provider invalidation
    /// listener, which demotes revoked admin sessions.
    pub fn start_background_tasks(&self) {
        self.sessions.spawn_invalidation_listener();
    }

    /// Stop background tasks.
    pub fn shutdown(&self) {
        self.sessions.shutdown();
    }
}
