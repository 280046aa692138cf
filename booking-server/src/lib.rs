//! Veritas Booking Server - reservation engine for the sports centre
//!
//! The node that owns the authoritative booking replica and pushes
//! consistent snapshots to every connected client.
//!
//! # Module structure
//!
//! ```text
//! booking-server/src/
//! ├── core/          # Config, server state
//! ├── calendar.rs    # Week windows, past/current slot classification
//! ├── auth/          # Session resolver, identity provider
//! ├── db/            # Embedded SurrealDB, booking repository
//! ├── engine/        # Reservation engine (reserve/annotate/release/query)
//! ├── sync.rs        # Snapshot fan-out bus, client mirror
//! ├── export.rs      # Tabular export
//! └── utils/         # Logger, validation helpers
//! ```
//!
//! The single hard invariant lives in `db`/`engine`: at most one live
//! booking per (resource, date, hour), enforced by an atomic conditional
//! insert against the store, never by a client-side cache check.

pub mod auth;
pub mod calendar;
pub mod core;
pub mod db;
pub mod engine;
pub mod export;
pub mod sync;
pub mod utils;

// Re-export public types
pub use auth::{AuthError, IdentityProvider, SessionService};
pub use crate::core::{Config, ServerState};
pub use engine::{EngineError, ReleaseOutcome, ReservationEngine, ReserveRequest};
pub use sync::{ClientMirror, SyncBus};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load environment, create the working directory tree and start logging.
/// Returns the loaded configuration.
pub fn setup_environment() -> std::io::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    std::fs::create_dir_all(&config.work_dir)?;
    let log_dir = std::path::Path::new(&config.work_dir).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    if config.is_production() {
        init_logger_with_file(Some("info"), log_dir.to_str());
    } else {
        init_logger();
    }
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
 _    __          _ __
| |  / /__  _____(_) /_____ ______
| | / / _ \/ ___/ / __/ __ `/ ___/
| |/ /  __/ /  / / /_/ /_/ (__  )
|___/\___/_/  /_/\__/\__,_/____/
    booking server
    "#
    );
}
