//! Server configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/veritas/booking | Working directory (database, logs) |
//! | ENVIRONMENT | development | development / staging / production |
//! | PROVIDER_URL | http://localhost:3001 | Identity provider base URL |
//! | STORE_TIMEOUT_MS | 10000 | Bound on any single store call |
//! | READONLY_SECRET | (deployment default) | Shared read-only secret |
//! | ADMIN_ROSTER | (deployment default) | `name:secret:email` entries, comma separated |
//! | OPEN_HOURS | 19,20,21,22,23 | Bookable hours of day |

use shared::models::{Resource, ResourceKind};

/// One entry of the fixed administrator roster.
///
/// The secret gates the role locally; the email is the identity the
/// external provider exchange is keyed on. The roster is a lookup table,
/// not the final authority for admin sessions.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub name: String,
    pub secret: String,
    pub email: String,
}

/// Booking server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// development | staging | production
    pub environment: String,
    /// Identity provider base URL
    pub provider_url: String,
    /// Timeout for a single store/provider call (milliseconds)
    pub store_timeout_ms: u64,
    /// Shared secret granting read-only access
    pub readonly_secret: String,
    /// Fixed administrator roster
    pub admins: Vec<AdminAccount>,
    /// Fixed set of bookable resources
    pub resources: Vec<Resource>,
    /// Legal operating hours (hour-of-day values)
    pub open_hours: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// deployment defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/veritas/booking".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            provider_url: std::env::var("PROVIDER_URL")
                .unwrap_or_else(|_| "http://localhost:3001".into()),
            store_timeout_ms: std::env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            readonly_secret: std::env::var("READONLY_SECRET")
                .unwrap_or_else(|_| "veritas2024".into()),
            admins: std::env::var("ADMIN_ROSTER")
                .ok()
                .map(|v| parse_roster(&v))
                .filter(|r| !r.is_empty())
                .unwrap_or_else(default_roster),
            resources: default_resources(),
            open_hours: std::env::var("OPEN_HOURS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .filter_map(|h| h.trim().parse().ok())
                        .collect::<Vec<u8>>()
                })
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| vec![19, 20, 21, 22, 23]),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Look up a configured resource by id
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Whether `hour` is a legal operating hour
    pub fn is_open_hour(&self, hour: u8) -> bool {
        self.open_hours.contains(&hour)
    }
}

#[cfg(test)]
impl Config {
    /// Deterministic configuration for unit tests; ignores the environment.
    pub(crate) fn for_tests() -> Self {
        Self {
            work_dir: "/tmp/veritas-test".into(),
            environment: "development".into(),
            provider_url: "http://localhost:3001".into(),
            store_timeout_ms: 2_000,
            readonly_secret: "veritas2024".into(),
            admins: default_roster(),
            resources: default_resources(),
            open_hours: vec![19, 20, 21, 22, 23],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse `name:secret:email` entries separated by commas.
/// Malformed entries are skipped with a warning.
fn parse_roster(raw: &str) -> Vec<AdminAccount> {
    raw.split(',')
        .filter_map(|entry| {
            let mut parts = entry.trim().splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(secret), Some(email))
                    if !name.is_empty() && !secret.is_empty() && !email.is_empty() =>
                {
                    Some(AdminAccount {
                        name: name.to_string(),
                        secret: secret.to_string(),
                        email: email.to_string(),
                    })
                }
                _ => {
                    tracing::warn!(entry = %entry, "Skipping malformed ADMIN_ROSTER entry");
                    None
                }
            }
        })
        .collect()
}

fn default_roster() -> Vec<AdminAccount> {
    [
        ("Filippo", "filippo2024", "filippo@example.com"),
        ("Roberto", "roberto2024", "roberto@example.com"),
        ("Patrizia", "patrizia2024", "patrizia@example.com"),
    ]
    .into_iter()
    .map(|(name, secret, email)| AdminAccount {
        name: name.to_string(),
        secret: secret.to_string(),
        email: email.to_string(),
    })
    .collect()
}

fn default_resources() -> Vec<Resource> {
    vec![
        Resource::new("campo7a", "Campo 7 — A", "C7A", ResourceKind::Field),
        Resource::new("campo7b", "Campo 7 — B", "C7B", ResourceKind::Field),
        Resource::new("campo11", "Campo 11", "C11", ResourceKind::Field),
        Resource::new("clubhouse", "Club House", "CH", ResourceKind::Clubhouse),
    ]
}
