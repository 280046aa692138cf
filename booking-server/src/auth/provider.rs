//! Identity provider seam
//!
//! An admin session requires more than a roster match: the provider must
//! confirm the identity, and it can later signal that the credential is no
//! longer valid, forcing session teardown. The HTTP implementation talks
//! to the real provider; the mock ships for tests and local development.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider refused the exchange (bad identity, revoked account)
    #[error("exchange refused: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered abnormally
    #[error("provider unreachable: {0}")]
    Unavailable(String),
}

/// External identity authority for administrator sessions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange an admin's identity and secret for a confirmed login.
    async fn exchange(&self, email: &str, secret: &str) -> Result<(), ProviderError>;

    /// Stream of admin names whose credentials were invalidated after
    /// login. Subscribers must demote the matching sessions.
    fn subscribe_invalidations(&self) -> broadcast::Receiver<String>;
}

const INVALIDATION_CHANNEL_CAPACITY: usize = 64;

/// Identity provider backed by an HTTP credential-exchange endpoint.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    invalidation_tx: broadcast::Sender<String>,
}

impl HttpIdentityProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let (invalidation_tx, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            invalidation_tx,
        }
    }

    /// Feed an externally received invalidation (webhook, poller) into the
    /// invalidation stream.
    pub fn notify_invalidated(&self, admin_name: impl Into<String>) {
        let name = admin_name.into();
        tracing::warn!(admin = %name, "Identity provider invalidated an admin credential");
        let _ = self.invalidation_tx.send(name);
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn exchange(&self, email: &str, secret: &str) -> Result<(), ProviderError> {
        let url = format!("{}/v1/sessions", self.base_url);
        let body = serde_json::json!({ "email": email, "secret": secret });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(ProviderError::Rejected(format!(
                "provider answered {status}"
            )))
        } else {
            Err(ProviderError::Unavailable(format!(
                "provider answered {status}"
            )))
        }
    }

    fn subscribe_invalidations(&self) -> broadcast::Receiver<String> {
        self.invalidation_tx.subscribe()
    }
}

#[derive(Debug, Clone, Copy)]
enum MockBehavior {
    Accept,
    Reject,
    /// Never answer, as a dead upstream would
    Stall,
}

/// In-process provider for tests and local development: accepts, rejects or
/// stalls every exchange, and lets the caller trigger invalidations by hand.
pub struct MockIdentityProvider {
    behavior: MockBehavior,
    invalidation_tx: broadcast::Sender<String>,
}

impl MockIdentityProvider {
    pub fn accepting() -> Self {
        Self::new(MockBehavior::Accept)
    }

    pub fn rejecting() -> Self {
        Self::new(MockBehavior::Reject)
    }

    /// A provider whose exchange never resolves; callers must hit their
    /// own timeout.
    pub fn stalling() -> Self {
        Self::new(MockBehavior::Stall)
    }

    fn new(behavior: MockBehavior) -> Self {
        let (invalidation_tx, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        Self {
            behavior,
            invalidation_tx,
        }
    }

    /// Simulate the provider revoking an admin's credential.
    pub fn invalidate(&self, admin_name: impl Into<String>) {
        let _ = self.invalidation_tx.send(admin_name.into());
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn exchange(&self, email: &str, _secret: &str) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Accept => Ok(()),
            MockBehavior::Reject => Err(ProviderError::Rejected(format!("{email} not accepted"))),
            MockBehavior::Stall => std::future::pending().await,
        }
    }

    fn subscribe_invalidations(&self) -> broadcast::Receiver<String> {
        self.invalidation_tx.subscribe()
    }
}
