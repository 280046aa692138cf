//! Session resolution
//!
//! One shared secret grants read-only access; each administrator holds a
//! personal secret that must additionally be confirmed by the identity
//! provider. Admin secrets are matched first, so a collision between an
//! admin secret and the shared secret resolves to the privileged session.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::provider::{IdentityProvider, ProviderError};
use super::AuthError;
use crate::core::{AdminAccount, Config};
use shared::Session;

/// Resolves credentials into sessions and tracks which admin sessions are
/// still live, so a provider-side invalidation demotes the session before
/// its next privileged operation.
///
/// Liveness is tracked per admin name, not per connected client: each
/// roster entry is one person holding one session at a time. Logging the
/// admin out anywhere, or a provider invalidation, ends that admin's
/// liveness everywhere.
#[derive(Clone)]
pub struct SessionService {
    readonly_secret: String,
    admins: Arc<Vec<AdminAccount>>,
    provider: Arc<dyn IdentityProvider>,
    live_admins: Arc<DashMap<String, ()>>,
    exchange_timeout: Duration,
    shutdown: CancellationToken,
}

impl SessionService {
    pub fn new(config: &Config, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            readonly_secret: config.readonly_secret.clone(),
            admins: Arc::new(config.admins.clone()),
            provider,
            live_admins: Arc::new(DashMap::new()),
            exchange_timeout: Duration::from_millis(config.store_timeout_ms),
            shutdown: CancellationToken::new(),
        }
    }

    /// Resolve a submitted credential into a session.
    ///
    /// The match is tried against the admin roster before the shared
    /// read-only secret. An admin match still requires the provider
    /// exchange to succeed; a refused or unreachable exchange never falls
    /// back to a read-only session.
    pub async fn authenticate(&self, credential: &str) -> Result<Session, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::InvalidCredential);
        }

        if let Some(admin) = self.admins.iter().find(|a| a.secret == credential) {
            return self.confirm_admin(admin).await;
        }

        if credential == self.readonly_secret {
            return Ok(Session::ReadOnly);
        }

        Err(AuthError::InvalidCredential)
    }

    async fn confirm_admin(&self, admin: &AdminAccount) -> Result<Session, AuthError> {
        let exchange = self.provider.exchange(&admin.email, &admin.secret);
        match tokio::time::timeout(self.exchange_timeout, exchange).await {
            Err(_) => Err(AuthError::ProviderUnavailable(
                "credential exchange timed out".to_string(),
            )),
            Ok(Err(ProviderError::Unavailable(msg))) => Err(AuthError::ProviderUnavailable(msg)),
            Ok(Err(ProviderError::Rejected(msg))) => {
                warn!(admin = %admin.name, "Identity provider refused admin login: {msg}");
                Err(AuthError::ProviderRejected(msg))
            }
            Ok(Ok(())) => {
                self.live_admins.insert(admin.name.clone(), ());
                info!(admin = %admin.name, "Administrator session established");
                Ok(Session::admin(&admin.name))
            }
        }
    }

    /// End a session. Always lands on [`Session::Absent`], whatever state
    /// the session was in. For an admin this drops the name from the live
    /// set, so any other copy of the session stops being honored too.
    pub fn deauthenticate(&self, session: &Session) -> Session {
        if let Some(name) = session.admin_name() {
            self.live_admins.remove(name);
            info!(admin = %name, "Administrator session ended");
        }
        Session::Absent
    }

    /// Whether the session is still honored. Admin sessions stop being
    /// honored the moment the provider invalidates their credential.
    pub fn is_live(&self, session: &Session) -> bool {
        match session {
            Session::Absent => false,
            Session::ReadOnly => true,
            Session::Admin { name } => self.live_admins.contains_key(name),
        }
    }

    /// Drop a live admin session in response to a provider invalidation.
    pub fn revoke(&self, admin_name: &str) {
        if self.live_admins.remove(admin_name).is_some() {
            warn!(admin = %admin_name, "Administrator session revoked by identity provider");
        }
    }

    /// Listen for provider invalidations in the background until shutdown.
    pub fn spawn_invalidation_listener(&self) {
        let mut rx = self.provider.subscribe_invalidations();
        let service = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = service.shutdown.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(name) => service.revoke(&name),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "Invalidation listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MockIdentityProvider;

    fn test_config() -> Config {
        Config::for_tests()
    }

    fn service_with(provider: MockIdentityProvider) -> (SessionService, Arc<MockIdentityProvider>) {
        let provider = Arc::new(provider);
        let service = SessionService::new(&test_config(), provider.clone());
        (service, provider)
    }

    #[tokio::test]
    async fn test_shared_secret_grants_readonly() {
        let (service, _) = service_with(MockIdentityProvider::accepting());
        let session = service.authenticate("veritas2024").await.unwrap();
        assert_eq!(session, Session::ReadOnly);
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn test_admin_secret_grants_admin() {
        let (service, _) = service_with(MockIdentityProvider::accepting());
        let session = service.authenticate("filippo2024").await.unwrap();
        assert!(session.is_admin());
        assert_eq!(session.admin_name(), Some("Filippo"));
        assert!(service.is_live(&session));
    }

    #[tokio::test]
    async fn test_credential_is_trimmed() {
        let (service, _) = service_with(MockIdentityProvider::accepting());
        let session = service.authenticate("  veritas2024  ").await.unwrap();
        assert_eq!(session, Session::ReadOnly);
    }

    #[tokio::test]
    async fn test_unknown_credential_rejected() {
        let (service, _) = service_with(MockIdentityProvider::accepting());
        let result = service.authenticate("wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredential)));

        let result = service.authenticate("   ").await;
        assert!(matches!(result, Err(AuthError::InvalidCredential)));
    }

    #[tokio::test]
    async fn test_provider_rejection_never_falls_back_to_readonly() {
        let (service, _) = service_with(MockIdentityProvider::rejecting());
        let result = service.authenticate("filippo2024").await;
        assert!(matches!(result, Err(AuthError::ProviderRejected(_))));
    }

    #[tokio::test]
    async fn test_stalled_exchange_surfaces_provider_unavailable() {
        let mut config = test_config();
        config.store_timeout_ms = 50;
        let service = SessionService::new(&config, Arc::new(MockIdentityProvider::stalling()));

        let result = service.authenticate("filippo2024").await;
        assert!(matches!(result, Err(AuthError::ProviderUnavailable(_))));
        // The timed-out admin never became live
        assert!(!service.is_live(&Session::admin("Filippo")));
    }

    #[tokio::test]
    async fn test_invalidation_revokes_live_session() {
        let (service, provider) = service_with(MockIdentityProvider::accepting());
        service.spawn_invalidation_listener();

        let session = service.authenticate("filippo2024").await.unwrap();
        assert!(service.is_live(&session));

        provider.invalidate("Filippo");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!service.is_live(&session));

        service.shutdown();
    }

    #[tokio::test]
    async fn test_deauthenticate_lands_on_absent() {
        let (service, _) = service_with(MockIdentityProvider::accepting());
        let session = service.authenticate("filippo2024").await.unwrap();
        let after = service.deauthenticate(&session);
        assert_eq!(after, Session::Absent);
        assert!(!service.is_live(&session));
    }
}
