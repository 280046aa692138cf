//! Authentication module - session resolution and the identity provider seam

pub mod provider;
pub mod resolver;

pub use provider::{HttpIdentityProvider, IdentityProvider, MockIdentityProvider, ProviderError};
pub use resolver::SessionService;

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential matched neither the roster nor the read-only secret
    #[error("Credential not recognized")]
    InvalidCredential,

    /// Local secret matched but the external exchange was refused.
    /// Surfaced distinctly from [`AuthError::InvalidCredential`] for
    /// diagnostics; never retried automatically.
    #[error("Identity provider rejected the admin login: {0}")]
    ProviderRejected(String),

    /// Transient provider connectivity/timeout; safe to retry
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}
