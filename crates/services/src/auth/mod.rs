//! Sign-in against the remote identity service.

use std::fmt;

use async_trait::async_trait;
use tracker_core::model::{PatientSummary, UserIdentity};

use crate::error::AuthError;

mod http;
mod memory;
mod service;

pub use http::{HttpIdentityProvider, IdentityConfig};
pub use memory::InMemoryIdentityProvider;
pub use service::AuthService;

/// A signed-in user and the bearer token that proves it.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub user: UserIdentity,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Result of registering a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    /// The service sent a confirmation mail; no session yet.
    ConfirmationRequired { email: String },
}

/// Remote identity service contract.
///
/// Implementations report the role the service assigned; callers never derive
/// it from the email.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email/password pair.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::Rejected` if the service refuses the registration.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    /// Resolve the user behind a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with status 401 for an expired or unknown
    /// token.
    async fn get_user(&self, access_token: &str) -> Result<UserIdentity, AuthError>;

    /// Revoke a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the service cannot be reached or refuses.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Every non-administrator account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token may not read the user table.
    async fn list_patients(&self, access_token: &str) -> Result<Vec<PatientSummary>, AuthError>;
}
