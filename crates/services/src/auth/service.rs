use std::sync::{Arc, Mutex};

use storage::repository::{SessionRepository, StoredSession};
use tracing::{info, warn};
use tracker_core::model::{PatientSummary, UserIdentity};

use super::{AuthSession, IdentityProvider, SignUpOutcome};
use crate::error::AuthError;

/// Tracks the signed-in user and keeps the session persisted between runs.
///
/// A failed call never changes the current session.
#[derive(Clone)]
pub struct AuthService {
    provider: Option<Arc<dyn IdentityProvider>>,
    sessions: Arc<dyn SessionRepository>,
    current: Arc<Mutex<Option<AuthSession>>>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        provider: Option<Arc<dyn IdentityProvider>>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            provider,
            sessions,
            current: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn IdentityProvider>, AuthError> {
        self.provider.as_ref().ok_or(AuthError::NotConfigured)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.current
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|session| session.user.clone()))
    }

    fn current_session(&self) -> Option<AuthSession> {
        self.current.lock().ok().and_then(|guard| guard.clone())
    }

    fn set_current(&self, session: Option<AuthSession>) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = session;
        }
    }

    /// Resume the persisted session, if the service still accepts it.
    ///
    /// A token the service rejects is discarded and `Ok(None)` returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` without a provider, or the
    /// provider's error when the token could not be checked. The stored
    /// session is kept in that case.
    pub async fn restore_session(&self) -> Result<Option<UserIdentity>, AuthError> {
        let provider = self.provider()?;
        let stored = match self.sessions.load_session().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "stored session unreadable; starting signed out");
                None
            }
        };
        let Some(stored) = stored else {
            return Ok(None);
        };

        match provider.get_user(&stored.access_token).await {
            Ok(user) => {
                info!(email = %user.email, role = ?user.role, "session restored");
                self.set_current(Some(AuthSession {
                    access_token: stored.access_token,
                    user: user.clone(),
                }));
                Ok(Some(user))
            }
            Err(err) if err.is_session_rejected() => {
                info!("stored session expired; signing out");
                if let Err(clear_err) = self.sessions.clear_session().await {
                    warn!(error = %clear_err, "failed to clear expired session");
                }
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong pair, or any
    /// provider error. The current session is unchanged on error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let session = self
            .provider()?
            .sign_in_with_password(email.trim(), password)
            .await?;
        info!(email = %session.user.email, role = ?session.user.role, "signed in");
        let user = session.user.clone();
        self.adopt(session).await;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns the provider's error; the current session is unchanged.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.provider()?.sign_up(email.trim(), password).await?;
        match &outcome {
            SignUpOutcome::SignedIn(session) => {
                info!(email = %session.user.email, "account created");
                self.adopt(session.clone()).await;
            }
            SignUpOutcome::ConfirmationRequired { email } => {
                info!(%email, "account created; confirmation pending");
            }
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` without a session, or the provider's
    /// error, in which case the user stays signed in.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let provider = self.provider()?;
        let session = self.current_session().ok_or(AuthError::NotSignedIn)?;
        provider.sign_out(&session.access_token).await?;

        self.set_current(None);
        if let Err(err) = self.sessions.clear_session().await {
            warn!(error = %err, "failed to clear stored session");
        }
        info!(email = %session.user.email, "signed out");
        Ok(())
    }

    /// Every patient account, for administrators.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn`, `AuthError::Forbidden` for a
    /// non-administrator, or the provider's error.
    pub async fn list_patients(&self) -> Result<Vec<PatientSummary>, AuthError> {
        let provider = self.provider()?;
        let session = self.current_session().ok_or(AuthError::NotSignedIn)?;
        if !session.user.role.is_admin() {
            return Err(AuthError::Forbidden);
        }
        provider.list_patients(&session.access_token).await
    }

    async fn adopt(&self, session: AuthSession) {
        let stored = StoredSession {
            access_token: session.access_token.clone(),
            email: Some(session.user.email.clone()),
        };
        if let Err(err) = self.sessions.save_session(&stored).await {
            warn!(error = %err, "failed to persist session; it will not survive a restart");
        }
        self.set_current(Some(session));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryIdentityProvider;
    use storage::Storage;
    use tracker_core::model::Role;

    fn setup() -> (InMemoryIdentityProvider, Storage, AuthService) {
        let provider = InMemoryIdentityProvider::new()
            .with_user("pat@example.com", "secret", Role::Patient)
            .with_user("doc@example.com", "hunter2", Role::Admin);
        let storage = Storage::in_memory();
        let service = AuthService::new(
            Some(Arc::new(provider.clone())),
            Arc::clone(&storage.sessions),
        );
        (provider, storage, service)
    }

    #[tokio::test]
    async fn unconfigured_service_refuses() {
        let service = AuthService::new(None, Storage::in_memory().sessions);
        assert!(!service.is_configured());
        assert!(matches!(
            service.sign_in("a@example.com", "x").await,
            Err(AuthError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn sign_in_persists_and_restores() {
        let (provider, storage, service) = setup();
        let user = service.sign_in(" pat@example.com ", "secret").await.unwrap();
        assert_eq!(user.role, Role::Patient);
        assert!(storage.sessions.load_session().await.unwrap().is_some());

        let fresh = AuthService::new(Some(Arc::new(provider)), Arc::clone(&storage.sessions));
        assert_eq!(fresh.current_user(), None);
        assert_eq!(fresh.restore_session().await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn failed_sign_in_keeps_current_session() {
        let (_, _, service) = setup();
        service.sign_in("pat@example.com", "secret").await.unwrap();

        let err = service.sign_in("doc@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(
            service.current_user().map(|u| u.email),
            Some("pat@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn sign_out_failure_keeps_session() {
        let (provider, storage, service) = setup();
        service.sign_in("pat@example.com", "secret").await.unwrap();

        provider.set_offline(true);
        assert!(matches!(
            service.sign_out().await,
            Err(AuthError::Unavailable(_))
        ));
        assert!(service.current_user().is_some());
        assert!(storage.sessions.load_session().await.unwrap().is_some());

        provider.set_offline(false);
        service.sign_out().await.unwrap();
        assert_eq!(service.current_user(), None);
        assert_eq!(storage.sessions.load_session().await.unwrap(), None);
        assert!(matches!(
            service.sign_out().await,
            Err(AuthError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn expired_session_is_discarded_on_restore() {
        let (provider, storage, service) = setup();
        service.sign_in("pat@example.com", "secret").await.unwrap();
        provider.expire_sessions();

        let fresh = AuthService::new(Some(Arc::new(provider)), Arc::clone(&storage.sessions));
        assert_eq!(fresh.restore_session().await.unwrap(), None);
        assert_eq!(storage.sessions.load_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_service_keeps_stored_session() {
        let (provider, storage, service) = setup();
        service.sign_in("pat@example.com", "secret").await.unwrap();
        provider.set_offline(true);

        let fresh = AuthService::new(Some(Arc::new(provider)), Arc::clone(&storage.sessions));
        assert!(fresh.restore_session().await.is_err());
        assert!(storage.sessions.load_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn patients_are_admin_only() {
        let (_, _, service) = setup();
        assert!(matches!(
            service.list_patients().await,
            Err(AuthError::NotSignedIn)
        ));

        service.sign_in("pat@example.com", "secret").await.unwrap();
        assert!(matches!(
            service.list_patients().await,
            Err(AuthError::Forbidden)
        ));

        service.sign_in("doc@example.com", "hunter2").await.unwrap();
        let patients = service.list_patients().await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].email, "pat@example.com");
    }

    #[tokio::test]
    async fn sign_up_with_confirmation_does_not_sign_in() {
        let (provider, _, service) = setup();
        provider.set_require_confirmation(true);

        let outcome = service.sign_up("new@example.com", "pw").await.unwrap();
        assert_eq!(
            outcome,
            SignUpOutcome::ConfirmationRequired {
                email: "new@example.com".into()
            }
        );
        assert_eq!(service.current_user(), None);

        assert!(matches!(
            service.sign_up("pat@example.com", "pw").await,
            Err(AuthError::Rejected { status: 422, .. })
        ));
    }
}
