use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracker_core::model::{PatientSummary, Role, UserIdentity};

use super::{AuthSession, IdentityProvider, SignUpOutcome};
use crate::error::AuthError;

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    tokens: HashMap<String, usize>,
    issued: u64,
    offline: bool,
    require_confirmation: bool,
}

struct Account {
    password: String,
    identity: UserIdentity,
}

impl State {
    fn issue(&mut self, account: usize) -> AuthSession {
        self.issued += 1;
        let token = format!("token-{}", self.issued);
        self.tokens.insert(token.clone(), account);
        AuthSession {
            access_token: token,
            user: self.accounts[account].identity.clone(),
        }
    }

    fn account_for(&self, token: &str) -> Result<&Account, AuthError> {
        self.tokens
            .get(token)
            .map(|&idx| &self.accounts[idx])
            .ok_or_else(|| AuthError::Rejected {
                status: 401,
                message: "invalid token".into(),
            })
    }
}

/// Identity service fake for tests and offline use.
#[derive(Clone, Default)]
pub struct InMemoryIdentityProvider {
    state: Arc<Mutex<State>>,
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with an explicit role.
    #[must_use]
    pub fn with_user(self, email: &str, password: &str, role: Role) -> Self {
        if let Ok(mut state) = self.state.lock() {
            let id = format!("user-{}", state.accounts.len() + 1);
            state.accounts.push(Account {
                password: password.to_string(),
                identity: UserIdentity::new(id, email, role),
            });
        }
        self
    }

    /// Make every call fail as if the service were unreachable.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.offline = offline;
        }
    }

    /// New accounts must confirm their email before a session is issued.
    pub fn set_require_confirmation(&self, required: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.require_confirmation = required;
        }
    }

    /// Forget every issued token, as if all sessions expired.
    pub fn expire_sessions(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.tokens.clear();
        }
    }

    fn online(&self) -> Result<MutexGuard<'_, State>, AuthError> {
        let state = self
            .state
            .lock()
            .map_err(|err| AuthError::Unavailable(err.to_string()))?;
        if state.offline {
            return Err(AuthError::Unavailable("identity service offline".into()));
        }
        Ok(state)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let mut state = self.online()?;
        let idx = state
            .accounts
            .iter()
            .position(|a| a.identity.email.eq_ignore_ascii_case(email) && a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(state.issue(idx))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let mut state = self.online()?;
        if state
            .accounts
            .iter()
            .any(|a| a.identity.email.eq_ignore_ascii_case(email))
        {
            return Err(AuthError::Rejected {
                status: 422,
                message: "User already registered".into(),
            });
        }

        let id = format!("user-{}", state.accounts.len() + 1);
        state.accounts.push(Account {
            password: password.to_string(),
            identity: UserIdentity::new(id, email, Role::Patient),
        });
        if state.require_confirmation {
            return Ok(SignUpOutcome::ConfirmationRequired {
                email: email.to_string(),
            });
        }
        let idx = state.accounts.len() - 1;
        Ok(SignUpOutcome::SignedIn(state.issue(idx)))
    }

    async fn get_user(&self, access_token: &str) -> Result<UserIdentity, AuthError> {
        let state = self.online()?;
        Ok(state.account_for(access_token)?.identity.clone())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut state = self.online()?;
        state.tokens.remove(access_token);
        Ok(())
    }

    async fn list_patients(&self, access_token: &str) -> Result<Vec<PatientSummary>, AuthError> {
        let state = self.online()?;
        if !state.account_for(access_token)?.identity.role.is_admin() {
            return Err(AuthError::Rejected {
                status: 403,
                message: "permission denied for table users".into(),
            });
        }
        Ok(state
            .accounts
            .iter()
            .filter(|a| !a.identity.role.is_admin())
            .map(|a| PatientSummary {
                id: a.identity.id.clone(),
                email: a.identity.email.clone(),
                created_at: None,
            })
            .collect())
    }
}
