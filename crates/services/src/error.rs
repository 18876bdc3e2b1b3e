//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tracker_core::model::{EntryError, GoalError};

/// Errors emitted by `GoalService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GoalServiceError {
    #[error(transparent)]
    Validation(#[from] GoalError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `WeeklyLogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WeeklyLogServiceError {
    #[error("save a goal before logging weekly entries")]
    GoalMissing,
    #[error(transparent)]
    Validation(#[from] EntryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AuthService` and identity providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("identity service rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
    #[error("administrator role required")]
    Forbidden,
    #[error("not signed in")]
    NotSignedIn,
    #[error("identity service is not configured")]
    NotConfigured,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// The service refused the token itself, so keeping it is pointless.
    #[must_use]
    pub fn is_session_rejected(&self) -> bool {
        matches!(self, AuthError::Rejected { status: 401 | 403, .. })
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
