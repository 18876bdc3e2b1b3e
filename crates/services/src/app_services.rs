use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::auth::{AuthService, IdentityProvider};
use crate::error::AppServicesError;
use crate::goal_service::GoalService;
use crate::progress_service::ProgressService;
use crate::weekly_log_service::WeeklyLogService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    goals: Arc<GoalService>,
    weekly_log: Arc<WeeklyLogService>,
    progress: Arc<ProgressService>,
    auth: Arc<AuthService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        identity: Option<Arc<dyn IdentityProvider>>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, identity))
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        identity: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        let goals = Arc::new(GoalService::new(Arc::clone(&storage.goals)));
        let weekly_log = Arc::new(WeeklyLogService::new(
            clock,
            Arc::clone(&storage.goals),
            Arc::clone(&storage.entries),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.goals),
            Arc::clone(&storage.entries),
        ));
        let auth = Arc::new(AuthService::new(identity, Arc::clone(&storage.sessions)));

        Self {
            clock,
            goals,
            weekly_log,
            progress,
            auth,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn goals(&self) -> Arc<GoalService> {
        Arc::clone(&self.goals)
    }

    #[must_use]
    pub fn weekly_log(&self) -> Arc<WeeklyLogService> {
        Arc::clone(&self.weekly_log)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }
}
