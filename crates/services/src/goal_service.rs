use std::sync::Arc;

use storage::repository::GoalRepository;
use tracing::info;
use tracker_core::model::{Goal, GoalDraft};

use crate::error::GoalServiceError;
use crate::notice::{Loaded, read_goal};

#[derive(Clone)]
pub struct GoalService {
    repo: Arc<dyn GoalRepository>,
}

impl GoalService {
    #[must_use]
    pub fn new(repo: Arc<dyn GoalRepository>) -> Self {
        Self { repo }
    }

    /// Load the saved goal. An unreadable goal is reported as absent with a
    /// notice.
    pub async fn load(&self) -> Loaded<Option<Goal>> {
        let mut notices = Vec::new();
        let goal = read_goal(self.repo.as_ref(), &mut notices).await;
        Loaded {
            value: goal,
            notices,
        }
    }

    /// Validate and persist a goal, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `GoalServiceError::Validation` without touching storage if the
    /// draft is invalid, or `GoalServiceError::Storage` if the write fails.
    pub async fn save(&self, draft: GoalDraft) -> Result<Goal, GoalServiceError> {
        let goal = draft.validate()?;
        self.repo.save_goal(&goal).await?;
        info!(
            start = %goal.start_date(),
            end = %goal.end_date(),
            "goal saved"
        );
        Ok(goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Notice;
    use chrono::NaiveDate;
    use storage::records::GOALS_KEY;
    use storage::{InMemoryKeyValueStore, Storage};
    use tracker_core::model::GoalError;

    fn draft() -> GoalDraft {
        GoalDraft {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            initial_weight: Some(80.0),
            target_weight: Some(70.0),
            initial_waist: Some(95.0),
            target_waist: Some(85.0),
            height: Some(165.0),
        }
    }

    #[tokio::test]
    async fn save_then_load() {
        let service = GoalService::new(Storage::in_memory().goals);
        assert_eq!(service.load().await, Loaded::clean(None));

        let goal = service.save(draft()).await.unwrap();
        assert_eq!(service.load().await, Loaded::clean(Some(goal)));
    }

    #[tokio::test]
    async fn invalid_goal_leaves_store_untouched() {
        let kv = InMemoryKeyValueStore::new();
        let storage = Storage::from_kv(Arc::new(kv.clone()));
        let service = GoalService::new(storage.goals);

        let mut bad = draft();
        bad.target_weight = Some(80.0);
        let err = service.save(bad).await.unwrap_err();
        assert!(matches!(
            err,
            GoalServiceError::Validation(GoalError::TargetWeightNotBelowInitial)
        ));
        assert_eq!(kv.raw(GOALS_KEY), None);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_goal() {
        let kv = InMemoryKeyValueStore::new();
        let service = GoalService::new(Storage::from_kv(Arc::new(kv.clone())).goals);
        let saved = service.save(draft()).await.unwrap();
        let before = kv.raw(GOALS_KEY);

        kv.fail_writes(true);
        let mut changed = draft();
        changed.target_weight = Some(65.0);
        let err = service.save(changed).await.unwrap_err();
        assert!(matches!(err, GoalServiceError::Storage(_)));
        assert_eq!(kv.raw(GOALS_KEY), before);
        assert_eq!(service.load().await, Loaded::clean(Some(saved)));
    }

    #[tokio::test]
    async fn unreadable_goal_degrades_to_none() {
        let kv = InMemoryKeyValueStore::new().with_value(GOALS_KEY, "not json");
        let service = GoalService::new(Storage::from_kv(Arc::new(kv)).goals);

        let loaded = service.load().await;
        assert_eq!(loaded.value, None);
        assert!(matches!(
            loaded.notices.as_slice(),
            [Notice::GoalUnreadable { .. }]
        ));
    }
}
