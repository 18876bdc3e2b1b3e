use std::sync::Arc;

use storage::repository::{EntryRepository, GoalRepository};
use tracing::info;
use tracker_core::Clock;
use tracker_core::model::{EntryId, WeeklyEntry, WeeklyEntryDraft};
use tracker_core::progress::{SortOrder, sorted_by_date};

use crate::error::WeeklyLogServiceError;
use crate::notice::{Loaded, read_entries};

/// Records and lists weekly entries.
#[derive(Clone)]
pub struct WeeklyLogService {
    clock: Clock,
    goals: Arc<dyn GoalRepository>,
    entries: Arc<dyn EntryRepository>,
}

impl WeeklyLogService {
    #[must_use]
    pub fn new(
        clock: Clock,
        goals: Arc<dyn GoalRepository>,
        entries: Arc<dyn EntryRepository>,
    ) -> Self {
        Self {
            clock,
            goals,
            entries,
        }
    }

    /// Validate a draft, give it a fresh id and append it to the log.
    ///
    /// # Errors
    ///
    /// Returns `WeeklyLogServiceError::GoalMissing` if no goal has been saved,
    /// `Validation` for an invalid draft and `Storage` if reading the goal or
    /// writing the log fails. Nothing is written on error.
    pub async fn record(
        &self,
        draft: WeeklyEntryDraft,
    ) -> Result<WeeklyEntry, WeeklyLogServiceError> {
        if self.goals.load_goal().await?.is_none() {
            return Err(WeeklyLogServiceError::GoalMissing);
        }

        let existing = self.entries.load_entries().await?;
        let id = next_entry_id(self.clock.now_millis(), existing.max_stored_id);
        let entry = draft.validate(id)?;
        self.entries.append_entry(&entry).await?;

        info!(id = %entry.id(), date = %entry.date(), "weekly entry recorded");
        Ok(entry)
    }

    /// Every readable entry, sorted by date.
    pub async fn list(&self, order: SortOrder) -> Loaded<Vec<WeeklyEntry>> {
        let mut notices = Vec::new();
        let entries = read_entries(self.entries.as_ref(), &mut notices).await;
        let sorted = sorted_by_date(&entries, order).into_iter().cloned().collect();
        Loaded {
            value: sorted,
            notices,
        }
    }
}

/// Millisecond timestamp id, bumped past the largest stored id.
fn next_entry_id(now_millis: u64, max_stored: Option<EntryId>) -> EntryId {
    let candidate = EntryId::new(now_millis);
    match max_stored {
        Some(max) if max >= candidate => max.next(),
        _ => candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Notice;
    use chrono::NaiveDate;
    use storage::records::ENTRIES_KEY;
    use storage::{InMemoryKeyValueStore, Storage};
    use tracker_core::model::{EntryError, EntryField, GoalDraft};
    use tracker_core::time::{FIXED_TEST_TIMESTAMP, fixed_clock};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn draft(d: u32, weight: f64) -> WeeklyEntryDraft {
        WeeklyEntryDraft {
            weight: Some(weight),
            waist: Some(90.0),
            ..WeeklyEntryDraft::new(date(d))
        }
    }

    async fn with_goal(storage: &Storage) {
        let goal = GoalDraft {
            start_date: Some(date(1)),
            end_date: Some(date(31)),
            initial_weight: Some(80.0),
            target_weight: Some(70.0),
            initial_waist: Some(95.0),
            target_waist: Some(85.0),
            height: Some(165.0),
        }
        .validate()
        .unwrap();
        storage.goals.save_goal(&goal).await.unwrap();
    }

    fn service(storage: &Storage) -> WeeklyLogService {
        WeeklyLogService::new(
            fixed_clock(),
            Arc::clone(&storage.goals),
            Arc::clone(&storage.entries),
        )
    }

    #[tokio::test]
    async fn requires_goal_first() {
        let storage = Storage::in_memory();
        let err = service(&storage).record(draft(8, 79.0)).await.unwrap_err();
        assert!(matches!(err, WeeklyLogServiceError::GoalMissing));
        assert!(storage.entries.load_entries().await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn ids_are_unique_under_a_frozen_clock() {
        let storage = Storage::in_memory();
        with_goal(&storage).await;
        let service = service(&storage);

        let first = service.record(draft(8, 79.0)).await.unwrap();
        let second = service.record(draft(15, 78.0)).await.unwrap();
        let millis = u64::try_from(FIXED_TEST_TIMESTAMP).unwrap() * 1000;
        assert_eq!(first.id(), EntryId::new(millis));
        assert_eq!(second.id(), EntryId::new(millis + 1));
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected() {
        let storage = Storage::in_memory();
        with_goal(&storage).await;

        let mut bad = draft(8, 79.0);
        bad.waist = None;
        let err = service(&storage).record(bad).await.unwrap_err();
        assert!(matches!(
            err,
            WeeklyLogServiceError::Validation(EntryError::Missing(EntryField::Waist))
        ));
        assert!(storage.entries.load_entries().await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn list_sorts_regardless_of_insertion_order() {
        let storage = Storage::in_memory();
        with_goal(&storage).await;
        let service = service(&storage);
        for (d, w) in [(15, 78.0), (1, 80.0), (8, 79.0)] {
            service.record(draft(d, w)).await.unwrap();
        }

        let ascending: Vec<_> = service
            .list(SortOrder::Ascending)
            .await
            .value
            .iter()
            .map(WeeklyEntry::date)
            .collect();
        assert_eq!(ascending, vec![date(1), date(8), date(15)]);

        let descending = service.list(SortOrder::Descending).await;
        assert_eq!(descending.value[0].date(), date(15));
        assert!(!descending.has_notices());
    }

    #[tokio::test]
    async fn unreadable_log_lists_empty_with_notice() {
        let kv = InMemoryKeyValueStore::new().with_value(ENTRIES_KEY, "42");
        let storage = Storage::from_kv(Arc::new(kv));

        let listed = service(&storage).list(SortOrder::Descending).await;
        assert!(listed.value.is_empty());
        assert!(matches!(
            listed.notices.as_slice(),
            [Notice::EntriesUnreadable { .. }]
        ));
    }

    #[tokio::test]
    async fn ids_skip_past_unreadable_entries() {
        let millis = u64::try_from(FIXED_TEST_TIMESTAMP).unwrap() * 1000;
        let unreadable = format!(
            r#"{{"schemaVersion":1,"entries":[{{"id":"{millis}","date":"2024-01-01","weight":80}}]}}"#
        );
        let kv = InMemoryKeyValueStore::new().with_value(ENTRIES_KEY, &unreadable);
        let storage = Storage::from_kv(Arc::new(kv.clone()));
        with_goal(&storage).await;

        let entry = service(&storage).record(draft(8, 79.0)).await.unwrap();
        assert_eq!(entry.id(), EntryId::new(millis + 1));

        let stored: serde_json::Value =
            serde_json::from_str(&kv.raw(ENTRIES_KEY).unwrap()).unwrap();
        let ids: Vec<&str> = stored["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn failed_write_is_a_storage_error() {
        let kv = InMemoryKeyValueStore::new();
        let storage = Storage::from_kv(Arc::new(kv.clone()));
        with_goal(&storage).await;
        let service = service(&storage);
        service.record(draft(8, 79.0)).await.unwrap();
        let before = kv.raw(ENTRIES_KEY);

        kv.fail_writes(true);
        let err = service.record(draft(15, 78.0)).await.unwrap_err();
        assert!(matches!(err, WeeklyLogServiceError::Storage(_)));
        assert_eq!(kv.raw(ENTRIES_KEY), before);
        assert_eq!(service.list(SortOrder::Ascending).await.value.len(), 1);
    }

    #[test]
    fn next_id_uses_clock_when_ahead() {
        assert_eq!(next_entry_id(100, None), EntryId::new(100));
        assert_eq!(next_entry_id(100, Some(EntryId::new(5))), EntryId::new(100));
        assert_eq!(next_entry_id(3, Some(EntryId::new(5))), EntryId::new(6));
    }
}
