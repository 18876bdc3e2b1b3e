use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use tracker_core::model::{Goal, WeeklyEntry};

use crate::kv::KeyValueStore;
use crate::records::{
    self, ENTRIES_KEY, GOALS_KEY, SESSION_KEY, decode_entry, decode_entry_list, encode_entry_list,
    entry_to_value, max_stored_id,
};
use crate::repository::{
    EntryRepository, GoalRepository, LoadedEntries, SessionRepository, SkippedEntry, StorageError,
    StoredSession,
};

/// Goal, weekly log and session repositories over one key-value medium.
#[derive(Clone)]
pub struct KvEntryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvEntryStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl GoalRepository for KvEntryStore {
    async fn load_goal(&self) -> Result<Option<Goal>, StorageError> {
        match self.kv.get(GOALS_KEY).await? {
            Some(raw) => records::decode_goal(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn save_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        let raw = records::encode_goal(goal)?;
        self.kv.set(GOALS_KEY, &raw).await?;
        debug!(key = GOALS_KEY, "goal saved");
        Ok(())
    }
}

#[async_trait]
impl EntryRepository for KvEntryStore {
    async fn load_entries(&self) -> Result<LoadedEntries, StorageError> {
        let Some(raw) = self.kv.get(ENTRIES_KEY).await? else {
            return Ok(LoadedEntries::default());
        };

        let values = decode_entry_list(&raw)?;
        let mut loaded = LoadedEntries {
            max_stored_id: max_stored_id(&values),
            ..LoadedEntries::default()
        };
        for (position, value) in values.into_iter().enumerate() {
            match decode_entry(value) {
                Ok(entry) => loaded.entries.push(entry),
                Err(reason) => {
                    warn!(key = ENTRIES_KEY, position, %reason, "skipping unreadable weekly entry");
                    loaded.skipped.push(SkippedEntry { position, reason });
                }
            }
        }
        Ok(loaded)
    }

    async fn append_entry(&self, entry: &WeeklyEntry) -> Result<(), StorageError> {
        // Work on raw elements so entries this build cannot decode survive the rewrite.
        let mut values = match self.kv.get(ENTRIES_KEY).await? {
            Some(raw) => decode_entry_list(&raw)?,
            None => Vec::new(),
        };
        values.push(entry_to_value(entry)?);

        let raw = encode_entry_list(&values)?;
        self.kv.set(ENTRIES_KEY, &raw).await?;
        debug!(key = ENTRIES_KEY, id = %entry.id(), total = values.len(), "weekly entry appended");
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for KvEntryStore {
    async fn load_session(&self) -> Result<Option<StoredSession>, StorageError> {
        match self.kv.get(SESSION_KEY).await? {
            Some(raw) => records::decode_session(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), StorageError> {
        let raw = records::encode_session(session)?;
        self.kv.set(SESSION_KEY, &raw).await
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        self.kv.remove(SESSION_KEY).await
    }
}
