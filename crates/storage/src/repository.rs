use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracker_core::model::{EntryId, Goal, WeeklyEntry};

use crate::entry_store::KvEntryStore;
use crate::kv::{InMemoryKeyValueStore, KeyValueStore};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// A stored element of the weekly log that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Zero-based position in the stored list.
    pub position: usize,
    pub reason: String,
}

/// Result of reading the weekly log: decodable entries in stored order plus
/// the elements that were left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedEntries {
    pub entries: Vec<WeeklyEntry>,
    pub skipped: Vec<SkippedEntry>,
    /// Largest id found on any stored element, skipped ones included.
    pub max_stored_id: Option<EntryId>,
}

impl LoadedEntries {
    #[must_use]
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Persisted sign-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub access_token: String,
    pub email: Option<String>,
}

/// Repository contract for the single goal record.
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Fetch the saved goal, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the medium is unreadable or the stored value
    /// cannot be decoded.
    async fn load_goal(&self) -> Result<Option<Goal>, StorageError>;

    /// Replace the saved goal.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the goal cannot be stored.
    async fn save_goal(&self, goal: &Goal) -> Result<(), StorageError>;
}

/// Repository contract for the append-only weekly log.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Fetch every decodable entry in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the medium is unreadable or the list itself
    /// is not valid JSON. Individual malformed entries are skipped instead.
    async fn load_entries(&self) -> Result<LoadedEntries, StorageError>;

    /// Append one entry to the end of the log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be read back or written.
    async fn append_entry(&self, entry: &WeeklyEntry) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the medium is unreadable or the value is corrupt.
    async fn load_session(&self) -> Result<Option<StoredSession>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn save_session(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be removed.
    async fn clear_session(&self) -> Result<(), StorageError>;
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub goals: Arc<dyn GoalRepository>,
    pub entries: Arc<dyn EntryRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    /// Build every repository over one key-value medium.
    #[must_use]
    pub fn from_kv(kv: Arc<dyn KeyValueStore>) -> Self {
        let store = KvEntryStore::new(kv);
        let goals: Arc<dyn GoalRepository> = Arc::new(store.clone());
        let entries: Arc<dyn EntryRepository> = Arc::new(store.clone());
        let sessions: Arc<dyn SessionRepository> = Arc::new(store);
        Self {
            goals,
            entries,
            sessions,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_kv(Arc::new(InMemoryKeyValueStore::new()))
    }
}
