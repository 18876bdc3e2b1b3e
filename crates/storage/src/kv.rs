use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::repository::StorageError;

/// Durable string key-value medium the repositories are built on.
///
/// Values are JSON documents; see [`crate::records`] for their shapes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the medium is unavailable.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the medium is unavailable or full.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the medium is unavailable.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory medium for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    writes_fail: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            writes_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every `set` and `remove` fail with `StorageError::Connection`,
    /// as a full or unavailable medium would. Reads keep working.
    pub fn fail_writes(&self, fail: bool) {
        self.writes_fail.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.writes_fail.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("medium unavailable".into()));
        }
        Ok(())
    }

    /// Seed a raw value, bypassing the repositories.
    #[must_use]
    pub fn with_value(self, key: &str, value: &str) -> Self {
        if let Ok(mut guard) = self.values.lock() {
            guard.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Raw value currently stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).cloned())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let kv = InMemoryKeyValueStore::new();
        assert_eq!(kv.get("a").await.unwrap(), None);

        kv.set("a", "1").await.unwrap();
        kv.set("a", "2").await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("2"));

        kv.remove("a").await.unwrap();
        kv.remove("a").await.unwrap();
        assert_eq!(kv.raw("a"), None);
    }

    #[tokio::test]
    async fn failing_writes_keep_previous_value() {
        let kv = InMemoryKeyValueStore::new().with_value("k", "v");
        kv.fail_writes(true);

        assert!(matches!(
            kv.set("k", "w").await,
            Err(StorageError::Connection(_))
        ));
        assert!(kv.remove("k").await.is_err());
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v"));

        kv.fail_writes(false);
        kv.set("k", "w").await.unwrap();
        assert_eq!(kv.raw("k").as_deref(), Some("w"));
    }

    #[tokio::test]
    async fn clones_share_values() {
        let kv = InMemoryKeyValueStore::new().with_value("k", "v");
        let other = kv.clone();
        other.set("k", "w").await.unwrap();
        assert_eq!(kv.raw("k").as_deref(), Some("w"));
    }
}
