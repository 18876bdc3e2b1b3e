#![forbid(unsafe_code)]

pub mod entry_store;
pub mod kv;
pub mod records;
pub mod repository;
pub mod sqlite;

pub use entry_store::KvEntryStore;
pub use kv::{InMemoryKeyValueStore, KeyValueStore};
pub use repository::{LoadedEntries, SkippedEntry, Storage, StorageError, StoredSession};
