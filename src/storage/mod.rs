//! Durable key-value storage for session state and settings.
//!
//! Every persisted value is a plain string under a namespaced key (see
//! [`keys`]). Two implementations are provided: [`SqliteStore`] for the
//! on-disk store and [`MemoryStore`] for tests and throwaway sessions.

mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StorageError, StorageResult};

/// Namespaced storage keys.
pub mod keys {
    /// Serialized session record (JSON).
    pub const SESSION: &str = "resume_enhancer:session";
    /// Last visited page name.
    pub const CURRENT_PAGE: &str = "resume_enhancer:current_page";
    /// Backend credential.
    pub const API_KEY: &str = "resume_enhancer:api_key";
    /// Backend model name.
    pub const MODEL: &str = "resume_enhancer:model";
    /// Questions prompt template override.
    pub const QUESTIONS_PROMPT: &str = "resume_enhancer:questions_prompt";
    /// Resume prompt template override.
    pub const RESUME_PROMPT: &str = "resume_enhancer:resume_prompt";
}

/// Key-value storage trait.
///
/// Writes are durable once the returned future resolves.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Process-local store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn poisoned() -> StorageError {
        StorageError::Query {
            message: "memory store lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }
}
