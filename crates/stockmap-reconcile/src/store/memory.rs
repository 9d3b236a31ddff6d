use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;

use super::{StorageBackend, StoreKey};

/// In-process backend, used for tests and `--dry-run` CLI invocations.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` with arbitrary text, valid JSON or not.
    #[must_use]
    pub fn with_raw(self, key: StoreKey, contents: impl Into<String>) -> Self {
        self.entries().insert(key, contents.into());
        self
    }

    /// A panic while holding the lock leaves the map itself intact.
    fn entries(&self) -> MutexGuard<'_, HashMap<StoreKey, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(&key).cloned())
    }

    fn write(&self, key: StoreKey, contents: &str) -> Result<(), StoreError> {
        self.entries().insert(key, contents.to_string());
        Ok(())
    }
}
