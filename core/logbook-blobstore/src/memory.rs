//! In-memory object store with failure injection.

use crate::error::{BlobStoreError, BlobStoreResult};
use crate::ObjectStore;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    objects: BTreeSet<String>,
    failing: HashSet<String>,
    attempts: Vec<String>,
}

/// Object store kept in process.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    state: Mutex<State>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `keys`.
    pub fn with_objects<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        store.state().objects.extend(keys.into_iter().map(Into::into));
        store
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, key: impl Into<String>) {
        self.state().objects.insert(key.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state().objects.contains(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.state().objects.iter().cloned().collect()
    }

    /// Makes every removal of `key` fail.
    pub fn fail_on(&self, key: impl Into<String>) {
        self.state().failing.insert(key.into());
    }

    /// Keys passed to `remove`, in call order.
    pub fn removal_attempts(&self) -> Vec<String> {
        self.state().attempts.clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn store_name(&self) -> &'static str {
        "in-memory"
    }

    async fn remove(&self, key: &str) -> BlobStoreResult<()> {
        let mut state = self.state();
        state.attempts.push(key.to_string());
        if state.failing.contains(key) {
            return Err(BlobStoreError::S3(format!("access denied: {key}")));
        }
        if state.objects.remove(key) {
            debug!("Removed object: {}", key);
        }
        Ok(())
    }
}
