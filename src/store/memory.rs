//! In-memory object store for tests
//!
//! Records every delete call and supports per-key failure injection, in the
//! spirit of a mock executor: configure the failures up front, run the
//! sweep, then assert on what was deleted.

use super::ObjectStore;
use anyhow::Result;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

/// Object store backed by a sorted in-memory key set.
#[derive(Clone, Default)]
pub struct MemoryStore {
    keys: Arc<Mutex<BTreeSet<String>>>,
    /// Keys whose deletion fails with an injected error.
    failing_deletes: Arc<Mutex<HashSet<String>>>,
    /// Every key passed to `delete`, in call order.
    deleted: Arc<Mutex<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with the given keys.
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        {
            let mut set = store.keys.lock().unwrap();
            for key in keys {
                set.insert(key.into());
            }
        }
        store
    }

    /// Make `delete` fail for a specific key.
    pub fn fail_delete_of(self, key: &str) -> Self {
        self.failing_deletes
            .lock()
            .unwrap()
            .insert(key.to_string());
        self
    }

    /// Keys passed to `delete`, in call order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Keys still present in the store.
    pub fn remaining_keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().iter().cloned().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.lock().unwrap().contains(key)
    }
}

impl ObjectStore for MemoryStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(key.to_string());

        if self.failing_deletes.lock().unwrap().contains(key) {
            anyhow::bail!("Injected delete failure for key: {}", key);
        }

        // Removing an absent key is fine; deletions are idempotent.
        self.keys.lock().unwrap().remove(key);
        Ok(())
    }
}
