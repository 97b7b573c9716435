use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{Result, Store, StoreError};

/// Process-local store. Mostly useful for tests and throwaway sessions.
///
/// An optional quota caps the total number of key and value bytes, the way a
/// browser caps its local storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// A panic while holding the lock cannot leave a half-written entry, so
    /// a poisoned map is still used as is.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock_entries().keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn footprint(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock_entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock_entries();

        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| footprint(k, v))
                .sum();
            let needed = others + footprint(key, value);
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock_entries();
        entries.remove(key);
        Ok(())
    }
}
