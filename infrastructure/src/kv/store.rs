//! Process-lifetime key-value store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use toolbridge_domain::tool::ToolFailure;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("key '{0}'")]
    KeyNotFound(String),
}

impl From<StoreError> for ToolFailure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::KeyNotFound(_) => ToolFailure::not_found(err.to_string()),
        }
    }
}

/// String-to-string mapping shared by the kv tools.
///
/// The lock is only held for the duration of a single map operation and is
/// never held across an await point.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A panic elsewhere cannot leave a BTreeMap half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries().insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Result<String, StoreError> {
        self.entries()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))
    }

    /// Remove a key, returning the value it held.
    pub fn delete(&self, key: &str) -> Result<String, StoreError> {
        self.entries()
            .remove(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))
    }

    /// Snapshot of all entries, sorted by key.
    pub fn list(&self) -> BTreeMap<String, String> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbridge_domain::tool::FailureKind;

    #[test]
    fn test_set_get_overwrite() {
        let store = InMemoryStore::new();
        assert_eq!(store.set("a", "1"), None);
        assert_eq!(store.get("a").unwrap(), "1");
        assert_eq!(store.set("a", "2"), Some("1".to_string()));
        assert_eq!(store.get("a").unwrap(), "2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let store = InMemoryStore::new();
        store.set("a", "1");
        assert_eq!(store.delete("a").unwrap(), "1");
        assert_eq!(store.get("a"), Err(StoreError::KeyNotFound("a".into())));
        assert_eq!(store.delete("a"), Err(StoreError::KeyNotFound("a".into())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_is_sorted() {
        let store = InMemoryStore::new();
        store.set("b", "2");
        store.set("a", "1");
        let keys: Vec<String> = store.list().into_keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_not_found_maps_to_failure_kind() {
        let failure = ToolFailure::from(StoreError::KeyNotFound("x".into()));
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.message, "Not found: key 'x'");
    }
}
