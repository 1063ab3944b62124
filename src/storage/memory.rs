//! In-memory storage backend.
//!
//! Holds the encoded record under [`STORAGE_KEY`], so loads go through the
//! same codec as the file backend. Intended for embedded usage and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::state::StoredState;

use super::codec::{decode_state, encode_state};
use super::traits::{StateStore, StorageError, STORAGE_KEY};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory [`StateStore`].
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    records: RwLock<HashMap<String, String>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `state`.
    pub fn with_state(state: &StoredState) -> Result<Self, StorageError> {
        let store = Self::new();
        store.save(state)?;
        Ok(store)
    }

    /// Returns the raw persisted text, if any.
    pub fn raw(&self) -> Result<Option<String>, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("records"))?;
        Ok(records.get(STORAGE_KEY).cloned())
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Result<Option<StoredState>, StorageError> {
        self.raw()?.as_deref().map(decode_state).transpose()
    }

    fn save(&self, state: &StoredState) -> Result<(), StorageError> {
        let text = encode_state(state)?;
        let mut records = self.records.write().map_err(|_| lock_err("records"))?;
        records.insert(STORAGE_KEY.to_string(), text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_empty_store_loads_none() {
        assert!(InMemoryStateStore::new().load().unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_whole_record() {
        let store = InMemoryStateStore::new();
        let mut state = StoredState::initial(Utc::now());
        state.add_competitor("a.com");
        store.save(&state).unwrap();

        state.remove_competitor("a.com");
        state.add_competitor("b.com");
        store.save(&state).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
        assert!(loaded.competitor("a.com").is_none());
    }
}
