//! In-process storage for native hosts and tests.

use super::{NotesStorage, StorageError, StorageFuture, StorageRecord};
use serde_json::{Map, Value};
use std::{cell::RefCell, rc::Rc};

/// Implementation of [`NotesStorage`] backed by a JSON map.
///
/// Clones share the same map, so a clone kept by a test observes every write.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: Rc<RefCell<Map<String, Value>>>,
}

impl MemoryStorage {
    /// Creates an empty [`MemoryStorage`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`MemoryStorage`] pre-populated with `items`, which may hold arbitrary JSON.
    pub fn with_items(items: Map<String, Value>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }

    /// Returns a copy of the value stored under `key`.
    pub fn item(&self, key: &str) -> Option<Value> {
        self.items.borrow().get(key).cloned()
    }
}

impl NotesStorage for MemoryStorage {
    fn get<'a>(
        &'a self,
        keys: &'a [&'a str],
    ) -> StorageFuture<'a, Result<Map<String, Value>, StorageError>> {
        Box::pin(async move {
            let items = self.items.borrow();
            Ok(keys
                .iter()
                .filter_map(|key| items.get(*key).map(|value| (key.to_string(), value.clone())))
                .collect())
        })
    }

    fn set<'a>(&'a self, record: &'a StorageRecord) -> StorageFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let update = record.to_map()?;
            self.items.borrow_mut().extend(update);
            Ok(())
        })
    }
}
