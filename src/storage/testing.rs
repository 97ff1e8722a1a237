//! A storage double that records writes and fails on demand.

use super::{MemoryStorage, NotesStorage, StorageError, StorageFuture, StorageRecord};
use serde_json::{Map, Value};
use std::{cell::RefCell, collections::VecDeque};

#[derive(Debug, Default)]
pub(crate) struct ScriptedStorage {
    inner: MemoryStorage,
    writes: RefCell<Vec<StorageRecord>>,
    failures: RefCell<VecDeque<StorageError>>,
    read_failure: RefCell<Option<StorageError>>,
}

impl ScriptedStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_items(items: Value) -> Self {
        let items = match items {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            inner: MemoryStorage::with_items(items),
            ..Self::default()
        }
    }

    /// Makes the next write fail with `err` without touching the stored items.
    pub(crate) fn fail_next_write(&self, err: StorageError) {
        self.failures.borrow_mut().push_back(err);
    }

    pub(crate) fn fail_reads(&self, err: StorageError) {
        *self.read_failure.borrow_mut() = Some(err);
    }

    /// Every write attempted so far, including failed ones.
    pub(crate) fn writes(&self) -> Vec<StorageRecord> {
        self.writes.borrow().clone()
    }
}

impl NotesStorage for ScriptedStorage {
    fn get<'a>(
        &'a self,
        keys: &'a [&'a str],
    ) -> StorageFuture<'a, Result<Map<String, Value>, StorageError>> {
        Box::pin(async move {
            let failure = self.read_failure.borrow().clone();
            match failure {
                Some(err) => Err(err),
                None => self.inner.get(keys).await,
            }
        })
    }

    fn set<'a>(&'a self, record: &'a StorageRecord) -> StorageFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.writes.borrow_mut().push(record.clone());
            let failure = self.failures.borrow_mut().pop_front();
            match failure {
                Some(err) => Err(err),
                None => self.inner.set(record).await,
            }
        })
    }
}
