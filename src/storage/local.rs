//! `window.localStorage` backed storage, for running the popup as a plain web page.

use super::{NotesStorage, StorageError, StorageFuture, StorageRecord, js_error_message};
use serde_json::{Map, Value};
use tracing::warn;
use web_sys::Storage;

/// Implementation of [`NotesStorage`] storing each key as a JSON string in local storage.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    prefix: String,
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStorage {
    /// Prefix applied to every key unless another one is given.
    pub const DEFAULT_PREFIX: &'static str = "popup-notes-";

    /// Creates a new instance of [`LocalStorage`] with the default key prefix.
    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    /// Creates a new instance of [`LocalStorage`] with a custom key prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn get_local_storage(&self) -> Result<Storage, StorageError> {
        match gloo_utils::window().local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StorageError::Unavailable(
                "LocalStorage not available".to_string(),
            )),
            Err(e) => Err(StorageError::Unavailable(js_error_message(&e))),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl NotesStorage for LocalStorage {
    fn get<'a>(
        &'a self,
        keys: &'a [&'a str],
    ) -> StorageFuture<'a, Result<Map<String, Value>, StorageError>> {
        Box::pin(async move {
            let local_storage = self.get_local_storage()?;
            let mut items = Map::new();
            for key in keys {
                let raw = local_storage
                    .get_item(&self.key(key))
                    .map_err(|e| StorageError::Thrown(js_error_message(&e)))?;
                let Some(raw) = raw else { continue };
                // Unparseable entries are handed on as plain strings and fail validation later.
                let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
                items.insert(key.to_string(), value);
            }
            Ok(items)
        })
    }

    /// Writes each present field under its own key.
    ///
    /// Every field is serialized before the first `setItem`, so a serialization error writes
    /// nothing. If a later `setItem` throws (a `QuotaExceededError` once the origin's quota is
    /// used up), the keys already written are put back to their previous values before the error
    /// is returned.
    fn set<'a>(&'a self, record: &'a StorageRecord) -> StorageFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let local_storage = self.get_local_storage()?;
            let entries = record
                .to_map()?
                .into_iter()
                .map(|(key, value)| Ok((self.key(&key), serde_json::to_string(&value)?)))
                .collect::<Result<Vec<_>, StorageError>>()?;

            let previous = entries
                .iter()
                .map(|(key, _)| local_storage.get_item(key))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::Thrown(js_error_message(&e)))?;

            for (index, (key, value)) in entries.iter().enumerate() {
                if let Err(e) = local_storage.set_item(key, value) {
                    restore(&local_storage, &entries[..index], &previous[..index]);
                    return Err(StorageError::Reported(js_error_message(&e)));
                }
            }
            Ok(())
        })
    }
}

fn restore(local_storage: &Storage, written: &[(String, String)], previous: &[Option<String>]) {
    for ((key, _), previous) in written.iter().zip(previous).rev() {
        let result = match previous {
            Some(value) => local_storage.set_item(key, value),
            None => local_storage.remove_item(key),
        };
        if let Err(e) = result {
            warn!("Failed to restore {key} after a failed write: {}", js_error_message(&e));
        }
    }
}
