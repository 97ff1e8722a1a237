//! Persistence of notes and the draft in an asynchronous key-value store.

use crate::note::Note;
use futures::future::LocalBoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};

#[cfg(target_family = "wasm")]
pub mod chrome;
#[cfg(target_family = "wasm")]
pub mod local;
pub mod memory;
#[cfg(test)]
pub(crate) mod testing;

#[cfg(target_family = "wasm")]
pub use chrome::ChromeStorage;
#[cfg(target_family = "wasm")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Key holding the array of saved notes.
pub const KEY_NOTES: &str = "notes";
/// Key holding the unsaved draft text.
pub const KEY_DRAFT: &str = "draftNote";

pub type StorageFuture<'a, T> = LocalBoxFuture<'a, T>;

/// A partial update of the stored record. Absent fields are left untouched.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
    #[serde(rename = "draftNote", skip_serializing_if = "Option::is_none")]
    pub draft_note: Option<String>,
}

impl StorageRecord {
    /// A write of the full note list only.
    pub fn notes(notes: Vec<Note>) -> Self {
        Self {
            notes: Some(notes),
            draft_note: None,
        }
    }

    /// A write of the draft only.
    pub fn draft(draft: String) -> Self {
        Self {
            notes: None,
            draft_note: Some(draft),
        }
    }

    /// A write of the full note list together with the draft.
    pub fn notes_and_draft(notes: Vec<Note>, draft: String) -> Self {
        Self {
            notes: Some(notes),
            draft_note: Some(draft),
        }
    }

    /// The record as a JSON object keyed by [`KEY_NOTES`] and [`KEY_DRAFT`].
    pub fn to_map(&self) -> Result<Map<String, Value>, StorageError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(StorageError::Serialization(
                "storage record is not an object".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The store completed the call but reported an error.
    #[error("Storage reported an error: {0}")]
    Reported(String),
    /// The call into the store threw before completing.
    #[error("Storage call failed: {0}")]
    Thrown(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage not available: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Returns `true` if the failure looks like the store ran out of quota.
    pub fn is_quota(&self) -> bool {
        match self {
            StorageError::Reported(message) | StorageError::Thrown(message) => {
                message.to_ascii_lowercase().contains("quota")
            }
            StorageError::Serialization(_) | StorageError::Unavailable(_) => false,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// An asynchronous key-value store holding the notes and the draft.
///
/// All methods take `&self` so a single store can be shared between the note store and the
/// draft manager; implementations needing mutation use interior mutability.
pub trait NotesStorage {
    /// Reads the given keys. Missing keys are absent from the returned map.
    fn get<'a>(
        &'a self,
        keys: &'a [&'a str],
    ) -> StorageFuture<'a, Result<Map<String, Value>, StorageError>>;

    /// Writes every present field of `record`.
    fn set<'a>(&'a self, record: &'a StorageRecord) -> StorageFuture<'a, Result<(), StorageError>>;
}

#[cfg(target_family = "wasm")]
pub(crate) fn js_error_message(err: &wasm_bindgen::JsValue) -> String {
    use wasm_bindgen_futures::js_sys::Reflect;

    if let Some(message) = err.as_string() {
        return message;
    }
    let field = |name: &str| {
        Reflect::get(err, &wasm_bindgen::JsValue::from_str(name))
            .ok()
            .and_then(|value| value.as_string())
            .filter(|value| !value.is_empty())
    };
    match (field("name"), field("message")) {
        (Some(name), Some(message)) => format!("{name}: {message}"),
        (None, Some(message)) => message,
        (Some(name), None) => name,
        (None, None) => format!("{err:?}"),
    }
}
