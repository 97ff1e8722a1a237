//! `chrome.storage.local` bindings.

use super::{NotesStorage, StorageError, StorageFuture, StorageRecord, js_error_message};
use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{
    JsFuture,
    js_sys::{self, Promise, Reflect},
};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get, catch)]
    fn local_get(keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set, catch)]
    fn local_set(items: &JsValue) -> Result<Promise, JsValue>;
}

/// Implementation of [`NotesStorage`] on the extension's local storage area.
///
/// A synchronous exception from the API maps to [`StorageError::Thrown`]; a rejected promise
/// (the `runtime.lastError` path) maps to [`StorageError::Reported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeStorage;

impl ChromeStorage {
    /// Creates a new instance of [`ChromeStorage`].
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` if `chrome.storage.local` exists, i.e. the page runs inside the extension.
    pub fn is_available() -> bool {
        let mut target = JsValue::from(js_sys::global());
        for name in ["chrome", "storage", "local"] {
            target = match Reflect::get(&target, &JsValue::from_str(name)) {
                Ok(value) if value.is_object() => value,
                _ => return false,
            };
        }
        true
    }
}

impl NotesStorage for ChromeStorage {
    fn get<'a>(
        &'a self,
        keys: &'a [&'a str],
    ) -> StorageFuture<'a, Result<Map<String, Value>, StorageError>> {
        Box::pin(async move {
            let keys = to_js(keys)?;
            let promise =
                local_get(&keys).map_err(|e| StorageError::Thrown(js_error_message(&e)))?;
            let items = JsFuture::from(promise)
                .await
                .map_err(|e| StorageError::Reported(js_error_message(&e)))?;
            if items.is_undefined() || items.is_null() {
                return Ok(Map::new());
            }
            serde_wasm_bindgen::from_value(items)
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }

    fn set<'a>(&'a self, record: &'a StorageRecord) -> StorageFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let items = to_js(record)?;
            let promise =
                local_set(&items).map_err(|e| StorageError::Thrown(js_error_message(&e)))?;
            JsFuture::from(promise)
                .await
                .map_err(|e| StorageError::Reported(js_error_message(&e)))?;
            Ok(())
        })
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, StorageError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| StorageError::Serialization(e.to_string()))
}
