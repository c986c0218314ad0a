//! Browser-backed storage and history.

use wasm_bindgen::JsValue;

use suitegate_auth::{KeyValueStorage, StorageError};

use crate::history::History;

/// `window.localStorage`.
///
/// The handle is looked up on every call so the type stays `Send + Sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn local_storage() -> Result<web_sys::Storage, StorageError> {
    let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window object".to_string()))?;
    window
        .local_storage()
        .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
        .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
}

impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?.get_item(key).map_err(|e| StorageError::Read {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?.set_item(key, value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?.remove_item(key).map_err(|e| StorageError::Write {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }
}

/// `window.history` / `window.location`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHistory;

impl History for BrowserHistory {
    fn current_path(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string())
    }

    fn push(&mut self, path: &str) {
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
                tracing::warn!(path, error = ?e, "pushState failed");
            }
        }
    }

    fn replace(&mut self, path: &str) {
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(path)) {
                tracing::warn!(path, error = ?e, "replaceState failed");
            }
        }
    }
}
