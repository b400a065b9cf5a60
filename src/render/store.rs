//! Request-scoped application state shared by the component tree.
//!
//! Components read from the store while rendering and write to it from the
//! pending operations they queue. The final snapshot is the hydration payload.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError, RwLock};

use serde_json::{Map, Value};

/// Application state for one request.
#[derive(Debug, Default)]
pub struct Store {
    state: RwLock<Map<String, Value>>,
    loading: Mutex<HashSet<String>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a top-level slice of state.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Read a nested value by a `/`-separated JSON pointer below `key`.
    pub fn get_path(&self, key: &str, pointer: &str) -> Option<Value> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .and_then(|v| v.pointer(pointer))
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Replace a top-level slice of state.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }

    /// Mark `key` as loading. Returns `false` if a load is already in flight.
    pub fn begin_load(&self, key: &str) -> bool {
        self.loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string())
    }

    /// Store the result of a load and clear its loading mark.
    pub fn finish_load(&self, key: &str, value: Value) {
        self.set(key, value);
        self.loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// The whole state as a JSON object.
    pub fn snapshot(&self) -> Value {
        Value::Object(
            self.state
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }
}
