use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::ports::KeyValueStore;

/// Process-local key/value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().map_or(0, |values| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&self, key: &str, value: &Value) -> StoreResult<()> {
        self.values
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn load(&self, key: &str, default: Value) -> Value {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(key).cloned())
            .unwrap_or(default)
    }
}
