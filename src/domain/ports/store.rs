//! Port for persistent key/value storage shared by every component.

use serde_json::Value;

use crate::domain::errors::StoreResult;

/// Last-write-wins JSON blob storage.
///
/// Keys are namespaced per component by convention; nothing here enforces
/// it.
pub trait KeyValueStore: Send + Sync {
    /// Persist `value` under `key`.
    fn save(&self, key: &str, value: &Value) -> StoreResult<()>;

    /// Load the value under `key`, or `default` when missing or unreadable.
    fn load(&self, key: &str, default: Value) -> Value;
}
