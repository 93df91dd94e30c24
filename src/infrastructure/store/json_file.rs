//! Key/value store persisted as a single JSON document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::ports::KeyValueStore;

/// Stores every key in one JSON object on disk.
///
/// The whole document is rewritten on each save through a temporary file
/// and a rename, so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file starts empty. An unreadable or corrupt file also
    /// starts empty and is replaced on the next save.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(values) => values,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Store file is corrupt, starting empty");
                    Map::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(err.into()),
        };

        debug!(path = %path.display(), keys = values.len(), "Opened JSON store");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self, values: &Map<String, Value>) -> StoreResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(serde_json::to_string_pretty(values)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn save(&self, key: &str, value: &Value) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        let mut updated = values.clone();
        updated.insert(key.to_string(), value.clone());
        // Only a value that reached disk becomes visible to `load`.
        self.write_document(&updated)?;
        *values = updated;
        Ok(())
    }

    fn load(&self, key: &str, default: Value) -> Value {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
            .unwrap_or(default)
    }
}
