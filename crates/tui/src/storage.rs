//! Durable key-value storage for UI preferences.
//!
//! Values are JSON text stored under string keys in a single JSON object
//! on disk. The file is read once when opened and rewritten on every
//! [`LocalStorage::set`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StudioError;

#[derive(Debug, Default)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Open the storage file at `path`.
    ///
    /// A missing file starts empty. A file that cannot be parsed is logged
    /// and treated as empty; it is overwritten by the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StudioError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable storage file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened storage");

        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// Storage that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store `value` under `key` and flush to disk.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), StudioError> {
        self.entries.insert(key.to_string(), value.into());
        self.flush()
    }

    /// Decode the value under `key`. Values that do not decode as `T` are
    /// logged and ignored.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed stored value");
                None
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StudioError> {
        let text = serde_json::to_string(value)?;
        self.set(key, text)
    }

    fn flush(&self) -> Result<(), StudioError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(&self.entries)?)?;
        Ok(())
    }
}
