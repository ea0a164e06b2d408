//! Key/value settings stores.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::error::SettingsError;

/// Durable string key/value store.
///
/// Keys are opaque; callers serialize values themselves.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn remove(&self, key: &str) -> Result<(), SettingsError>;
}

// ============================================================================
// JsonFileStore
// ============================================================================

/// A store backed by a single JSON object on disk.
///
/// The file is read once on open. Every `set` or `remove` rewrites the
/// whole file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or malformed file is
    /// logged and also treated as empty, so the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!("{} ({})", e, e.suggestion());
                BTreeMap::new()
            }
        };
        debug!("Loaded {} setting(s) from {}", values.len(), path.display());
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// `<config_dir>/prodomo/settings.json`, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prodomo").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, SettingsError> {
        self.values.lock().map_err(|_| SettingsError::ReadFailed {
            path: self.path.display().to_string(),
            reason: "settings lock poisoned".to_string(),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), SettingsError> {
        let write_failed = |reason: String| SettingsError::WriteFailed {
            path: self.path.display().to_string(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(values).map_err(|e| write_failed(e.to_string()))?;

        // Write next to the target, then rename over it.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| write_failed(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| write_failed(e.to_string()))
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut values = self.lock()?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let mut values = self.lock()?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&values)
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>, SettingsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(SettingsError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };
    serde_json::from_str(&contents).map_err(|e| SettingsError::MalformedData {
        key: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// MemorySettingsStore
// ============================================================================

/// In-memory store for testing.
///
/// With `set_should_fail(true)` every call returns an error, which lets
/// tests exercise persistence failures.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
    should_fail: AtomicBool,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with the given entries.
    #[must_use]
    pub fn with_values<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Reads a value directly, bypassing the failure switch.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn check(&self, write: bool) -> Result<(), SettingsError> {
        if !self.should_fail.load(Ordering::SeqCst) {
            return Ok(());
        }
        let path = "memory".to_string();
        let reason = "Mock failure".to_string();
        Err(if write {
            SettingsError::WriteFailed { path, reason }
        } else {
            SettingsError::ReadFailed { path, reason }
        })
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        self.check(false)?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.check(true)?;
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.check(true)?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
