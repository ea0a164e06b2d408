//! Storage for uploaded sound files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::debug;
use uuid::Uuid;

use super::error::SettingsError;

/// Directory, relative to the store root, that holds uploaded sounds.
pub const SOUNDS_DIRECTORY: &str = "sounds";

/// Persists uploaded files and hands back a stable reference.
pub trait FileStore {
    /// Stores `bytes` under `directory` and returns a URI for the file.
    fn write(&self, name: &str, bytes: &[u8], directory: &str) -> Result<String, SettingsError>;

    /// Deletes a file previously returned by `write`. Missing files are fine.
    fn delete(&self, uri: &str) -> Result<(), SettingsError>;
}

/// Keeps only characters that are safe in a file name.
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "sound".to_string()
    } else {
        cleaned
    }
}

/// Unique on-disk name for an upload.
fn unique_file_name(name: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), sanitize_file_name(name))
}

// ============================================================================
// DirFileStore
// ============================================================================

/// A file store rooted at a directory on disk. Returns `file://` URIs.
#[derive(Debug, Clone)]
pub struct DirFileStore {
    root: PathBuf,
}

impl DirFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<data_dir>/prodomo`, if the platform has one.
    #[must_use]
    pub fn default_root() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("prodomo"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for DirFileStore {
    fn write(&self, name: &str, bytes: &[u8], directory: &str) -> Result<String, SettingsError> {
        let dir = self.root.join(directory);
        let path = dir.join(unique_file_name(name));
        let write_failed = |reason: String| SettingsError::WriteFailed {
            path: path.display().to_string(),
            reason,
        };

        fs::create_dir_all(&dir).map_err(|e| write_failed(e.to_string()))?;
        fs::write(&path, bytes).map_err(|e| write_failed(e.to_string()))?;

        debug!("Stored {} byte(s) at {}", bytes.len(), path.display());
        Ok(format!("file://{}", path.display()))
    }

    fn delete(&self, uri: &str) -> Result<(), SettingsError> {
        let path = Path::new(uri.strip_prefix("file://").unwrap_or(uri));
        // Only files this store created are removed.
        if !path.starts_with(&self.root) {
            debug!("Not deleting {} outside {}", path.display(), self.root.display());
            return Ok(());
        }
        match fs::remove_file(path) {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SettingsError::WriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

// ============================================================================
// MemoryFileStore
// ============================================================================

/// In-memory file store for testing. Returns `memory://` URIs.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    should_fail: AtomicBool,
}

impl MemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.files.lock().unwrap().contains_key(uri)
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl FileStore for MemoryFileStore {
    fn write(&self, name: &str, bytes: &[u8], directory: &str) -> Result<String, SettingsError> {
        let uri = format!("memory://{}/{}", directory, unique_file_name(name));
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SettingsError::WriteFailed {
                path: uri,
                reason: "Mock failure".to_string(),
            });
        }
        self.files.lock().unwrap().insert(uri.clone(), bytes.to_vec());
        Ok(uri)
    }

    fn delete(&self, uri: &str) -> Result<(), SettingsError> {
        self.files.lock().unwrap().remove(uri);
        Ok(())
    }
}
