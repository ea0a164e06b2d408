//! Persisted user preferences.
//!
//! Settings are loaded once at startup and written through on every change.
//! Stored values are plain strings:
//!
//! - `workMinutes` / `breakMinutes`: decimal integers
//! - `selectedSound`: a catalog id, or a `{"uri", "name"}` record for an
//!   uploaded file
//!
//! Read failures and malformed values fall back to defaults so the session
//! can always start.

mod error;
mod files;
mod store;

pub use error::SettingsError;
pub use files::{DirFileStore, FileStore, MemoryFileStore, SOUNDS_DIRECTORY};
pub use store::{JsonFileStore, MemorySettingsStore, SettingsStore};

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::sound::SoundSelection;
use crate::types::{clamp_minutes, DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

/// Store key of the work duration.
pub const WORK_MINUTES_KEY: &str = "workMinutes";

/// Store key of the break duration.
pub const BREAK_MINUTES_KEY: &str = "breakMinutes";

/// Store key of the alarm sound selection.
pub const SELECTED_SOUND_KEY: &str = "selectedSound";

/// Typed view of the persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub sound: SoundSelection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            sound: SoundSelection::default(),
        }
    }
}

/// Settings backed by a [`SettingsStore`].
///
/// The in-memory copy is authoritative for the running process. Setters
/// update it first, then write through; a failed write is returned but the
/// new value stays in effect.
pub struct Preferences {
    store: Arc<dyn SettingsStore + Send + Sync>,
    current: Settings,
}

impl Preferences {
    /// Reads every key from `store`, substituting defaults where needed.
    pub fn load(store: Arc<dyn SettingsStore + Send + Sync>) -> Self {
        let defaults = Settings::default();
        let current = Settings {
            work_minutes: load_minutes(store.as_ref(), WORK_MINUTES_KEY, defaults.work_minutes),
            break_minutes: load_minutes(store.as_ref(), BREAK_MINUTES_KEY, defaults.break_minutes),
            sound: load_sound(store.as_ref()),
        };
        debug!(
            "Settings loaded: work={}m break={}m sound={}",
            current.work_minutes, current.break_minutes, current.sound.id
        );
        Self { store, current }
    }

    pub fn settings(&self) -> &Settings {
        &self.current
    }

    /// Clamps and stores the work duration. Returns the applied value.
    ///
    /// # Errors
    ///
    /// Returns the store error; the in-memory value is updated regardless.
    pub fn set_work_minutes(&mut self, minutes: i64) -> Result<u32, SettingsError> {
        let minutes = clamp_minutes(minutes);
        self.current.work_minutes = minutes;
        self.store.set(WORK_MINUTES_KEY, &minutes.to_string())?;
        Ok(minutes)
    }

    /// Clamps and stores the break duration. Returns the applied value.
    ///
    /// # Errors
    ///
    /// Returns the store error; the in-memory value is updated regardless.
    pub fn set_break_minutes(&mut self, minutes: i64) -> Result<u32, SettingsError> {
        let minutes = clamp_minutes(minutes);
        self.current.break_minutes = minutes;
        self.store.set(BREAK_MINUTES_KEY, &minutes.to_string())?;
        Ok(minutes)
    }

    /// Stores the sound selection and returns the one it replaced.
    ///
    /// # Errors
    ///
    /// Returns the store error; the in-memory value is updated regardless.
    pub fn set_sound(&mut self, selection: SoundSelection) -> Result<SoundSelection, SettingsError> {
        let stored = selection
            .to_stored()
            .map_err(|e| SettingsError::MalformedData {
                key: SELECTED_SOUND_KEY.to_string(),
                reason: e.to_string(),
            });
        let previous = std::mem::replace(&mut self.current.sound, selection);
        self.store.set(SELECTED_SOUND_KEY, &stored?)?;
        Ok(previous)
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

fn read_key(store: &dyn SettingsStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("{} ({})", e, e.suggestion());
            None
        }
    }
}

fn load_minutes(store: &dyn SettingsStore, key: &str, default: u32) -> u32 {
    let Some(raw) = read_key(store, key) else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(minutes) => clamp_minutes(minutes),
        Err(e) => {
            let err = SettingsError::MalformedData {
                key: key.to_string(),
                reason: e.to_string(),
            };
            warn!("{} ({})", err, err.suggestion());
            default
        }
    }
}

fn load_sound(store: &dyn SettingsStore) -> SoundSelection {
    let Some(raw) = read_key(store, SELECTED_SOUND_KEY) else {
        return SoundSelection::default();
    };
    SoundSelection::from_stored(&raw).unwrap_or_else(|| {
        let err = SettingsError::MalformedData {
            key: SELECTED_SOUND_KEY.to_string(),
            reason: format!("unrecognized value {:?}", raw),
        };
        warn!("{} ({})", err, err.suggestion());
        // Drop the record so the next start does not warn again.
        if let Err(e) = store.remove(SELECTED_SOUND_KEY) {
            warn!("Failed to clear {}: {}", SELECTED_SOUND_KEY, e);
        }
        SoundSelection::default()
    })
}
