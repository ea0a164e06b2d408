//! Alarm sound handling.
//!
//! This module provides:
//!
//! - The built-in catalog and the persisted sound selection
//! - The audio engine contract and a rodio-backed implementation
//! - A resolver that keeps exactly one alarm asset prepared at a time
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  SoundResolver   │ ← select / play / teardown
//! └────────┬─────────┘
//!          │ preload("alarm") / play / unload
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   AudioEngine    │────▶│ RodioAudioEngine │ (audio thread)
//! │                  │     ├──────────────────┤
//! │                  │────▶│ NullAudioEngine  │
//! └──────────────────┘     └──────────────────┘
//! ```

mod catalog;
mod embedded;
mod error;
mod player;
mod resolver;

pub use catalog::{
    find_builtin, BuiltinSound, CustomSoundRecord, SoundKind, SoundSelection, BUILTIN_SOUNDS,
    CUSTOM_SOUND_ID, DEFAULT_SOUND_ID, NONE_SOUND_ID,
};
pub use embedded::{default_sound_data, resolve_embedded, EMBEDDED_DEFAULT_REF};
pub use error::SoundError;
pub use player::{try_create_engine, NullAudioEngine, RodioAudioEngine};
pub use resolver::{SoundResolver, ALARM_ASSET_ID};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Native audio engine contract.
///
/// Assets are addressed by an id chosen by the caller. `play` on an asset
/// that is already playing restarts it from the beginning.
pub trait AudioEngine {
    /// Loads an asset so it can be played without delay.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or decoded.
    fn preload(
        &self,
        id: &str,
        source: &str,
        channels: u32,
        is_remote: bool,
    ) -> Result<(), SoundError>;

    /// Plays a preloaded asset from position zero.
    fn play(&self, id: &str) -> Result<(), SoundError>;

    /// Releases a preloaded asset.
    fn unload(&self, id: &str) -> Result<(), SoundError>;
}

/// A call recorded by [`MockAudioEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Preload { id: String, source: String },
    Play(String),
    Unload(String),
}

/// Mock audio engine for testing.
#[derive(Debug, Default)]
pub struct MockAudioEngine {
    calls: Mutex<Vec<AudioCall>>,
    loaded: Mutex<Vec<String>>,
    fail_preload: AtomicBool,
    fail_play: AtomicBool,
}

impl MockAudioEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_preload(&self, fail: bool) {
        self.fail_preload.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, AudioCall::Play(_)))
            .count()
    }

    /// Number of assets currently held.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded.lock().unwrap().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl AudioEngine for MockAudioEngine {
    fn preload(
        &self,
        id: &str,
        source: &str,
        _channels: u32,
        _is_remote: bool,
    ) -> Result<(), SoundError> {
        self.calls.lock().unwrap().push(AudioCall::Preload {
            id: id.to_string(),
            source: source.to_string(),
        });
        if self.fail_preload.load(Ordering::SeqCst) {
            return Err(SoundError::FileNotFound(source.to_string()));
        }
        let mut loaded = self.loaded.lock().unwrap();
        if !loaded.iter().any(|l| l == id) {
            loaded.push(id.to_string());
        }
        Ok(())
    }

    fn play(&self, id: &str) -> Result<(), SoundError> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if !self.loaded.lock().unwrap().iter().any(|l| l == id) {
            return Err(SoundError::NotPrepared(id.to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push(AudioCall::Play(id.to_string()));
        Ok(())
    }

    fn unload(&self, id: &str) -> Result<(), SoundError> {
        self.calls
            .lock()
            .unwrap()
            .push(AudioCall::Unload(id.to_string()));
        self.loaded.lock().unwrap().retain(|l| l != id);
        Ok(())
    }
}
