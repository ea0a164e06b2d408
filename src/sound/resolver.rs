//! Maps the selected sound to a prepared alarm asset.

use std::sync::Arc;

use tracing::{debug, warn};

use super::catalog::SoundSelection;
use super::AudioEngine;

/// Engine id under which the alarm is prepared.
pub const ALARM_ASSET_ID: &str = "alarm";

/// Number of simultaneous voices requested for the alarm.
const ALARM_CHANNELS: u32 = 1;

/// Holds at most one prepared alarm asset.
///
/// The asset is released when the selection changes and when the resolver
/// is dropped.
pub struct SoundResolver {
    engine: Arc<dyn AudioEngine + Send + Sync>,
    selection: SoundSelection,
    prepared: bool,
}

impl SoundResolver {
    /// Creates a resolver with nothing prepared.
    pub fn new(engine: Arc<dyn AudioEngine + Send + Sync>) -> Self {
        Self {
            engine,
            selection: SoundSelection::none(),
            prepared: false,
        }
    }

    /// Switches to a new selection.
    ///
    /// The previous asset is unloaded first. Preload failures are logged and
    /// leave the resolver silent. Blocks while the engine loads the asset;
    /// see [`SoundResolver::prepare`] for doing that step elsewhere.
    pub fn select(&mut self, selection: &SoundSelection) {
        self.teardown();
        let prepared = Self::prepare(self.engine.as_ref(), selection);
        self.adopt(selection, prepared);
    }

    /// Preloads `selection` under [`ALARM_ASSET_ID`] on `engine`.
    ///
    /// May block on file I/O and decoding. Returns true if the asset is
    /// ready; failures are logged.
    pub fn prepare<E: AudioEngine + ?Sized>(engine: &E, selection: &SoundSelection) -> bool {
        if selection.is_silent() {
            debug!("Silent sound selected, nothing to prepare");
            return false;
        }

        match engine.preload(
            ALARM_ASSET_ID,
            &selection.payload_ref,
            ALARM_CHANNELS,
            selection.is_remote(),
        ) {
            Ok(()) => {
                debug!("Prepared alarm sound: {}", selection.display_name);
                true
            }
            Err(e) => {
                warn!(
                    "Failed to prepare alarm sound '{}': {}",
                    selection.display_name, e
                );
                false
            }
        }
    }

    /// Records a selection whose asset was prepared with
    /// [`SoundResolver::prepare`]. Call after [`SoundResolver::teardown`].
    pub fn adopt(&mut self, selection: &SoundSelection, prepared: bool) {
        self.selection = selection.clone();
        self.prepared = prepared;
    }

    /// Plays the prepared alarm from the start.
    ///
    /// Returns true if playback was requested.
    pub fn play(&self) -> bool {
        if !self.prepared {
            debug!("No alarm prepared, skipping playback");
            return false;
        }
        match self.engine.play(ALARM_ASSET_ID) {
            Ok(()) => true,
            Err(e) => {
                warn!("Alarm playback failed: {}", e);
                false
            }
        }
    }

    /// Releases the prepared asset, if any.
    pub fn teardown(&mut self) {
        if !self.prepared {
            return;
        }
        self.prepared = false;
        if let Err(e) = self.engine.unload(ALARM_ASSET_ID) {
            warn!("Failed to unload alarm sound: {}", e);
        }
    }

    /// Engine handle, for preparing a selection off the owning thread.
    pub fn engine(&self) -> Arc<dyn AudioEngine + Send + Sync> {
        Arc::clone(&self.engine)
    }

    pub fn selection(&self) -> &SoundSelection {
        &self.selection
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }
}

impl Drop for SoundResolver {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for SoundResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundResolver")
            .field("selection", &self.selection.id)
            .field("prepared", &self.prepared)
            .finish_non_exhaustive()
    }
}
