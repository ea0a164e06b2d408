//! Audio engine implementations.
//!
//! `RodioAudioEngine` owns the rodio output stream on a dedicated audio
//! thread, since the stream cannot move between threads. Callers talk to it
//! through a channel, so the engine handle itself is `Send + Sync`.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::embedded::{resolve_embedded, EMBEDDED_PREFIX};
use super::error::SoundError;
use super::AudioEngine;

type Reply = Sender<Result<(), SoundError>>;

/// Requests handled by the audio thread.
enum AudioRequest {
    Preload {
        id: String,
        bytes: Arc<[u8]>,
        reply: Reply,
    },
    Play {
        id: String,
    },
    Unload {
        id: String,
    },
    Shutdown,
}

/// An audio engine that plays through rodio.
///
/// Preloading reads and validates the whole asset up front, so `play` only
/// needs to hand the bytes to a fresh sink. A new `play` stops whatever is
/// still sounding.
pub struct RodioAudioEngine {
    requests: Sender<AudioRequest>,
}

impl RodioAudioEngine {
    /// Starts the audio thread.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (requests, inbox) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);

        thread::Builder::new()
            .name("prodomo-audio".to_string())
            .spawn(move || {
                let (stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => pair,
                    Err(e) => {
                        let _ = ready_tx.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                debug!("Audio output stream initialized");
                AudioWorker::new(handle).run(inbox);
                drop(stream);
            })
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))??;

        Ok(Self { requests })
    }

    fn send(&self, request: AudioRequest) -> Result<(), SoundError> {
        self.requests
            .send(request)
            .map_err(|_| SoundError::DeviceNotAvailable("audio thread stopped".to_string()))
    }
}

impl AudioEngine for RodioAudioEngine {
    fn preload(
        &self,
        id: &str,
        source: &str,
        channels: u32,
        is_remote: bool,
    ) -> Result<(), SoundError> {
        if is_remote {
            return Err(SoundError::Unsupported(source.to_string()));
        }
        debug!("Preloading '{}' from {} ({} channel(s))", id, source, channels);

        let bytes = load_asset(source)?;
        // Decode once here so a broken file fails at selection time.
        Decoder::new(Cursor::new(bytes.clone()))
            .map_err(|e| SoundError::DecodeError(format!("{}: {}", source, e)))?;

        let (reply, result) = bounded(1);
        self.send(AudioRequest::Preload {
            id: id.to_string(),
            bytes,
            reply,
        })?;
        result
            .recv()
            .map_err(|_| SoundError::DeviceNotAvailable("audio thread stopped".to_string()))?
    }

    fn play(&self, id: &str) -> Result<(), SoundError> {
        self.send(AudioRequest::Play { id: id.to_string() })
    }

    fn unload(&self, id: &str) -> Result<(), SoundError> {
        self.send(AudioRequest::Unload { id: id.to_string() })
    }
}

impl Drop for RodioAudioEngine {
    fn drop(&mut self) {
        let _ = self.requests.send(AudioRequest::Shutdown);
    }
}

impl std::fmt::Debug for RodioAudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioAudioEngine").finish_non_exhaustive()
    }
}

/// Reads an asset reference into memory.
fn load_asset(source: &str) -> Result<Arc<[u8]>, SoundError> {
    if source.starts_with(EMBEDDED_PREFIX) {
        return resolve_embedded(source)
            .map(Arc::from)
            .ok_or_else(|| SoundError::FileNotFound(source.to_string()));
    }
    let path = source.strip_prefix("file://").unwrap_or(source);
    std::fs::read(path)
        .map(Arc::from)
        .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path, e)))
}

/// State owned by the audio thread.
struct AudioWorker {
    handle: OutputStreamHandle,
    assets: HashMap<String, Arc<[u8]>>,
    current: Option<(String, Sink)>,
}

impl AudioWorker {
    fn new(handle: OutputStreamHandle) -> Self {
        Self {
            handle,
            assets: HashMap::new(),
            current: None,
        }
    }

    fn run(mut self, inbox: Receiver<AudioRequest>) {
        while let Ok(request) = inbox.recv() {
            match request {
                AudioRequest::Preload { id, bytes, reply } => {
                    self.assets.insert(id, bytes);
                    let _ = reply.send(Ok(()));
                }
                AudioRequest::Play { id } => {
                    if let Err(e) = self.play(&id) {
                        warn!("Failed to play '{}': {}", id, e);
                    }
                }
                AudioRequest::Unload { id } => {
                    if self.current.as_ref().is_some_and(|(playing, _)| *playing == id) {
                        self.stop();
                    }
                    self.assets.remove(&id);
                }
                AudioRequest::Shutdown => break,
            }
        }
        self.stop();
        debug!("Audio thread stopped");
    }

    fn play(&mut self, id: &str) -> Result<(), SoundError> {
        let bytes = self
            .assets
            .get(id)
            .cloned()
            .ok_or_else(|| SoundError::NotPrepared(id.to_string()))?;

        self.stop();

        let decoder =
            Decoder::new(Cursor::new(bytes)).map_err(|e| SoundError::DecodeError(e.to_string()))?;
        let sink =
            Sink::try_new(&self.handle).map_err(|e| SoundError::PlaybackError(e.to_string()))?;
        sink.append(decoder);
        self.current = Some((id.to_string(), sink));

        debug!("Sound playback started: {}", id);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some((_, sink)) = self.current.take() {
            sink.stop();
        }
    }
}

/// An engine that accepts everything and plays nothing.
///
/// Used when sound is disabled or no audio device exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioEngine;

impl AudioEngine for NullAudioEngine {
    fn preload(&self, id: &str, _: &str, _: u32, _: bool) -> Result<(), SoundError> {
        debug!("Sound disabled, not preloading '{}'", id);
        Ok(())
    }

    fn play(&self, _id: &str) -> Result<(), SoundError> {
        debug!("Sound disabled, skipping playback");
        Ok(())
    }

    fn unload(&self, _id: &str) -> Result<(), SoundError> {
        Ok(())
    }
}

/// Creates the rodio engine, falling back to [`NullAudioEngine`].
///
/// If audio initialization fails, a warning is logged and sound is disabled.
#[must_use]
pub fn try_create_engine(disabled: bool) -> Arc<dyn AudioEngine + Send + Sync> {
    if disabled {
        return Arc::new(NullAudioEngine);
    }
    match RodioAudioEngine::new() {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            Arc::new(NullAudioEngine)
        }
    }
}
