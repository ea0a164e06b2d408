//! Command surface.
//!
//! Validates user intents and forwards them to the session machine, the
//! preferences and the file store. The only state kept here is whether the
//! user currently wants the overlay shown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use super::timer::SharedSession;
use crate::mirror::{MirrorError, OverlayMirror};
use crate::settings::{FileStore, Preferences, Settings, SettingsError, SOUNDS_DIRECTORY};
use crate::sound::{SoundResolver, SoundSelection, CUSTOM_SOUND_ID};
use crate::types::{clamp_minutes, SessionSnapshot};

// ============================================================================
// Command / CommandResponse
// ============================================================================

/// A user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    /// New work length in minutes, coerced into range
    SetWorkMinutes(i64),
    /// New break length in minutes, coerced into range
    SetBreakMinutes(i64),
    /// Catalog id, or `custom` to keep the current upload
    SelectSound(String),
    /// A new custom sound file
    UploadSound { name: String, bytes: Vec<u8> },
    SetOverlay(bool),
    Status,
}

/// Result of a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// "success" or "error"
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SessionSnapshot>,
}

impl CommandResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<SessionSnapshot>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// CommandHandler
// ============================================================================

/// Handles commands against the shared session.
pub struct CommandHandler {
    session: SharedSession,
    preferences: Mutex<Preferences>,
    files: Arc<dyn FileStore + Send + Sync>,
    overlay_requested: AtomicBool,
    restart: Arc<Notify>,
    /// Serializes sound changes across the unlocked preload step.
    sound_change: Mutex<()>,
}

impl CommandHandler {
    /// Creates a handler.
    ///
    /// `restart` is notified after every successful start so the ticker can
    /// realign its phase.
    pub fn new(
        session: SharedSession,
        preferences: Preferences,
        files: Arc<dyn FileStore + Send + Sync>,
        restart: Arc<Notify>,
    ) -> Self {
        Self {
            session,
            preferences: Mutex::new(preferences),
            files,
            overlay_requested: AtomicBool::new(false),
            restart,
            sound_change: Mutex::new(()),
        }
    }

    /// Handles a command and returns the response.
    pub async fn handle(&self, command: Command) -> CommandResponse {
        debug!("Handling command: {:?}", CommandName(&command));
        match command {
            Command::Start => self.handle_start().await,
            Command::Pause => self.handle_pause().await,
            Command::Reset => self.handle_reset().await,
            Command::SetWorkMinutes(minutes) => self.handle_work_minutes(minutes).await,
            Command::SetBreakMinutes(minutes) => self.handle_break_minutes(minutes).await,
            Command::SelectSound(id) => self.handle_select_sound(&id).await,
            Command::UploadSound { name, bytes } => self.handle_upload_sound(&name, &bytes).await,
            Command::SetOverlay(true) => self.handle_overlay_on().await,
            Command::SetOverlay(false) => self.handle_overlay_off().await,
            Command::Status => self.handle_status().await,
        }
    }

    /// Whether the user asked for the overlay and it was shown.
    pub fn overlay_requested(&self) -> bool {
        self.overlay_requested.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Current settings.
    pub async fn settings(&self) -> Settings {
        self.preferences.lock().await.settings().clone()
    }

    /// Shuts the session down.
    pub async fn shutdown(&self) {
        self.overlay_requested.store(false, Ordering::SeqCst);
        self.session.lock().await.shutdown();
    }

    async fn handle_start(&self) -> CommandResponse {
        let mut machine = self.session.lock().await;
        if !machine.start() {
            return CommandResponse::success("Timer is already running", Some(machine.snapshot()));
        }
        self.restart.notify_one();
        CommandResponse::success("Timer started", Some(machine.snapshot()))
    }

    async fn handle_pause(&self) -> CommandResponse {
        let mut machine = self.session.lock().await;
        let message = if machine.pause() {
            "Timer paused"
        } else {
            "Timer is not running"
        };
        CommandResponse::success(message, Some(machine.snapshot()))
    }

    async fn handle_reset(&self) -> CommandResponse {
        let mut machine = self.session.lock().await;
        machine.reset();
        CommandResponse::success("Timer reset", Some(machine.snapshot()))
    }

    async fn handle_work_minutes(&self, minutes: i64) -> CommandResponse {
        let applied = {
            let mut preferences = self.preferences.lock().await;
            persisted_minutes(preferences.set_work_minutes(minutes), minutes)
        };

        let mut machine = self.session.lock().await;
        machine.set_work_minutes(applied);
        let mut message = format!("Work duration set to {} min", applied);
        if !machine.session().is_idle() {
            message.push_str(" (applies from the next work interval)");
        }
        CommandResponse::success(message, Some(machine.snapshot()))
    }

    async fn handle_break_minutes(&self, minutes: i64) -> CommandResponse {
        let applied = {
            let mut preferences = self.preferences.lock().await;
            persisted_minutes(preferences.set_break_minutes(minutes), minutes)
        };

        let mut machine = self.session.lock().await;
        machine.set_break_minutes(applied);
        let message = format!("Break duration set to {} min", applied);
        CommandResponse::success(message, Some(machine.snapshot()))
    }

    async fn handle_select_sound(&self, id: &str) -> CommandResponse {
        let selection = if id == CUSTOM_SOUND_ID {
            let current = self.preferences.lock().await.settings().sound.clone();
            if !current.is_custom() {
                return CommandResponse::error(
                    "No custom sound uploaded; give a file path to upload one",
                );
            }
            current
        } else {
            match SoundSelection::builtin(id) {
                Some(selection) => selection,
                None => return CommandResponse::error(format!("Unknown sound: {}", id)),
            }
        };
        self.apply_sound(selection).await
    }

    async fn handle_upload_sound(&self, name: &str, bytes: &[u8]) -> CommandResponse {
        if bytes.is_empty() {
            return CommandResponse::error(format!("Sound file is empty: {}", name));
        }
        let uri = match self.files.write(name, bytes, SOUNDS_DIRECTORY) {
            Ok(uri) => uri,
            Err(e) => return CommandResponse::error(format!("Failed to store sound: {}", e)),
        };
        self.apply_sound(SoundSelection::custom(uri, name)).await
    }

    /// Persists and prepares a selection, then drops a superseded upload.
    ///
    /// The superseded file is only deleted once the new selection is
    /// stored; otherwise the store would still point at it.
    async fn apply_sound(&self, selection: SoundSelection) -> CommandResponse {
        let _change = self.sound_change.lock().await;

        let superseded = {
            let mut preferences = self.preferences.lock().await;
            match preferences.set_sound(selection.clone()) {
                Ok(previous) => Some(previous),
                Err(e) => {
                    warn!("{} ({})", e, e.suggestion());
                    None
                }
            }
        };

        // Loading and decoding may take a while; keep the session free so
        // ticks continue meanwhile.
        let engine = self.session.lock().await.release_sound();
        let prepared = {
            let selection = selection.clone();
            match tokio::task::spawn_blocking(move || {
                SoundResolver::prepare(engine.as_ref(), &selection)
            })
            .await
            {
                Ok(prepared) => prepared,
                Err(e) => {
                    warn!("Sound preparation task failed: {}", e);
                    false
                }
            }
        };

        if let Some(previous) = superseded {
            if previous.is_custom() && previous.payload_ref != selection.payload_ref {
                if let Err(e) = self.files.delete(&previous.payload_ref) {
                    warn!("Failed to delete superseded sound: {}", e);
                }
            }
        }

        let mut machine = self.session.lock().await;
        machine.adopt_sound(&selection, prepared);

        let mut message = format!("Alarm sound set to {}", selection.display_name);
        if !selection.is_silent() && !prepared {
            message.push_str(" (could not be loaded; the alarm will be silent)");
        }
        CommandResponse::success(message, Some(machine.snapshot()))
    }

    async fn handle_overlay_on(&self) -> CommandResponse {
        if self.overlay_requested() {
            let machine = self.session.lock().await;
            return CommandResponse::success("Overlay is already on", Some(machine.snapshot()));
        }

        // The permission step may wait on the user; keep the session free
        // so ticks continue meanwhile.
        let backend = self.session.lock().await.overlay_backend();
        let granted =
            match tokio::task::spawn_blocking(move || OverlayMirror::ensure_permission(backend.as_ref()))
                .await
            {
                Ok(granted) => granted,
                Err(e) => {
                    warn!("Overlay permission task failed: {}", e);
                    false
                }
            };
        if !granted {
            let e = MirrorError::PermissionDenied;
            return CommandResponse::error(format!("{} ({})", e, e.suggestion()));
        }

        let mut machine = self.session.lock().await;
        match machine.show_overlay_granted() {
            Ok(()) => {
                self.overlay_requested.store(true, Ordering::SeqCst);
                CommandResponse::success("Overlay on", Some(machine.snapshot()))
            }
            Err(e) => CommandResponse::error(format!("Failed to show overlay: {}", e)),
        }
    }

    async fn handle_overlay_off(&self) -> CommandResponse {
        self.overlay_requested.store(false, Ordering::SeqCst);
        let mut machine = self.session.lock().await;
        machine.hide_overlay();
        CommandResponse::success("Overlay off", Some(machine.snapshot()))
    }

    async fn handle_status(&self) -> CommandResponse {
        let machine = self.session.lock().await;
        CommandResponse::success("", Some(machine.snapshot()))
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("overlay_requested", &self.overlay_requested())
            .finish_non_exhaustive()
    }
}

/// Falls back to the clamped input when the write failed.
fn persisted_minutes(result: Result<u32, SettingsError>, requested: i64) -> u32 {
    match result {
        Ok(minutes) => minutes,
        Err(e) => {
            warn!("{} ({})", e, e.suggestion());
            clamp_minutes(requested)
        }
    }
}

/// Logs a command without its payload bytes.
struct CommandName<'a>(&'a Command);

impl std::fmt::Debug for CommandName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Command::UploadSound { name, bytes } => {
                write!(f, "UploadSound({}, {} bytes)", name, bytes.len())
            }
            other => write!(f, "{:?}", other),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::timer::{Backends, SessionMachine};
    use crate::mirror::{MockNotificationBackend, MockOverlayBackend};
    use crate::settings::{MemoryFileStore, MemorySettingsStore};
    use crate::sound::{AudioEngine, MockAudioEngine, SoundError, SoundKind};
    use crate::types::{Mode, RunState};

    struct Fixture {
        handler: CommandHandler,
        store: Arc<MemorySettingsStore>,
        files: Arc<MemoryFileStore>,
        audio: Arc<MockAudioEngine>,
        overlay: Arc<MockOverlayBackend>,
        restart: Arc<Notify>,
    }

    fn create_fixture(entries: &[(&str, &str)]) -> Fixture {
        let store = Arc::new(MemorySettingsStore::with_values(entries.iter().copied()));
        let files = Arc::new(MemoryFileStore::new());
        let audio = Arc::new(MockAudioEngine::new());
        let overlay = Arc::new(MockOverlayBackend::new());
        let restart = Arc::new(Notify::new());

        let preferences = Preferences::load(store.clone());
        let machine = SessionMachine::new(
            preferences.settings(),
            Backends {
                audio: audio.clone(),
                notification: Arc::new(MockNotificationBackend::new()),
                overlay: overlay.clone(),
            },
        );
        let handler = CommandHandler::new(
            machine.into_shared(),
            preferences,
            files.clone(),
            restart.clone(),
        );
        Fixture {
            handler,
            store,
            files,
            audio,
            overlay,
            restart,
        }
    }

    fn snapshot(response: &CommandResponse) -> &SessionSnapshot {
        response.data.as_ref().unwrap()
    }

    // ------------------------------------------------------------------------
    // CommandResponse Tests
    // ------------------------------------------------------------------------

    mod response_tests {
        use super::*;

        #[test]
        fn test_success_and_error() {
            let ok = CommandResponse::success("done", None);
            assert!(ok.is_success());
            let err = CommandResponse::error("bad");
            assert!(!err.is_success());
            assert_eq!(err.status, "error");
        }

        #[test]
        fn test_serialize_skips_empty_data() {
            let json = serde_json::to_string(&CommandResponse::error("bad")).unwrap();
            assert_eq!(json, r#"{"status":"error","message":"bad"}"#);
        }
    }

    // ------------------------------------------------------------------------
    // Transition Command Tests
    // ------------------------------------------------------------------------

    mod transition_tests {
        use super::*;

        #[tokio::test]
        async fn test_start_notifies_ticker() {
            let fixture = create_fixture(&[]);
            let response = fixture.handler.handle(Command::Start).await;

            assert!(response.is_success());
            assert_eq!(snapshot(&response).run_state, RunState::Running);
            // A stored permit resolves immediately.
            tokio::time::timeout(
                std::time::Duration::from_millis(100),
                fixture.restart.notified(),
            )
            .await
            .unwrap();
        }

        #[tokio::test]
        async fn test_start_twice_is_not_an_error() {
            let fixture = create_fixture(&[]);
            fixture.handler.handle(Command::Start).await;
            let response = fixture.handler.handle(Command::Start).await;
            assert!(response.is_success());
            assert!(response.message.contains("already running"));
        }

        #[tokio::test]
        async fn test_pause_when_idle_is_not_an_error() {
            let fixture = create_fixture(&[]);
            let response = fixture.handler.handle(Command::Pause).await;
            assert!(response.is_success());
            assert_eq!(snapshot(&response).run_state, RunState::Idle);
        }

        #[tokio::test]
        async fn test_reset() {
            let fixture = create_fixture(&[("workMinutes", "2")]);
            fixture.handler.handle(Command::Start).await;
            fixture.handler.session().lock().await.tick();

            let response = fixture.handler.handle(Command::Reset).await;
            let data = snapshot(&response);
            assert_eq!(data.run_state, RunState::Idle);
            assert_eq!(data.mode, Mode::Work);
            assert_eq!(data.remaining_seconds, 120);
        }
    }

    // ------------------------------------------------------------------------
    // Duration Command Tests
    // ------------------------------------------------------------------------

    mod duration_tests {
        use super::*;

        #[tokio::test]
        async fn test_work_minutes_persisted_and_applied_while_idle() {
            let fixture = create_fixture(&[]);
            let response = fixture.handler.handle(Command::SetWorkMinutes(25)).await;

            assert_eq!(snapshot(&response).remaining_seconds, 1500);
            assert_eq!(fixture.store.value("workMinutes"), Some("25".to_string()));
            assert_eq!(fixture.handler.settings().await.work_minutes, 25);
        }

        #[tokio::test]
        async fn test_out_of_range_minutes_are_coerced() {
            let fixture = create_fixture(&[]);
            let response = fixture.handler.handle(Command::SetWorkMinutes(0)).await;
            assert_eq!(snapshot(&response).remaining_seconds, 60);

            let response = fixture.handler.handle(Command::SetBreakMinutes(5000)).await;
            assert_eq!(snapshot(&response).break_seconds, 999 * 60);
            assert_eq!(fixture.store.value("breakMinutes"), Some("999".to_string()));
        }

        #[tokio::test]
        async fn test_work_minutes_while_running_are_deferred() {
            let fixture = create_fixture(&[]);
            fixture.handler.handle(Command::Start).await;
            let response = fixture.handler.handle(Command::SetWorkMinutes(5)).await;

            assert!(response.message.contains("next work interval"));
            assert_eq!(snapshot(&response).remaining_seconds, 2400);
            assert_eq!(snapshot(&response).work_seconds, 300);
        }

        #[tokio::test]
        async fn test_persistence_failure_keeps_session_going() {
            let fixture = create_fixture(&[]);
            fixture.store.set_should_fail(true);

            let response = fixture.handler.handle(Command::SetWorkMinutes(3)).await;
            assert!(response.is_success());
            assert_eq!(snapshot(&response).remaining_seconds, 180);
        }
    }

    // ------------------------------------------------------------------------
    // Sound Command Tests
    // ------------------------------------------------------------------------

    mod sound_tests {
        use super::*;

        #[tokio::test]
        async fn test_select_builtin() {
            let fixture = create_fixture(&[]);
            let response = fixture
                .handler
                .handle(Command::SelectSound("none".to_string()))
                .await;

            assert!(response.is_success());
            assert_eq!(snapshot(&response).sound_name.as_deref(), Some("Silent"));
            assert_eq!(fixture.store.value("selectedSound"), Some("none".to_string()));
            assert_eq!(fixture.audio.loaded_count(), 0);
        }

        #[tokio::test]
        async fn test_select_unknown_is_rejected() {
            let fixture = create_fixture(&[]);
            let response = fixture
                .handler
                .handle(Command::SelectSound("kazoo".to_string()))
                .await;
            assert!(!response.is_success());
            assert_eq!(fixture.store.value("selectedSound"), None);
        }

        #[tokio::test]
        async fn test_select_custom_without_upload_is_rejected() {
            let fixture = create_fixture(&[]);
            let response = fixture
                .handler
                .handle(Command::SelectSound("custom".to_string()))
                .await;
            assert!(!response.is_success());
        }

        #[tokio::test]
        async fn test_upload_persists_record_and_prepares_sound() {
            let fixture = create_fixture(&[]);
            let response = fixture
                .handler
                .handle(Command::UploadSound {
                    name: "bell.wav".to_string(),
                    bytes: b"RIFF".to_vec(),
                })
                .await;

            assert!(response.is_success());
            let settings = fixture.handler.settings().await;
            assert_eq!(settings.sound.kind, SoundKind::Custom);
            assert!(fixture.files.contains(&settings.sound.payload_ref));

            let stored = fixture.store.value("selectedSound").unwrap();
            assert!(stored.starts_with('{'));
            assert_eq!(SoundSelection::from_stored(&stored), Some(settings.sound));
            assert_eq!(fixture.audio.loaded_count(), 1);
        }

        #[tokio::test]
        async fn test_new_upload_supersedes_previous_file() {
            let fixture = create_fixture(&[]);
            for name in ["first.wav", "second.wav"] {
                fixture
                    .handler
                    .handle(Command::UploadSound {
                        name: name.to_string(),
                        bytes: b"RIFF".to_vec(),
                    })
                    .await;
            }
            assert_eq!(fixture.files.file_count(), 1);
            let settings = fixture.handler.settings().await;
            assert_eq!(settings.sound.display_name, "second.wav");
        }

        #[tokio::test]
        async fn test_reselect_custom_keeps_file() {
            let fixture = create_fixture(&[]);
            fixture
                .handler
                .handle(Command::UploadSound {
                    name: "bell.wav".to_string(),
                    bytes: b"RIFF".to_vec(),
                })
                .await;
            let response = fixture
                .handler
                .handle(Command::SelectSound("custom".to_string()))
                .await;
            assert!(response.is_success());
            assert_eq!(fixture.files.file_count(), 1);
        }

        #[tokio::test]
        async fn test_upload_write_failure() {
            let fixture = create_fixture(&[]);
            fixture.files.set_should_fail(true);
            let response = fixture
                .handler
                .handle(Command::UploadSound {
                    name: "bell.wav".to_string(),
                    bytes: b"RIFF".to_vec(),
                })
                .await;
            assert!(!response.is_success());
            assert_eq!(fixture.handler.settings().await.sound, SoundSelection::default());
        }

        #[tokio::test]
        async fn test_unloadable_sound_reports_silent_alarm() {
            let fixture = create_fixture(&[]);
            fixture.audio.set_fail_preload(true);
            let response = fixture
                .handler
                .handle(Command::SelectSound("sound_mp3".to_string()))
                .await;
            assert!(response.is_success());
            assert!(response.message.contains("silent"));
        }

        async fn upload(fixture: &Fixture, name: &str) -> CommandResponse {
            fixture
                .handler
                .handle(Command::UploadSound {
                    name: name.to_string(),
                    bytes: b"RIFF".to_vec(),
                })
                .await
        }

        #[tokio::test]
        async fn test_failed_save_keeps_previous_upload() {
            let fixture = create_fixture(&[]);
            upload(&fixture, "first.wav").await;
            let first = fixture.handler.settings().await.sound.payload_ref;

            fixture.store.set_should_fail(true);
            let response = upload(&fixture, "second.wav").await;
            assert!(response.is_success());

            // The store still names the first upload, so its file must stay.
            let stored = fixture.store.value("selectedSound").unwrap();
            assert_eq!(SoundSelection::from_stored(&stored).unwrap().payload_ref, first);
            assert!(fixture.files.contains(&first));
            assert_eq!(fixture.files.file_count(), 2);
        }

        /// Records whether the session was locked during each preload.
        #[derive(Default)]
        struct LockCheckingEngine {
            session: std::sync::OnceLock<SharedSession>,
            locked: std::sync::Mutex<Vec<bool>>,
        }

        impl AudioEngine for LockCheckingEngine {
            fn preload(&self, _: &str, _: &str, _: u32, _: bool) -> Result<(), SoundError> {
                if let Some(session) = self.session.get() {
                    self.locked.lock().unwrap().push(session.try_lock().is_err());
                }
                Ok(())
            }

            fn play(&self, _: &str) -> Result<(), SoundError> {
                Ok(())
            }

            fn unload(&self, _: &str) -> Result<(), SoundError> {
                Ok(())
            }
        }

        #[tokio::test]
        async fn test_sound_is_prepared_without_holding_session() {
            let engine = Arc::new(LockCheckingEngine::default());
            let preferences = Preferences::load(Arc::new(MemorySettingsStore::new()));
            let session = SessionMachine::new(
                preferences.settings(),
                Backends {
                    audio: engine.clone(),
                    notification: Arc::new(MockNotificationBackend::new()),
                    overlay: Arc::new(MockOverlayBackend::new()),
                },
            )
            .into_shared();
            let _ = engine.session.set(Arc::clone(&session));
            let handler = CommandHandler::new(
                session,
                preferences,
                Arc::new(MemoryFileStore::new()),
                Arc::new(Notify::new()),
            );

            let response = handler
                .handle(Command::SelectSound("sound_mp3".to_string()))
                .await;
            assert!(response.is_success());
            assert!(!response.message.contains("silent"));
            assert_eq!(*engine.locked.lock().unwrap(), vec![false]);
        }
    }

    // ------------------------------------------------------------------------
    // Overlay Command Tests
    // ------------------------------------------------------------------------

    mod overlay_tests {
        use super::*;
        use crate::mirror::OverlayCall;

        #[tokio::test]
        async fn test_overlay_on_and_off() {
            let fixture = create_fixture(&[]);
            let response = fixture.handler.handle(Command::SetOverlay(true)).await;
            assert!(response.is_success());
            assert!(snapshot(&response).overlay_active);
            assert!(fixture.handler.overlay_requested());

            let response = fixture.handler.handle(Command::SetOverlay(false)).await;
            assert!(!snapshot(&response).overlay_active);
            assert!(!fixture.handler.overlay_requested());
            assert_eq!(fixture.overlay.calls().last(), Some(&OverlayCall::Hide));
        }

        #[tokio::test]
        async fn test_overlay_denied_keeps_toggle_off() {
            let fixture = create_fixture(&[]);
            fixture.overlay.set_has_permission(false);
            fixture.overlay.set_grant_on_request(false);

            let response = fixture.handler.handle(Command::SetOverlay(true)).await;
            assert!(!response.is_success());
            assert!(response.message.contains("permission denied"));
            assert!(!fixture.handler.overlay_requested());
            assert_eq!(fixture.overlay.show_count(), 0);
        }

        #[tokio::test]
        async fn test_overlay_shows_live_remaining_time() {
            let fixture = create_fixture(&[("workMinutes", "1")]);
            fixture.handler.handle(Command::Start).await;
            {
                let session = fixture.handler.session();
                let mut machine = session.lock().await;
                for _ in 0..3 {
                    machine.tick();
                }
            }
            fixture.handler.handle(Command::SetOverlay(true)).await;
            assert_eq!(fixture.overlay.last_text(), Some("00:57".to_string()));
        }

        #[tokio::test]
        async fn test_overlay_on_twice_shows_once() {
            let fixture = create_fixture(&[]);
            fixture.handler.handle(Command::SetOverlay(true)).await;
            let response = fixture.handler.handle(Command::SetOverlay(true)).await;
            assert!(response.message.contains("already on"));
            assert_eq!(fixture.overlay.show_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_status_and_shutdown() {
        let fixture = create_fixture(&[]);
        let response = fixture.handler.handle(Command::Status).await;
        assert_eq!(snapshot(&response).status, "Idle");
        assert_eq!(snapshot(&response).clock, "40:00");

        fixture.handler.handle(Command::Start).await;
        fixture.handler.handle(Command::SetOverlay(true)).await;
        fixture.handler.shutdown().await;
        let machine = fixture.handler.session();
        let machine = machine.lock().await;
        assert!(!machine.notification().is_active());
        assert!(!machine.overlay().is_active());
    }
}
