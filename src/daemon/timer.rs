//! Session state machine.
//!
//! This module owns the live countdown and drives its side effects:
//! - Start/pause/reset transitions and the one-second tick
//! - Mode switches at interval boundaries, with alarm playback
//! - Pushing the countdown to the notification and overlay mirrors
//! - Deferred duration edits
//! - Event fan-out to subscribers

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::mirror::{
    MirrorError, MirrorPayload, NotificationBackend, NotificationMirror, OverlayBackend,
    OverlayMirror,
};
use crate::settings::Settings;
use crate::sound::{AudioEngine, SoundResolver, SoundSelection};
use crate::types::{minutes_to_seconds, Mode, RunState, Session, SessionSnapshot, TickOutcome};

/// A session machine shared between the ticker and the command handler.
pub type SharedSession = Arc<Mutex<SessionMachine>>;

// ============================================================================
// SessionEvent
// ============================================================================

/// Events emitted by the session machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// One second elapsed and time remains
    Tick {
        mode: Mode,
        remaining_seconds: u32,
    },
    /// An interval ended and the other mode began
    ModeSwitched {
        /// The mode now counting down
        mode: Mode,
        remaining_seconds: u32,
    },
    /// Run state changed, or an idle edit changed the remaining time
    StateChanged {
        run_state: RunState,
        mode: Mode,
        remaining_seconds: u32,
    },
}

// ============================================================================
// Backends
// ============================================================================

/// Collaborators the machine drives.
pub struct Backends {
    pub audio: Arc<dyn AudioEngine + Send + Sync>,
    pub notification: Arc<dyn NotificationBackend + Send + Sync>,
    pub overlay: Arc<dyn OverlayBackend + Send + Sync>,
}

// ============================================================================
// SessionMachine
// ============================================================================

/// The single owner of the live session.
///
/// Every operation runs to completion before the next one starts; callers
/// serialize access through [`SharedSession`]. Collaborator failures are
/// logged and never stop the countdown.
pub struct SessionMachine {
    session: Session,
    sound: SoundResolver,
    notification: NotificationMirror,
    overlay: OverlayMirror,
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl SessionMachine {
    /// Creates an idle machine from the loaded settings and prepares the
    /// selected sound.
    pub fn new(settings: &Settings, backends: Backends) -> Self {
        let mut sound = SoundResolver::new(backends.audio);
        sound.select(&settings.sound);

        Self {
            session: Session::from_minutes(settings.work_minutes, settings.break_minutes),
            sound,
            notification: NotificationMirror::new(backends.notification),
            overlay: OverlayMirror::new(backends.overlay),
            subscribers: Vec::new(),
        }
    }

    /// Wraps the machine for sharing.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Registers a new event subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: SessionEvent) {
        // Dropped receivers are pruned here.
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    fn emit_state(&mut self) {
        self.emit(SessionEvent::StateChanged {
            run_state: self.session.run_state(),
            mode: self.session.mode(),
            remaining_seconds: self.session.remaining_seconds(),
        });
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Starts or resumes the countdown.
    ///
    /// Returns false if it was already running.
    pub fn start(&mut self) -> bool {
        if !self.session.start() {
            debug!("Start ignored, session already running");
            return false;
        }
        debug!(
            "Session running: {} {}",
            self.session.mode().as_str(),
            self.session.clock()
        );

        let payload = self.payload();
        if let Err(e) = self.notification.activate(&payload) {
            warn!("Failed to show notification: {} ({})", e, e.suggestion());
        }
        self.emit_state();
        true
    }

    /// Pauses the countdown, keeping the remaining time.
    ///
    /// Returns false if it was not running.
    pub fn pause(&mut self) -> bool {
        if !self.session.pause() {
            debug!("Pause ignored, session not running");
            return false;
        }
        debug!("Session paused at {}", self.session.clock());

        self.notification.deactivate();
        self.emit_state();
        true
    }

    /// Returns to an idle work interval.
    pub fn reset(&mut self) {
        self.session.reset();
        debug!("Session reset to {}", self.session.clock());

        self.notification.deactivate();
        self.overlay.update(&self.session.clock());
        self.emit_state();
    }

    /// Advances the countdown by one second.
    ///
    /// Inert unless running. When the interval reaches zero the mode
    /// switches and the session keeps running.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.session.tick();
        match outcome {
            TickOutcome::Inert => {}
            TickOutcome::Counted { remaining_seconds } => {
                let payload = self.payload();
                self.notification.update(&payload);
                self.overlay.update(&payload.text());
                self.emit(SessionEvent::Tick {
                    mode: self.session.mode(),
                    remaining_seconds,
                });
            }
            TickOutcome::Elapsed => {
                self.notification.deactivate();
                self.switch_mode();
            }
        }
        outcome
    }

    fn switch_mode(&mut self) {
        self.session.switch_mode();
        info!(
            "{} started ({})",
            self.session.mode().label(),
            self.session.clock()
        );

        self.sound.play();

        let payload = self.payload();
        if self.session.is_running() {
            if let Err(e) = self.notification.activate(&payload) {
                warn!("Failed to show notification: {} ({})", e, e.suggestion());
            }
        }
        self.overlay.update(&payload.text());

        self.emit(SessionEvent::ModeSwitched {
            mode: self.session.mode(),
            remaining_seconds: self.session.remaining_seconds(),
        });
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    /// Applies a new work length.
    ///
    /// While idle the countdown is recomputed at once; otherwise the value
    /// waits for the next reset or switch into work. Returns true if the
    /// remaining time changed.
    pub fn set_work_minutes(&mut self, minutes: u32) -> bool {
        let changed = self.session.set_work_seconds(minutes_to_seconds(minutes));
        self.after_duration_edit(changed);
        changed
    }

    /// Applies a new break length. See [`SessionMachine::set_work_minutes`].
    pub fn set_break_minutes(&mut self, minutes: u32) -> bool {
        let changed = self.session.set_break_seconds(minutes_to_seconds(minutes));
        self.after_duration_edit(changed);
        changed
    }

    fn after_duration_edit(&mut self, changed: bool) {
        if !changed {
            return;
        }
        self.overlay.update(&self.session.clock());
        self.emit_state();
    }

    /// Unloads the current alarm ahead of a selection change and returns
    /// the engine to prepare the next one on, away from the session lock.
    pub fn release_sound(&mut self) -> Arc<dyn AudioEngine + Send + Sync> {
        self.sound.teardown();
        self.sound.engine()
    }

    /// Installs a selection prepared with
    /// [`SoundResolver::prepare`] after [`SessionMachine::release_sound`].
    pub fn adopt_sound(&mut self, selection: &SoundSelection, prepared: bool) {
        self.sound.adopt(selection, prepared);
    }

    // ------------------------------------------------------------------------
    // Overlay
    // ------------------------------------------------------------------------

    /// Runs the overlay permission step inline and shows it.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::PermissionDenied` or the backend error.
    pub fn activate_overlay(&mut self) -> Result<(), MirrorError> {
        let text = self.session.clock();
        self.overlay.activate(&text)
    }

    /// Shows the overlay once permission was granted, with the current text.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub fn show_overlay_granted(&mut self) -> Result<(), MirrorError> {
        let text = self.session.clock();
        self.overlay.show_granted(&text)
    }

    pub fn hide_overlay(&mut self) {
        self.overlay.deactivate();
    }

    /// Overlay backend, for running the permission step off the session.
    pub fn overlay_backend(&self) -> Arc<dyn OverlayBackend + Send + Sync> {
        self.overlay.backend()
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sound(&self) -> &SoundResolver {
        &self.sound
    }

    pub fn notification(&self) -> &NotificationMirror {
        &self.notification
    }

    pub fn overlay(&self) -> &OverlayMirror {
        &self.overlay
    }

    /// Display payload rendered from the live session.
    pub fn payload(&self) -> MirrorPayload {
        MirrorPayload::from_session(&self.session)
    }

    /// Read model of the session and its side channels.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            sound_name: Some(self.sound.selection().display_name.clone()),
            notification_active: self.notification.is_active(),
            overlay_active: self.overlay.is_active(),
            ..SessionSnapshot::from_session(&self.session)
        }
    }

    /// Clears both mirrors, releases the alarm asset and drops subscribers.
    pub fn shutdown(&mut self) {
        self.notification.deactivate();
        self.overlay.deactivate();
        self.sound.teardown();
        self.subscribers.clear();
        info!("Session shut down");
    }
}

impl std::fmt::Debug for SessionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMachine")
            .field("session", &self.session)
            .field("sound", &self.sound)
            .field("notification", &self.notification)
            .field("overlay", &self.overlay)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
