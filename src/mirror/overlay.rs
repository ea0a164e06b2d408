//! Floating overlay mirror.

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::{MirrorError, MirrorState};

/// Backend of the floating overlay.
pub trait OverlayBackend {
    /// Returns true if the overlay may be shown.
    fn check_permission(&self) -> bool;
    /// Asks the user for permission. Returns the outcome.
    fn request_permission(&self) -> bool;
    fn show(&self, initial_text: &str) -> Result<(), MirrorError>;
    fn update(&self, text: &str) -> Result<(), MirrorError>;
    fn hide(&self) -> Result<(), MirrorError>;
}

/// Mirrors the countdown text into a floating overlay.
pub struct OverlayMirror {
    backend: Arc<dyn OverlayBackend + Send + Sync>,
    state: MirrorState,
}

impl OverlayMirror {
    pub fn new(backend: Arc<dyn OverlayBackend + Send + Sync>) -> Self {
        Self {
            backend,
            state: MirrorState::default(),
        }
    }

    /// Checks the permission, requesting it if missing.
    ///
    /// May block on user interaction, so callers holding the session should
    /// run it elsewhere and then call [`OverlayMirror::show_granted`].
    pub fn ensure_permission<B: OverlayBackend + ?Sized>(backend: &B) -> bool {
        if backend.check_permission() {
            return true;
        }
        debug!("Overlay permission missing, requesting it");
        backend.request_permission()
    }

    /// Runs the permission step, then shows the overlay.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::PermissionDenied` if permission is refused, in
    /// which case `show` is never called and the mirror stays inactive.
    pub fn activate(&mut self, initial_text: &str) -> Result<(), MirrorError> {
        if self.state.is_active() {
            self.update(initial_text);
            return Ok(());
        }
        if !Self::ensure_permission(self.backend.as_ref()) {
            return Err(MirrorError::PermissionDenied);
        }
        self.show_granted(initial_text)
    }

    /// Shows the overlay after permission was granted elsewhere.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the mirror stays inactive in that case.
    pub fn show_granted(&mut self, initial_text: &str) -> Result<(), MirrorError> {
        if self.state.is_active() {
            self.update(initial_text);
            return Ok(());
        }
        self.backend.show(initial_text)?;
        debug!("Overlay mirror active at {}", initial_text);
        self.state.activated(initial_text.to_string());
        Ok(())
    }

    /// Pushes new text. Dropped while inactive.
    pub fn update(&mut self, text: &str) {
        if !self.state.is_active() {
            return;
        }
        if let Err(e) = self.backend.update(text) {
            warn!("Overlay update failed: {}", e);
        }
        self.state.pushed(text.to_string());
    }

    /// Hides the overlay. No backend call when already inactive.
    pub fn deactivate(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.state.deactivated();
        if let Err(e) = self.backend.hide() {
            warn!("Failed to hide overlay: {}", e);
        }
        debug!("Overlay mirror inactive");
    }

    /// Shared handle to the backend, for running the permission step.
    pub fn backend(&self) -> Arc<dyn OverlayBackend + Send + Sync> {
        Arc::clone(&self.backend)
    }

    pub fn state(&self) -> &MirrorState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

impl std::fmt::Debug for OverlayMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayMirror")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TerminalTitleOverlay
// ============================================================================

/// Shows the countdown in the terminal window title.
///
/// Permission is granted only when stdout is an interactive terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalTitleOverlay;

impl TerminalTitleOverlay {
    fn supported() -> bool {
        let dumb = std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false);
        std::io::stdout().is_terminal() && !dumb
    }

    fn set_title(title: &str) -> Result<(), MirrorError> {
        let mut out = std::io::stdout().lock();
        write!(out, "\x1b]0;{}\x07", title)
            .and_then(|()| out.flush())
            .map_err(|e| MirrorError::BackendFailed(e.to_string()))
    }
}

impl OverlayBackend for TerminalTitleOverlay {
    fn check_permission(&self) -> bool {
        Self::supported()
    }

    fn request_permission(&self) -> bool {
        let granted = Self::supported();
        if !granted {
            warn!("Overlay needs an interactive terminal");
        }
        granted
    }

    fn show(&self, initial_text: &str) -> Result<(), MirrorError> {
        Self::set_title(&format!("{} - prodomo", initial_text))
    }

    fn update(&self, text: &str) -> Result<(), MirrorError> {
        Self::set_title(&format!("{} - prodomo", text))
    }

    fn hide(&self) -> Result<(), MirrorError> {
        Self::set_title("")
    }
}

// ============================================================================
// Mock
// ============================================================================

/// A call recorded by [`MockOverlayBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCall {
    CheckPermission,
    RequestPermission,
    Show(String),
    Update(String),
    Hide,
}

/// Mock overlay backend for testing.
#[derive(Debug)]
pub struct MockOverlayBackend {
    calls: Mutex<Vec<OverlayCall>>,
    has_permission: AtomicBool,
    grant_on_request: AtomicBool,
    should_fail_show: AtomicBool,
}

impl MockOverlayBackend {
    /// A backend whose permission is already granted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            has_permission: AtomicBool::new(true),
            grant_on_request: AtomicBool::new(true),
            should_fail_show: AtomicBool::new(false),
        }
    }

    pub fn set_has_permission(&self, granted: bool) {
        self.has_permission.store(granted, Ordering::SeqCst);
    }

    pub fn set_grant_on_request(&self, granted: bool) {
        self.grant_on_request.store(granted, Ordering::SeqCst);
    }

    pub fn set_should_fail_show(&self, fail: bool) {
        self.should_fail_show.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<OverlayCall> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn show_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, OverlayCall::Show(_)))
            .count()
    }

    /// Text of the most recent show or update.
    #[must_use]
    pub fn last_text(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|c| match c {
                OverlayCall::Show(t) | OverlayCall::Update(t) => Some(t.clone()),
                _ => None,
            })
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: OverlayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for MockOverlayBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayBackend for MockOverlayBackend {
    fn check_permission(&self) -> bool {
        self.record(OverlayCall::CheckPermission);
        self.has_permission.load(Ordering::SeqCst)
    }

    fn request_permission(&self) -> bool {
        self.record(OverlayCall::RequestPermission);
        let granted = self.grant_on_request.load(Ordering::SeqCst);
        if granted {
            self.has_permission.store(true, Ordering::SeqCst);
        }
        granted
    }

    fn show(&self, initial_text: &str) -> Result<(), MirrorError> {
        if self.should_fail_show.load(Ordering::SeqCst) {
            return Err(MirrorError::BackendFailed("Mock failure".to_string()));
        }
        self.record(OverlayCall::Show(initial_text.to_string()));
        Ok(())
    }

    fn update(&self, text: &str) -> Result<(), MirrorError> {
        self.record(OverlayCall::Update(text.to_string()));
        Ok(())
    }

    fn hide(&self) -> Result<(), MirrorError> {
        self.record(OverlayCall::Hide);
        Ok(())
    }
}
