//! Persistent notification mirror.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::{MirrorError, MirrorPayload, MirrorState};
use crate::types::format_clock;

/// Backend of the persistent notification.
///
/// Every call carries the full display payload; there is no delta protocol.
pub trait NotificationBackend {
    fn start(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError>;
    fn update(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError>;
    fn stop(&self) -> Result<(), MirrorError>;
}

/// Formats the notification body, e.g. `"Work Session - 39:59"`.
pub(crate) fn notification_body(text: &str, seconds_left: u32) -> String {
    format!("{} - {}", text, format_clock(seconds_left))
}

/// Mirrors the countdown into a persistent notification.
pub struct NotificationMirror {
    backend: Arc<dyn NotificationBackend + Send + Sync>,
    state: MirrorState,
}

impl NotificationMirror {
    pub fn new(backend: Arc<dyn NotificationBackend + Send + Sync>) -> Self {
        Self {
            backend,
            state: MirrorState::default(),
        }
    }

    /// Shows the notification with the given payload.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the mirror stays inactive in that case.
    pub fn activate(&mut self, payload: &MirrorPayload) -> Result<(), MirrorError> {
        self.backend
            .start(&payload.title, &payload.status, payload.remaining_seconds)?;
        debug!("Notification mirror active at {}", payload.text());
        self.state.activated(payload.text());
        Ok(())
    }

    /// Pushes the payload. Dropped while inactive.
    pub fn update(&mut self, payload: &MirrorPayload) {
        if !self.state.is_active() {
            return;
        }
        if let Err(e) =
            self.backend
                .update(&payload.title, &payload.status, payload.remaining_seconds)
        {
            warn!("Notification update failed: {}", e);
        }
        self.state.pushed(payload.text());
    }

    /// Removes the notification. No backend call when already inactive.
    pub fn deactivate(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.state.deactivated();
        if let Err(e) = self.backend.stop() {
            warn!("Failed to stop notification: {}", e);
        }
        debug!("Notification mirror inactive");
    }

    pub fn state(&self) -> &MirrorState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

impl std::fmt::Debug for NotificationMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationMirror")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Backends
// ============================================================================

/// Freedesktop notification backend.
///
/// Keeps one notification on screen and replaces its content in place.
#[cfg(all(unix, not(target_os = "macos")))]
#[derive(Default)]
pub struct DesktopNotificationBackend {
    handle: Mutex<Option<notify_rust::NotificationHandle>>,
}

#[cfg(all(unix, not(target_os = "macos")))]
impl DesktopNotificationBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn show(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError> {
        let body = notification_body(text, seconds_left);
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| MirrorError::BackendFailed("notification lock poisoned".to_string()))?;

        if let Some(handle) = guard.as_mut() {
            handle.summary(title).body(&body);
            handle.update();
            return Ok(());
        }

        let handle = notify_rust::Notification::new()
            .appname("prodomo")
            .summary(title)
            .body(&body)
            .timeout(notify_rust::Timeout::Never)
            .show()
            .map_err(|e| MirrorError::BackendFailed(e.to_string()))?;
        *guard = Some(handle);
        Ok(())
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
impl NotificationBackend for DesktopNotificationBackend {
    fn start(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError> {
        self.show(title, text, seconds_left)
    }

    fn update(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError> {
        self.show(title, text, seconds_left)
    }

    fn stop(&self) -> Result<(), MirrorError> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| MirrorError::BackendFailed("notification lock poisoned".to_string()))?;
        if let Some(handle) = guard.take() {
            handle.close();
        }
        Ok(())
    }
}

/// Backend that only writes the notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationBackend;

impl NotificationBackend for TracingNotificationBackend {
    fn start(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError> {
        info!("{}: {}", title, notification_body(text, seconds_left));
        Ok(())
    }

    fn update(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError> {
        debug!("{}: {}", title, notification_body(text, seconds_left));
        Ok(())
    }

    fn stop(&self) -> Result<(), MirrorError> {
        debug!("Notification cleared");
        Ok(())
    }
}

/// Picks the notification backend for this platform.
#[must_use]
pub fn default_notification_backend(disabled: bool) -> Arc<dyn NotificationBackend + Send + Sync> {
    if disabled {
        return Arc::new(TracingNotificationBackend);
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Arc::new(DesktopNotificationBackend::new())
    }
    #[cfg(not(all(unix, not(target_os = "macos"))))]
    {
        Arc::new(TracingNotificationBackend)
    }
}

// ============================================================================
// Mock
// ============================================================================

/// A call recorded by [`MockNotificationBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationCall {
    Start {
        title: String,
        text: String,
        seconds_left: u32,
    },
    Update {
        title: String,
        text: String,
        seconds_left: u32,
    },
    Stop,
}

/// Mock notification backend for testing.
#[derive(Debug, Default)]
pub struct MockNotificationBackend {
    calls: Mutex<Vec<NotificationCall>>,
    should_fail: AtomicBool,
}

impl MockNotificationBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<NotificationCall> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn start_count(&self) -> usize {
        self.count(|c| matches!(c, NotificationCall::Start { .. }))
    }

    #[must_use]
    pub fn update_count(&self) -> usize {
        self.count(|c| matches!(c, NotificationCall::Update { .. }))
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.count(|c| matches!(c, NotificationCall::Stop))
    }

    /// The most recent call, if any.
    #[must_use]
    pub fn last_call(&self) -> Option<NotificationCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn count(&self, predicate: impl Fn(&NotificationCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: NotificationCall) -> Result<(), MirrorError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(MirrorError::BackendFailed("Mock failure".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl NotificationBackend for MockNotificationBackend {
    fn start(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError> {
        self.record(NotificationCall::Start {
            title: title.to_string(),
            text: text.to_string(),
            seconds_left,
        })
    }

    fn update(&self, title: &str, text: &str, seconds_left: u32) -> Result<(), MirrorError> {
        self.record(NotificationCall::Update {
            title: title.to_string(),
            text: text.to_string(),
            seconds_left,
        })
    }

    fn stop(&self) -> Result<(), MirrorError> {
        self.record(NotificationCall::Stop)
    }
}
