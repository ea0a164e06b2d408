//! Presence mirrors.
//!
//! A mirror echoes the countdown on an external surface without owning it.
//! Two independent mirrors exist:
//!
//! - [`NotificationMirror`]: a persistent system notification, always sent
//!   the full payload (title, status text, remaining seconds)
//! - [`OverlayMirror`]: a floating text surface that needs a permission step
//!   before it can be shown
//!
//! Both drop updates while inactive and treat `deactivate` as idempotent.

mod error;
mod notification;
mod overlay;

pub use error::MirrorError;
pub use notification::{
    default_notification_backend, MockNotificationBackend, NotificationBackend, NotificationCall,
    NotificationMirror, TracingNotificationBackend,
};
#[cfg(all(unix, not(target_os = "macos")))]
pub use notification::DesktopNotificationBackend;
pub use overlay::{
    MockOverlayBackend, OverlayBackend, OverlayCall, OverlayMirror, TerminalTitleOverlay,
};

use crate::types::{format_clock, Session};

/// Notification title.
pub const APP_TITLE: &str = "Pomodoro Timer";

/// Activation state shared by both mirrors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorState {
    active: bool,
    last_text: Option<String>,
}

impl MirrorState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Last display string pushed to the surface.
    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    fn activated(&mut self, text: String) {
        self.active = true;
        self.last_text = Some(text);
    }

    fn pushed(&mut self, text: String) {
        self.last_text = Some(text);
    }

    fn deactivated(&mut self) {
        self.active = false;
    }
}

/// Everything a mirror needs to render the countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPayload {
    pub title: String,
    pub status: String,
    pub remaining_seconds: u32,
}

impl MirrorPayload {
    /// Builds the payload from the live session.
    pub fn from_session(session: &Session) -> Self {
        Self {
            title: APP_TITLE.to_string(),
            status: session.mode().label().to_string(),
            remaining_seconds: session.remaining_seconds(),
        }
    }

    /// Remaining time as `mm:ss`.
    pub fn text(&self) -> String {
        format_clock(self.remaining_seconds)
    }
}
