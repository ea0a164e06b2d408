//! prodomo library
//!
//! A work/break interval timer. It includes:
//! - The session state machine and its one-second ticker
//! - Persisted settings and uploaded sound files
//! - Alarm sound resolution and playback
//! - Notification and overlay mirrors of the countdown
//! - CLI command parsing and display utilities

pub mod cli;
pub mod daemon;
pub mod mirror;
pub mod settings;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{Mode, RunState, Session, SessionSnapshot, TickOutcome};

pub use daemon::{
    Backends, Command, CommandHandler, CommandResponse, SessionEvent, SessionMachine,
    SharedSession, Ticker,
};

pub use settings::{Preferences, Settings, SettingsError, SettingsStore};

pub use sound::{AudioEngine, MockAudioEngine, SoundError, SoundResolver, SoundSelection};

pub use mirror::{
    MirrorError, MockNotificationBackend, MockOverlayBackend, NotificationBackend,
    NotificationMirror, OverlayBackend, OverlayMirror,
};
