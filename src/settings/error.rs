//! Settings error types.
//!
//! None of these are fatal: the running session keeps its in-memory values
//! when the store cannot be read or written.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The backing store could not be read.
    #[error("failed to read settings from {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    /// The backing store could not be written.
    #[error("failed to write settings to {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    /// A stored value could not be parsed.
    #[error("malformed value for '{key}': {reason}")]
    MalformedData { key: String, reason: String },
}

impl SettingsError {
    /// Returns true for read and write failures of the backing store.
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Self::ReadFailed { .. } | Self::WriteFailed { .. })
    }

    /// Returns true if a stored value failed to parse.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedData { .. })
    }

    /// Returns true if the session can continue with in-memory values.
    ///
    /// Settings errors never stop the countdown.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::ReadFailed { .. } => "check that the settings file is readable",
            Self::WriteFailed { .. } => {
                "check free disk space and permissions of the settings directory"
            }
            Self::MalformedData { .. } => "the default value is used; set it again to fix it",
        }
    }
}
