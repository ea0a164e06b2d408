//! Mirror error types.

use thiserror::Error;

/// Errors that can occur while driving a presence mirror.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MirrorError {
    /// The user refused the overlay permission.
    #[error("overlay permission denied")]
    PermissionDenied,

    /// The backend rejected the call.
    #[error("mirror backend failed: {0}")]
    BackendFailed(String),

    /// The surface is not available on this platform.
    #[error("mirror not available: {0}")]
    NotAvailable(String),
}

impl MirrorError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "allow the overlay and try again",
            Self::BackendFailed(_) => "the countdown continues; the mirror will retry on the next start",
            Self::NotAvailable(_) => "run inside a desktop session or a terminal",
        }
    }
}
