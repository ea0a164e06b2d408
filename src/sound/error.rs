//! Sound system error types.
//!
//! Every variant is recoverable: the alarm is skipped and the countdown
//! keeps running.

use thiserror::Error;

/// Errors that can occur while preparing or playing the alarm sound.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("sound file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("failed to decode sound file: {0}")]
    DecodeError(String),

    /// The source cannot be loaded by this engine (e.g., a remote URI).
    #[error("unsupported sound source: {0}")]
    Unsupported(String),

    /// `play` or `unload` named an asset that was never preloaded.
    #[error("sound asset not prepared: {0}")]
    NotPrepared(String),

    /// Generic sound playback error.
    #[error("sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_) | Self::DecodeError(_) | Self::Unsupported(_)
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "connect an audio output device",
            Self::FileNotFound(_) => "select the sound again or upload a new file",
            Self::DecodeError(_) => "the sound file may be corrupt; try another file",
            Self::Unsupported(_) => "use a local audio file",
            Self::NotPrepared(_) => "select a sound before playing it",
            Self::PlaybackError(_) => "check the audio settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SoundError::DeviceNotAvailable("no device".to_string());
        assert!(err.to_string().contains("no device"));

        let err = SoundError::FileNotFound("/path/to/sound.mp3".to_string());
        assert!(err.to_string().contains("/path/to/sound.mp3"));

        let err = SoundError::Unsupported("https://x".to_string());
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_is_device_error() {
        assert!(SoundError::DeviceNotAvailable("x".into()).is_device_error());
        assert!(!SoundError::FileNotFound("x".into()).is_device_error());
        assert!(!SoundError::PlaybackError("x".into()).is_device_error());
    }

    #[test]
    fn test_is_file_error() {
        assert!(SoundError::FileNotFound("x".into()).is_file_error());
        assert!(SoundError::DecodeError("x".into()).is_file_error());
        assert!(SoundError::Unsupported("x".into()).is_file_error());
        assert!(!SoundError::NotPrepared("x".into()).is_file_error());
    }

    #[test]
    fn test_suggestion() {
        let err = SoundError::DeviceNotAvailable("x".into());
        assert!(err.suggestion().contains("audio output"));

        let err = SoundError::Unsupported("x".into());
        assert!(err.suggestion().contains("local"));
    }
}
