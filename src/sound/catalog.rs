//! Alarm sound selection and the built-in catalog.
//!
//! A selection is either silent, one of the bundled sounds, or a single
//! user-uploaded file. Selections are persisted as a bare catalog id, or as
//! a small JSON record for a custom upload.

use serde::{Deserialize, Serialize};

use super::embedded::EMBEDDED_DEFAULT_REF;

/// Catalog id of the silent option.
pub const NONE_SOUND_ID: &str = "none";

/// Id used for every custom upload.
pub const CUSTOM_SOUND_ID: &str = "custom";

/// Catalog id of the default sound.
pub const DEFAULT_SOUND_ID: &str = "sound_mp3";

/// What kind of asset a selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKind {
    /// No alarm
    None,
    /// Bundled asset
    Builtin,
    /// User-uploaded file
    Custom,
}

/// A bundled catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSound {
    pub id: &'static str,
    pub kind: SoundKind,
    pub name: &'static str,
    /// Asset reference handed to the audio engine
    pub asset: &'static str,
}

/// Sounds shipped with the application.
pub const BUILTIN_SOUNDS: &[BuiltinSound] = &[
    BuiltinSound {
        id: NONE_SOUND_ID,
        kind: SoundKind::None,
        name: "Silent",
        asset: "",
    },
    BuiltinSound {
        id: DEFAULT_SOUND_ID,
        kind: SoundKind::Builtin,
        name: "Default chime (Sound.mp3)",
        asset: EMBEDDED_DEFAULT_REF,
    },
];

/// Looks up a catalog entry by id.
pub fn find_builtin(id: &str) -> Option<&'static BuiltinSound> {
    BUILTIN_SOUNDS.iter().find(|s| s.id == id)
}

/// Persisted form of a custom upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSoundRecord {
    pub uri: String,
    pub name: String,
}

/// The user's alarm sound choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundSelection {
    pub kind: SoundKind,
    /// Catalog key, or `custom`
    pub id: String,
    pub display_name: String,
    /// Bundled asset reference, or the stored upload's URI
    pub payload_ref: String,
}

impl SoundSelection {
    /// The silent selection.
    #[must_use]
    pub fn none() -> Self {
        Self::from_builtin(&BUILTIN_SOUNDS[0])
    }

    /// Selection for a catalog entry.
    #[must_use]
    pub fn from_builtin(sound: &BuiltinSound) -> Self {
        Self {
            kind: sound.kind,
            id: sound.id.to_string(),
            display_name: sound.name.to_string(),
            payload_ref: sound.asset.to_string(),
        }
    }

    /// Selection for a catalog id, if it exists.
    #[must_use]
    pub fn builtin(id: &str) -> Option<Self> {
        find_builtin(id).map(Self::from_builtin)
    }

    /// Selection for an uploaded file.
    #[must_use]
    pub fn custom(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: SoundKind::Custom,
            id: CUSTOM_SOUND_ID.to_string(),
            display_name: name.into(),
            payload_ref: uri.into(),
        }
    }

    /// Returns true if no alarm should be prepared.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.kind == SoundKind::None
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.kind == SoundKind::Custom
    }

    /// Returns true if the payload points at a network location.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.payload_ref.starts_with("http://") || self.payload_ref.starts_with("https://")
    }

    /// Serializes the selection for the settings store.
    pub fn to_stored(&self) -> Result<String, serde_json::Error> {
        match self.kind {
            SoundKind::Custom => serde_json::to_string(&CustomSoundRecord {
                uri: self.payload_ref.clone(),
                name: self.display_name.clone(),
            }),
            SoundKind::None | SoundKind::Builtin => Ok(self.id.clone()),
        }
    }

    /// Parses a stored value.
    ///
    /// Returns `None` when the value is neither a known catalog id nor a
    /// well-formed custom record.
    #[must_use]
    pub fn from_stored(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('{') {
            let record: CustomSoundRecord = serde_json::from_str(value).ok()?;
            if record.uri.is_empty() {
                return None;
            }
            return Some(Self::custom(record.uri, record.name));
        }
        Self::builtin(value)
    }
}

impl Default for SoundSelection {
    fn default() -> Self {
        Self::from_builtin(&BUILTIN_SOUNDS[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_builtin_chime() {
        let selection = SoundSelection::default();
        assert_eq!(selection.kind, SoundKind::Builtin);
        assert_eq!(selection.id, DEFAULT_SOUND_ID);
        assert_eq!(selection.payload_ref, EMBEDDED_DEFAULT_REF);
    }

    #[test]
    fn test_none_is_silent() {
        let selection = SoundSelection::none();
        assert!(selection.is_silent());
        assert_eq!(selection.id, "none");
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(SoundSelection::builtin("sound_mp3").is_some());
        assert!(SoundSelection::builtin("custom").is_none());
        assert!(SoundSelection::builtin("missing").is_none());
    }

    #[test]
    fn test_stored_builtin_is_bare_id() {
        let selection = SoundSelection::default();
        assert_eq!(selection.to_stored().unwrap(), "sound_mp3");
        assert_eq!(SoundSelection::from_stored("sound_mp3"), Some(selection));
        assert_eq!(
            SoundSelection::from_stored("none"),
            Some(SoundSelection::none())
        );
    }

    #[test]
    fn test_stored_custom_is_json_record() {
        let selection = SoundSelection::custom("/data/sounds/abc-bell.mp3", "bell.mp3");
        let stored = selection.to_stored().unwrap();
        assert!(stored.contains("\"uri\""));
        assert!(stored.contains("\"name\":\"bell.mp3\""));
        assert_eq!(SoundSelection::from_stored(&stored), Some(selection));
    }

    #[test]
    fn test_malformed_stored_value() {
        assert_eq!(SoundSelection::from_stored("{\"uri\": 3"), None);
        assert_eq!(SoundSelection::from_stored("{\"name\":\"x\"}"), None);
        assert_eq!(SoundSelection::from_stored("{\"uri\":\"\",\"name\":\"x\"}"), None);
        assert_eq!(SoundSelection::from_stored("unknown_id"), None);
    }

    #[test]
    fn test_is_remote() {
        assert!(SoundSelection::custom("https://example.com/a.mp3", "a").is_remote());
        assert!(!SoundSelection::custom("/tmp/a.mp3", "a").is_remote());
    }
}
