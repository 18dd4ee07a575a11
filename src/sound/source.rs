//! Sound source management.
//!
//! Two alert sounds are used: a short chime on every phase transition and a
//! reminder tone played with the reminder notification. Each resolves to a
//! platform sound file when one exists and to a synthesized tone otherwise.

use std::path::{Path, PathBuf};

/// The two alert sounds of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertSound {
    /// Played three times on every phase transition
    Chime,
    /// Played twice alongside the reminder notification
    Reminder,
}

impl AlertSound {
    /// Preferred platform sound names, searched in order.
    fn candidate_names(&self) -> &'static [&'static str] {
        match self {
            // macOS name first, then freedesktop sound theme names
            AlertSound::Chime => &["Ping", "complete", "message"],
            AlertSound::Reminder => &["Submarine", "bell", "alarm-clock-elapsed"],
        }
    }
}

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// A sound file on disk.
    File {
        /// Which alert the file plays.
        alert: AlertSound,
        /// The name of the sound (e.g., "Ping").
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
    /// A tone generated at playback time.
    Synth {
        /// Which alert the tone stands in for.
        sound: AlertSound,
    },
}

impl SoundSource {
    /// Creates a new file sound source.
    #[must_use]
    pub fn file(alert: AlertSound, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            alert,
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a synthesized sound source.
    #[must_use]
    pub fn synth(sound: AlertSound) -> Self {
        Self::Synth { sound }
    }

    /// Returns the alert this source plays.
    #[must_use]
    pub fn alert(&self) -> AlertSound {
        match self {
            Self::File { alert, .. } => *alert,
            Self::Synth { sound } => *sound,
        }
    }

    /// Returns the synthesized tone that stands in for this source.
    #[must_use]
    pub fn fallback(&self) -> SoundSource {
        Self::synth(self.alert())
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } => name,
            Self::Synth {
                sound: AlertSound::Chime,
            } => "synth-chime",
            Self::Synth {
                sound: AlertSound::Reminder,
            } => "synth-reminder",
        }
    }

    /// Returns true if this is a sound file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Returns true if this is a synthesized tone.
    #[must_use]
    pub fn is_synth(&self) -> bool {
        matches!(self, Self::Synth { .. })
    }

    /// Returns the file path if this is a sound file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Synth { .. } => None,
        }
    }
}

/// Directories to search for system sounds, in order of priority.
const SYSTEM_SOUND_DIRS: &[&str] = &[
    "/System/Library/Sounds",
    "/Library/Sounds",
    "/usr/share/sounds/freedesktop/stereo",
];

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["aiff", "wav", "oga", "ogg", "mp3", "flac"];

/// Finds a sound file named `name` (any supported extension) in `dirs`.
fn find_in_dirs<P: AsRef<Path>>(
    dirs: &[P],
    alert: AlertSound,
    name: &str,
) -> Option<SoundSource> {
    for dir in dirs {
        for ext in SUPPORTED_EXTENSIONS {
            let path = dir.as_ref().join(format!("{name}.{ext}"));
            if path.is_file() {
                return Some(SoundSource::file(alert, name, path));
            }
        }
    }
    None
}

/// Resolves an alert sound within the given directories.
///
/// Falls back to the synthesized tone when no candidate file exists.
#[must_use]
pub fn resolve_alert_in<P: AsRef<Path>>(sound: AlertSound, dirs: &[P]) -> SoundSource {
    sound
        .candidate_names()
        .iter()
        .find_map(|name| find_in_dirs(dirs, sound, name))
        .unwrap_or(SoundSource::Synth { sound })
}

/// Resolves an alert sound in the platform sound directories.
#[must_use]
pub fn resolve_alert(sound: AlertSound) -> SoundSource {
    resolve_alert_in(sound, SYSTEM_SOUND_DIRS)
}

/// Resolved sources for both alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSounds {
    pub chime: SoundSource,
    pub reminder: SoundSource,
}

impl AlertSounds {
    /// Looks up both alerts in the platform sound directories.
    #[must_use]
    pub fn discover() -> Self {
        Self {
            chime: resolve_alert(AlertSound::Chime),
            reminder: resolve_alert(AlertSound::Reminder),
        }
    }

    /// Uses the synthesized tones for both alerts.
    #[must_use]
    pub fn synthesized() -> Self {
        Self {
            chime: SoundSource::synth(AlertSound::Chime),
            reminder: SoundSource::synth(AlertSound::Reminder),
        }
    }

    /// Returns the source for `sound`.
    #[must_use]
    pub fn source_for(&self, sound: AlertSound) -> &SoundSource {
        match sound {
            AlertSound::Chime => &self.chime,
            AlertSound::Reminder => &self.reminder,
        }
    }
}
