//! Persisted application settings.
//!
//! `AppSettings` is the single configuration struct handed to the timer
//! engine at construction. `SettingsStore` is the only place that reads or
//! writes `settings.json`:
//! - Missing file: all defaults
//! - Unparsable file: all defaults, with a warning
//! - Missing, mistyped or out-of-range key: that key's default, with a warning

pub mod error;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::OverlayPosition;

pub use error::ConfigError;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding the data directory.
pub const HOME_ENV_VAR: &str = "POMOCLOCK_HOME";

/// Directory name under the user's home directory.
const DATA_DIR_NAME: &str = ".pomoclock";

/// Settings file name.
pub const SETTINGS_FILE: &str = "settings.json";

/// Session theme log file name.
pub const SESSION_LOG_FILE: &str = "session_themes.jsonl";

/// Control socket file name.
pub const SOCKET_FILE: &str = "pomoclock.sock";

/// Default Work duration in seconds.
pub const DEFAULT_WORK_SECONDS: u32 = 1500;

/// Default Break duration in seconds.
pub const DEFAULT_BREAK_SECONDS: u32 = 300;

/// Default alert volume.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Longest accepted Work duration in seconds (120 minutes).
pub const MAX_WORK_SECONDS: u32 = 120 * 60;

/// Longest accepted Break duration in seconds (60 minutes).
pub const MAX_BREAK_SECONDS: u32 = 60 * 60;

// ============================================================================
// Data directory
// ============================================================================

/// Returns the data directory: `$POMOCLOCK_HOME`, else `~/.pomoclock`.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .ok_or(ConfigError::NoDataDir)
}

/// Returns the control socket path inside the data directory.
pub fn socket_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join(SOCKET_FILE))
}

/// Returns the session log path inside the data directory.
pub fn session_log_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join(SESSION_LOG_FILE))
}

// ============================================================================
// AppSettings
// ============================================================================

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Work duration in seconds
    #[serde(rename = "workDuration")]
    pub work_duration_seconds: u32,
    /// Break duration in seconds
    #[serde(rename = "breakDuration")]
    pub break_duration_seconds: u32,
    /// Completed Work phases
    pub completed_cycles: u32,
    /// Whether the dark palette is active
    pub is_dark_theme: bool,
    /// Whether the screen locks when a Work phase ends
    pub enable_auto_lock: bool,
    /// Alert volume, 0.0 to 1.0
    pub volume: f32,
    /// Overlay top-left position in pixels
    pub overlay_position: OverlayPosition,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            work_duration_seconds: DEFAULT_WORK_SECONDS,
            break_duration_seconds: DEFAULT_BREAK_SECONDS,
            completed_cycles: 0,
            is_dark_theme: false,
            enable_auto_lock: false,
            volume: DEFAULT_VOLUME,
            overlay_position: OverlayPosition::DEFAULT,
        }
    }
}

impl AppSettings {
    /// Builds settings from a parsed JSON document, key by key.
    ///
    /// Each key that is missing or invalid keeps its default; the other keys
    /// are taken from the document.
    pub fn from_value(value: &Value) -> Self {
        let mut settings = Self::default();

        let Some(object) = value.as_object() else {
            warn!("Settings file is not a JSON object, using defaults");
            return settings;
        };

        if let Some(work) = read_key(object, "workDuration", |v| {
            v.as_u64()
                .filter(|s| (1..=u64::from(MAX_WORK_SECONDS)).contains(s))
                .map(|s| s as u32)
        }) {
            settings.work_duration_seconds = work;
        }

        if let Some(brk) = read_key(object, "breakDuration", |v| {
            v.as_u64()
                .filter(|s| (1..=u64::from(MAX_BREAK_SECONDS)).contains(s))
                .map(|s| s as u32)
        }) {
            settings.break_duration_seconds = brk;
        }

        if let Some(cycles) = read_key(object, "completedCycles", |v| {
            v.as_u64().and_then(|c| u32::try_from(c).ok())
        }) {
            settings.completed_cycles = cycles;
        }

        if let Some(dark) = read_key(object, "isDarkTheme", Value::as_bool) {
            settings.is_dark_theme = dark;
        }

        if let Some(lock) = read_key(object, "enableAutoLock", Value::as_bool) {
            settings.enable_auto_lock = lock;
        }

        if let Some(volume) = read_key(object, "volume", |v| {
            v.as_f64()
                .filter(|vol| (0.0..=1.0).contains(vol))
                .map(|vol| vol as f32)
        }) {
            settings.volume = volume;
        }

        if let Some(position) = read_key(object, "overlayPosition", |v| {
            serde_json::from_value::<OverlayPosition>(v.clone()).ok()
        }) {
            settings.overlay_position = position;
        }

        settings
    }

    /// Volume as a whole percentage.
    pub fn volume_percent(&self) -> u32 {
        (self.volume * 100.0).round() as u32
    }
}

/// Reads one key, logging a warning when it is present but unusable.
fn read_key<T>(
    object: &serde_json::Map<String, Value>,
    key: &str,
    parse: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = object.get(key)?;
    let parsed = parse(value);
    if parsed.is_none() {
        warn!(key, %value, "Invalid settings value, using default");
    }
    parsed
}

// ============================================================================
// SettingsStore
// ============================================================================

/// Load/save boundary for `settings.json`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store for the given settings file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store for `settings.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SETTINGS_FILE))
    }

    /// Creates a store in the default data directory.
    pub fn default_location() -> Result<Self, ConfigError> {
        Ok(Self::in_dir(&data_dir()?))
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings, falling back to defaults on any problem.
    pub fn load(&self) -> AppSettings {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                return AppSettings::default();
            }
            Err(e) => {
                let err = ConfigError::Read {
                    path: self.path.clone(),
                    source: e,
                };
                warn!("{}. {}", err, err.suggestion());
                return AppSettings::default();
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(value) => AppSettings::from_value(&value),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Corrupt settings file, using defaults"
                );
                AppSettings::default()
            }
        }
    }

    /// Saves settings atomically (temp file, then rename).
    pub fn save(&self, settings: &AppSettings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        let tmp_path = self.path.with_extension("json.tmp");

        std::fs::write(&tmp_path, json).map_err(|e| ConfigError::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| ConfigError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
