//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, reading or writing `settings.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `$POMOCLOCK_HOME` nor a home directory is available.
    #[error("could not determine the data directory (set POMOCLOCK_HOME)")]
    NoDataDir,

    /// Reading the settings file failed.
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the settings file failed.
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    /// Returns true if the application can keep running with defaults.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NoDataDir => "Set POMOCLOCK_HOME to a writable directory",
            Self::Read { .. } => "Check the file permissions; defaults are used meanwhile",
            Self::Write { .. } => "Check that the data directory is writable",
            Self::Serialize(_) => "Report this as a bug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_display() {
        let err = ConfigError::Write {
            path: PathBuf::from("/tmp/settings.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = err.to_string();
        assert!(message.contains("/tmp/settings.json"));
        assert!(message.contains("denied"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_read_error_is_recoverable() {
        let err = ConfigError::Read {
            path: PathBuf::from("settings.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        };
        assert!(err.is_recoverable());
        assert!(err.suggestion().contains("defaults"));
    }

    #[test]
    fn test_no_data_dir_suggestion() {
        assert!(ConfigError::NoDataDir.suggestion().contains("POMOCLOCK_HOME"));
    }
}
