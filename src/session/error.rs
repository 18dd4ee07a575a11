//! Session log error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while recording or exporting session themes.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("failed to serialize session record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The export range ends before it starts.
    #[error("invalid range: {from} is after {to}")]
    InvalidRange { from: String, to: String },
}

impl SessionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Io { .. } => "Check that the path exists and is writable",
            Self::Serialize(_) => "Report this as a bug",
            Self::InvalidRange { .. } => "Pass a --from date before the --to date",
        }
    }
}
