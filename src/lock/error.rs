//! Screen lock error types.
//!
//! Locking the screen is best effort: every error here is logged and the
//! timer carries on.

use thiserror::Error;

/// Errors that can occur while locking the screen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    /// No lock command is known for this platform.
    #[error("screen locking is not supported on this platform")]
    Unsupported,

    /// The lock command could not be spawned.
    #[error("failed to run '{0}': {1}")]
    SpawnFailed(String, String),

    /// The lock command exited with a failure status.
    #[error("'{0}' exited with status {1}")]
    CommandFailed(String, String),

    /// The lock command did not finish in time.
    #[error("'{0}' timed out after {1} seconds")]
    Timeout(String, u64),
}

impl LockError {
    /// Returns true if the lock command itself is missing.
    #[must_use]
    pub fn is_command_missing(&self) -> bool {
        matches!(self, Self::Unsupported | Self::SpawnFailed(_, _))
    }

    /// Returns true if the error is recoverable and the timer should continue.
    ///
    /// Always true.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Unsupported => "Disable auto-lock with `pomoclock auto-lock off`",
            Self::SpawnFailed(_, _) => "Check that the lock command is installed and on PATH",
            Self::CommandFailed(_, _) => "Run the lock command manually to see its error",
            Self::Timeout(_, _) => "Check whether the session manager is responding",
        }
    }
}
