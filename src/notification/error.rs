//! Notification system error types.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The desktop notification service rejected or could not take the message.
    #[error("failed to send notification: {0}")]
    SendFailed(String),

    /// No notification service is running.
    #[error("notification service not available")]
    NotAvailable,

    /// Writing the terminal fallback failed.
    #[error("failed to write notification: {0}")]
    Io(#[from] std::io::Error),
}

impl NotificationError {
    /// Returns true if the terminal fallback should be used instead.
    #[must_use]
    pub fn should_fallback_to_terminal(&self) -> bool {
        matches!(self, Self::SendFailed(_) | Self::NotAvailable)
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::SendFailed(_) => "Check that a notification daemon is running",
            Self::NotAvailable => "Install or start a notification daemon",
            Self::Io(_) => "Check that the terminal is still attached",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotificationError::SendFailed("dbus".to_string());
        assert_eq!(err.to_string(), "failed to send notification: dbus");
        assert_eq!(
            NotificationError::NotAvailable.to_string(),
            "notification service not available"
        );
    }

    #[test]
    fn test_fallback() {
        assert!(NotificationError::SendFailed("x".into()).should_fallback_to_terminal());
        assert!(NotificationError::NotAvailable.should_fallback_to_terminal());
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        assert!(!NotificationError::from(io).should_fallback_to_terminal());
    }

    #[test]
    fn test_suggestion_not_empty() {
        assert!(!NotificationError::NotAvailable.suggestion().is_empty());
    }
}
