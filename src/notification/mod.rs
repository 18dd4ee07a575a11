//! Notification surfaces for phase transitions.
//!
//! This module provides:
//!
//! - [`DesktopNotifier`]: desktop notifications via `notify-rust`, falling
//!   back to the terminal when no notification service answers
//! - [`TerminalNotifier`]: plain-text notices on any writer
//! - [`MockNotifier`]: records notices for tests
//!
//! Acknowledgement is never awaited; a notice is shown and forgotten.

mod content;
pub mod error;

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use notify_rust::Notification;
use tracing::{debug, warn};

pub use self::content::{Notice, NOTICE_TITLE, REMINDER_TITLE};
pub use self::error::NotificationError;

/// Application name reported to the notification service.
const APP_NAME: &str = "pomoclock";

/// Balloon display time in milliseconds.
const BALLOON_TIMEOUT_MS: i32 = 5000;

/// Something that can show a [`Notice`].
pub trait Notifier {
    /// Shows the balloon and the reminder of `notice`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notice could not be shown.
    fn notify(&self, notice: &Notice) -> Result<(), NotificationError>;
}

// ============================================================================
// DesktopNotifier
// ============================================================================

/// Desktop notifications through the platform notification service.
#[derive(Debug)]
pub struct DesktopNotifier {
    terminal_fallback: bool,
}

impl DesktopNotifier {
    /// Creates a notifier that prints to stderr when the desktop fails.
    #[must_use]
    pub fn new() -> Self {
        Self {
            terminal_fallback: true,
        }
    }

    /// Creates a notifier that reports desktop failures without fallback.
    #[must_use]
    pub fn without_fallback() -> Self {
        Self {
            terminal_fallback: false,
        }
    }

    fn send(summary: &str, body: &str, timeout_ms: i32) -> Result<(), NotificationError> {
        Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(body)
            .timeout(timeout_ms)
            .show()
            .map(|_| ())
            .map_err(|e| NotificationError::SendFailed(e.to_string()))
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        let result = Self::send(&notice.title, &notice.balloon, BALLOON_TIMEOUT_MS)
            // The reminder stays until dismissed
            .and_then(|()| Self::send(REMINDER_TITLE, &notice.reminder, 0));

        match result {
            Ok(()) => {
                debug!(balloon = %notice.balloon, "Desktop notification sent");
                Ok(())
            }
            Err(e) if self.terminal_fallback && e.should_fallback_to_terminal() => {
                warn!("{}. {}", e, e.suggestion());
                TerminalNotifier::stderr().notify(notice)
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// TerminalNotifier
// ============================================================================

/// Writes notices as plain text.
#[derive(Debug)]
pub struct TerminalNotifier<W: Write> {
    out: Mutex<W>,
}

impl TerminalNotifier<std::io::Stderr> {
    /// Creates a notifier writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(out, "\n[{}] {}", notice.title, notice.balloon)?;
        for line in notice.reminder.lines() {
            writeln!(out, "  {}", line)?;
        }
        out.flush()?;
        Ok(())
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Mock notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notices: Mutex<Vec<Notice>>,
    should_fail: AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    #[must_use]
    pub fn notice_count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::NotAvailable);
        }
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        self.as_ref().notify(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_notifier_output() {
        let notifier = TerminalNotifier::new(Vec::new());
        notifier.notify(&Notice::break_complete()).unwrap();

        let output = String::from_utf8(notifier.into_inner()).unwrap();
        assert!(output.contains("[Pomodoro] Break over, back to work!"));
        assert!(output.contains("  Break is over!"));
        assert!(output.contains("  Starting a new round of work ⏰"));
    }

    #[test]
    fn test_mock_notifier_records() {
        let notifier = MockNotifier::new();
        notifier.notify(&Notice::work_complete(2, false)).unwrap();

        assert_eq!(notifier.notice_count(), 1);
        assert!(notifier.notices()[0].reminder.contains("#2"));
    }

    #[test]
    fn test_mock_notifier_failure() {
        let notifier = MockNotifier::new();
        notifier.set_should_fail(true);
        assert!(notifier.notify(&Notice::break_complete()).is_err());
        assert_eq!(notifier.notice_count(), 0);
    }
}
