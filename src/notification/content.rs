//! Notification content for phase transitions.
//!
//! A transition produces two messages: a short balloon shown next to the
//! tray icon and a longer reminder.

/// Title of every balloon.
pub const NOTICE_TITLE: &str = "Pomodoro";

/// Title of every reminder.
pub const REMINDER_TITLE: &str = "Pomodoro reminder";

/// Texts shown when a phase ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Balloon title
    pub title: String,
    /// Short balloon text
    pub balloon: String,
    /// Multi-line reminder text
    pub reminder: String,
}

impl Notice {
    /// Content for the end of a Work phase.
    #[must_use]
    pub fn work_complete(completed_cycles: u32, screen_locked: bool) -> Self {
        let mut balloon = "Work finished, time for a break!".to_string();
        let rest_line = if screen_locked {
            balloon.push_str(" (screen locked)");
            "Screen locked, take a rest 🌿"
        } else {
            "Time for a break 🌿"
        };

        Self {
            title: NOTICE_TITLE.to_string(),
            balloon,
            reminder: format!(
                "Work complete!\nPomodoro #{} finished 🎉\n{}",
                completed_cycles, rest_line
            ),
        }
    }

    /// Content for the end of a Break phase.
    #[must_use]
    pub fn break_complete() -> Self {
        Self {
            title: NOTICE_TITLE.to_string(),
            balloon: "Break over, back to work!".to_string(),
            reminder: "Break is over!\nStarting a new round of work ⏰".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_complete_text() {
        let notice = Notice::work_complete(4, false);
        assert_eq!(notice.title, "Pomodoro");
        assert_eq!(notice.balloon, "Work finished, time for a break!");
        assert_eq!(
            notice.reminder,
            "Work complete!\nPomodoro #4 finished 🎉\nTime for a break 🌿"
        );
    }

    #[test]
    fn test_work_complete_with_lock() {
        let notice = Notice::work_complete(1, true);
        assert_eq!(notice.balloon, "Work finished, time for a break! (screen locked)");
        assert!(notice.reminder.ends_with("Screen locked, take a rest 🌿"));
        assert!(notice.reminder.contains("Pomodoro #1 finished"));
    }

    #[test]
    fn test_break_complete_text() {
        let notice = Notice::break_complete();
        assert_eq!(notice.balloon, "Break over, back to work!");
        assert_eq!(notice.reminder, "Break is over!\nStarting a new round of work ⏰");
    }
}
