//! Display utilities for the pomoclock CLI.
//!
//! This module provides formatted output for:
//! - Command acknowledgements
//! - Status display
//! - Stored configuration
//! - Error and warning messages

use std::fmt::Write as _;
use std::path::Path;

use crate::config::AppSettings;
use crate::types::{format_clock, IpcResponse, ResponseData};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the acknowledgement of a control command.
    pub fn show_success(response: &IpcResponse) {
        print!("{}", Self::format_success(response));
    }

    /// Formats the acknowledgement of a control command.
    pub fn format_success(response: &IpcResponse) -> String {
        let mut out = format!("* {}\n", response.message);
        if let Some(remaining) = response.data.as_ref().and_then(|d| d.remaining_seconds) {
            let _ = writeln!(out, "  Remaining: {}", format_clock(remaining));
        }
        out
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        print!("{}", Self::format_status(response));
    }

    /// Formats the current timer status.
    pub fn format_status(response: &IpcResponse) -> String {
        let mut out = String::from("Pomodoro status\n");
        out.push_str("───────────────\n");

        let Some(data) = &response.data else {
            out.push_str("No status available\n");
            return out;
        };

        let _ = writeln!(out, "Phase:      {}", Self::phase_line(data));
        if let Some(remaining) = data.remaining_seconds {
            let _ = writeln!(out, "Remaining:  {}", format_clock(remaining));
        }
        if let Some(progress) = data.progress {
            let _ = writeln!(out, "Progress:   {}%", progress);
        }
        if let Some(cycles) = data.completed_cycles {
            let _ = writeln!(out, "Completed:  {}", cycles);
        }
        if let Some(theme) = &data.session_theme {
            let _ = writeln!(out, "Theme:      {}", theme);
        }
        if let Some(volume) = data.volume {
            let _ = writeln!(out, "Volume:     {}%", volume);
        }
        if let Some(auto_lock) = data.auto_lock {
            let _ = writeln!(out, "Auto-lock:  {}", Self::on_off(auto_lock));
        }
        if let Some(dark) = data.dark_theme {
            let _ = writeln!(out, "Palette:    {}", if dark { "dark" } else { "light" });
        }
        out
    }

    fn phase_line(data: &ResponseData) -> String {
        let phase = match data.phase.as_deref() {
            Some("work") => "Work",
            Some("break") => "Break",
            Some(other) => other,
            None => "unknown",
        };
        match data.running {
            Some(false) => format!("{} (paused)", phase),
            _ => phase.to_string(),
        }
    }

    /// Shows the stored settings and data paths.
    pub fn show_config(settings: &AppSettings, settings_path: &Path, session_log: &Path) {
        print!(
            "{}",
            Self::format_config(settings, settings_path, session_log)
        );
    }

    /// Formats the stored settings and data paths.
    pub fn format_config(
        settings: &AppSettings,
        settings_path: &Path,
        session_log: &Path,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Settings file:    {}", settings_path.display());
        let _ = writeln!(out, "Session log:      {}", session_log.display());
        let _ = writeln!(
            out,
            "Work duration:    {} min",
            settings.work_duration_seconds / 60
        );
        let _ = writeln!(
            out,
            "Break duration:   {} min",
            settings.break_duration_seconds / 60
        );
        let _ = writeln!(out, "Completed cycles: {}", settings.completed_cycles);
        let _ = writeln!(
            out,
            "Palette:          {}",
            if settings.is_dark_theme { "dark" } else { "light" }
        );
        let _ = writeln!(out, "Auto-lock:        {}", Self::on_off(settings.enable_auto_lock));
        let _ = writeln!(out, "Volume:           {}%", settings.volume_percent());
        let _ = writeln!(
            out,
            "Overlay position: {}, {}",
            settings.overlay_position.x, settings.overlay_position.y
        );
        out
    }

    /// Shows the result of a session export.
    pub fn show_export_success(count: usize, output: &Path) {
        println!("* Exported {} session theme(s) to {}", count, output.display());
    }

    /// Shows a warning that does not change the exit status.
    pub fn show_warning(message: &str) {
        eprintln!("Warning: {}", message);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn on_off(enabled: bool) -> &'static str {
        if enabled {
            "on"
        } else {
            "off"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn running_response() -> IpcResponse {
        IpcResponse::success(
            "Timer started",
            Some(ResponseData {
                phase: Some("work".to_string()),
                running: Some(true),
                remaining_seconds: Some(1499),
                progress: Some(0),
                completed_cycles: Some(3),
                session_theme: Some("Write report".to_string()),
                dark_theme: Some(false),
                auto_lock: Some(true),
                volume: Some(50),
            }),
        )
    }

    // ------------------------------------------------------------------------
    // Success Tests
    // ------------------------------------------------------------------------

    mod success_tests {
        use super::*;

        #[test]
        fn test_format_success_with_remaining() {
            let text = Display::format_success(&running_response());
            assert_eq!(text, "* Timer started\n  Remaining: 24:59\n");
        }

        #[test]
        fn test_format_success_without_data() {
            let response = IpcResponse::success("Shutting down", None);
            assert_eq!(Display::format_success(&response), "* Shutting down\n");
        }
    }

    // ------------------------------------------------------------------------
    // Status Tests
    // ------------------------------------------------------------------------

    mod status_tests {
        use super::*;

        #[test]
        fn test_format_status_running() {
            let text = Display::format_status(&running_response());

            assert!(text.contains("Phase:      Work\n"));
            assert!(text.contains("Remaining:  24:59\n"));
            assert!(text.contains("Completed:  3\n"));
            assert!(text.contains("Theme:      Write report\n"));
            assert!(text.contains("Auto-lock:  on\n"));
            assert!(text.contains("Palette:    light\n"));
        }

        #[test]
        fn test_format_status_paused_break() {
            let response = IpcResponse::success(
                "Status retrieved",
                Some(ResponseData {
                    phase: Some("break".to_string()),
                    running: Some(false),
                    ..ResponseData::default()
                }),
            );
            let text = Display::format_status(&response);

            assert!(text.contains("Phase:      Break (paused)\n"));
            assert!(!text.contains("Theme:"));
        }

        #[test]
        fn test_format_status_no_data() {
            let response = IpcResponse::success("", None);
            assert!(Display::format_status(&response).contains("No status available"));
        }
    }

    // ------------------------------------------------------------------------
    // Config Tests
    // ------------------------------------------------------------------------

    mod config_tests {
        use super::*;

        #[test]
        fn test_format_config_defaults() {
            let text = Display::format_config(
                &AppSettings::default(),
                &PathBuf::from("/data/settings.json"),
                &PathBuf::from("/data/session_themes.jsonl"),
            );

            assert!(text.contains("Settings file:    /data/settings.json\n"));
            assert!(text.contains("Work duration:    25 min\n"));
            assert!(text.contains("Break duration:   5 min\n"));
            assert!(text.contains("Volume:           50%\n"));
            assert!(text.contains("Overlay position: 20, 80\n"));
        }
    }
}
