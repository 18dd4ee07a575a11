//! Core data types for pomoclock.
//!
//! This module defines the data structures used for:
//! - The Work/Break phase and the one-second countdown
//! - Timer state owned by the phase controller
//! - Read-only snapshots handed to the presentation sinks
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

// ============================================================================
// Phase
// ============================================================================

/// The two countdown modes of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Focused work
    #[default]
    Work,
    /// Rest between work phases
    Break,
}

impl Phase {
    /// Returns the wire representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }

    /// Returns the human-readable phase name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }

    /// Returns the phase that follows this one.
    pub fn next(&self) -> Phase {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }
}

// ============================================================================
// Countdown
// ============================================================================

/// Result of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown is still running (or already reported its expiry)
    Running,
    /// The countdown reached zero; reported once per countdown
    Expired,
}

/// Seconds remaining in the current phase.
///
/// The decrement is guarded so the value never underflows, and expiry is
/// latched so it is reported exactly once until the next [`Countdown::reset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    remaining_seconds: u32,
    #[serde(default, skip_serializing)]
    expiry_reported: bool,
}

impl Countdown {
    /// Creates a countdown starting at `seconds`.
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining_seconds: seconds,
            expiry_reported: false,
        }
    }

    /// Returns the remaining seconds.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }

        if self.remaining_seconds == 0 && !self.expiry_reported {
            self.expiry_reported = true;
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    /// Restarts the countdown at `seconds` and clears the expiry latch.
    pub fn reset(&mut self, seconds: u32) {
        self.remaining_seconds = seconds;
        self.expiry_reported = false;
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Percentage of the phase that has elapsed, using integer division.
///
/// Returns 0 at phase start and 100 once the countdown reaches zero.
/// A zero-length phase counts as complete.
pub fn progress_percent(remaining_seconds: u32, phase_duration_seconds: u32) -> u32 {
    if phase_duration_seconds == 0 {
        return 100;
    }
    let remaining = u64::from(remaining_seconds.min(phase_duration_seconds));
    let elapsed_share = remaining * 100 / u64::from(phase_duration_seconds);
    100 - elapsed_share as u32
}

/// Formats seconds as `mm:ss`. Minutes are not wrapped at 60.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// TimerState
// ============================================================================

/// State of the Pomodoro timer, exclusively mutated by the phase controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerState {
    /// Current phase
    pub phase: Phase,
    /// Countdown for the current phase
    pub countdown: Countdown,
    /// Configured Work duration in seconds
    pub work_duration_seconds: u32,
    /// Configured Break duration in seconds
    pub break_duration_seconds: u32,
    /// Whether the tick source advances the countdown
    pub running: bool,
    /// Number of completed Work phases
    pub completed_cycles: u32,
    /// Label attached to the current Work phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_theme: Option<String>,
}

impl TimerState {
    /// Creates a paused state at the start of a Work phase.
    pub fn new(
        work_duration_seconds: u32,
        break_duration_seconds: u32,
        completed_cycles: u32,
    ) -> Self {
        Self {
            phase: Phase::Work,
            countdown: Countdown::new(work_duration_seconds),
            work_duration_seconds,
            break_duration_seconds,
            running: false,
            completed_cycles,
            session_theme: None,
        }
    }

    /// Returns the configured duration of `phase`.
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_duration_seconds,
            Phase::Break => self.break_duration_seconds,
        }
    }

    /// Returns the configured duration of the active phase.
    pub fn phase_duration(&self) -> u32 {
        self.duration_of(self.phase)
    }

    /// Returns the seconds left in the active phase.
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining_seconds()
    }

    /// Advances the countdown by one second if the timer is running.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Running;
        }
        self.countdown.tick()
    }

    /// Changes the configured duration of `phase`.
    ///
    /// The countdown restarts only when `phase` is the active phase.
    pub fn set_duration(&mut self, phase: Phase, seconds: u32) {
        match phase {
            Phase::Work => self.work_duration_seconds = seconds,
            Phase::Break => self.break_duration_seconds = seconds,
        }
        if phase == self.phase {
            self.countdown.reset(seconds);
        }
    }

    /// Enters `phase` with a full countdown.
    pub fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.countdown.reset(self.duration_of(phase));
    }

    /// Sets the running flag. Returns true if it changed.
    pub fn set_running(&mut self, running: bool) -> bool {
        let changed = self.running != running;
        self.running = running;
        changed
    }

    /// Returns to a stopped Work phase with the given durations.
    pub fn reset(&mut self, work_duration_seconds: u32, break_duration_seconds: u32) {
        self.work_duration_seconds = work_duration_seconds;
        self.break_duration_seconds = break_duration_seconds;
        self.running = false;
        self.enter_phase(Phase::Work);
    }

    /// Returns the elapsed share of the active phase in percent.
    pub fn progress(&self) -> u32 {
        progress_percent(self.remaining_seconds(), self.phase_duration())
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Position of the floating overlay in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPosition {
    pub x: i32,
    pub y: i32,
}

impl OverlayPosition {
    /// Top-left offset used until the user moves the overlay.
    pub const DEFAULT: OverlayPosition = OverlayPosition { x: 20, y: 80 };
}

impl Default for OverlayPosition {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Read-only view of the timer taken at refresh time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub phase_duration_seconds: u32,
    pub running: bool,
    pub completed_cycles: u32,
    pub session_theme: Option<String>,
    pub dark_theme: bool,
    pub auto_lock: bool,
    pub volume: f32,
    pub overlay_position: OverlayPosition,
    pub overlay_visible: bool,
}

impl TimerSnapshot {
    /// Elapsed share of the phase in percent.
    pub fn progress(&self) -> u32 {
        progress_percent(self.remaining_seconds, self.phase_duration_seconds)
    }

    /// Remaining time as `mm:ss`.
    pub fn clock_text(&self) -> String {
        format_clock(self.remaining_seconds)
    }

    /// Whole minutes remaining (truncated).
    pub fn remaining_minutes(&self) -> u32 {
        self.remaining_seconds / 60
    }

    /// Text shown next to the clock: the session theme during Work if one
    /// is set, otherwise the phase name.
    pub fn phase_label(&self) -> &str {
        match (self.phase, self.session_theme.as_deref()) {
            (Phase::Work, Some(theme)) if !theme.is_empty() => theme,
            (phase, _) => phase.display_name(),
        }
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// Overlay operations available over IPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayAction {
    /// Show the overlay if hidden, hide it otherwise
    Toggle,
    /// Move the overlay back to its default position and show it
    Reset,
    /// Move the overlay to an absolute position
    Move { x: i32, y: i32 },
}

/// IPC request from client to the running application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start (or continue) the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Return to a stopped Work phase
    Reset,
    /// Query the current status
    Status,
    /// Change phase durations
    Settings {
        /// Work duration in minutes
        #[serde(rename = "workMinutes", skip_serializing_if = "Option::is_none")]
        work_minutes: Option<u32>,
        /// Break duration in minutes
        #[serde(rename = "breakMinutes", skip_serializing_if = "Option::is_none")]
        break_minutes: Option<u32>,
    },
    /// Toggle between the light and dark palette
    Palette,
    /// Enable or disable locking the screen when a Work phase ends
    #[serde(rename = "autolock")]
    AutoLock { enabled: bool },
    /// Set the alert volume in percent
    Volume { percent: u32 },
    /// Show, hide or move the floating overlay
    Overlay { action: OverlayAction },
    /// Record a session theme and show it during Work
    Session { label: String },
    /// Save settings and exit
    Quit,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current phase ("work" or "break")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Whether the countdown is running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    /// Remaining seconds
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    /// Elapsed share of the phase in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    /// Completed Work phases
    #[serde(rename = "completedCycles", skip_serializing_if = "Option::is_none")]
    pub completed_cycles: Option<u32>,
    /// Current session theme
    #[serde(rename = "sessionTheme", skip_serializing_if = "Option::is_none")]
    pub session_theme: Option<String>,
    /// Whether the dark palette is active
    #[serde(rename = "darkTheme", skip_serializing_if = "Option::is_none")]
    pub dark_theme: Option<bool>,
    /// Whether auto-lock is enabled
    #[serde(rename = "autoLock", skip_serializing_if = "Option::is_none")]
    pub auto_lock: Option<bool>,
    /// Alert volume in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
}

impl ResponseData {
    /// Creates response data from a timer snapshot.
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        Self {
            phase: Some(snapshot.phase.as_str().to_string()),
            running: Some(snapshot.running),
            remaining_seconds: Some(snapshot.remaining_seconds),
            progress: Some(snapshot.progress()),
            completed_cycles: Some(snapshot.completed_cycles),
            session_theme: snapshot.session_theme.clone(),
            dark_theme: Some(snapshot.dark_theme),
            auto_lock: Some(snapshot.auto_lock),
            volume: Some((snapshot.volume * 100.0).round() as u32),
        }
    }
}

/// IPC response from the running application to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for error responses.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(phase: Phase, remaining: u32, duration: u32) -> TimerSnapshot {
        TimerSnapshot {
            phase,
            remaining_seconds: remaining,
            phase_duration_seconds: duration,
            running: true,
            completed_cycles: 0,
            session_theme: None,
            dark_theme: false,
            auto_lock: false,
            volume: 0.5,
            overlay_position: OverlayPosition::DEFAULT,
            overlay_visible: false,
        }
    }

    // ------------------------------------------------------------------------
    // Phase Tests
    // ------------------------------------------------------------------------

    mod phase_tests {
        use super::*;

        #[test]
        fn test_default_is_work() {
            assert_eq!(Phase::default(), Phase::Work);
        }

        #[test]
        fn test_next_alternates() {
            assert_eq!(Phase::Work.next(), Phase::Break);
            assert_eq!(Phase::Break.next(), Phase::Work);
        }

        #[test]
        fn test_serialize() {
            assert_eq!(serde_json::to_string(&Phase::Break).unwrap(), "\"break\"");
            let phase: Phase = serde_json::from_str("\"work\"").unwrap();
            assert_eq!(phase, Phase::Work);
        }
    }

    // ------------------------------------------------------------------------
    // Countdown Tests
    // ------------------------------------------------------------------------

    mod countdown_tests {
        use super::*;

        #[test]
        fn test_tick_decrements_by_one() {
            let mut countdown = Countdown::new(10);
            for expected in (2..10).rev() {
                assert_eq!(countdown.tick(), TickOutcome::Running);
                assert_eq!(countdown.remaining_seconds(), expected);
            }
        }

        #[test]
        fn test_tick_reaching_zero_expires() {
            let mut countdown = Countdown::new(2);
            assert_eq!(countdown.tick(), TickOutcome::Running);
            assert_eq!(countdown.tick(), TickOutcome::Expired);
            assert_eq!(countdown.remaining_seconds(), 0);
        }

        #[test]
        fn test_tick_at_zero_expires_once() {
            let mut countdown = Countdown::new(0);
            assert_eq!(countdown.tick(), TickOutcome::Expired);
            assert_eq!(countdown.tick(), TickOutcome::Running);
            assert_eq!(countdown.tick(), TickOutcome::Running);
            assert_eq!(countdown.remaining_seconds(), 0);
        }

        #[test]
        fn test_reset_rearms_expiry() {
            let mut countdown = Countdown::new(1);
            assert_eq!(countdown.tick(), TickOutcome::Expired);
            assert_eq!(countdown.tick(), TickOutcome::Running);

            countdown.reset(1);
            assert_eq!(countdown.remaining_seconds(), 1);
            assert_eq!(countdown.tick(), TickOutcome::Expired);
        }
    }

    // ------------------------------------------------------------------------
    // Progress Tests
    // ------------------------------------------------------------------------

    mod progress_tests {
        use super::*;

        #[test]
        fn test_progress_zero_at_start() {
            assert_eq!(progress_percent(1500, 1500), 0);
        }

        #[test]
        fn test_progress_hundred_at_end() {
            assert_eq!(progress_percent(0, 1500), 100);
        }

        #[test]
        fn test_progress_integer_division() {
            // 1499 * 100 / 1500 = 99 -> 1
            assert_eq!(progress_percent(1499, 1500), 1);
            assert_eq!(progress_percent(750, 1500), 50);
            // 1 * 100 / 300 = 0 -> 100
            assert_eq!(progress_percent(1, 300), 100);
        }

        #[test]
        fn test_progress_zero_duration() {
            assert_eq!(progress_percent(0, 0), 100);
        }

        #[test]
        fn test_format_clock() {
            assert_eq!(format_clock(1500), "25:00");
            assert_eq!(format_clock(65), "01:05");
            assert_eq!(format_clock(0), "00:00");
            assert_eq!(format_clock(7200), "120:00");
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = TimerState::new(1500, 300, 4);
            assert_eq!(state.phase, Phase::Work);
            assert_eq!(state.remaining_seconds(), 1500);
            assert!(!state.running);
            assert_eq!(state.completed_cycles, 4);
        }

        #[test]
        fn test_tick_ignored_when_not_running() {
            let mut state = TimerState::new(1500, 300, 0);
            assert_eq!(state.tick(), TickOutcome::Running);
            assert_eq!(state.remaining_seconds(), 1500);
        }

        #[test]
        fn test_set_duration_active_phase_resets_countdown() {
            let mut state = TimerState::new(1500, 300, 0);
            state.running = true;
            state.tick();
            state.set_duration(Phase::Work, 600);
            assert_eq!(state.remaining_seconds(), 600);
        }

        #[test]
        fn test_set_duration_inactive_phase_keeps_countdown() {
            let mut state = TimerState::new(1500, 300, 0);
            state.running = true;
            state.tick();
            state.set_duration(Phase::Break, 600);
            assert_eq!(state.remaining_seconds(), 1499);
            assert_eq!(state.break_duration_seconds, 600);
        }

        #[test]
        fn test_remaining_never_exceeds_duration() {
            let mut state = TimerState::new(1500, 300, 0);
            state.set_duration(Phase::Work, 60);
            assert!(state.remaining_seconds() <= state.phase_duration());
        }

        #[test]
        fn test_reset_from_break() {
            let mut state = TimerState::new(1500, 300, 0);
            state.running = true;
            state.enter_phase(Phase::Break);
            state.tick();

            state.reset(1200, 600);

            assert_eq!(state.phase, Phase::Work);
            assert_eq!(state.remaining_seconds(), 1200);
            assert_eq!(state.break_duration_seconds, 600);
            assert!(!state.running);
        }

        #[test]
        fn test_set_running_reports_change() {
            let mut state = TimerState::new(1500, 300, 0);
            assert!(state.set_running(true));
            assert!(!state.set_running(true));
            assert!(state.set_running(false));
        }
    }

    // ------------------------------------------------------------------------
    // Snapshot Tests
    // ------------------------------------------------------------------------

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_phase_label_uses_session_theme_during_work() {
            let mut snap = snapshot(Phase::Work, 1500, 1500);
            assert_eq!(snap.phase_label(), "Work");

            snap.session_theme = Some("Write report".to_string());
            assert_eq!(snap.phase_label(), "Write report");

            snap.phase = Phase::Break;
            assert_eq!(snap.phase_label(), "Break");
        }

        #[test]
        fn test_remaining_minutes_truncates() {
            let snap = snapshot(Phase::Work, 59, 1500);
            assert_eq!(snap.remaining_minutes(), 0);
            assert_eq!(snap.clock_text(), "00:59");
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_unit_requests_serialize() {
            assert_eq!(
                serde_json::to_string(&IpcRequest::Start).unwrap(),
                r#"{"command":"start"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::Reset).unwrap(),
                r#"{"command":"reset"}"#
            );
        }

        #[test]
        fn test_settings_request_serialize() {
            let request = IpcRequest::Settings {
                work_minutes: Some(30),
                break_minutes: None,
            };
            let json = serde_json::to_string(&request).unwrap();
            assert!(json.contains("\"command\":\"settings\""));
            assert!(json.contains("\"workMinutes\":30"));
            assert!(!json.contains("breakMinutes"));
        }

        #[test]
        fn test_autolock_request_deserialize() {
            let json = r#"{"command":"autolock","enabled":true}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert!(matches!(request, IpcRequest::AutoLock { enabled: true }));
        }

        #[test]
        fn test_overlay_request_deserialize() {
            let json = r#"{"command":"overlay","action":{"move":{"x":100,"y":200}}}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            match request {
                IpcRequest::Overlay { action } => {
                    assert_eq!(action, OverlayAction::Move { x: 100, y: 200 })
                }
                other => panic!("Expected overlay request, got {:?}", other),
            }

            let json = r#"{"command":"overlay","action":"toggle"}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert!(matches!(
                request,
                IpcRequest::Overlay {
                    action: OverlayAction::Toggle
                }
            ));
        }

        #[test]
        fn test_response_data_from_snapshot() {
            let mut snap = snapshot(Phase::Break, 150, 300);
            snap.completed_cycles = 3;
            let data = ResponseData::from_snapshot(&snap);

            assert_eq!(data.phase, Some("break".to_string()));
            assert_eq!(data.remaining_seconds, Some(150));
            assert_eq!(data.progress, Some(50));
            assert_eq!(data.completed_cycles, Some(3));
            assert_eq!(data.volume, Some(50));
            assert!(data.session_theme.is_none());
        }

        #[test]
        fn test_response_serialize_skips_none() {
            let response = IpcResponse::success("OK", None);
            let json = serde_json::to_string(&response).unwrap();
            assert_eq!(json, r#"{"status":"success","message":"OK"}"#);
            assert!(!response.is_error());
            assert!(IpcResponse::error("boom").is_error());
        }
    }
}
