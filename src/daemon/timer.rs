//! Phase controller for pomoclock.
//!
//! This module provides the core timer functionality:
//! - Work ↔ Break transitions when the countdown expires
//! - Start / pause / reset with idempotent semantics
//! - Ownership of every persisted setting (durations, palette, volume, ...)
//! - Event firing for effects, persistence and rendering

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::config::{AppSettings, MAX_BREAK_SECONDS, MAX_WORK_SECONDS};
use crate::types::{OverlayPosition, Phase, TickOutcome, TimerSnapshot, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Events emitted by the engine, consumed by the application loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// Countdown started or continued
    Started,
    /// Countdown paused
    Paused,
    /// Timer returned to a stopped Work phase
    Reset,
    /// One second elapsed
    Tick {
        /// Remaining seconds after the tick
        remaining_seconds: u32,
    },
    /// Work phase finished; Break has begun
    WorkCompleted {
        /// Completed Work phases including this one
        completed_cycles: u32,
    },
    /// Break phase finished; Work has begun
    BreakCompleted,
    /// Work and/or Break duration changed
    DurationsChanged {
        work_duration_seconds: u32,
        break_duration_seconds: u32,
    },
    /// Palette toggled
    AppearanceChanged {
        /// Whether the dark palette is now active
        dark_theme: bool,
    },
    /// Auto-lock or volume changed
    PreferencesChanged,
    /// Overlay visibility or position changed
    OverlayChanged {
        visible: bool,
        position: OverlayPosition,
    },
    /// Session theme set or cleared
    SessionThemeChanged {
        /// New theme, `None` when cleared
        label: Option<String>,
    },
}

impl TimerEvent {
    /// Returns true if the event changes something persisted in settings.
    pub fn changes_settings(&self) -> bool {
        matches!(
            self,
            TimerEvent::WorkCompleted { .. }
                | TimerEvent::BreakCompleted
                | TimerEvent::DurationsChanged { .. }
                | TimerEvent::AppearanceChanged { .. }
                | TimerEvent::PreferencesChanged
                | TimerEvent::OverlayChanged { .. }
        )
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the Pomodoro state and all persisted settings.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Preferences not covered by `state`
    settings: AppSettings,
    /// Whether the floating overlay is shown
    overlay_visible: bool,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a new engine from loaded settings and an event channel.
    ///
    /// The timer starts paused at the beginning of a Work phase.
    pub fn new(settings: AppSettings, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(
                settings.work_duration_seconds,
                settings.break_duration_seconds,
                settings.completed_cycles,
            ),
            settings,
            overlay_visible: false,
            event_tx,
        }
    }

    fn emit(&self, event: TimerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("Failed to send timer event")
    }

    /// Advances the countdown by one second.
    ///
    /// Does nothing while paused. When the countdown expires the phase
    /// transition happens before this returns.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if !self.state.running {
            return Ok(TickOutcome::Running);
        }

        let outcome = self.state.tick();

        self.emit(TimerEvent::Tick {
            remaining_seconds: self.state.remaining_seconds(),
        })?;

        if outcome == TickOutcome::Expired {
            self.handle_phase_complete()?;
        }

        Ok(outcome)
    }

    /// Handles countdown expiry (phase transitions).
    fn handle_phase_complete(&mut self) -> Result<()> {
        match self.state.phase {
            Phase::Work => {
                self.state.completed_cycles += 1;
                self.state.enter_phase(Phase::Break);

                tracing::info!(
                    completed_cycles = self.state.completed_cycles,
                    "Work phase completed"
                );
                self.emit(TimerEvent::WorkCompleted {
                    completed_cycles: self.state.completed_cycles,
                })
            }
            Phase::Break => {
                self.state.enter_phase(Phase::Work);

                tracing::info!("Break phase completed");
                self.emit(TimerEvent::BreakCompleted)
            }
        }
    }

    /// Starts (or continues) the countdown. Returns false if already running.
    pub fn start(&mut self) -> Result<bool> {
        if !self.state.set_running(true) {
            return Ok(false);
        }
        self.emit(TimerEvent::Started)?;
        Ok(true)
    }

    /// Pauses the countdown. Returns false if already paused.
    pub fn pause(&mut self) -> Result<bool> {
        if !self.state.set_running(false) {
            return Ok(false);
        }
        self.emit(TimerEvent::Paused)?;
        Ok(true)
    }

    /// Pauses a running countdown or continues a paused one.
    pub fn toggle_pause(&mut self) -> Result<()> {
        if self.state.running {
            self.pause()?;
        } else {
            self.start()?;
        }
        Ok(())
    }

    /// Returns to a stopped Work phase with the configured durations.
    ///
    /// The cycle count and session theme are kept.
    pub fn reset(&mut self) -> Result<()> {
        self.state
            .reset(self.state.work_duration_seconds, self.state.break_duration_seconds);
        self.emit(TimerEvent::Reset)
    }

    /// Changes the phase durations, in minutes.
    ///
    /// Only the active phase's countdown restarts.
    ///
    /// # Errors
    ///
    /// Returns an error if a duration is outside 1-120 (Work) or 1-60 (Break)
    /// minutes. Nothing is changed in that case.
    pub fn set_durations(
        &mut self,
        work_minutes: Option<u32>,
        break_minutes: Option<u32>,
    ) -> Result<()> {
        if let Some(work) = work_minutes {
            if work == 0 || work > MAX_WORK_SECONDS / 60 {
                anyhow::bail!("Work duration must be 1-{} minutes", MAX_WORK_SECONDS / 60);
            }
        }
        if let Some(brk) = break_minutes {
            if brk == 0 || brk > MAX_BREAK_SECONDS / 60 {
                anyhow::bail!("Break duration must be 1-{} minutes", MAX_BREAK_SECONDS / 60);
            }
        }

        if let Some(work) = work_minutes {
            self.state.set_duration(Phase::Work, work * 60);
        }
        if let Some(brk) = break_minutes {
            self.state.set_duration(Phase::Break, brk * 60);
        }

        self.emit(TimerEvent::DurationsChanged {
            work_duration_seconds: self.state.work_duration_seconds,
            break_duration_seconds: self.state.break_duration_seconds,
        })
    }

    /// Switches between the light and dark palette. Returns the new mode.
    pub fn toggle_palette(&mut self) -> Result<bool> {
        self.settings.is_dark_theme = !self.settings.is_dark_theme;
        self.emit(TimerEvent::AppearanceChanged {
            dark_theme: self.settings.is_dark_theme,
        })?;
        Ok(self.settings.is_dark_theme)
    }

    /// Enables or disables locking the screen after Work.
    pub fn set_auto_lock(&mut self, enabled: bool) -> Result<()> {
        self.settings.enable_auto_lock = enabled;
        self.emit(TimerEvent::PreferencesChanged)
    }

    /// Sets the alert volume in percent.
    ///
    /// # Errors
    ///
    /// Returns an error if `percent` is above 100.
    pub fn set_volume(&mut self, percent: u32) -> Result<()> {
        if percent > 100 {
            anyhow::bail!("Volume must be 0-100");
        }
        self.settings.volume = percent as f32 / 100.0;
        self.emit(TimerEvent::PreferencesChanged)
    }

    /// Shows the overlay if hidden, hides it otherwise. Returns visibility.
    pub fn toggle_overlay(&mut self) -> Result<bool> {
        self.overlay_visible = !self.overlay_visible;
        self.emit_overlay()?;
        Ok(self.overlay_visible)
    }

    /// Moves the overlay to an absolute position and shows it.
    pub fn move_overlay(&mut self, position: OverlayPosition) -> Result<()> {
        self.settings.overlay_position = position;
        self.overlay_visible = true;
        self.emit_overlay()
    }

    /// Moves the overlay back to its default position and shows it.
    pub fn reset_overlay_position(&mut self) -> Result<()> {
        self.move_overlay(OverlayPosition::DEFAULT)
    }

    fn emit_overlay(&self) -> Result<()> {
        self.emit(TimerEvent::OverlayChanged {
            visible: self.overlay_visible,
            position: self.settings.overlay_position,
        })
    }

    /// Sets the session theme shown during Work.
    ///
    /// A blank label clears the theme. Returns the stored theme.
    pub fn set_session_theme(&mut self, label: &str) -> Result<Option<String>> {
        let trimmed = label.trim();
        self.state.session_theme = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.emit(TimerEvent::SessionThemeChanged {
            label: self.state.session_theme.clone(),
        })?;
        Ok(self.state.session_theme.clone())
    }

    /// Returns a reference to the current timer state.
    pub fn get_state(&self) -> &TimerState {
        &self.state
    }

    /// Returns whether the overlay is shown.
    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Returns the settings to persist, reflecting the current state.
    pub fn to_settings(&self) -> AppSettings {
        AppSettings {
            work_duration_seconds: self.state.work_duration_seconds,
            break_duration_seconds: self.state.break_duration_seconds,
            completed_cycles: self.state.completed_cycles,
            ..self.settings.clone()
        }
    }

    /// Takes a read-only snapshot for the presentation sinks.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds(),
            phase_duration_seconds: self.state.phase_duration(),
            running: self.state.running,
            completed_cycles: self.state.completed_cycles,
            session_theme: self.state.session_theme.clone(),
            dark_theme: self.settings.is_dark_theme,
            auto_lock: self.settings.enable_auto_lock,
            volume: self.settings.volume,
            overlay_position: self.settings.overlay_position,
            overlay_visible: self.overlay_visible,
        }
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub fn get_state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

// ============================================================================
// Tests
// ============================================================================
