//! Tray menu model.
//!
//! Layout: a disabled title, disabled status rows (phase, remaining time,
//! completed cycles), then Start, Pause/Continue, Reset, Toggle overlay and
//! Quit. Building the native menu from this model happens in the
//! platform-specific code.

use crate::types::TimerSnapshot;

use super::event::MenuItemId;

/// Title row text.
pub const MENU_TITLE: &str = "Pomodoro";

// ============================================================================
// MenuItemConfig
// ============================================================================

/// Configuration for a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemConfig {
    pub id: MenuItemId,
    pub text: String,
    pub enabled: bool,
}

impl MenuItemConfig {
    pub fn new(id: MenuItemId, text: impl Into<String>, enabled: bool) -> Self {
        Self {
            id,
            text: text.into(),
            enabled,
        }
    }

    /// A disabled row without an action.
    pub fn label(text: impl Into<String>) -> Self {
        Self::new(MenuItemId::Unknown, text, false)
    }
}

// ============================================================================
// MenuConfig
// ============================================================================

/// Complete menu configuration for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    pub title: MenuItemConfig,
    pub status_items: Vec<MenuItemConfig>,
    /// Start, Pause/Continue, Reset, Toggle overlay
    pub actions: Vec<MenuItemConfig>,
    pub quit: MenuItemConfig,
}

// ============================================================================
// MenuBuilder
// ============================================================================

/// Builds the menu model from a snapshot.
#[derive(Debug, Default)]
pub struct MenuBuilder;

impl MenuBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, snapshot: &TimerSnapshot) -> MenuConfig {
        MenuConfig {
            title: MenuItemConfig::label(MENU_TITLE),
            status_items: self.build_status_items(snapshot),
            actions: self.build_actions(snapshot),
            quit: MenuItemConfig::new(MenuItemId::Quit, "Quit", true),
        }
    }

    fn build_status_items(&self, snapshot: &TimerSnapshot) -> Vec<MenuItemConfig> {
        let state = if snapshot.running { "" } else { " (paused)" };
        vec![
            MenuItemConfig::label(format!("{}{}", snapshot.phase_label(), state)),
            MenuItemConfig::label(format!("Remaining: {}", snapshot.clock_text())),
            MenuItemConfig::label(format!("Completed: {}", snapshot.completed_cycles)),
        ]
    }

    fn build_actions(&self, snapshot: &TimerSnapshot) -> Vec<MenuItemConfig> {
        let pause_text = if snapshot.running { "Pause" } else { "Continue" };
        let overlay_text = if snapshot.overlay_visible {
            "Hide overlay"
        } else {
            "Show overlay"
        };

        vec![
            MenuItemConfig::new(MenuItemId::Start, "Start", !snapshot.running),
            MenuItemConfig::new(MenuItemId::TogglePause, pause_text, true),
            MenuItemConfig::new(MenuItemId::Reset, "Reset", true),
            MenuItemConfig::new(MenuItemId::ToggleOverlay, overlay_text, true),
        ]
    }
}

// ============================================================================
// Tests
// ============================================================================
