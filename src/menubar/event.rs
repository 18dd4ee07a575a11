//! Tray menu events.
//!
//! This module handles:
//! - Mapping tray menu item ids to [`MenuAction`]s
//! - The [`TrayUpdate`] messages sent from the timer loop to the tray
//!
//! Actions are fed back into the timer as ordinary user commands.

use std::fmt;

use crate::types::TimerSnapshot;

// ============================================================================
// MenuAction
// ============================================================================

/// Actions that can be triggered from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start or continue the countdown
    Start,
    /// Pause a running countdown, continue a paused one
    TogglePause,
    /// Return to a stopped Work phase
    Reset,
    /// Show or hide the floating overlay
    ToggleOverlay,
    /// Quit the application
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_command())
    }
}

impl MenuAction {
    /// Returns the equivalent CLI command name.
    pub fn as_command(&self) -> &'static str {
        match self {
            MenuAction::Start => "start",
            MenuAction::TogglePause => "pause",
            MenuAction::Reset => "reset",
            MenuAction::ToggleOverlay => "overlay",
            MenuAction::Quit => "quit",
        }
    }
}

// ============================================================================
// MenuItemId
// ============================================================================

/// Identifiers of the tray menu items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    Start,
    TogglePause,
    Reset,
    ToggleOverlay,
    Quit,
    /// Title, status rows and anything else without an action
    Unknown,
}

impl MenuItemId {
    /// Returns the string id registered with the native menu.
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItemId::Start => "pomoclock.start",
            MenuItemId::TogglePause => "pomoclock.toggle_pause",
            MenuItemId::Reset => "pomoclock.reset",
            MenuItemId::ToggleOverlay => "pomoclock.toggle_overlay",
            MenuItemId::Quit => "pomoclock.quit",
            MenuItemId::Unknown => "pomoclock.unknown",
        }
    }

    /// Parses a native menu id.
    pub fn parse(id: &str) -> MenuItemId {
        [
            MenuItemId::Start,
            MenuItemId::TogglePause,
            MenuItemId::Reset,
            MenuItemId::ToggleOverlay,
            MenuItemId::Quit,
        ]
        .into_iter()
        .find(|item| item.as_str() == id)
        .unwrap_or(MenuItemId::Unknown)
    }

    /// Converts a menu item ID to the corresponding action.
    pub fn to_action(&self) -> Option<MenuAction> {
        match self {
            MenuItemId::Start => Some(MenuAction::Start),
            MenuItemId::TogglePause => Some(MenuAction::TogglePause),
            MenuItemId::Reset => Some(MenuAction::Reset),
            MenuItemId::ToggleOverlay => Some(MenuAction::ToggleOverlay),
            MenuItemId::Quit => Some(MenuAction::Quit),
            MenuItemId::Unknown => None,
        }
    }
}

// ============================================================================
// EventHandler
// ============================================================================

/// Converts menu clicks to actions.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Returns the action for a clicked item, if any.
    pub fn handle_click(&self, item_id: MenuItemId) -> Option<MenuAction> {
        let action = item_id.to_action();
        if let Some(action) = action {
            tracing::info!(action = %action, "Tray menu action received");
        }
        action
    }
}

// ============================================================================
// TrayUpdate
// ============================================================================

/// Messages sent to the tray icon over a crossbeam channel.
#[derive(Debug, Clone)]
pub enum TrayUpdate {
    /// Redraw icon, tooltip and menu from a snapshot
    Refresh(TimerSnapshot),
    /// Remove the tray icon
    Shutdown,
}

// ============================================================================
// Tests
// ============================================================================
