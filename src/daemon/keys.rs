//! Single-key shortcuts for `pomoclock run`.
//!
//! While a [`KeyInput`] is open the terminal is in raw mode, so every key
//! press arrives on its own without waiting for Enter.

use crossterm::event::{Event, EventStream};
use crossterm::terminal;
use futures_util::StreamExt;
use tracing::{debug, warn};

use super::runtime::UserAction;

/// Key press reader over the controlling terminal.
pub struct KeyInput {
    events: EventStream,
    raw: bool,
}

impl KeyInput {
    /// Switches the terminal to raw mode and starts reading key events.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled.
    pub fn open() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        debug!("Raw mode enabled for keyboard shortcuts");
        Ok(Self {
            events: EventStream::new(),
            raw: true,
        })
    }

    /// Waits for the next key that maps to an action.
    ///
    /// Returns `None` once the event stream ends or fails.
    pub async fn next_action(&mut self) -> Option<UserAction> {
        loop {
            match self.events.next().await? {
                Ok(Event::Key(key)) => {
                    if let Some(action) = UserAction::from_key_event(&key) {
                        return Some(action);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Failed to read keyboard input: {}", e);
                    return None;
                }
            }
        }
    }

    /// Leaves raw mode. Later calls do nothing.
    pub fn restore(&mut self) {
        if !self.raw {
            return;
        }
        self.raw = false;
        match terminal::disable_raw_mode() {
            Ok(()) => debug!("Raw mode disabled"),
            Err(e) => warn!("Failed to restore the terminal: {}", e),
        }
    }
}

impl Drop for KeyInput {
    fn drop(&mut self) {
        self.restore();
    }
}

impl std::fmt::Debug for KeyInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyInput")
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

/// Waits for the next action from `keys`, or forever when there are none.
pub(crate) async fn next_key_action(keys: &mut Option<KeyInput>) -> Option<UserAction> {
    match keys {
        Some(keys) => keys.next_action().await,
        None => std::future::pending().await,
    }
}
