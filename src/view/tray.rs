//! Tray sink: forwards snapshots to the tray icon thread.

use anyhow::Result;
use crossbeam_channel::Sender;
use tracing::warn;

use crate::menubar::TrayUpdate;
use crate::types::TimerSnapshot;

use super::View;

/// Sends each snapshot to the [`TrayIconManager`](crate::menubar::TrayIconManager).
#[derive(Debug)]
pub struct TrayView {
    tx: Sender<TrayUpdate>,
    connected: bool,
}

impl TrayView {
    pub fn new(tx: Sender<TrayUpdate>) -> Self {
        Self {
            tx,
            connected: true,
        }
    }

    /// Returns false once the tray side has gone away.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl View for TrayView {
    fn render(&mut self, snapshot: &TimerSnapshot) -> Result<()> {
        if !self.connected {
            return Ok(());
        }
        if self.tx.send(TrayUpdate::Refresh(snapshot.clone())).is_err() {
            warn!("Tray update channel disconnected; tray rendering stopped");
            self.connected = false;
        }
        Ok(())
    }
}
