//! Presentation sinks.
//!
//! Every sink implements [`View`] and redraws passively from a
//! [`TimerSnapshot`]. No sink writes back to the timer.
//!
//! - [`LabelView`]: one terminal line with `mm:ss` and the phase label
//! - [`OverlayView`]: large block digits at the persisted overlay position
//! - [`TrayView`]: forwards snapshots to the tray icon
//! - [`MockView`]: records snapshots for tests

pub mod font;
pub mod label;
pub mod overlay;
pub mod palette;
pub mod tray;

use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::types::TimerSnapshot;

pub use label::{label_text, LabelView};
pub use overlay::OverlayView;
pub use palette::{Color, Palette, BREAK_COLOR, WORK_COLOR};
pub use tray::TrayView;

/// A passive rendering of the timer state.
pub trait View {
    /// Redraws from `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output could not be written.
    fn render(&mut self, snapshot: &TimerSnapshot) -> Result<()>;
}

impl<V: View + ?Sized> View for Box<V> {
    fn render(&mut self, snapshot: &TimerSnapshot) -> Result<()> {
        self.as_mut().render(snapshot)
    }
}

/// Records every rendered snapshot.
///
/// Clones share the same record, so a test can keep one clone and hand
/// the other to the application.
#[derive(Debug, Clone, Default)]
pub struct MockView {
    rendered: Arc<Mutex<Vec<TimerSnapshot>>>,
}

impl MockView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_count(&self) -> usize {
        self.rendered.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<TimerSnapshot> {
        self.rendered.lock().unwrap().last().cloned()
    }

    pub fn rendered(&self) -> Vec<TimerSnapshot> {
        self.rendered.lock().unwrap().clone()
    }
}

impl View for MockView {
    fn render(&mut self, snapshot: &TimerSnapshot) -> Result<()> {
        self.rendered.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OverlayPosition, Phase};

    #[test]
    fn test_mock_view_shares_record_between_clones() {
        let view = MockView::new();
        let mut boxed: Box<dyn View> = Box::new(view.clone());

        let snapshot = TimerSnapshot {
            phase: Phase::Break,
            remaining_seconds: 10,
            phase_duration_seconds: 300,
            running: false,
            completed_cycles: 1,
            session_theme: None,
            dark_theme: false,
            auto_lock: false,
            volume: 0.5,
            overlay_position: OverlayPosition::DEFAULT,
            overlay_visible: false,
        };
        boxed.render(&snapshot).unwrap();

        assert_eq!(view.render_count(), 1);
        assert_eq!(view.last(), Some(snapshot));
    }
}
