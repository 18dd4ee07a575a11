//! Single-line terminal label: `mm:ss` plus the phase or session theme.

use std::io::{Stdout, Write};

use anyhow::Result;
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::types::TimerSnapshot;

use super::palette::Palette;
use super::View;

/// Returns the label text for a snapshot, e.g. `24:59 Write report`.
pub fn label_text(snapshot: &TimerSnapshot) -> String {
    let mut text = format!("{} {}", snapshot.clock_text(), snapshot.phase_label());
    if !snapshot.running {
        text.push_str(" (paused)");
    }
    text
}

/// Rewrites the current terminal line on every render, in the window
/// colours of the active palette.
#[derive(Debug)]
pub struct LabelView<W: Write> {
    out: W,
}

impl LabelView<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> LabelView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> View for LabelView<W> {
    fn render(&mut self, snapshot: &TimerSnapshot) -> Result<()> {
        let palette = Palette::for_theme(snapshot.dark_theme);
        queue!(
            self.out,
            MoveToColumn(0),
            SetBackgroundColor(palette.window.into()),
            SetForegroundColor(palette.window_text.into()),
            Print(label_text(snapshot)),
            ResetColor,
            Clear(ClearType::UntilNewLine),
        )?;
        self.out.flush()?;
        Ok(())
    }
}
