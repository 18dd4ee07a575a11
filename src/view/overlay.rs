//! Floating countdown overlay drawn in the terminal with block digits.
//!
//! The overlay is placed at the terminal cell derived from its pixel
//! position (8 px per column, 16 px per row) and drawn between cursor
//! save / restore so the label line is left untouched.

use std::io::{Stdout, Write};

use anyhow::Result;
use crossterm::cursor::{MoveTo, RestorePosition, SavePosition};
use crossterm::queue;
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};

use crate::types::{OverlayPosition, Phase, TimerSnapshot};

use super::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::palette::{Color, Palette, BREAK_COLOR, WORK_COLOR};
use super::View;

/// Pixel width of one terminal column.
pub const CELL_WIDTH_PX: i32 = 8;

/// Pixel height of one terminal row.
pub const CELL_HEIGHT_PX: i32 = 16;

const BLOCK_ON: &str = "██";
const BLOCK_OFF: &str = "  ";

/// Returns the 0-based `(column, row)` of the overlay's top-left cell.
pub fn cell_for(position: OverlayPosition) -> (u16, u16) {
    let to_cell = |px: i32, cell: i32| u16::try_from(px.max(0) / cell).unwrap_or(u16::MAX);
    (
        to_cell(position.x, CELL_WIDTH_PX),
        to_cell(position.y, CELL_HEIGHT_PX),
    )
}

/// Overlay colour for a phase.
pub fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Work => WORK_COLOR,
        Phase::Break => BREAK_COLOR,
    }
}

/// Renders `text` as five lines of block digits. Unsupported characters
/// are skipped.
pub fn block_lines(text: &str) -> Vec<String> {
    let glyphs: Vec<_> = text.chars().filter_map(font::glyph).collect();

    (0..GLYPH_HEIGHT)
        .map(|row| {
            glyphs
                .iter()
                .map(|rows| {
                    (0..GLYPH_WIDTH)
                        .map(|col| {
                            if font::is_set(rows, col, row) {
                                BLOCK_ON
                            } else {
                                BLOCK_OFF
                            }
                        })
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DrawnArea {
    col: u16,
    row: u16,
    width: usize,
    height: u16,
}

/// Terminal overlay sink. Hidden until the snapshot says otherwise.
#[derive(Debug)]
pub struct OverlayView<W: Write> {
    out: W,
    drawn: Option<DrawnArea>,
}

impl OverlayView<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> OverlayView<W> {
    pub fn new(out: W) -> Self {
        Self { out, drawn: None }
    }

    /// Returns true if the overlay is currently on screen.
    pub fn is_drawn(&self) -> bool {
        self.drawn.is_some()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn erase(&mut self, area: DrawnArea) -> Result<()> {
        let blank = " ".repeat(area.width);
        queue!(self.out, SavePosition)?;
        for offset in 0..area.height {
            queue!(
                self.out,
                MoveTo(area.col, area.row.saturating_add(offset)),
                Print(&blank)
            )?;
        }
        queue!(self.out, RestorePosition)?;
        Ok(())
    }

    fn draw(&mut self, snapshot: &TimerSnapshot) -> Result<DrawnArea> {
        let header = snapshot.phase_label().to_string();
        let digits = block_lines(&snapshot.clock_text());
        let width = digits
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);

        let (col, row) = cell_for(snapshot.overlay_position);
        let palette = Palette::for_theme(snapshot.dark_theme);
        let color = phase_color(snapshot.phase);

        queue!(
            self.out,
            SavePosition,
            MoveTo(col, row),
            SetBackgroundColor(palette.highlight.into()),
            SetForegroundColor(palette.highlighted_text.into()),
            SetAttribute(Attribute::Bold),
            Print(format!("{:<width$}", header)),
            SetAttribute(Attribute::Reset),
        )?;
        let mut height: u16 = 1;
        for line in &digits {
            queue!(
                self.out,
                MoveTo(col, row.saturating_add(height)),
                SetForegroundColor(color.into()),
                Print(format!("{:<width$}", line)),
                ResetColor,
            )?;
            height += 1;
        }
        queue!(self.out, RestorePosition)?;

        Ok(DrawnArea {
            col,
            row,
            width,
            height,
        })
    }
}

impl<W: Write> View for OverlayView<W> {
    fn render(&mut self, snapshot: &TimerSnapshot) -> Result<()> {
        if !snapshot.overlay_visible {
            if let Some(area) = self.drawn.take() {
                self.erase(area)?;
                self.out.flush()?;
            }
            return Ok(());
        }

        let (col, row) = cell_for(snapshot.overlay_position);
        if let Some(previous) = self.drawn {
            if previous.row != row || previous.col != col {
                self.erase(previous)?;
            }
        }

        let area = self.draw(snapshot)?;
        // A shorter clock ("9:59" after "10:00") leaves stale cells behind
        if let Some(previous) = self.drawn {
            if previous.row == row && previous.col == col && previous.width > area.width {
                self.erase(previous)?;
                self.draw(snapshot)?;
            }
        }
        self.drawn = Some(area);
        self.out.flush()?;
        Ok(())
    }
}
