//! Tray icon bitmap and tooltip generation.
//!
//! The icon is an 80×32 RGBA bitmap:
//! - a filled disc (diameter 28, x = 2, vertically centred) in the tray track
//!   colour
//! - a 3 px progress ring inset 2 px, swept clockwise from 12 o'clock by
//!   `360° × progress / 100`, in the tray ink colour
//! - the remaining whole minutes in a 3×5 font scaled ×4, centred right of
//!   the disc
//!
//! Everything here is platform-independent and fully testable.

use crate::types::{Phase, TimerSnapshot};
use crate::view::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::view::{Color, Palette};

// ============================================================================
// Constants
// ============================================================================

/// Bitmap width in pixels
pub const ICON_WIDTH: u32 = 80;

/// Bitmap height in pixels
pub const ICON_HEIGHT: u32 = 32;

const DISC_DIAMETER: u32 = 28;
const DISC_X: u32 = 2;
const RING_INSET: f32 = 2.0;
const RING_WIDTH: f32 = 3.0;
const DIGIT_SCALE: u32 = 4;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

// ============================================================================
// TrayBitmap
// ============================================================================

/// A tightly packed RGBA bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayBitmap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TrayBitmap {
    /// Creates a fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel at (`x`, `y`), transparent when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return TRANSPARENT;
        }
        let i = ((y * self.width + x) * 4) as usize;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    /// Sets a pixel; out-of-bounds writes are clipped.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba[i..i + 4].copy_from_slice(&color);
    }

    /// Returns the raw RGBA bytes.
    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Clockwise angle from 12 o'clock, in degrees within `[0, 360)`.
fn clockwise_angle(dx: f32, dy: f32) -> f32 {
    let degrees = dx.atan2(-dy).to_degrees();
    if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// Renders the progress icon for `progress` percent and `minutes` remaining.
pub fn render_icon(progress: u32, minutes: u32, track: Color, ink: Color) -> TrayBitmap {
    let mut bitmap = TrayBitmap::new(ICON_WIDTH, ICON_HEIGHT);

    let radius = DISC_DIAMETER as f32 / 2.0;
    let cx = DISC_X as f32 + radius;
    let cy = ICON_HEIGHT as f32 / 2.0;
    let ring_outer = radius - RING_INSET;
    let ring_inner = ring_outer - RING_WIDTH;
    let sweep = (progress.min(100) * 360 / 100) as f32;

    let disc_top = (ICON_HEIGHT - DISC_DIAMETER) / 2;
    for y in disc_top..disc_top + DISC_DIAMETER {
        for x in DISC_X..DISC_X + DISC_DIAMETER {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance > radius {
                continue;
            }

            let on_arc = distance >= ring_inner
                && distance <= ring_outer
                && clockwise_angle(dx, dy) < sweep;
            let color = if on_arc { ink } else { track };
            bitmap.set_pixel(x, y, color.to_rgba());
        }
    }

    draw_digits(&mut bitmap, &minutes.to_string(), ink);
    bitmap
}

fn draw_digits(bitmap: &mut TrayBitmap, text: &str, ink: Color) {
    let glyphs: Vec<_> = text.chars().filter_map(font::glyph).collect();
    if glyphs.is_empty() {
        return;
    }

    let glyph_w = GLYPH_WIDTH as u32 * DIGIT_SCALE;
    let glyph_h = GLYPH_HEIGHT as u32 * DIGIT_SCALE;
    let gap = DIGIT_SCALE;
    let text_w = glyphs.len() as u32 * glyph_w + (glyphs.len() as u32 - 1) * gap;

    let area_x = DISC_X + DISC_DIAMETER;
    let area_w = ICON_WIDTH - area_x;
    let x0 = area_x + area_w.saturating_sub(text_w) / 2;
    let y0 = (ICON_HEIGHT - glyph_h) / 2;

    for (index, rows) in glyphs.iter().enumerate() {
        let gx = x0 + index as u32 * (glyph_w + gap);
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !font::is_set(rows, col, row) {
                    continue;
                }
                for sy in 0..DIGIT_SCALE {
                    for sx in 0..DIGIT_SCALE {
                        bitmap.set_pixel(
                            gx + col as u32 * DIGIT_SCALE + sx,
                            y0 + row as u32 * DIGIT_SCALE + sy,
                            ink.to_rgba(),
                        );
                    }
                }
            }
        }
    }
}

/// Tooltip text, e.g. `Pomodoro - Work: 24 min`.
pub fn tooltip(snapshot: &TimerSnapshot) -> String {
    format!(
        "Pomodoro - {}: {} min",
        snapshot.phase_label(),
        snapshot.remaining_minutes()
    )
}

// ============================================================================
// IconManager
// ============================================================================

/// Produces tray bitmaps and texts from snapshots.
#[derive(Debug, Default)]
pub struct IconManager {
    /// Last rendered (phase, progress, minutes, dark) key
    last_key: Option<(Phase, u32, u32, bool)>,
}

impl IconManager {
    pub fn new() -> Self {
        Self { last_key: None }
    }

    /// Renders the icon for a snapshot using its palette.
    pub fn render(&self, snapshot: &TimerSnapshot) -> TrayBitmap {
        let palette = Palette::for_theme(snapshot.dark_theme);
        render_icon(
            snapshot.progress(),
            snapshot.remaining_minutes(),
            palette.tray_track,
            palette.tray_ink,
        )
    }

    /// Returns the short title shown next to the icon, e.g. `24:59`.
    pub fn generate_title(&self, snapshot: &TimerSnapshot) -> String {
        snapshot.clock_text()
    }

    /// Returns true if the bitmap would differ from the last one rendered.
    ///
    /// Only the arc, the minutes and the palette affect the bitmap, so most
    /// ticks can skip the redraw.
    pub fn needs_redraw(&mut self, snapshot: &TimerSnapshot) -> bool {
        let key = (
            snapshot.phase,
            snapshot.progress(),
            snapshot.remaining_minutes(),
            snapshot.dark_theme,
        );
        let changed = self.last_key != Some(key);
        if changed {
            self.last_key = Some(key);
        }
        changed
    }
}

// ============================================================================
// Tests
// ============================================================================
