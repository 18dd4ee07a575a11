//! Light and dark colour palettes.

use crossterm::style;

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the colour as RGBA bytes with full opacity.
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xff]
    }
}

impl From<Color> for style::Color {
    fn from(color: Color) -> Self {
        style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

/// Overlay colour during Work.
pub const WORK_COLOR: Color = Color::rgb(255, 100, 100);

/// Overlay colour during Break.
pub const BREAK_COLOR: Color = Color::rgb(100, 255, 100);

/// Colour roles used by the sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Label line background
    pub window: Color,
    /// Label line text
    pub window_text: Color,
    /// Overlay header background
    pub highlight: Color,
    /// Overlay header text
    pub highlighted_text: Color,
    /// Background disc of the tray progress icon
    pub tray_track: Color,
    /// Progress arc and digits of the tray icon
    pub tray_ink: Color,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        window: Color::rgb(240, 240, 240),
        window_text: Color::rgb(0, 0, 0),
        highlight: Color::rgb(48, 140, 198),
        highlighted_text: Color::rgb(255, 255, 255),
        tray_track: Color::rgb(192, 192, 192),
        tray_ink: Color::rgb(0, 0, 0),
    };

    pub const DARK: Palette = Palette {
        window: Color::rgb(43, 43, 43),
        window_text: Color::rgb(255, 255, 255),
        highlight: Color::rgb(110, 110, 110),
        highlighted_text: Color::rgb(255, 255, 255),
        tray_track: Color::rgb(128, 128, 128),
        tray_ink: Color::rgb(255, 255, 255),
    };

    /// Returns the dark palette when `dark` is set, the light one otherwise.
    pub fn for_theme(dark: bool) -> &'static Palette {
        if dark {
            &Self::DARK
        } else {
            &Self::LIGHT
        }
    }
}
