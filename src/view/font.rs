//! 3×5 bitmap font for digits and the clock colon.
//!
//! Each glyph is five rows; bit 2 is the leftmost column.

/// Glyph width in font pixels.
pub const GLYPH_WIDTH: usize = 3;

/// Glyph height in font pixels.
pub const GLYPH_HEIGHT: usize = 5;

const DIGITS: [[u8; GLYPH_HEIGHT]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const COLON: [u8; GLYPH_HEIGHT] = [0b000, 0b010, 0b000, 0b010, 0b000];

/// Returns the rows of `c`, or `None` for unsupported characters.
pub fn glyph(c: char) -> Option<[u8; GLYPH_HEIGHT]> {
    match c {
        ':' => Some(COLON),
        _ => c.to_digit(10).map(|d| DIGITS[d as usize]),
    }
}

/// Returns true if the pixel at (`col`, `row`) of `rows` is set.
pub fn is_set(rows: &[u8; GLYPH_HEIGHT], col: usize, row: usize) -> bool {
    col < GLYPH_WIDTH && row < GLYPH_HEIGHT && rows[row] & (0b100 >> col) != 0
}
