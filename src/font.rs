//! Tiny 5x7 bitmap font used to rasterize text sources.
//!
//! Glyphs are scaled up to the requested font size, so text renders as
//! blocky letters. Lowercase input is drawn with the uppercase glyphs.

use glam::Vec2;

use crate::surface::TextPlacement;

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
/// Horizontal advance in font pixels, including one column of spacing.
const ADVANCE: usize = GLYPH_WIDTH + 1;

fn glyph(c: char) -> [u8; GLYPH_HEIGHT] {
    match c.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => [0; GLYPH_HEIGHT],
    }
}

/// Text laid out on a canvas: maps canvas pixels back to glyph bits.
#[derive(Debug, Clone)]
pub struct TextLayout {
    glyphs: Vec<[u8; GLYPH_HEIGHT]>,
    origin: Vec2,
    /// Canvas pixels per font pixel, per axis.
    scale: Vec2,
}

impl TextLayout {
    /// Lay out `text` centered on `placement.center`.
    ///
    /// The glyph height equals the font size; the width is compressed when
    /// the natural width would exceed `placement.max_width`.
    pub fn new(text: &str, placement: &TextPlacement) -> Self {
        let glyphs: Vec<_> = text.chars().map(glyph).collect();

        let scale_y = (placement.font_size / GLYPH_HEIGHT as f32).max(0.0);
        let columns = Self::columns_for(glyphs.len()) as f32;
        let natural_width = columns * scale_y;
        let scale_x = if natural_width > placement.max_width && columns > 0.0 {
            placement.max_width.max(0.0) / columns
        } else {
            scale_y
        };

        let scale = Vec2::new(scale_x, scale_y);
        let extent = Vec2::new(columns, GLYPH_HEIGHT as f32) * scale;

        Self {
            glyphs,
            origin: placement.center - extent / 2.0,
            scale,
        }
    }

    fn columns_for(count: usize) -> usize {
        // No trailing spacing after the last glyph
        (count * ADVANCE).saturating_sub(1)
    }

    /// Top-left corner and size of the text block in canvas pixels.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let columns = Self::columns_for(self.glyphs.len()) as f32;
        (
            self.origin,
            Vec2::new(columns, GLYPH_HEIGHT as f32) * self.scale,
        )
    }

    /// Whether the canvas pixel whose center is `point` is inked.
    pub fn covers(&self, point: Vec2) -> bool {
        if self.scale.x <= 0.0 || self.scale.y <= 0.0 {
            return false;
        }
        let local = (point - self.origin) / self.scale;
        if local.x < 0.0 || local.y < 0.0 {
            return false;
        }
        let column = local.x as usize;
        let row = local.y as usize;
        if row >= GLYPH_HEIGHT {
            return false;
        }

        let glyph_index = column / ADVANCE;
        let bit = column % ADVANCE;
        if bit >= GLYPH_WIDTH {
            return false;
        }
        self.glyphs
            .get(glyph_index)
            .is_some_and(|g| (g[row] >> (GLYPH_WIDTH - 1 - bit)) & 1 == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(font_size: f32, max_width: f32) -> TextPlacement {
        TextPlacement {
            center: Vec2::new(100.0, 50.0),
            font_size,
            max_width,
        }
    }

    #[test]
    fn test_layout_is_centered() {
        let layout = TextLayout::new("HI", &placement(70.0, 1000.0));
        let (origin, size) = layout.bounds();
        // 11 font columns at 10px each, 7 rows at 10px each
        assert_eq!(size, Vec2::new(110.0, 70.0));
        assert_eq!(origin + size / 2.0, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_layout_compresses_to_max_width() {
        let layout = TextLayout::new("HI", &placement(70.0, 55.0));
        let (_, size) = layout.bounds();
        assert!((size.x - 55.0).abs() < 1e-4);
        assert_eq!(size.y, 70.0);
    }

    #[test]
    fn test_covers_follows_glyph_bits() {
        let layout = TextLayout::new("I", &placement(7.0, 1000.0));
        let (origin, _) = layout.bounds();
        let at = |col: f32, row: f32| layout.covers(origin + Vec2::new(col + 0.5, row + 0.5));

        // 'I' top row is 0b01110
        assert!(!at(0.0, 0.0));
        assert!(at(1.0, 0.0));
        assert!(at(3.0, 0.0));
        assert!(!at(4.0, 0.0));
        // Stem
        assert!(at(2.0, 3.0));
        assert!(!at(0.0, 3.0));
        // Outside the block
        assert!(!at(2.0, 7.0));
        assert!(!at(-1.0, 3.0));
    }

    #[test]
    fn test_lowercase_uses_uppercase_glyphs() {
        assert_eq!(glyph('q'), glyph('Q'));
        assert_eq!(glyph(' '), [0; GLYPH_HEIGHT]);
    }
}
