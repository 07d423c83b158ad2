//! Piece catalog
//!
//! The seven playable shapes, each an occupancy mask written as pattern rows
//! (`'X'` = filled) plus the colour it is drawn in. Shapes never change;
//! pieces refer to them by `&'static` reference.

use crate::rng::Randomizer;
use ratatui::style::Color;

/// An immutable, rectangular occupancy mask with a display colour
#[derive(Debug, PartialEq, Eq)]
pub struct Shape {
    pub name: &'static str,
    pattern: &'static [&'static str],
    pub color: Color,
}

impl Shape {
    /// Ragged or empty patterns fail at compile time for the catalog statics.
    const fn new(name: &'static str, pattern: &'static [&'static str], color: Color) -> Self {
        assert!(!pattern.is_empty(), "shape pattern has no rows");
        let width = pattern[0].len();
        assert!(width > 0, "shape pattern has no columns");
        let mut i = 1;
        while i < pattern.len() {
            assert!(pattern[i].len() == width, "shape pattern rows differ in length");
            i += 1;
        }
        Self {
            name,
            pattern,
            color,
        }
    }

    /// Rows of the unrotated mask
    pub fn rows(&self) -> usize {
        self.pattern.len()
    }

    /// Columns of the unrotated mask
    pub fn cols(&self) -> usize {
        self.pattern[0].len()
    }

    /// Whether the unrotated mask is filled at (row, col)
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.pattern[row].as_bytes()[col] == b'X'
    }

    /// Number of filled cells in the mask
    #[cfg(test)]
    pub fn size(&self) -> usize {
        self.pattern
            .iter()
            .map(|row| row.bytes().filter(|&b| b == b'X').count())
            .sum()
    }
}

pub static SQUARE: Shape = Shape::new("Square", &["XX", "XX"], Color::Red);
pub static BAR: Shape = Shape::new("Bar", &["XXXX"], Color::Green);
pub static LEFT_L: Shape = Shape::new("Left L", &["X  ", "XXX"], Color::Blue);
pub static RIGHT_L: Shape = Shape::new("Right L", &["  X", "XXX"], Color::Rgb(255, 165, 0)); // Orange
pub static Z: Shape = Shape::new("Z", &["XX ", " XX"], Color::Yellow);
pub static REVERSE_Z: Shape = Shape::new("Reverse Z", &[" XX", "XX "], Color::Gray);
pub static TRIANGLE: Shape = Shape::new("Triangle", &[" X ", "XXX"], Color::Magenta);

/// The full catalog, in selection order
pub static CATALOG: [&Shape; 7] = [&SQUARE, &BAR, &LEFT_L, &RIGHT_L, &Z, &REVERSE_Z, &TRIANGLE];

/// Choose a shape uniformly at random from the catalog
pub fn pick(rng: &mut dyn Randomizer) -> &'static Shape {
    CATALOG[rng.pick(CATALOG.len())]
}
