//! Active falling piece
//!
//! A piece never rotates its shape data. It keeps a quarter-turn count and
//! remaps coordinates on every query, so the four rotations stay exact
//! inverses of each other.

use crate::tetromino::Shape;

/// The piece currently under player control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Shape this piece was spawned from
    pub shape: &'static Shape,
    /// Top-left corner of the bounding box on the board
    /// Row 0 is the top row, rows increase downward
    pub row: i32,
    pub col: i32,
    /// Clockwise quarter turns, always in 0..4
    rotation: u8,
}

impl Piece {
    pub fn new(shape: &'static Shape, row: i32, col: i32) -> Self {
        Self {
            shape,
            row,
            col,
            rotation: 0,
        }
    }

    /// A fresh piece on the top row, horizontally centred on a board `board_cols` wide
    pub fn spawn(shape: &'static Shape, board_cols: usize) -> Self {
        let col = board_cols.saturating_sub(shape.cols()) / 2;
        Self::new(shape, 0, col as i32)
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    fn rotation_with(&self, extra: u8) -> u8 {
        (self.rotation + extra % 4) % 4
    }

    /// Size of the bounding box after `extra` more clockwise quarter turns
    pub fn bounding_box(&self, extra: u8) -> (usize, usize) {
        let (rows, cols) = (self.shape.rows(), self.shape.cols());
        if self.rotation_with(extra) % 2 == 0 {
            (rows, cols)
        } else {
            (cols, rows)
        }
    }

    /// Whether the piece, turned `extra` more quarter turns clockwise, fills
    /// local cell (row, col) of its rotated bounding box
    pub fn occupied_at(&self, row: usize, col: usize, extra: u8) -> bool {
        let (rows, cols) = self.bounding_box(extra);
        if row >= rows || col >= cols {
            return false;
        }
        let max_row = rows - 1;
        let max_col = cols - 1;

        let (native_row, native_col) = match self.rotation_with(extra) {
            0 => (row, col),
            1 => (max_col - col, row),
            2 => (max_row - row, max_col - col),
            _ => (col, max_row - row),
        };
        self.shape.is_filled(native_row, native_col)
    }

    /// Local (row, col) of every filled cell after `extra` more quarter turns
    pub fn cells(&self, extra: u8) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (rows, cols) = self.bounding_box(extra);
        (0..rows)
            .flat_map(move |r| (0..cols).map(move |c| (r, c)))
            .filter(move |&(r, c)| self.occupied_at(r, c, extra))
    }

    /// Board coordinates of every filled cell at the current position and rotation
    pub fn positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells(0)
            .map(|(r, c)| (self.row + r as i32, self.col + c as i32))
    }

    pub fn translate(&mut self, d_row: i32, d_col: i32) {
        self.row += d_row;
        self.col += d_col;
    }

    pub fn rotate_by(&mut self, quarter_turns: u8) {
        self.rotation = self.rotation_with(quarter_turns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::{BAR, CATALOG, LEFT_L, SQUARE, TRIANGLE};

    fn render(piece: &Piece, extra: u8) -> Vec<String> {
        let (rows, cols) = piece.bounding_box(extra);
        (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| if piece.occupied_at(r, c, extra) { 'X' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_spawn_centres_piece() {
        assert_eq!(Piece::spawn(&SQUARE, 10).col, 4);
        assert_eq!(Piece::spawn(&BAR, 10).col, 3);
        assert_eq!(Piece::spawn(&TRIANGLE, 10).row, 0);
    }

    #[test]
    fn test_bounding_box_swaps_on_odd_rotation() {
        let piece = Piece::new(&BAR, 0, 0);
        assert_eq!(piece.bounding_box(0), (1, 4));
        assert_eq!(piece.bounding_box(1), (4, 1));
        assert_eq!(piece.bounding_box(2), (1, 4));
        assert_eq!(piece.bounding_box(3), (4, 1));
    }

    #[test]
    fn test_left_l_rotates_clockwise() {
        let piece = Piece::new(&LEFT_L, 0, 0);
        assert_eq!(render(&piece, 0), ["X..", "XXX"]);
        assert_eq!(render(&piece, 1), ["XX", "X.", "X."]);
        assert_eq!(render(&piece, 2), ["XXX", "..X"]);
        assert_eq!(render(&piece, 3), [".X", ".X", "XX"]);
    }

    #[test]
    fn test_triangle_points_right_after_one_turn() {
        let piece = Piece::new(&TRIANGLE, 0, 0);
        assert_eq!(render(&piece, 1), ["X.", "XX", "X."]);
    }

    #[test]
    fn test_quarter_turn_moves_native_cell() {
        // native (r, c) lands at (c, rows - 1 - r) after one clockwise turn
        for shape in CATALOG {
            let piece = Piece::new(shape, 0, 0);
            let max_row = shape.rows() - 1;
            for r in 0..shape.rows() {
                for c in 0..shape.cols() {
                    assert_eq!(
                        piece.occupied_at(c, max_row - r, 1),
                        shape.is_filled(r, c),
                        "{} at ({}, {})",
                        shape.name,
                        r,
                        c
                    );
                }
            }
        }
    }

    #[test]
    fn test_four_turns_are_identity() {
        for shape in CATALOG {
            for start in 0..4 {
                let mut piece = Piece::new(shape, 0, 0);
                piece.rotate_by(start);
                let before = render(&piece, 0);
                for _ in 0..4 {
                    piece.rotate_by(1);
                }
                assert_eq!(piece.rotation(), start);
                assert_eq!(render(&piece, 0), before);
                assert_eq!(render(&piece, 4), before);
            }
        }
    }

    #[test]
    fn test_rotation_normalised_on_mutation() {
        let mut piece = Piece::new(&TRIANGLE, 0, 0);
        for _ in 0..11 {
            piece.rotate_by(1);
        }
        assert_eq!(piece.rotation(), 3);
        piece.rotate_by(255);
        assert_eq!(piece.rotation(), 2);
    }

    #[test]
    fn test_cells_and_positions() {
        let piece = Piece::new(&SQUARE, 5, 2);
        assert_eq!(piece.cells(0).count(), 4);
        let positions: Vec<_> = piece.positions().collect();
        assert_eq!(positions, [(5, 2), (5, 3), (6, 2), (6, 3)]);
    }

    #[test]
    fn test_outside_box_is_empty() {
        let piece = Piece::new(&BAR, 0, 0);
        assert!(!piece.occupied_at(1, 0, 0));
        assert!(!piece.occupied_at(0, 4, 0));
    }
}
