//! Game board representation and collision detection

use crate::piece::Piece;
use ratatui::style::Color;
use std::ops::Deref;

/// A cell on the board - either empty or filled with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// The game board
///
/// The falling piece is committed into the cells like any locked block, so
/// every placement test has to look past the piece's own footprint. That is
/// what [`Board::can_place`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Row-major, row 0 is the top
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "board must have at least one cell");
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        self.checked(row, col).map(|(r, c)| self.cells[r * self.cols + c])
    }

    /// Cells of one row, left to right
    pub fn row(&self, row: usize) -> &[Cell] {
        let start = self.index(row, 0);
        &self.cells[start..start + self.cols]
    }

    #[cfg(test)]
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let i = self.index(row, col);
        self.cells[i] = cell;
    }

    fn checked(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.rows && col < self.cols).then_some((row, col))
    }

    /// Index for a mutation; anything outside the board is a caller bug
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({}, {}) outside {}x{} board",
            row,
            col,
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    /// Whether `piece`, shifted and turned, lands only on empty in-bounds cells.
    ///
    /// Does not look past the piece's own footprint; use this for pieces that
    /// are not committed to the board.
    pub fn fits(&self, piece: &Piece, d_row: i32, d_col: i32, d_rot: u8) -> bool {
        piece.cells(d_rot).all(|(r, c)| {
            let row = piece.row + r as i32 + d_row;
            let col = piece.col + c as i32 + d_col;
            self.get(row, col).is_some_and(|cell| cell.is_empty())
        })
    }

    /// Whether the committed `piece` could be shifted by (d_row, d_col) and
    /// turned `d_rot` quarter turns.
    ///
    /// The piece's footprint is lifted for the duration of the test and put
    /// back before returning, whatever the answer.
    pub fn can_place(&mut self, piece: &Piece, d_row: i32, d_col: i32, d_rot: u8) -> bool {
        let board = Retracted::new(self, piece);
        board.fits(piece, d_row, d_col, d_rot)
    }

    /// How many rows the committed `piece` can fall before it lands
    pub fn drop_distance(&mut self, piece: &Piece) -> usize {
        let board = Retracted::new(self, piece);
        let mut distance = 0;
        while board.fits(piece, distance as i32 + 1, 0, 0) {
            distance += 1;
        }
        distance
    }

    /// Write (`occupied = true`) or erase the footprint of `piece`.
    ///
    /// Writing over a filled cell is refused: nothing changes and `false` is
    /// returned.
    pub fn commit(&mut self, piece: &Piece, occupied: bool) -> bool {
        let indices: Vec<usize> = piece
            .cells(0)
            .map(|(r, c)| self.index(to_index(piece.row, r), to_index(piece.col, c)))
            .collect();

        if occupied && indices.iter().any(|&i| self.cells[i].is_filled()) {
            return false;
        }

        let cell = if occupied {
            Cell::Filled(piece.shape.color)
        } else {
            Cell::Empty
        };
        for i in indices {
            self.cells[i] = cell;
        }
        true
    }

    /// Whether every cell of the piece's footprint is filled
    fn holds(&self, piece: &Piece) -> bool {
        piece
            .positions()
            .all(|(row, col)| self.get(row, col).is_some_and(|cell| cell.is_filled()))
    }

    /// Indices of completely filled rows, top to bottom
    pub fn scan_full_rows(&self) -> Vec<usize> {
        (0..self.rows)
            .filter(|&row| self.row(row).iter().all(Cell::is_filled))
            .collect()
    }

    /// Remove the given rows, in order, shifting everything above each one
    /// down by a row.
    ///
    /// Pass the result of [`Board::scan_full_rows`] as is. Indices refer to
    /// the board as scanned; processing top to bottom keeps them valid.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        for &row in rows {
            let start = self.index(row, 0);
            self.cells.copy_within(0..start, self.cols);
            self.cells[..self.cols].fill(Cell::Empty);
        }
    }

    /// Number of filled cells on the board
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_filled()).count()
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

fn to_index(anchor: i32, offset: usize) -> usize {
    let value = anchor + offset as i32;
    usize::try_from(value).unwrap_or_else(|_| panic!("negative board coordinate {}", value))
}

/// Board with a piece's footprint lifted; the footprint returns on drop
struct Retracted<'a> {
    board: &'a mut Board,
    piece: &'a Piece,
}

impl<'a> Retracted<'a> {
    fn new(board: &'a mut Board, piece: &'a Piece) -> Self {
        debug_assert!(board.holds(piece), "retracting a piece that is not on the board");
        board.commit(piece, false);
        Self { board, piece }
    }
}

impl Deref for Retracted<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Retracted<'_> {
    fn drop(&mut self) {
        let restored = self.board.commit(self.piece, true);
        debug_assert!(restored, "footprint was overwritten while retracted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::{BAR, SQUARE, TRIANGLE};

    fn fill_row(board: &mut Board, row: usize, color: Color) {
        for col in 0..board.cols() {
            board.set(row, col, Cell::Filled(color));
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(20, 10);
        assert!(board.is_empty());
        assert_eq!(board.filled_count(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::new(20, 10);
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(20, 0), None);
        assert_eq!(board.get(0, 10), None);
        assert_eq!(board.get(19, 9), Some(Cell::Empty));
    }

    #[test]
    fn test_can_place_rejects_out_of_bounds() {
        let mut board = Board::new(20, 10);
        let piece = Piece::new(&SQUARE, 0, 0);
        assert!(board.commit(&piece, true));

        assert!(!board.can_place(&piece, -1, 0, 0));
        assert!(!board.can_place(&piece, 0, -1, 0));
        assert!(!board.can_place(&piece, 19, 0, 0));
        assert!(!board.can_place(&piece, 0, 9, 0));
        assert!(board.can_place(&piece, 18, 8, 0));
    }

    #[test]
    fn test_can_place_rejects_rotation_off_board() {
        let mut board = Board::new(20, 10);
        // Horizontal bar in the bottom row: standing it up pokes below the floor
        let piece = Piece::new(&BAR, 19, 0);
        assert!(board.commit(&piece, true));
        assert!(!board.can_place(&piece, 0, 0, 1));
        assert!(board.can_place(&piece, -3, 0, 1));
    }

    #[test]
    fn test_can_place_ignores_own_footprint() {
        let mut board = Board::new(20, 10);
        let piece = Piece::new(&SQUARE, 0, 0);
        assert!(board.commit(&piece, true));
        let before = board.clone();

        // Moving one step overlaps half of the current footprint
        assert!(board.can_place(&piece, 1, 0, 0));
        assert!(board.can_place(&piece, 0, 1, 0));
        assert_eq!(board, before);
    }

    #[test]
    fn test_can_place_blocked_by_other_block() {
        let mut board = Board::new(20, 10);
        board.set(2, 0, Cell::Filled(Color::Red));
        let piece = Piece::new(&SQUARE, 0, 0);
        assert!(board.commit(&piece, true));
        let before = board.clone();

        assert!(!board.can_place(&piece, 1, 0, 0));
        assert_eq!(board, before);
    }

    #[test]
    fn test_fits_does_not_look_past_piece() {
        let mut board = Board::new(20, 10);
        let piece = Piece::new(&SQUARE, 0, 0);
        assert!(board.fits(&piece, 0, 0, 0));
        assert!(board.commit(&piece, true));
        assert!(!board.fits(&piece, 0, 0, 0));
    }

    #[test]
    fn test_commit_then_retract_restores_board() {
        let mut board = Board::new(20, 10);
        board.set(19, 3, Cell::Filled(Color::Blue));
        board.set(5, 7, Cell::Filled(Color::Green));
        let before = board.clone();

        let piece = Piece::new(&TRIANGLE, 10, 4);
        assert!(board.commit(&piece, true));
        assert_eq!(board.filled_count(), before.filled_count() + 4);
        assert!(board.commit(&piece, false));
        assert_eq!(board, before);
    }

    #[test]
    fn test_commit_refuses_overlap() {
        let mut board = Board::new(20, 10);
        board.set(1, 1, Cell::Filled(Color::Blue));
        let before = board.clone();

        let piece = Piece::new(&SQUARE, 0, 0);
        assert!(!board.commit(&piece, true));
        assert_eq!(board, before);
    }

    #[test]
    fn test_commit_uses_shape_color() {
        let mut board = Board::new(20, 10);
        let piece = Piece::new(&SQUARE, 0, 0);
        assert!(board.commit(&piece, true));
        assert_eq!(board.get(1, 1), Some(Cell::Filled(SQUARE.color)));
    }

    #[test]
    #[should_panic]
    fn test_commit_out_of_bounds_panics() {
        let mut board = Board::new(20, 10);
        let piece = Piece::new(&BAR, 0, 8);
        board.commit(&piece, true);
    }

    #[test]
    fn test_drop_distance() {
        let mut board = Board::new(20, 10);
        board.set(15, 4, Cell::Filled(Color::Red));
        let piece = Piece::new(&SQUARE, 0, 4);
        assert!(board.commit(&piece, true));
        // Square bottom row is 1, blocked at 15
        assert_eq!(board.drop_distance(&piece), 13);
        assert_eq!(board.filled_count(), 5);
    }

    #[test]
    fn test_scan_full_rows_empty_board() {
        let board = Board::new(20, 10);
        assert!(board.scan_full_rows().is_empty());
    }

    #[test]
    fn test_scan_full_rows_finds_single_row() {
        let mut board = Board::new(6, 4);
        for row in 0..6 {
            board.set(row, 0, Cell::Filled(Color::Gray));
        }
        fill_row(&mut board, 3, Color::Red);
        assert_eq!(board.scan_full_rows(), vec![3]);
    }

    #[test]
    fn test_scan_full_rows_ascending() {
        let mut board = Board::new(6, 4);
        fill_row(&mut board, 5, Color::Red);
        fill_row(&mut board, 1, Color::Red);
        fill_row(&mut board, 2, Color::Red);
        assert_eq!(board.scan_full_rows(), vec![1, 2, 5]);
    }

    #[test]
    fn test_clear_rows_uses_scanned_indices() {
        // Rows [A, B, C, D] with B and D full become [empty, empty, A, C]
        let mut board = Board::new(4, 3);
        board.set(0, 0, Cell::Filled(Color::Red)); // A
        fill_row(&mut board, 1, Color::Blue); // B
        board.set(2, 2, Cell::Filled(Color::Green)); // C
        board.set(2, 1, Cell::Filled(Color::Green));
        fill_row(&mut board, 3, Color::Yellow); // D

        let row_a = board.row(0).to_vec();
        let row_c = board.row(2).to_vec();

        let full = board.scan_full_rows();
        assert_eq!(full, vec![1, 3]);
        board.clear_rows(&full);

        assert!(board.row(0).iter().all(Cell::is_empty));
        assert!(board.row(1).iter().all(Cell::is_empty));
        assert_eq!(board.row(2), row_a.as_slice());
        assert_eq!(board.row(3), row_c.as_slice());
    }

    #[test]
    fn test_clear_adjacent_rows() {
        let mut board = Board::new(5, 3);
        board.set(2, 1, Cell::Filled(Color::Red));
        fill_row(&mut board, 3, Color::Blue);
        fill_row(&mut board, 4, Color::Blue);

        let full = board.scan_full_rows();
        board.clear_rows(&full);

        assert_eq!(board.filled_count(), 1);
        assert_eq!(board.get(4, 1), Some(Cell::Filled(Color::Red)));
    }

    #[test]
    fn test_clear_top_row() {
        let mut board = Board::new(3, 3);
        fill_row(&mut board, 0, Color::Blue);
        board.set(2, 0, Cell::Filled(Color::Red));
        board.clear_rows(&[0]);
        assert_eq!(board.filled_count(), 1);
        assert_eq!(board.get(2, 0), Some(Cell::Filled(Color::Red)));
    }
}
