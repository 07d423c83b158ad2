//! Scoring
//!
//! A lock that clears `n` rows is worth `n² × 10` points, so clearing several
//! rows with one piece pays more than clearing them one at a time.

/// Points for a single lock clearing `rows` rows
pub fn clear_points(rows: usize) -> u64 {
    let rows = rows as u64;
    rows * rows * 10
}

/// Display name for a lock clearing `rows` rows
pub fn clear_name(rows: usize) -> Option<&'static str> {
    match rows {
        0 => None,
        1 => Some("Single"),
        2 => Some("Double"),
        3 => Some("Triple"),
        _ => Some("Quad"),
    }
}

/// Running totals for a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
    /// Pieces locked so far
    pub pieces: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one locked piece that cleared `rows` rows
    /// Returns the points awarded
    pub fn add_lock(&mut self, rows: usize) -> u64 {
        let awarded = clear_points(rows);
        self.points += awarded;
        self.lines += rows as u32;
        self.pieces += 1;
        awarded
    }
}
