//! Core game state and the per-frame turn loop

use crate::board::Board;
use crate::piece::Piece;
use crate::rng::{Randomizer, SeededRandomizer};
use crate::score::{self, Score};
use crate::tetromino::{self, Shape};
use tracing::{debug, info};

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    Paused,
    GameOver,
}

/// Player intents, sampled once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    RotateCw,
    SoftDrop,
    HardDrop,
    TogglePause,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::MoveLeft,
        Intent::MoveRight,
        Intent::RotateCw,
        Intent::SoftDrop,
        Intent::HardDrop,
        Intent::TogglePause,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// The set of intents asserted during one frame (level-triggered: "key is down")
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents(u8);

impl Intents {
    pub const NONE: Intents = Intents(0);

    pub fn insert(&mut self, intent: Intent) {
        self.0 |= intent.bit();
    }

    pub fn contains(self, intent: Intent) -> bool {
        self.0 & intent.bit() != 0
    }
}

impl From<Intent> for Intents {
    fn from(intent: Intent) -> Self {
        Intents(intent.bit())
    }
}

impl FromIterator<Intent> for Intents {
    fn from_iter<I: IntoIterator<Item = Intent>>(iter: I) -> Self {
        let mut intents = Intents::NONE;
        for intent in iter {
            intents.insert(intent);
        }
        intents
    }
}

/// Session parameters, fixed for the lifetime of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub rows: usize,
    pub cols: usize,
    /// Frames per second the game is stepped at
    pub fps: u32,
    /// Gravity: rows fallen per second
    pub lines_per_second: u32,
    /// Input: accepted moves per second
    pub keys_per_second: u32,
}

impl SessionConfig {
    /// Frames between gravity ticks
    pub fn gravity_interval(&self) -> u64 {
        u64::from(self.fps / self.lines_per_second.max(1)).max(1)
    }

    /// Minimum frames between two accepted moves
    pub fn input_interval(&self) -> u64 {
        u64::from(self.fps / self.keys_per_second.max(1)).max(1)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 10,
            fps: 60,
            lines_per_second: 2,
            keys_per_second: 10,
        }
    }
}

/// The main game struct
///
/// The current piece is always committed to the board while the game is
/// running, so `board()` alone is enough to draw the playfield.
pub struct Game {
    config: SessionConfig,
    board: Board,
    /// Current falling piece
    current: Piece,
    /// Shape that spawns after the current piece locks
    next: &'static Shape,
    score: Score,
    state: GameState,
    /// Frames stepped while running; frozen while paused
    frame: u64,
    /// Frame of the last accepted move
    last_input_frame: u64,
    /// TogglePause was asserted on the previous frame
    pause_held: bool,
    /// Rows the current piece can still fall
    ghost_offset: usize,
    /// Name of the last clear, for display
    last_action: Option<&'static str>,
    rng: Box<dyn Randomizer>,
}

impl Game {
    /// Create a new game drawing pieces from `rng`
    pub fn new(config: SessionConfig, mut rng: Box<dyn Randomizer>) -> Self {
        let first = tetromino::pick(rng.as_mut());
        let next = tetromino::pick(rng.as_mut());

        let mut game = Self {
            config,
            board: Board::new(config.rows, config.cols),
            current: Piece::spawn(first, config.cols),
            next,
            score: Score::new(),
            state: GameState::Running,
            frame: 0,
            last_input_frame: 0,
            pause_held: false,
            ghost_offset: 0,
            last_action: None,
            rng,
        };
        game.place_spawned();
        game
    }

    /// Create a new game with a reproducible piece sequence
    pub fn with_seed(config: SessionConfig, seed: u64) -> Self {
        Self::new(config, Box::new(SeededRandomizer::new(seed)))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    /// Shape queued for the next spawn (for the preview)
    pub fn next(&self) -> &'static Shape {
        self.next
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Rows the current piece would fall on a hard drop
    pub fn ghost_offset(&self) -> usize {
        self.ghost_offset
    }

    pub fn last_action(&self) -> Option<&'static str> {
        self.last_action
    }

    /// Start a fresh session on the same board size and random source
    pub fn restart(&mut self) {
        let first = tetromino::pick(self.rng.as_mut());
        self.next = tetromino::pick(self.rng.as_mut());
        self.board = Board::new(self.config.rows, self.config.cols);
        self.current = Piece::spawn(first, self.config.cols);
        self.score = Score::new();
        self.state = GameState::Running;
        self.frame = 0;
        self.last_input_frame = 0;
        self.pause_held = false;
        self.last_action = None;
        info!("Game restarted");
        self.place_spawned();
    }

    /// Advance the game by one frame
    pub fn step(&mut self, intents: Intents) {
        let toggle_held = intents.contains(Intent::TogglePause);
        let toggled = toggle_held && !self.pause_held;
        self.pause_held = toggle_held;

        match self.state {
            GameState::GameOver => return,
            GameState::Paused => {
                if toggled {
                    self.state = GameState::Running;
                    info!("Resumed at frame {}", self.frame);
                }
                return;
            }
            GameState::Running => {
                if toggled {
                    self.state = GameState::Paused;
                    info!("Paused at frame {}", self.frame);
                    return;
                }
            }
        }

        self.frame += 1;

        let hard_dropped = self.apply_input(intents);
        if hard_dropped || self.frame % self.config.gravity_interval() == 0 {
            self.gravity_tick();
        }

        if self.state == GameState::Running {
            self.ghost_offset = self.board.drop_distance(&self.current);
        }
    }

    /// Honour at most one movement intent; returns true on a hard drop
    fn apply_input(&mut self, intents: Intents) -> bool {
        if self.frame - self.last_input_frame < self.config.input_interval() {
            return false;
        }

        if intents.contains(Intent::HardDrop) {
            let distance = self.board.drop_distance(&self.current);
            self.shift(distance as i32, 0, 0);
            self.last_input_frame = self.frame;
            return true;
        }

        let (d_row, d_col, d_rot) = if intents.contains(Intent::MoveLeft) {
            (0, -1, 0)
        } else if intents.contains(Intent::MoveRight) {
            (0, 1, 0)
        } else if intents.contains(Intent::RotateCw) {
            (0, 0, 1)
        } else if intents.contains(Intent::SoftDrop) {
            (1, 0, 0)
        } else {
            return false;
        };

        if self.board.can_place(&self.current, d_row, d_col, d_rot) {
            self.shift(d_row, d_col, d_rot);
            self.last_input_frame = self.frame;
        }
        false
    }

    /// Move the committed piece; the move must already be validated
    fn shift(&mut self, d_row: i32, d_col: i32, d_rot: u8) {
        self.board.commit(&self.current, false);
        self.current.translate(d_row, d_col);
        self.current.rotate_by(d_rot);
        let placed = self.board.commit(&self.current, true);
        debug_assert!(placed, "validated move collided");
    }

    fn gravity_tick(&mut self) {
        if self.board.can_place(&self.current, 1, 0, 0) {
            self.shift(1, 0, 0);
        } else {
            self.lock_piece();
        }
    }

    /// Lock the current piece, clear rows and spawn the next one
    fn lock_piece(&mut self) {
        // The footprint is already on the board; it simply stops moving
        let full_rows = self.board.scan_full_rows();
        let awarded = self.score.add_lock(full_rows.len());
        self.board.clear_rows(&full_rows);
        if !full_rows.is_empty() {
            self.last_action = if self.board.is_empty() {
                Some("All Clear")
            } else {
                score::clear_name(full_rows.len())
            };
        }

        debug!(
            "Locked {} at ({}, {}) rotation {}, cleared {:?} for {} points, {} cells left",
            self.current.shape.name,
            self.current.row,
            self.current.col,
            self.current.rotation(),
            full_rows,
            awarded,
            self.board.filled_count()
        );

        let shape = std::mem::replace(&mut self.next, tetromino::pick(self.rng.as_mut()));
        self.current = Piece::spawn(shape, self.config.cols);
        self.place_spawned();
    }

    /// Put the freshly spawned current piece on the board, or end the game
    fn place_spawned(&mut self) {
        if self.board.fits(&self.current, 0, 0, 0) {
            self.board.commit(&self.current, true);
            self.ghost_offset = self.board.drop_distance(&self.current);
        } else {
            self.state = GameState::GameOver;
            info!(
                "Game over: {} points, {} lines, {} pieces",
                self.score.points, self.score.lines, self.score.pieces
            );
        }
    }

    #[cfg(test)]
    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}
