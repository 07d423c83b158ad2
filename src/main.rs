//! FALLGRID - falling blocks in the terminal
//!
//! Pieces drop, rotate, lock and clear full rows.

mod board;
mod game;
mod input;
mod piece;
mod rng;
mod score;
mod settings;
mod tetromino;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::{Game, GameState};
use input::{Command, InputHandler};
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Falling-block puzzle in the terminal.
///
/// Options given here override the settings file for this run.
#[derive(Debug, Parser)]
#[command(name = "fallgrid", version, about)]
struct Args {
    /// Board height in rows
    #[arg(long, value_name = "ROWS")]
    rows: Option<usize>,

    /// Board width in columns
    #[arg(long, value_name = "COLS")]
    cols: Option<usize>,

    /// Frames per second the game is stepped at
    #[arg(long, value_name = "RATE")]
    fps: Option<u32>,

    /// Gravity speed: rows fallen per second
    #[arg(long, value_name = "RATE")]
    lines_per_second: Option<u32>,

    /// Input responsiveness: moves accepted per second while a key is held
    #[arg(long, value_name = "RATE")]
    keys_per_second: Option<u32>,

    /// Seed for the piece sequence (random if not set)
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the landing preview of the falling piece
    #[arg(long)]
    no_ghost: bool,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        let session = &mut settings.session;
        session.rows = self.rows.unwrap_or(session.rows);
        session.cols = self.cols.unwrap_or(session.cols);
        session.fps = self.fps.unwrap_or(session.fps);
        session.lines_per_second = self.lines_per_second.unwrap_or(session.lines_per_second);
        session.keys_per_second = self.keys_per_second.unwrap_or(session.keys_per_second);
        if self.no_ghost {
            settings.visual.show_ghost = false;
        }
    }
}

/// Get the fallgrid temp directory, creating it if needed
fn fallgrid_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("fallgrid");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to log file; the terminal belongs to the UI
    let log_dir = fallgrid_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fallgrid=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    let mut settings = Settings::load();
    args.apply(&mut settings);
    let config = settings
        .session
        .validate()
        .context("invalid session settings")?;

    if args.save_settings {
        if let Err(e) = settings.save() {
            eprintln!("Warning: Could not save settings: {}", e);
        }
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(
        "FALLGRID starting up, session={:08x}, log={}, seed={}, {:?}",
        session_id,
        log_dir.join(&log_file).display(),
        seed,
        config
    );

    let mut game = Game::with_seed(config, seed);
    let mut input = InputHandler::from_settings(&settings);

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run app and capture result
    let result = run_app(&mut terminal, &mut game, &mut input, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    result?;

    tracing::info!("Session ended after {} frames", game.frame());
    let score = game.score();
    println!("\nThanks for playing FALLGRID!");
    println!("Final Score: {} | Lines: {} | Pieces: {}", score.points, score.lines, score.pieces);
    println!("Seed: {}", seed);
    Ok(())
}

/// Frame loop: gather input until the frame deadline, step once, draw
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    input: &mut InputHandler,
    settings: &Settings,
) -> io::Result<()> {
    let frame_duration = Duration::from_secs_f64(1.0 / f64::from(game.config().fps));
    let mut deadline = Instant::now() + frame_duration;

    loop {
        terminal.draw(|frame| ui::render_game(frame, game, settings))?;

        // Handle input until the frame is due
        while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
            if !event::poll(timeout)? {
                break;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                input.key_up(key);
                continue;
            }
            match input.key_down(key, Instant::now()) {
                Some(Command::Quit) => return Ok(()),
                Some(Command::Restart) if game.state() != GameState::Running => {
                    game.restart();
                    input.clear();
                }
                _ => {}
            }
        }

        let now = Instant::now();
        game.step(input.intents(now));

        // Keep the cadence; after a stall start counting from now
        deadline += frame_duration;
        if deadline < now {
            deadline = now + frame_duration;
        }
    }
}
