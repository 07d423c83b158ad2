//! Terminal UI rendering with ratatui

use crate::board::Cell;
use crate::game::{Game, GameState};
use crate::settings::Settings;
use crate::tetromino::Shape;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Width of the next piece + stats column
const SIDE_WIDTH: u16 = 16;
/// Height of the next piece box: two pattern rows, padding and borders
const NEXT_HEIGHT: u16 = 6;

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    let board = game.board();
    let board_width = board.cols() as u16 * 2 + 2;
    let board_height = board.rows() as u16 + 2;

    // Center the game area
    let game_area = center_rect(area, board_width + SIDE_WIDTH, board_height);

    // Create main layout: board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Length(SIDE_WIDTH)])
        .split(game_area);

    render_board(frame, main_layout[0], game, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(NEXT_HEIGHT), Constraint::Min(8)])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], game.next(), block_char);
    render_stats(frame, right_layout[1], game);

    // Overlays
    match game.state() {
        GameState::Paused => render_overlay(frame, area, "PAUSED", "Press P to resume"),
        GameState::GameOver => render_overlay(frame, area, "GAME OVER", "R restart  Q quit"),
        GameState::Running => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the queued shape, unrotated
fn render_next(frame: &mut Frame, area: Rect, shape: &Shape, block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::raw("")];
    for row in 0..shape.rows() {
        let spans: Vec<Span> = (0..shape.cols())
            .map(|col| {
                if shape.is_filled(row, col) {
                    Span::styled(block_char, Style::default().fg(shape.color))
                } else {
                    Span::raw(EMPTY)
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();
    let board = game.board();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Landing spot of the current piece; empty when it already rests there
    let piece = game.current();
    let ghost: Vec<(i32, i32)> = if settings.visual.show_ghost
        && game.state() == GameState::Running
        && game.ghost_offset() > 0
    {
        let offset = game.ghost_offset() as i32;
        piece.positions().map(|(r, c)| (r + offset, c)).collect()
    } else {
        Vec::new()
    };

    let mut lines: Vec<Line> = Vec::with_capacity(board.rows());
    for row in 0..board.rows() as i32 {
        let spans: Vec<Span> = (0..board.cols() as i32)
            .map(|col| match board.get(row, col) {
                Some(Cell::Filled(color)) => Span::styled(block_char, Style::default().fg(color)),
                _ if ghost.contains(&(row, col)) => {
                    Span::styled(ghost_char, Style::default().fg(piece.shape.color).dim())
                }
                _ => Span::raw(EMPTY),
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let score = game.score();
    let mut lines = vec![
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", score.points),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("LINES", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", score.lines),
            Style::default().fg(Color::Green),
        )),
    ];

    // Show last action if any
    if let Some(action) = game.last_action() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(action, Style::default().fg(Color::Magenta).bold()));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 24u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
