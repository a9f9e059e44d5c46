//! Terminal rendering
//!
//! A frame is plain text: one line per board row, then the HUD. Frames go
//! to a [`RenderSink`]; the terminal sink draws them with ratatui.

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::game::Game;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;

const FILLED: &str = "[]";
const EMPTY: &str = " .";

pub const GAME_OVER: &str = "GAME OVER!";

/// Where frames are drawn
pub trait RenderSink {
    /// Start a new frame
    fn clear_screen(&mut self) -> io::Result<()>;

    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Show everything written since the last clear
    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Board rows with the falling piece overlaid
pub fn board_lines<R>(game: &Game<R>) -> Vec<String> {
    let mut grid: Vec<[bool; BOARD_WIDTH]> = game.board.rows().copied().collect();

    if let Some(piece) = &game.current_piece {
        for (x, y) in piece.cells() {
            if (0..BOARD_WIDTH as i32).contains(&x) && (0..BOARD_HEIGHT as i32).contains(&y) {
                grid[y as usize][x as usize] = true;
            }
        }
    }

    grid.iter()
        .map(|row| {
            row.iter()
                .map(|&filled| if filled { FILLED } else { EMPTY })
                .collect::<String>()
        })
        .collect()
}

pub fn hud_line<R>(game: &Game<R>) -> String {
    format!(
        "Score: {} | Level: {} | Speed: {}ms",
        game.score.points, game.score.level, game.score.speed_ms
    )
}

/// Draw one frame: board, falling piece and HUD
pub fn render<R, S: RenderSink>(sink: &mut S, game: &Game<R>) -> io::Result<()> {
    sink.clear_screen()?;
    for line in board_lines(game) {
        sink.write_line(&line)?;
    }
    sink.write_line(&hud_line(game))?;
    sink.present()
}

/// Draw the final frame after a blocked spawn
pub fn render_game_over<R, S: RenderSink>(sink: &mut S, game: &Game<R>) -> io::Result<()> {
    sink.clear_screen()?;
    for line in board_lines(game) {
        sink.write_line(&line)?;
    }
    sink.write_line(&hud_line(game))?;
    sink.write_line(GAME_OVER)?;
    sink.present()
}

/// Total width: board (10 * 2) + 2 for borders, wide enough for the HUD
const GAME_WIDTH: u16 = 40;
/// Total height: board(20) + HUD + game over + 2 for borders
const GAME_HEIGHT: u16 = 24;

/// Renders frames through a ratatui terminal
pub struct TerminalSink<B: Backend> {
    terminal: Terminal<B>,
    lines: Vec<String>,
}

impl<B: Backend> TerminalSink<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            lines: Vec::with_capacity(BOARD_HEIGHT + 2),
        }
    }

    #[cfg(test)]
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: Backend> RenderSink for TerminalSink<B> {
    fn clear_screen(&mut self) -> io::Result<()> {
        self.lines.clear();
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        let lines = &self.lines;
        self.terminal.draw(|frame| render_lines(frame, lines))?;
        Ok(())
    }
}

fn render_lines(frame: &mut Frame, lines: &[String]) {
    let area = center_rect(frame.area(), GAME_WIDTH, GAME_HEIGHT);

    let block = Block::default()
        .title(" TERMTRIS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let text: Vec<Line> = lines
        .iter()
        .map(|line| {
            if line == GAME_OVER {
                Line::styled(line.as_str(), Style::default().fg(Color::Yellow))
            } else {
                Line::raw(line.as_str())
            }
        })
        .collect();

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(text), inner);
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
