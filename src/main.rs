//! TERMTRIS - falling blocks in the terminal
//!
//! Keys: a/d move, w rotate, hold s to drop faster, q quits.

mod board;
mod game;
mod input;
mod piece;
mod scheduler;
mod score;
mod settings;
mod tetromino;
mod ui;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::Game;
use input::{KeyBindings, TerminalInput};
use ratatui::{backend::CrosstermBackend, Terminal};
use scheduler::{Outcome, SystemClock};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::Instant,
};
use tracing_subscriber::EnvFilter;
use ui::TerminalSink;

/// Get the termtris temp directory, creating it if needed
fn termtris_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("termtris");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = termtris_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Log to a file so nothing interleaves with the board
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termtris=debug")),
        )
        .with_ansi(false)
        .init();

    let seed: u64 = rand::random();
    tracing::info!(
        "TERMTRIS starting up, session={:08x}, seed={}, log={}",
        session_id,
        seed,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    let keys = KeyBindings::from_settings(&settings);

    // Setup terminal
    enable_raw_mode()?;
    if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    let mut game = Game::with_seed(seed, Instant::now());
    let result = Terminal::new(CrosstermBackend::new(stdout())).and_then(|mut terminal| {
        terminal.clear()?;
        let mut sink = TerminalSink::new(terminal);
        scheduler::run(
            &mut game,
            &mut TerminalInput::new(),
            &mut sink,
            &mut SystemClock,
            &keys,
            &settings.timing,
        )
    });

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    match &result {
        Ok(outcome) => {
            if *outcome == Outcome::GameOver {
                println!("{}", ui::GAME_OVER);
            }
            println!("Final Score: {}", game.score.points);
            println!("Level: {} | Lines: {}", game.score.level, game.score.lines);
        }
        Err(e) => tracing::error!("Terminal error: {}", e),
    }

    result.map(|_| ())
}
