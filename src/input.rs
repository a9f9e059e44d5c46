//! Keyboard input
//!
//! Keys arrive one character at a time from an [`InputSource`] and map to
//! exactly one [`Command`] through [`KeyBindings`]. The terminal source reads
//! crossterm events in raw mode, so keystrokes arrive unbuffered and unechoed.

use crate::settings::Settings;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;

/// What raw mode delivers for Ctrl+C. Always quits, whatever the bindings say.
pub const CTRL_C: char = '\u{3}';

/// Player commands, one per key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    /// Hold for fast gravity
    SoftDrop,
    Quit,
}

/// A non-blocking source of single keystrokes
pub trait InputSource {
    /// Wait at most `timeout` for a pending key
    fn has_pending_key(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Consume exactly one pending event. `None` when it was not a character key.
    fn read_key(&mut self) -> io::Result<Option<char>>;
}

/// Key bindings - supports multiple keys per command
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<char>,
    pub move_right: Vec<char>,
    pub rotate: Vec<char>,
    pub soft_drop: Vec<char>,
    pub quit: Vec<char>,
}

impl KeyBindings {
    /// Parse a key string into a character. Only single characters and
    /// "space" can be delivered by the input source.
    fn parse_key(s: &str) -> Option<char> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ if s.eq_ignore_ascii_case("space") => Some(' '),
            _ => None,
        }
    }

    /// Parse a list of key strings, dropping the ones we cannot deliver
    fn parse_keys(keys: &[String]) -> Vec<char> {
        keys.iter()
            .filter_map(|s| {
                let key = Self::parse_key(s);
                if key.is_none() {
                    tracing::warn!("Ignoring unusable key binding {:?}", s);
                }
                key
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            rotate: Self::parse_keys(&settings.keys.rotate),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }

    /// The command bound to `key`, if any. Bindings are checked in a fixed
    /// order so a key bound twice always resolves the same way.
    pub fn command_for(&self, key: char) -> Option<Command> {
        if key == CTRL_C || self.quit.contains(&key) {
            Some(Command::Quit)
        } else if self.move_left.contains(&key) {
            Some(Command::MoveLeft)
        } else if self.move_right.contains(&key) {
            Some(Command::MoveRight)
        } else if self.rotate.contains(&key) {
            Some(Command::Rotate)
        } else if self.soft_drop.contains(&key) {
            Some(Command::SoftDrop)
        } else {
            None
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Keystrokes from the terminal via crossterm
///
/// The terminal must already be in raw mode.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        Self
    }
}

impl InputSource for TerminalInput {
    fn has_pending_key(&mut self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    fn read_key(&mut self) -> io::Result<Option<char>> {
        Ok(match event::read()? {
            Event::Key(key) => key_to_char(key),
            _ => None,
        })
    }
}

/// Translate a key press into the character a raw terminal would deliver
fn key_to_char(key: KeyEvent) -> Option<char> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(CTRL_C),
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}
