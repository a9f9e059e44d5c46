//! The real-time loop
//!
//! One pass renders, reads at most one key, applies it, then checks gravity
//! and sleeps. Everything runs on the calling thread.

use crate::game::Game;
use crate::input::{Command, InputSource, KeyBindings};
use crate::settings::TimingSettings;
use crate::ui::{self, RenderSink};
use rand::Rng;
use std::io;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// How long the final frame stays up before the loop returns
pub const GAME_OVER_HOLD: Duration = Duration::from_secs(2);

/// Time as seen by the loop
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// How the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The player pressed quit
    Quit,
    /// A new piece could not be placed
    GameOver,
}

/// Run `game` until the player quits or the stack reaches the top
pub fn run<R, I, S, C>(
    game: &mut Game<R>,
    input: &mut I,
    sink: &mut S,
    clock: &mut C,
    keys: &KeyBindings,
    timing: &TimingSettings,
) -> io::Result<Outcome>
where
    R: Rng,
    I: InputSource,
    S: RenderSink,
    C: Clock,
{
    game.start(clock.now());

    loop {
        if game.is_over() {
            ui::render_game_over(sink, game)?;
            clock.sleep(GAME_OVER_HOLD);
            return Ok(Outcome::GameOver);
        }

        ui::render(sink, game)?;

        if input.has_pending_key(timing.input_timeout())? {
            match input.read_key()?.and_then(|key| keys.command_for(key)) {
                Some(Command::Quit) => {
                    info!("Quit with score {}", game.score.points);
                    return Ok(Outcome::Quit);
                }
                Some(command) => {
                    debug!("Command {:?}", command);
                    game.process_command(command);
                }
                None => trace!("Ignoring key"),
            }
        } else {
            game.release_soft_drop();
        }

        game.update(clock.now());

        clock.sleep(timing.poll_interval());
    }
}
