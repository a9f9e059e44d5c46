//! Core game state and logic

use crate::board::Board;
use crate::input::Command;
use crate::piece::{try_apply, Piece, Transform};
use crate::score::Score;
use crate::tetromino::TetrominoType;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Gravity period while soft drop is held
pub const SOFT_DROP_INTERVAL: Duration = Duration::from_millis(50);

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Waiting for the next piece to be placed
    Spawning,
    /// A piece is falling and accepts input
    Active,
    /// A fresh piece could not be placed
    GameOver,
}

/// The main game struct
pub struct Game<R = ChaCha8Rng> {
    /// The game board
    pub board: Board,
    /// Current falling piece
    pub current_piece: Option<Piece>,
    /// Score tracking
    pub score: Score,
    /// Current game state
    pub state: GameState,
    /// Soft drop held this pass
    fast_drop: bool,
    /// Last gravity tick
    last_fall: Instant,
    /// Source for piece selection
    rng: R,
}

impl Game<ChaCha8Rng> {
    /// Create a new game whose piece sequence is fixed by `seed`
    pub fn with_seed(seed: u64, now: Instant) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed), now)
    }
}

impl<R: Rng> Game<R> {
    /// Create a new game drawing pieces from `rng`. Call [`Game::start`] to spawn.
    pub fn new(rng: R, now: Instant) -> Self {
        Self {
            board: Board::new(),
            current_piece: None,
            score: Score::new(),
            state: GameState::Spawning,
            fast_drop: false,
            last_fall: now,
            rng,
        }
    }

    /// Spawn the first piece and start the gravity clock
    pub fn start(&mut self, now: Instant) {
        self.last_fall = now;
        self.spawn_next();
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    #[allow(dead_code)]
    pub fn is_fast_drop(&self) -> bool {
        self.fast_drop
    }

    /// Process a player command. Quit is left to the scheduler.
    pub fn process_command(&mut self, command: Command) {
        if self.state != GameState::Active {
            return;
        }
        match command {
            Command::MoveLeft => self.try_transform(Transform::MoveLeft),
            Command::MoveRight => self.try_transform(Transform::MoveRight),
            Command::Rotate => self.try_transform(Transform::Rotate),
            Command::SoftDrop => self.fast_drop = true,
            Command::Quit => {}
        }
    }

    /// No key this pass counts as the soft drop key being released
    pub fn release_soft_drop(&mut self) {
        self.fast_drop = false;
    }

    /// Gravity period in effect right now
    pub fn fall_interval(&self) -> Duration {
        if self.fast_drop {
            SOFT_DROP_INTERVAL
        } else {
            self.score.fall_interval()
        }
    }

    /// Apply gravity if a full period has passed since the last tick
    pub fn update(&mut self, now: Instant) {
        if self.state != GameState::Active {
            return;
        }
        if now.saturating_duration_since(self.last_fall) < self.fall_interval() {
            return;
        }
        self.last_fall = now;

        let Some(piece) = self.current_piece else {
            return;
        };
        match try_apply(Transform::Fall, &piece, &self.board) {
            Some(fallen) => self.current_piece = Some(fallen),
            None => self.lock_piece(),
        }
    }

    /// Replace the current piece with the transformed copy if the board accepts it
    fn try_transform(&mut self, transform: Transform) {
        let Some(piece) = &self.current_piece else {
            return;
        };
        match try_apply(transform, piece, &self.board) {
            Some(moved) => self.current_piece = Some(moved),
            None => trace!("Rejected {:?}", transform),
        }
    }

    /// Lock the current piece and spawn next
    fn lock_piece(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };
        self.state = GameState::Spawning;

        self.board.commit(&piece);
        debug!(
            "Locked {} at ({}, {})",
            piece.piece_type.name(),
            piece.x,
            piece.y
        );

        let lines_cleared = self.board.clear_full_lines();
        if lines_cleared > 0 {
            let previous_level = self.score.level;
            self.score.on_lines_cleared(lines_cleared);
            debug!(
                "Cleared {} lines, score={} speed={}ms",
                lines_cleared, self.score.points, self.score.speed_ms
            );
            if self.score.level != previous_level {
                info!("Level up: {}", self.score.level);
            }
        }

        self.spawn_next();
    }

    /// Pick a uniformly random tetromino and try to place it
    fn spawn_next(&mut self) {
        let kinds = TetrominoType::all();
        let kind = kinds[self.rng.gen_range(0..kinds.len())];
        self.spawn(kind);
    }

    /// Place a fresh piece of `kind`; an overlapping spawn ends the game
    fn spawn(&mut self, kind: TetrominoType) {
        let piece = Piece::new(kind);
        if !self.board.is_valid_position(&piece) {
            info!(
                "Game over: {} cannot spawn, final score {}",
                kind.name(),
                self.score.points
            );
            self.current_piece = None;
            self.state = GameState::GameOver;
            return;
        }
        debug!("Spawned {} at ({}, {})", kind.name(), piece.x, piece.y);
        self.current_piece = Some(piece);
        self.state = GameState::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};

    const TICK: Duration = Duration::from_millis(500);

    fn started(seed: u64) -> (Game, Instant) {
        let now = Instant::now();
        let mut game = Game::with_seed(seed, now);
        game.start(now);
        (game, now)
    }

    fn piece(game: &Game) -> Piece {
        game.current_piece.expect("no active piece")
    }

    #[test]
    fn test_start_spawns_active_piece() {
        let (game, _) = started(1);
        assert_eq!(game.state, GameState::Active);
        let piece = piece(&game);
        assert_eq!(piece.y, 0);
        assert!(game.board.is_valid_position(&piece));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let kinds = |seed| {
            let (mut game, _) = started(seed);
            (0..200)
                .map(|_| {
                    game.spawn_next();
                    piece(&game).piece_type
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(kinds(42), kinds(42));
        // Every kind shows up eventually
        let seen = kinds(7);
        for kind in TetrominoType::all() {
            assert!(seen.contains(&kind), "missing {}", kind.name());
        }
    }

    #[test]
    fn test_move_o_piece_to_wall() {
        let (mut game, _) = started(1);
        game.spawn(TetrominoType::O);
        assert_eq!((piece(&game).x, piece(&game).y), (4, 0));

        game.process_command(Command::MoveRight);
        assert_eq!((piece(&game).x, piece(&game).y), (5, 0));

        for _ in 0..3 {
            game.process_command(Command::MoveRight);
        }
        assert_eq!(piece(&game).x, 8);
        game.process_command(Command::MoveRight);
        assert_eq!(piece(&game).x, 8);
    }

    #[test]
    fn test_blocked_rotation_keeps_orientation() {
        let (mut game, _) = started(1);
        game.spawn(TetrominoType::I);
        game.process_command(Command::Rotate);
        for _ in 0..6 {
            game.process_command(Command::MoveRight);
        }
        let vertical = piece(&game);
        assert_eq!(vertical.x, 9);

        game.process_command(Command::Rotate);
        assert_eq!(piece(&game), vertical);
    }

    #[test]
    fn test_rotation_blocked_by_stack() {
        let (mut game, start) = started(1);
        game.spawn(TetrominoType::I);
        game.process_command(Command::Rotate);
        game.update(start + TICK);
        game.update(start + TICK * 2);
        let vertical = piece(&game);
        assert_eq!((vertical.x, vertical.y), (3, 2));
        assert_eq!(vertical.shape.height(), 4);

        // Lying flat would need (3..7, 2)
        game.board.set(5, 2, true);
        game.process_command(Command::Rotate);
        assert_eq!(piece(&game), vertical);
        assert!(!game.board.is_occupied(3, 2));

        // Clearing the cell lets the same rotation through
        game.board.set(5, 2, false);
        game.process_command(Command::Rotate);
        assert_eq!(piece(&game).shape.width(), 4);
    }

    #[test]
    fn test_gravity_waits_for_period() {
        let (mut game, start) = started(1);
        let before = piece(&game);

        game.update(start + TICK - Duration::from_millis(1));
        assert_eq!(piece(&game), before);

        game.update(start + TICK);
        assert_eq!(piece(&game).y, before.y + 1);

        // The clock was reset by the tick
        game.update(start + TICK + Duration::from_millis(10));
        assert_eq!(piece(&game).y, before.y + 1);
    }

    #[test]
    fn test_fast_drop_shortens_period() {
        let (mut game, start) = started(1);
        let before = piece(&game);

        game.process_command(Command::SoftDrop);
        assert!(game.is_fast_drop());
        assert_eq!(game.fall_interval(), SOFT_DROP_INTERVAL);
        game.update(start + SOFT_DROP_INTERVAL);
        assert_eq!(piece(&game).y, before.y + 1);

        game.release_soft_drop();
        assert_eq!(game.fall_interval(), TICK);
        game.update(start + SOFT_DROP_INTERVAL * 2);
        assert_eq!(piece(&game).y, before.y + 1);
    }

    #[test]
    fn test_landing_locks_and_spawns() {
        let (mut game, start) = started(3);
        game.spawn(TetrominoType::O);

        let mut now = start;
        // 18 falls reach the floor, the 19th tick locks
        for _ in 0..19 {
            now += TICK;
            game.update(now);
        }
        assert!(game.board.is_occupied(4, 19));
        assert!(game.board.is_occupied(5, 18));
        assert_eq!(game.state, GameState::Active);
        assert_eq!(piece(&game).y, 0);
        assert_eq!(game.score.points, 0);
    }

    #[test]
    fn test_vertical_i_clears_bottom_line() {
        let (mut game, start) = started(5);
        let bottom = BOARD_HEIGHT as i32 - 1;
        for x in 0..BOARD_WIDTH as i32 {
            if x != 3 {
                game.board.set(x, bottom, true);
            }
        }

        game.spawn(TetrominoType::I);
        game.process_command(Command::Rotate);
        assert_eq!(piece(&game).x, 3);

        // 16 falls put the bar on the floor, the 17th tick locks it
        let mut now = start;
        for _ in 0..17 {
            now += TICK;
            game.update(now);
        }

        assert_eq!(game.score.points, 10);
        assert_eq!(game.score.level, 1);
        assert_eq!(game.score.speed_ms, 460);
        assert_eq!(game.score.lines, 1);
        // The rest of the bar dropped into the cleared row
        for y in 17..20 {
            assert!(game.board.is_occupied(3, y));
        }
        assert!(!game.board.is_occupied(0, bottom));
    }

    #[test]
    fn test_speed_clamps_after_many_clears() {
        let (mut game, start) = started(9);
        let mut now = start;
        let bottom = BOARD_HEIGHT as i32 - 1;

        while game.score.points < 400 {
            for x in 0..BOARD_WIDTH as i32 {
                if x != 3 {
                    game.board.set(x, bottom, true);
                }
            }
            game.spawn(TetrominoType::I);
            game.process_command(Command::Rotate);
            let clears = game.score.lines;
            while game.score.lines == clears {
                now += game.fall_interval();
                game.update(now);
                assert!(!game.is_over());
            }
            // Start the next round from an empty board
            game.board = Board::new();
        }

        assert!(game.score.level >= 14);
        assert_eq!(game.score.speed_ms, 100);
    }

    #[test]
    fn test_spawn_overlap_is_game_over() {
        let now = Instant::now();
        let mut game = Game::with_seed(11, now);
        for x in 0..BOARD_WIDTH as i32 {
            game.board.set(x, 0, true);
        }
        game.start(now);

        assert!(game.is_over());
        assert_eq!(game.current_piece, None);

        // Nothing moves once the game is over
        game.process_command(Command::MoveLeft);
        game.update(now + TICK * 10);
        assert!(game.is_over());
        assert_eq!(game.current_piece, None);
    }

    #[test]
    fn test_stack_to_top_ends_game() {
        let (mut game, start) = started(13);
        let mut now = start;
        for _ in 0..10_000 {
            if game.is_over() {
                break;
            }
            game.process_command(Command::SoftDrop);
            now += SOFT_DROP_INTERVAL;
            game.update(now);
        }
        assert!(game.is_over());
        // The blocked spawn overlapped the top two rows
        assert!(game.board.rows().take(2).flatten().any(|&cell| cell));
    }
}
