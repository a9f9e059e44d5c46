//! Scoring and difficulty curve
//!
//! Score grows by a flat amount per cleared line. Level follows score, and
//! the gravity period shrinks with level down to a fixed floor.

use std::time::Duration;

/// Points per cleared line. No combo or multi-line bonus.
pub const POINTS_PER_LINE: u32 = 10;
/// Points needed per level step
pub const POINTS_PER_LEVEL: u32 = 30;
/// Gravity period before any line is cleared
pub const BASE_SPEED_MS: u32 = 500;
/// Gravity period reduction per level
pub const SPEED_STEP_MS: u32 = 40;
/// Fastest gravity period
pub const MIN_SPEED_MS: u32 = 100;

/// Score, level and fall speed for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u32,
    /// Current level
    pub level: u32,
    /// Milliseconds per gravity tick
    pub speed_ms: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            speed_ms: BASE_SPEED_MS,
            lines: 0,
        }
    }

    /// Account for `lines` rows cleared by a single lock
    pub fn on_lines_cleared(&mut self, lines: usize) {
        if lines == 0 {
            return;
        }
        let lines = lines as u32;
        self.lines += lines;
        self.points += lines * POINTS_PER_LINE;
        self.level = self.points / POINTS_PER_LEVEL + 1;
        self.speed_ms = speed_for_level(self.level);
    }

    /// Get the gravity period for the current level
    pub fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.speed_ms as u64)
    }
}

/// Gravity period for a level, floored at `MIN_SPEED_MS`
pub fn speed_for_level(level: u32) -> u32 {
    BASE_SPEED_MS
        .saturating_sub(level.saturating_mul(SPEED_STEP_MS))
        .max(MIN_SPEED_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let score = Score::new();
        assert_eq!(score.points, 0);
        assert_eq!(score.level, 1);
        assert_eq!(score.speed_ms, 500);
        assert_eq!(score.fall_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_no_lines_is_noop() {
        let mut score = Score::new();
        score.on_lines_cleared(0);
        assert_eq!(score, Score::new());
    }

    #[test]
    fn test_single_clear() {
        let mut score = Score::new();
        score.on_lines_cleared(1);
        assert_eq!(score.points, 10);
        assert_eq!(score.level, 1);
        // Speed is recomputed on every clear, even without a level change
        assert_eq!(score.speed_ms, 460);
        assert_eq!(score.lines, 1);
    }

    #[test]
    fn test_four_lines_is_flat() {
        let mut score = Score::new();
        score.on_lines_cleared(4);
        assert_eq!(score.points, 40);
        assert_eq!(score.level, 2);
        assert_eq!(score.speed_ms, 420);
    }

    #[test]
    fn test_matches_formula() {
        let mut score = Score::new();
        for n in [1usize, 3, 2, 4, 1, 1, 4, 2, 3] {
            let previous = score.points;
            score.on_lines_cleared(n);
            let expected = previous + 10 * n as u32;
            assert_eq!(score.points, expected);
            assert_eq!(score.level, expected / 30 + 1);
            assert_eq!(
                score.speed_ms,
                (500i64 - score.level as i64 * 40).max(100) as u32
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let mut a = Score::new();
        let mut b = Score::new();
        a.on_lines_cleared(2);
        b.on_lines_cleared(2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_speed_floor() {
        let mut score = Score::new();
        while score.points < 400 {
            score.on_lines_cleared(1);
        }
        assert!(score.level >= 14);
        assert_eq!(score.speed_ms, MIN_SPEED_MS);

        score.on_lines_cleared(4);
        assert_eq!(score.speed_ms, MIN_SPEED_MS);
        assert_eq!(speed_for_level(1000), MIN_SPEED_MS);
    }
}
