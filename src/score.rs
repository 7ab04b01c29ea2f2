//! Scoring, level progression and drop speed

use crate::piece::Direction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Points for clearing 0-4 lines with one lock, before the level multiplier
pub const LINE_POINTS: [u64; 5] = [0, 100, 300, 500, 800];

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Drop interval at level 1
const BASE_DROP_MS: u64 = 800;
/// Interval shaved off per level
const DROP_STEP_MS: u64 = 100;
/// Fastest drop interval
const MIN_DROP_MS: u64 = 100;

/// Points awarded for one lock that cleared `lines` rows at `level`
pub fn points_for_clear(lines: usize, level: u32) -> u64 {
    LINE_POINTS.get(lines).copied().unwrap_or(0) * level as u64
}

/// Level for a running total of cleared lines
pub fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Time between automatic drops: 800ms at level 1, 100ms faster per level,
/// never below 100ms
pub fn drop_interval(level: u32) -> Duration {
    let reduction = (level.max(1) as u64 - 1).saturating_mul(DROP_STEP_MS);
    Duration::from_millis(BASE_DROP_MS.saturating_sub(reduction).max(MIN_DROP_MS))
}

/// Shared progress counters: combined lines drive the level in both modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub level: u32,
    pub lines: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self { level: 1, lines: 0 }
    }

    /// Score one lock and advance the counters.
    ///
    /// Points use the level in effect before the lines are added.
    /// Returns the points earned.
    pub fn record_lock(&mut self, lines: usize) -> u64 {
        let points = points_for_clear(lines, self.level);
        self.lines += lines as u32;
        self.level = level_for_lines(self.lines);
        points
    }
}

/// One counter per direction, used for quad-mode scores and lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadTally {
    pub up: u64,
    pub down: u64,
    pub left: u64,
    pub right: u64,
}

impl QuadTally {
    pub fn get(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn add(&mut self, direction: Direction, amount: u64) {
        let slot = match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        };
        *slot += amount;
    }

    pub fn total(&self) -> u64 {
        self.up + self.down + self.left + self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_clear_scales_with_level() {
        assert_eq!(points_for_clear(1, 3), 300);
    }

    #[test]
    fn test_tetris_at_level_one() {
        assert_eq!(points_for_clear(4, 1), 800);
    }

    #[test]
    fn test_point_table() {
        assert_eq!(points_for_clear(0, 5), 0);
        assert_eq!(points_for_clear(2, 1), 300);
        assert_eq!(points_for_clear(3, 2), 1000);
        assert_eq!(points_for_clear(7, 2), 0);
    }

    #[test]
    fn test_level_from_lines() {
        assert_eq!(level_for_lines(0), 1);
        assert_eq!(level_for_lines(9), 1);
        assert_eq!(level_for_lines(10), 2);
        assert_eq!(level_for_lines(27), 3);
    }

    #[test]
    fn test_drop_interval_curve() {
        assert_eq!(drop_interval(1), Duration::from_millis(800));
        assert_eq!(drop_interval(2), Duration::from_millis(700));
        assert_eq!(drop_interval(7), Duration::from_millis(200));
        assert_eq!(drop_interval(8), Duration::from_millis(100));
        assert_eq!(drop_interval(30), Duration::from_millis(100));
    }

    #[test]
    fn test_record_lock_uses_level_before_update() {
        let mut progress = Progress { level: 1, lines: 9 };
        // Crossing into level 2 still pays at level 1
        assert_eq!(progress.record_lock(2), 300);
        assert_eq!(progress.lines, 11);
        assert_eq!(progress.level, 2);
    }

    #[test]
    fn test_level_up() {
        let mut progress = Progress::new();
        for _ in 0..10 {
            progress.record_lock(1);
        }
        assert_eq!(progress.level, 2);
        assert_eq!(progress.lines, 10);
    }

    #[test]
    fn test_quad_tally() {
        let mut tally = QuadTally::default();
        tally.add(Direction::Left, 300);
        tally.add(Direction::Up, 100);
        tally.add(Direction::Left, 100);
        assert_eq!(tally.get(Direction::Left), 400);
        assert_eq!(tally.get(Direction::Right), 0);
        assert_eq!(tally.total(), 500);
    }
}
