//! Play modes: the ordinary single board, and quad mode with four arms
//!
//! In quad mode every piece is given a random travel direction when it
//! spawns and lives on that direction's own 10x20 arm. The arms are cleared
//! and scored independently; a front end arranges them around a shared
//! center when drawing.

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Gravity, Position};
use crate::piece::{ActivePiece, Direction};
use crate::score::QuadTally;
use crate::tetromino::{Shape, TetrominoType};
use rand::Rng;

/// State only the single-board mode has
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleField {
    pub board: Board,
    pub score: u64,
}

impl SingleField {
    pub fn new(board: Board) -> Self {
        Self { board, score: 0 }
    }
}

/// State only quad mode has
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadField {
    /// Indexed by `Direction::index`
    arms: [Board; 4],
    pub scores: QuadTally,
    pub lines: QuadTally,
}

impl Default for QuadField {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadField {
    pub fn new() -> Self {
        Self::with_down_arm(Board::new())
    }

    /// Four arms where the DOWN arm starts from an existing board
    pub fn with_down_arm(down: Board) -> Self {
        let mut arms = Direction::all().map(|d| Board::with_gravity(arm_gravity(d)));
        arms[Direction::Down.index()] = down;
        Self {
            arms,
            scores: QuadTally::default(),
            lines: QuadTally::default(),
        }
    }

    pub fn arm(&self, direction: Direction) -> &Board {
        &self.arms[direction.index()]
    }

    pub fn arm_mut(&mut self, direction: Direction) -> &mut Board {
        &mut self.arms[direction.index()]
    }
}

/// The UP arm is the only one with its vertical axis inverted
pub fn arm_gravity(direction: Direction) -> Gravity {
    match direction {
        Direction::Up => Gravity::Up,
        _ => Gravity::Down,
    }
}

/// Place a piece at the entry point of the arm for `direction`.
///
/// DOWN pieces use the standard spawn. UP pieces enter centered from below,
/// with their topmost filled row on the last board row. LEFT pieces enter on
/// the right edge and RIGHT pieces on the left edge, both at the standard
/// height, so they can steer toward the middle.
pub fn spawn_toward(direction: Direction, kind: TetrominoType, shape: Shape) -> ActivePiece {
    let standard = ActivePiece::spawn(kind, shape);
    let Position { x, y } = standard.position;

    let position = match direction {
        Direction::Down => standard.position,
        Direction::Up => {
            let top = shape.top_row().unwrap_or(0) as i32;
            Position::new(x, BOARD_HEIGHT as i32 - 1 - top)
        }
        Direction::Left => {
            let right = shape.right_col().unwrap_or(0) as i32;
            Position::new(BOARD_WIDTH as i32 - 1 - right, y)
        }
        Direction::Right => {
            let left = shape.left_col().unwrap_or(0) as i32;
            Position::new(-left, y)
        }
    };

    ActivePiece {
        position,
        direction: Some(direction),
        ..standard
    }
}

/// Which mode a session is in, with the fields that only make sense there
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayMode {
    Single(SingleField),
    Quad(QuadField),
}

impl PlayMode {
    /// Fresh empty boards for the requested mode
    pub fn new(quad: bool) -> Self {
        if quad {
            PlayMode::Quad(QuadField::new())
        } else {
            PlayMode::Single(SingleField::new(Board::new()))
        }
    }

    pub fn is_quad(&self) -> bool {
        matches!(self, PlayMode::Quad(_))
    }

    /// The board a piece with the given tag plays on. Untagged pieces in
    /// quad mode go to the DOWN arm.
    pub fn board_for(&self, direction: Option<Direction>) -> &Board {
        match self {
            PlayMode::Single(field) => &field.board,
            PlayMode::Quad(field) => field.arm(direction.unwrap_or(Direction::Down)),
        }
    }

    pub fn board_for_mut(&mut self, direction: Option<Direction>) -> &mut Board {
        match self {
            PlayMode::Single(field) => &mut field.board,
            PlayMode::Quad(field) => field.arm_mut(direction.unwrap_or(Direction::Down)),
        }
    }

    /// Spawn a piece for this mode, drawing a direction in quad mode
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        kind: TetrominoType,
        shape: Shape,
        rng: &mut R,
    ) -> ActivePiece {
        match self {
            PlayMode::Single(_) => ActivePiece::spawn(kind, shape),
            PlayMode::Quad(_) => spawn_toward(Direction::random(rng), kind, shape),
        }
    }

    /// Add a lock's points and lines to the right accumulator
    pub fn credit(&mut self, direction: Option<Direction>, points: u64, lines: usize) {
        match self {
            PlayMode::Single(field) => field.score += points,
            PlayMode::Quad(field) => {
                let direction = direction.unwrap_or(Direction::Down);
                field.scores.add(direction, points);
                field.lines.add(direction, lines as u64);
            }
        }
    }

    /// Displayed score; in quad mode the sum of all four directions
    pub fn total_score(&self) -> u64 {
        match self {
            PlayMode::Single(field) => field.score,
            PlayMode::Quad(field) => field.scores.total(),
        }
    }

    /// Switch modes, carrying the main board across.
    ///
    /// The single board becomes the DOWN arm and back again. Score
    /// accumulators of the new mode start at zero.
    pub fn toggled(self) -> PlayMode {
        match self {
            PlayMode::Single(field) => PlayMode::Quad(QuadField::with_down_arm(field.board)),
            PlayMode::Quad(field) => {
                PlayMode::Single(SingleField::new(field.arm(Direction::Down).clone()))
            }
        }
    }
}
