//! Active falling piece logic

use crate::board::{BOARD_WIDTH, Board, Position};
use crate::tetromino::{Shape, TetrominoType};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The four cardinal directions, used both for single steps and for the
/// travel direction a piece is assigned in quad mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    /// Uniform choice among the four directions
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::all()[rng.gen_range(0..4)]
    }

    /// (dx, dy) for one step; y grows downward
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Stable slot for per-direction tables
    pub fn index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Left => "◀",
            Direction::Right => "▶",
        }
    }
}

/// Result of trying to move a piece one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The piece after the attempt (unchanged when blocked)
    pub piece: ActivePiece,
    /// Set when a step toward the floor was blocked and the piece must lock
    pub locked: bool,
}

/// An active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: TetrominoType,
    /// Board position of the shape matrix's top-left corner
    pub position: Position,
    /// Current orientation
    pub shape: Shape,
    /// Assigned travel direction, only present in quad mode
    pub direction: Option<Direction>,
}

impl ActivePiece {
    /// Place a piece at the standard spawn point: horizontally centered, with
    /// its lowest filled row sitting on row 0.
    pub fn spawn(kind: TetrominoType, shape: Shape) -> Self {
        let bottom = shape.bottom_row().unwrap_or(0) as i32;
        Self {
            kind,
            position: Position::new(BOARD_WIDTH as i32 / 2 - 1, -bottom),
            shape,
            direction: None,
        }
    }

    /// Board coordinates of every filled cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let Position { x, y } = self.position;
        self.shape.offsets().map(move |(dx, dy)| (x + dx, y + dy))
    }

    /// Direction the drop timer moves this piece
    pub fn gravity(&self) -> Direction {
        match self.direction {
            Some(Direction::Up) => Direction::Up,
            _ => Direction::Down,
        }
    }

    /// Whether a player move in `input` has any effect on this piece.
    /// Quad-mode pieces only answer to their own direction.
    pub fn accepts(&self, input: Direction) -> bool {
        self.direction.is_none_or(|assigned| assigned == input)
    }

    /// Try a player move. Ignored inputs come back unchanged and unlocked.
    pub fn try_move(&self, board: &Board, input: Direction) -> MoveOutcome {
        if !self.accepts(input) {
            return MoveOutcome {
                piece: *self,
                locked: false,
            };
        }
        self.step(board, input)
    }

    /// One automatic drop along this piece's gravity
    pub fn fall(&self, board: &Board) -> MoveOutcome {
        self.step(board, self.gravity())
    }

    fn step(&self, board: &Board, direction: Direction) -> MoveOutcome {
        let candidate = self.position.stepped(direction);
        if !board.collides(candidate, &self.shape) {
            return MoveOutcome {
                piece: ActivePiece {
                    position: candidate,
                    ..*self
                },
                locked: false,
            };
        }

        // Sideways bumps are harmless; only a blocked step toward the floor locks
        MoveOutcome {
            piece: *self,
            locked: direction == board.gravity().direction(),
        }
    }

    /// Turn clockwise in place. No kicks: a blocked turn leaves the piece as is.
    pub fn try_rotate(&self, board: &Board) -> ActivePiece {
        let rotated = self.shape.rotated();
        if board.collides(self.position, &rotated) {
            return *self;
        }
        ActivePiece {
            shape: rotated,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_HEIGHT, Cell, Gravity};

    fn canonical(kind: TetrominoType) -> ActivePiece {
        ActivePiece::spawn(kind, kind.shape())
    }

    #[test]
    fn test_spawn_position() {
        let piece = canonical(TetrominoType::T);
        // Lowest filled row of T is matrix row 1, so it sits on board row 0
        assert_eq!(piece.position, Position::new(4, -1));
        assert_eq!(piece.cells().map(|(_, y)| y).max(), Some(0));
    }

    #[test]
    fn test_spawn_vertical_i_hangs_above_board() {
        let shape = TetrominoType::I.shape().rotated();
        let piece = ActivePiece::spawn(TetrominoType::I, shape);
        assert_eq!(piece.position.y, -3);
        assert_eq!(piece.cells().map(|(_, y)| y).max(), Some(0));
        assert_eq!(piece.cells().map(|(_, y)| y).min(), Some(-3));
    }

    #[test]
    fn test_move_left_and_right() {
        let board = Board::new();
        let piece = canonical(TetrominoType::O);
        let left = piece.try_move(&board, Direction::Left);
        assert_eq!(left.piece.position.x, 3);
        assert!(!left.locked);
        let right = piece.try_move(&board, Direction::Right);
        assert_eq!(right.piece.position.x, 5);
    }

    #[test]
    fn test_sideways_collision_is_ignored() {
        let board = Board::new();
        let mut piece = canonical(TetrominoType::O);
        piece.position.x = 0;
        let outcome = piece.try_move(&board, Direction::Left);
        assert_eq!(outcome.piece, piece);
        assert!(!outcome.locked);
    }

    #[test]
    fn test_down_collision_locks() {
        let board = Board::new();
        let mut piece = canonical(TetrominoType::O);
        piece.position.y = BOARD_HEIGHT as i32 - 2;
        let outcome = piece.try_move(&board, Direction::Down);
        assert!(outcome.locked);
        assert_eq!(outcome.piece, piece);
    }

    #[test]
    fn test_down_onto_stack_locks() {
        let mut board = Board::new();
        board.set(4, 5, Cell::Filled(TetrominoType::Z));
        let mut piece = canonical(TetrominoType::O);
        piece.position.y = 3;
        assert!(piece.try_move(&board, Direction::Down).locked);
    }

    #[test]
    fn test_rotate_succeeds_in_open_space() {
        let board = Board::new();
        let mut piece = canonical(TetrominoType::T);
        piece.position.y = 5;
        let rotated = piece.try_rotate(&board);
        assert_eq!(rotated.shape, piece.shape.rotated());
        assert_eq!(rotated.position, piece.position);
    }

    #[test]
    fn test_rotate_rejected_against_wall() {
        let board = Board::new();
        // Vertical I hugging the left wall: turning would push cells to x = -1
        let shape = TetrominoType::I.shape().rotated();
        let piece = ActivePiece {
            kind: TetrominoType::I,
            position: Position::new(-2, 5),
            shape,
            direction: None,
        };
        assert!(!board.collides(piece.position, &piece.shape));
        assert_eq!(piece.try_rotate(&board), piece);
    }

    #[test]
    fn test_quad_piece_ignores_other_directions() {
        let board = Board::new();
        let mut piece = canonical(TetrominoType::T);
        piece.direction = Some(Direction::Left);
        assert_eq!(piece.try_move(&board, Direction::Right).piece, piece);
        assert_eq!(piece.try_move(&board, Direction::Down).piece, piece);
        let moved = piece.try_move(&board, Direction::Left);
        assert_eq!(moved.piece.position.x, piece.position.x - 1);
    }

    #[test]
    fn test_gravity_follows_assigned_direction() {
        let mut piece = canonical(TetrominoType::T);
        assert_eq!(piece.gravity(), Direction::Down);
        piece.direction = Some(Direction::Right);
        assert_eq!(piece.gravity(), Direction::Down);
        piece.direction = Some(Direction::Up);
        assert_eq!(piece.gravity(), Direction::Up);
    }

    #[test]
    fn test_up_piece_falls_upward_and_locks_at_top() {
        let board = Board::with_gravity(Gravity::Up);
        let piece = ActivePiece {
            kind: TetrominoType::O,
            position: Position::new(4, 1),
            shape: TetrominoType::O.shape(),
            direction: Some(Direction::Up),
        };
        let first = piece.fall(&board);
        assert!(!first.locked);
        assert_eq!(first.piece.position.y, 0);
        let second = first.piece.fall(&board);
        assert!(second.locked);
        assert_eq!(second.piece.position.y, 0);
    }
}
