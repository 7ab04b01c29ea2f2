//! Game board representation and collision detection

use crate::piece::{ActivePiece, Direction};
use crate::tetromino::{Shape, TetrominoType};
use serde::{Deserialize, Serialize};

/// Standard board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled with a piece's color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    /// Color tag of the piece that filled this cell
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Cell::Empty => None,
            Cell::Filled(kind) => Some(kind.color()),
        }
    }
}

/// Board coordinates of a shape's top-left corner. `y` grows downward and
/// may be negative while a piece is still entering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring position one step in `direction`
    pub fn stepped(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

/// Which way pieces settle on a board.
///
/// `Down` is the ordinary playfield. `Up` flips the vertical axis: pieces
/// enter below the last row, the top edge is the floor, and cleared rows are
/// replaced at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gravity {
    #[default]
    Down,
    Up,
}

impl Gravity {
    /// Direction a falling piece travels on this board
    pub fn direction(&self) -> Direction {
        match self {
            Gravity::Down => Direction::Down,
            Gravity::Up => Direction::Up,
        }
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top row
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
    gravity: Gravity,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board with downward gravity
    pub fn new() -> Self {
        Self::with_gravity(Gravity::Down)
    }

    /// Create a new empty board settling in the given direction
    pub fn with_gravity(gravity: Gravity) -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
            gravity,
        }
    }

    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    /// Get the cell at (x, y). Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        Some(self.cells[y as usize][x as usize])
    }

    /// Set a cell at (x, y). Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if !Self::in_bounds(x, y) {
            return false;
        }
        self.cells[y as usize][x as usize] = cell;
        true
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < BOARD_WIDTH && (y as usize) < BOARD_HEIGHT
    }

    /// Check whether `shape` placed at `position` hits a wall, the floor or a
    /// filled cell.
    ///
    /// Rows on the entry side of the board (above row 0 for downward gravity,
    /// below the last row for upward gravity) never collide, so pieces can
    /// hang partly outside while spawning.
    pub fn collides(&self, position: Position, shape: &Shape) -> bool {
        let height = BOARD_HEIGHT as i32;
        shape.offsets().any(|(dx, dy)| {
            let x = position.x + dx;
            let y = position.y + dy;

            let in_entry_zone = match self.gravity {
                Gravity::Down => y < 0,
                Gravity::Up => y >= height,
            };
            if in_entry_zone {
                return false;
            }

            if x < 0 || x >= BOARD_WIDTH as i32 || y < 0 || y >= height {
                return true;
            }
            self.cells[y as usize][x as usize].is_filled()
        })
    }

    /// Stamp a piece onto the board with its color. Cells that land outside
    /// the grid are dropped.
    pub fn lock_piece(&mut self, piece: &ActivePiece) {
        let cell = Cell::Filled(piece.kind);
        for (x, y) in piece.cells() {
            self.set(x, y, cell);
        }
    }

    /// Remove completed rows and return how many were cleared.
    ///
    /// Surviving rows keep their order and slide toward the floor; the freed
    /// rows on the entry side come back empty.
    pub fn clear_lines(&mut self) -> usize {
        let kept: Vec<[Cell; BOARD_WIDTH]> = self
            .cells
            .iter()
            .filter(|row| !Self::is_row_full(row))
            .copied()
            .collect();
        let cleared = BOARD_HEIGHT - kept.len();
        if cleared == 0 {
            return 0;
        }

        let empty = [Cell::Empty; BOARD_WIDTH];
        let start = match self.gravity {
            Gravity::Down => cleared,
            Gravity::Up => 0,
        };
        self.cells = [empty; BOARD_HEIGHT];
        for (offset, row) in kept.into_iter().enumerate() {
            self.cells[start + offset] = row;
        }

        cleared
    }

    fn is_row_full(row: &[Cell; BOARD_WIDTH]) -> bool {
        row.iter().all(|cell| cell.is_filled())
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.cells.iter()
    }
}
