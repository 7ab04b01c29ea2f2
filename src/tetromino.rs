//! Tetromino definitions and shapes
//!
//! The 7 piece kinds, each stored as a small square matrix. Rotation is a
//! plain 90 degree clockwise turn of that matrix, with no kick table.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest matrix any piece needs (the I piece)
pub const MAX_SHAPE_SIZE: usize = 4;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I, // Cyan - long bar
    J, // Blue
    L, // Orange
    O, // Yellow - square
    S, // Green
    T, // Purple
    Z, // Red
}

impl TetrominoType {
    /// Get all tetromino types
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::O,
            TetrominoType::S,
            TetrominoType::T,
            TetrominoType::Z,
        ]
    }

    /// Color tag stamped into board cells for this kind
    pub fn color(&self) -> &'static str {
        match self {
            TetrominoType::I => "cyan",
            TetrominoType::J => "blue",
            TetrominoType::L => "orange",
            TetrominoType::O => "yellow",
            TetrominoType::S => "green",
            TetrominoType::T => "purple",
            TetrominoType::Z => "red",
        }
    }

    /// Canonical (unrotated) shape matrix
    pub fn shape(&self) -> Shape {
        match self {
            TetrominoType::I => Shape::from_rows(&[
                &[0, 0, 0, 0],
                &[1, 1, 1, 1],
                &[0, 0, 0, 0],
                &[0, 0, 0, 0],
            ]),
            TetrominoType::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]]),
            TetrominoType::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]]),
            TetrominoType::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            TetrominoType::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]]),
            TetrominoType::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]]),
            TetrominoType::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]]),
        }
    }

    /// Uniform choice among the 7 kinds
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::all()[rng.gen_range(0..7)]
    }

    /// Canonical shape turned clockwise 0-3 times at random.
    ///
    /// The O piece looks the same in every orientation, so it is never turned.
    pub fn randomly_rotated_shape<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        let mut shape = self.shape();
        if *self == TetrominoType::O {
            return shape;
        }
        for _ in 0..rng.gen_range(0..4) {
            shape = shape.rotated();
        }
        shape
    }
}

/// An N x N occupancy matrix for a piece in one orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: usize,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Build a shape from rows of 0/1 values. Rows must form a square.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let size = rows.len().min(MAX_SHAPE_SIZE);
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in rows.iter().take(size).enumerate() {
            for (c, &value) in row.iter().take(size).enumerate() {
                cells[r][c] = value != 0;
            }
        }
        Self { size, cells }
    }

    /// Side length of the matrix
    #[cfg(test)]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    pub fn is_empty(&self) -> bool {
        self.offsets().next().is_none()
    }

    /// 90 degree clockwise turn: cell (r, c) moves to (c, N-1-r)
    pub fn rotated(&self) -> Shape {
        let n = self.size;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for r in 0..n {
            for c in 0..n {
                cells[c][n - 1 - r] = self.cells[r][c];
            }
        }
        Shape { size: n, cells }
    }

    /// Occupied cells as (dx, dy) offsets from the matrix's top-left corner
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |r| {
            (0..self.size)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (c as i32, r as i32))
        })
    }

    /// Index of the first row holding a filled cell
    pub fn top_row(&self) -> Option<usize> {
        (0..self.size).find(|&r| self.cells[r][..self.size].iter().any(|&c| c))
    }

    /// Index of the last row holding a filled cell
    pub fn bottom_row(&self) -> Option<usize> {
        (0..self.size)
            .rev()
            .find(|&r| self.cells[r][..self.size].iter().any(|&c| c))
    }

    /// Index of the first column holding a filled cell
    pub fn left_col(&self) -> Option<usize> {
        (0..self.size).find(|&c| (0..self.size).any(|r| self.cells[r][c]))
    }

    /// Index of the last column holding a filled cell
    pub fn right_col(&self) -> Option<usize> {
        (0..self.size)
            .rev()
            .find(|&c| (0..self.size).any(|r| self.cells[r][c]))
    }

    /// Matrix as rows of 0/1, the form the front end draws from
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.size)
            .map(|r| (0..self.size).map(|c| self.cells[r][c] as u8).collect())
            .collect()
    }
}
