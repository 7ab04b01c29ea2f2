//! One-slot lookahead for upcoming pieces
//!
//! The next piece's orientation is chosen when it enters the queue, so the
//! preview always matches what eventually spawns.

use crate::tetromino::{Shape, TetrominoType};
use rand::Rng;

/// The single "next" slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceQueue {
    next_kind: TetrominoType,
    next_shape: Shape,
}

impl PieceQueue {
    /// Create a queue with a freshly drawn next piece
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (next_kind, next_shape) = Self::draw(rng);
        Self {
            next_kind,
            next_shape,
        }
    }

    /// Kind waiting in the preview
    pub fn next_kind(&self) -> TetrominoType {
        self.next_kind
    }

    /// Pre-rotated shape waiting in the preview
    pub fn next_shape(&self) -> Shape {
        self.next_shape
    }

    /// Hand out the queued piece and draw a replacement
    pub fn promote<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (TetrominoType, Shape) {
        let promoted = (self.next_kind, self.next_shape);
        (self.next_kind, self.next_shape) = Self::draw(rng);
        promoted
    }

    fn draw<R: Rng + ?Sized>(rng: &mut R) -> (TetrominoType, Shape) {
        let kind = TetrominoType::random(rng);
        (kind, kind.randomly_rotated_shape(rng))
    }
}
