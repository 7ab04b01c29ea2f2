//! Render-ready view of a session
//!
//! Front ends (the terminal UI, or anything on the other end of the headless
//! line protocol) only ever see this structure. Keys serialize in camelCase.

use crate::board::Board;
use crate::game::Game;
use crate::mode::PlayMode;
use crate::piece::Direction;
use crate::score::QuadTally;
use crate::tetromino::TetrominoType;
use serde::Serialize;

/// One board cell as a renderer sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub filled: bool,
    pub color: Option<&'static str>,
}

/// The falling piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceView {
    #[serde(rename = "type")]
    pub kind: TetrominoType,
    pub x: i32,
    pub y: i32,
    pub shape: Vec<Vec<u8>>,
    pub direction: Option<Direction>,
}

/// Complete rendering state after one transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// The single board, or the DOWN arm in quad mode
    pub board: Vec<Vec<CellView>>,
    /// Quad arms in UP, DOWN, LEFT, RIGHT order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quad_boards: Option<[Vec<Vec<CellView>>; 4]>,
    pub current_piece: Option<PieceView>,
    pub next_piece: TetrominoType,
    pub next_piece_shape: Vec<Vec<u8>>,
    pub score: u64,
    pub quad_scores: QuadTally,
    pub quad_lines: QuadTally,
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
    pub paused: bool,
    pub quad_mode: bool,
    pub quad_direction: Option<Direction>,
}

fn board_view(board: &Board) -> Vec<Vec<CellView>> {
    board
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| CellView {
                    filled: cell.is_filled(),
                    color: cell.color(),
                })
                .collect()
        })
        .collect()
}

impl Snapshot {
    pub fn capture(game: &Game) -> Self {
        let (quad_boards, quad_scores, quad_lines) = match &game.mode {
            PlayMode::Single(_) => (None, QuadTally::default(), QuadTally::default()),
            PlayMode::Quad(field) => (
                Some(Direction::all().map(|d| board_view(field.arm(d)))),
                field.scores,
                field.lines,
            ),
        };

        Self {
            board: board_view(game.board()),
            quad_boards,
            current_piece: game.active.map(|piece| PieceView {
                kind: piece.kind,
                x: piece.position.x,
                y: piece.position.y,
                shape: piece.shape.to_rows(),
                direction: piece.direction,
            }),
            next_piece: game.next_kind(),
            next_piece_shape: game.next_shape().to_rows(),
            score: game.score(),
            quad_scores,
            quad_lines,
            level: game.level(),
            lines_cleared: game.lines_cleared(),
            game_over: game.is_over(),
            paused: game.is_paused(),
            quad_mode: game.is_quad(),
            quad_direction: game.quad_direction(),
        }
    }
}

impl Game {
    /// Current rendering state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Cell};
    use crate::game::Action;

    #[test]
    fn test_fresh_snapshot() {
        let game = Game::with_seed(3);
        let snap = game.snapshot();
        assert_eq!(snap.board.len(), BOARD_HEIGHT);
        assert!(snap.board.iter().all(|row| row.len() == BOARD_WIDTH));
        assert!(snap.current_piece.is_none());
        assert!(snap.paused);
        assert!(!snap.game_over);
        assert!(!snap.quad_mode);
        assert!(snap.quad_boards.is_none());
        assert_eq!(snap.next_piece, game.next_kind());
    }

    #[test]
    fn test_filled_cell_has_color() {
        let mut game = Game::with_seed(3);
        game.mode.board_for_mut(None).set(1, 19, Cell::Filled(TetrominoType::L));
        let snap = game.snapshot();
        assert_eq!(
            snap.board[19][1],
            CellView {
                filled: true,
                color: Some("orange")
            }
        );
        assert_eq!(
            snap.board[0][0],
            CellView {
                filled: false,
                color: None
            }
        );
    }

    #[test]
    fn test_quad_snapshot_lists_arms() {
        let mut game = Game::with_options(9, true);
        game.apply(Action::Pause);
        let snap = game.snapshot();
        assert!(snap.quad_mode);
        assert_eq!(snap.quad_boards.as_ref().map(|arms| arms.len()), Some(4));
        assert!(snap.quad_direction.is_some());
        assert_eq!(
            snap.current_piece.as_ref().and_then(|p| p.direction),
            snap.quad_direction
        );
    }

    #[test]
    fn test_json_uses_camel_case() {
        let mut game = Game::with_seed(4);
        game.apply(Action::Pause);
        let json = serde_json::to_value(game.snapshot()).expect("snapshot serializes");
        assert_eq!(json["gameOver"], false);
        assert_eq!(json["linesCleared"], 0);
        assert_eq!(json["quadScores"]["left"], 0);
        assert!(json["currentPiece"]["type"].is_string());
        assert!(json["nextPieceShape"].is_array());
    }
}
