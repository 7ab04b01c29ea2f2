//! Core game state and logic
//!
//! `Game` is the whole play session. Every input, including the drop timer,
//! goes through `apply` or `drop_tick`, each of which moves the session from
//! one complete state to the next. Actions that make no sense in the current
//! state are dropped without complaint.

use crate::board::Board;
use crate::mode::{PlayMode, spawn_toward};
use crate::piece::{ActivePiece, Direction, MoveOutcome};
use crate::queue::PieceQueue;
use crate::score::{Progress, drop_interval};
use crate::tetromino::{Shape, TetrominoType};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    /// Fresh session waiting for the first start
    NotStarted,
    Running,
    Paused,
    /// Topped out
    GameOver,
    /// Ended by the player; final like `GameOver`
    Abandoned,
}

impl GameState {
    /// Whether the session has ended, by losing or quitting
    pub fn is_over(&self) -> bool {
        matches!(self, GameState::GameOver | GameState::Abandoned)
    }

    /// Everything except `Running` counts as paused
    pub fn is_paused(&self) -> bool {
        *self != GameState::Running
    }
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Down,
    Rotate,
    Pause,
    Restart,
    Quit,
    ToggleQuadMode,
}

impl Action {
    pub fn all() -> [Action; 8] {
        [
            Action::Left,
            Action::Right,
            Action::Down,
            Action::Rotate,
            Action::Pause,
            Action::Restart,
            Action::Quit,
            Action::ToggleQuadMode,
        ]
    }

    /// Parse an input token such as `LEFT` or `TOGGLE_QUAD_MODE`.
    /// Case and surrounding whitespace are ignored.
    pub fn from_token(token: &str) -> Option<Action> {
        let token = token.trim();
        Self::all()
            .into_iter()
            .find(|action| action.token().eq_ignore_ascii_case(token))
    }

    pub fn token(&self) -> &'static str {
        match self {
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
            Action::Down => "DOWN",
            Action::Rotate => "ROTATE",
            Action::Pause => "PAUSE",
            Action::Restart => "RESTART",
            Action::Quit => "QUIT",
            Action::ToggleQuadMode => "TOGGLE_QUAD_MODE",
        }
    }

    fn move_direction(&self) -> Option<Direction> {
        match self {
            Action::Left => Some(Direction::Left),
            Action::Right => Some(Direction::Right),
            Action::Down => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Summary of the most recent lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockReport {
    pub kind: TetrominoType,
    pub direction: Option<Direction>,
    pub lines: usize,
    pub points: u64,
}

impl LockReport {
    /// Name of the clear, if any lines went
    pub fn label(&self) -> Option<&'static str> {
        match self.lines {
            1 => Some("Single"),
            2 => Some("Double"),
            3 => Some("Triple"),
            4 => Some("Tetris"),
            _ => None,
        }
    }
}

/// What the leaderboard needs from a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    pub score: u64,
    pub level: u32,
    pub lines_cleared: u32,
}

/// The main game struct
#[derive(Debug, Clone)]
pub struct Game {
    /// Current lifecycle state
    pub state: GameState,
    /// Boards and score accumulators for the current mode
    pub mode: PlayMode,
    /// Current falling piece
    pub active: Option<ActivePiece>,
    /// Level and combined lines cleared
    pub progress: Progress,
    /// Most recent lock, for display
    pub last_lock: Option<LockReport>,
    queue: PieceQueue,
    rng: ChaCha8Rng,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Create a single-mode session with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a single-mode session whose pieces follow `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::with_options(seed, false)
    }

    /// Create a session in the requested mode, waiting to be started
    pub fn with_options(seed: u64, quad: bool) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let queue = PieceQueue::new(&mut rng);
        Self {
            state: GameState::NotStarted,
            mode: PlayMode::new(quad),
            active: None,
            progress: Progress::new(),
            last_lock: None,
            queue,
            rng,
        }
    }

    pub fn next_kind(&self) -> TetrominoType {
        self.queue.next_kind()
    }

    pub fn next_shape(&self) -> Shape {
        self.queue.next_shape()
    }

    /// Displayed score (sum of all directions in quad mode)
    pub fn score(&self) -> u64 {
        self.mode.total_score()
    }

    pub fn level(&self) -> u32 {
        self.progress.level
    }

    /// Combined lines cleared across every board
    pub fn lines_cleared(&self) -> u32 {
        self.progress.lines
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn is_quad(&self) -> bool {
        self.mode.is_quad()
    }

    /// Travel direction of the active quad-mode piece
    pub fn quad_direction(&self) -> Option<Direction> {
        self.active.and_then(|piece| piece.direction)
    }

    /// The single board, or the DOWN arm in quad mode
    pub fn board(&self) -> &Board {
        self.mode.board_for(None)
    }

    /// Drop timer period, present only while the game is running
    pub fn drop_interval(&self) -> Option<Duration> {
        (self.state == GameState::Running).then(|| drop_interval(self.progress.level))
    }

    /// Final figures for the leaderboard, once the session has ended with
    /// something to show for it
    pub fn final_result(&self) -> Option<FinalResult> {
        if !self.state.is_over() || self.score() == 0 {
            return None;
        }
        Some(FinalResult {
            score: self.score(),
            level: self.progress.level,
            lines_cleared: self.progress.lines,
        })
    }

    /// Process an action
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Left | Action::Right | Action::Down => {
                if let Some(direction) = action.move_direction() {
                    self.move_active(direction);
                }
            }
            Action::Rotate => self.rotate_active(),
            Action::Pause => self.toggle_pause(),
            Action::Restart => self.restart(),
            Action::Quit => self.quit(),
            Action::ToggleQuadMode => self.toggle_quad_mode(),
        }
    }

    /// Process a raw input token, ignoring anything unrecognised.
    /// Returns whether the token named an action.
    pub fn apply_token(&mut self, token: &str) -> bool {
        match Action::from_token(token) {
            Some(action) => {
                self.apply(action);
                true
            }
            None => {
                debug!(token, "ignoring unknown action token");
                false
            }
        }
    }

    /// One automatic drop. A tick that arrives after the game stopped
    /// running does nothing.
    pub fn drop_tick(&mut self) {
        if self.state != GameState::Running {
            debug!(state = ?self.state, "stale drop tick ignored");
            return;
        }
        let Some(piece) = self.active else {
            return;
        };
        let outcome = piece.fall(self.mode.board_for(piece.direction));
        self.settle(outcome);
    }

    fn move_active(&mut self, input: Direction) {
        if self.state != GameState::Running {
            return;
        }
        let Some(piece) = self.active else {
            return;
        };
        let outcome = piece.try_move(self.mode.board_for(piece.direction), input);
        self.settle(outcome);
    }

    fn rotate_active(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        if let Some(piece) = self.active {
            self.active = Some(piece.try_rotate(self.mode.board_for(piece.direction)));
        }
    }

    fn settle(&mut self, outcome: MoveOutcome) {
        if outcome.locked {
            self.lock_piece(outcome.piece);
        } else {
            self.active = Some(outcome.piece);
        }
    }

    /// Lock the piece, clear its board, score, then bring in the next piece
    fn lock_piece(&mut self, piece: ActivePiece) {
        self.active = None;

        let board = self.mode.board_for_mut(piece.direction);
        board.lock_piece(&piece);
        let lines = board.clear_lines();

        let level_before = self.progress.level;
        let points = self.progress.record_lock(lines);
        self.mode.credit(piece.direction, points, lines);
        self.last_lock = Some(LockReport {
            kind: piece.kind,
            direction: piece.direction,
            lines,
            points,
        });
        debug!(kind = ?piece.kind, direction = ?piece.direction, lines, points, "piece locked");

        if self.progress.level > level_before {
            info!(level = self.progress.level, "level up");
        }

        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let (kind, shape) = self.queue.promote(&mut self.rng);
        let piece = self.mode.spawn(kind, shape, &mut self.rng);
        self.place_or_top_out(piece);
    }

    /// Expose a new piece, or end the game if its spawn spot is taken
    fn place_or_top_out(&mut self, piece: ActivePiece) {
        if self
            .mode
            .board_for(piece.direction)
            .collides(piece.position, &piece.shape)
        {
            self.active = None;
            self.state = GameState::GameOver;
            info!(
                score = self.score(),
                level = self.progress.level,
                lines = self.progress.lines,
                "game over"
            );
            return;
        }
        self.active = Some(piece);
    }

    fn toggle_pause(&mut self) {
        match self.state {
            GameState::NotStarted => {
                self.state = GameState::Running;
                info!(quad = self.mode.is_quad(), "game started");
                self.spawn_next();
            }
            GameState::Running => self.state = GameState::Paused,
            GameState::Paused => self.state = GameState::Running,
            GameState::GameOver | GameState::Abandoned => {
                debug!("pause ignored after game over");
            }
        }
    }

    /// Full reset in the current mode, straight into play
    fn restart(&mut self) {
        let quad = self.mode.is_quad();
        self.mode = PlayMode::new(quad);
        self.progress = Progress::new();
        self.queue = PieceQueue::new(&mut self.rng);
        self.last_lock = None;
        self.active = None;
        self.state = GameState::Running;
        info!(quad, "game restarted");
        self.spawn_next();
    }

    /// End the session, keeping the board and score as they are
    fn quit(&mut self) {
        self.active = None;
        if !self.state.is_over() {
            self.state = GameState::Abandoned;
            info!(score = self.score(), "game abandoned");
        }
    }

    fn toggle_quad_mode(&mut self) {
        if self.state == GameState::Running {
            debug!("quad mode toggle ignored while running");
            return;
        }

        let previous = std::mem::replace(&mut self.mode, PlayMode::new(false));
        self.mode = previous.toggled();
        info!(quad = self.mode.is_quad(), "quad mode toggled");

        if let Some(piece) = self.active.take() {
            self.retag(piece);
        }
    }

    /// Move an in-flight piece into the newly selected mode
    fn retag(&mut self, piece: ActivePiece) {
        if self.mode.is_quad() {
            let direction = Direction::random(&mut self.rng);
            let moved = spawn_toward(direction, piece.kind, piece.shape);
            let fits = !self
                .mode
                .board_for(moved.direction)
                .collides(moved.position, &moved.shape);
            // The old board is now the DOWN arm, so the current spot is still free there
            self.active = Some(if fits {
                moved
            } else {
                ActivePiece {
                    direction: Some(Direction::Down),
                    ..piece
                }
            });
            return;
        }

        match piece.direction {
            None | Some(Direction::Down) => {
                self.active = Some(ActivePiece {
                    direction: None,
                    ..piece
                });
            }
            Some(_) => self.place_or_top_out(ActivePiece::spawn(piece.kind, piece.shape)),
        }
    }
}
