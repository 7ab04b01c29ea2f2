//! QUADTRIS - falling blocks, in one direction or four
//!
//! The simulation engine: a board, pieces, scoring and a session state
//! machine driven by discrete actions and a drop timer. Rendering and input
//! capture live in the `quadtris` binary; other front ends can drive the
//! engine through [`game::Game`] and read [`snapshot::Snapshot`]s back.

pub mod board;
pub mod game;
pub mod leaderboard;
pub mod mode;
pub mod piece;
pub mod queue;
pub mod scheduler;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod tetromino;
