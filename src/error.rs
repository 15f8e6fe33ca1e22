//! Error types for the board and the search controller
//!
//! Rejected moves (occupied cell, finished game) are not errors: they are
//! reported as `Ok(false)` by [`Board::make_move`](crate::Board::make_move).
//! The variants here cover structural failures only.

use std::io;

/// Failures raised at the board boundary.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Coordinates outside `0..size` on either axis.
    #[error("coordinate ({x}, {y}) is outside the {size}x{size} board")]
    InvalidCoordinate { x: i32, y: i32, size: usize },
    /// A move was requested for `Stone::Empty`.
    #[error("cannot place an empty stone")]
    EmptyStone,
}

/// Failures raised by the search controller.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Board(#[from] BoardError),
    /// A playout worker panicked; its batch is discarded.
    #[error("playout worker {worker} panicked")]
    PlayoutPanicked { worker: usize },
    /// The OS refused to start a playout thread.
    #[error("failed to spawn playout thread: {0}")]
    Spawn(#[from] io::Error),
}
