//! Error types for move application, move parsing, layouts, and search.

use thiserror::Error;

use crate::board::{Player, Square};

/// Reasons a move request is rejected. A rejected move never mutates the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Illegal move: ({row}, {col}) is off the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("Illegal move: {0} is not empty")]
    Occupied(Square),
    #[error("Illegal move: {0} captures nothing")]
    NoCapture(Square),
    #[error("Illegal move: it is {0}'s turn")]
    NotYourTurn(Player),
    #[error("Illegal move: the game is over")]
    GameOver,
}

/// Malformed algebraic move text such as `"z9"` or `"e"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square {input:?}: expected a file a-h followed by a rank 1-8")]
pub struct ParseSquareError {
    pub input: String,
}

/// Problems with a starting layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout must have 8 rows, found {0}")]
    RowCount(usize),
    #[error("layout row {row} must have 8 cells, found {found}")]
    RowLength { row: usize, found: usize },
    #[error("layout row {row} contains {symbol:?}; expected '.', 'B' or 'W'")]
    Symbol { row: usize, symbol: char },
    #[error("layout places both players on the same squares ({0:#018x})")]
    Overlap(u64),
    #[error("malformed config file: {0}")]
    Format(String),
}

/// Failures inside the search. These are isolated per rollout or worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("rollout rejected move: {0}")]
    Rollout(#[from] MoveError),
    #[error("search worker {0} panicked")]
    WorkerPanicked(usize),
}
