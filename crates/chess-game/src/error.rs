//! Errors raised by game-record operations.

use thiserror::Error;

/// Errors that can occur while building or navigating a game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A move is not legal (or not parseable) in the position it was played from.
    #[error("Illegal move '{token}' at ply {ply}")]
    IllegalMove { token: String, ply: usize },
    /// A navigation request outside `[0, len]`.
    #[error("Index {index} out of range (mainline has {len} plies)")]
    IndexOutOfRange { index: usize, len: usize },
    /// A variation request that names no existing line.
    #[error("No variation {line} at index {index}")]
    NoSuchVariation { index: usize, line: usize },
    /// Malformed game record.
    #[error("Parse error: {0}")]
    Parse(String),
}
