use crate::OracleError;
use chess_game::GameError;
use thiserror::Error;

/// Errors from analysing a game or position.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Analysis task failed: {0}")]
    Task(String),
}
