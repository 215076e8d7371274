use crate::config::ConfigError;
use chess_analysis::{AnalysisError, OracleError};
use chess_game::GameError;
use chess_openings::OpeningError;
use thiserror::Error;

/// Errors surfaced by review sessions and analysis files.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Opening(#[from] OpeningError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid analysis file: {0}")]
    Json(#[from] serde_json::Error),

    /// The analysis file parsed but its contents are inconsistent.
    #[error("Invalid analysis file: {0}")]
    Format(String),
}
