//! The position-evaluator seam.
//!
//! An [`Oracle`] evaluates positions given as UCI move histories from the
//! standard starting position. [`UciOracle`](crate::UciOracle) talks to an
//! external engine; tests script their own.

use crate::Score;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by an oracle.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The evaluator process is missing, failed its handshake, or died.
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),
    /// A single query failed.
    #[error("Analysis query failed: {0}")]
    QueryFailed(String),
    /// A single query exceeded its deadline.
    #[error("Analysis query timed out after {0:?}")]
    QueryTimedOut(Duration),
    /// Writing to the evaluator failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OracleError {
    /// Whether the evaluator itself is gone (as opposed to one failed query).
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, OracleError::EngineUnavailable(_) | OracleError::Io(_))
    }
}

/// Bound on a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Time(Duration),
    Depth(u32),
}

impl Limit {
    /// Time limit in milliseconds.
    #[must_use]
    pub fn millis(ms: u64) -> Self {
        Limit::Time(Duration::from_millis(ms))
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit::millis(100)
    }
}

/// One candidate line returned by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalLine {
    /// Moves in UCI notation, starting with the candidate move.
    pub moves: Vec<String>,
    /// Score relative to the side to move at the queried position.
    pub score: Score,
}

/// Session-global evaluator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub threads: u32,
    pub hash_mb: u32,
    /// Limit playing strength to this Elo (`UCI_LimitStrength`).
    pub elo_limit: Option<u32>,
    /// Engine skill level (0-20 for Stockfish).
    pub skill_level: Option<u8>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 16,
            elo_limit: None,
            skill_level: None,
        }
    }
}

/// A position evaluator reached by blocking request/response calls.
pub trait Oracle: Send {
    /// Evaluates the position after `history` and returns up to `lines`
    /// principal lines, best first. An empty result means the position has
    /// no legal moves.
    fn evaluate(
        &mut self,
        history: &[String],
        limit: Limit,
        lines: usize,
    ) -> Result<Vec<PrincipalLine>, OracleError>;

    /// Best move after `history`, `None` when there is no legal move.
    fn best_move(&mut self, history: &[String], limit: Limit)
        -> Result<Option<String>, OracleError>;

    /// Applies session-global settings.
    fn configure(&mut self, options: &EngineOptions) -> Result<(), OracleError>;

    /// Tells the evaluator a different game follows.
    fn new_game(&mut self) -> Result<(), OracleError> {
        Ok(())
    }
}

/// Serializes every request to one oracle session.
///
/// Configuration is session-global, so a request must never interleave with
/// another (or with a reconfiguration). Clones share the same session.
#[derive(Clone)]
pub struct SharedOracle {
    inner: Arc<Mutex<Box<dyn Oracle>>>,
}

impl SharedOracle {
    pub fn new<O: Oracle + 'static>(oracle: O) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(oracle))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn Oracle>>, OracleError> {
        self.inner
            .lock()
            .map_err(|_| OracleError::EngineUnavailable("oracle lock poisoned".to_string()))
    }
}

impl Oracle for SharedOracle {
    fn evaluate(
        &mut self,
        history: &[String],
        limit: Limit,
        lines: usize,
    ) -> Result<Vec<PrincipalLine>, OracleError> {
        self.lock()?.evaluate(history, limit, lines)
    }

    fn best_move(
        &mut self,
        history: &[String],
        limit: Limit,
    ) -> Result<Option<String>, OracleError> {
        self.lock()?.best_move(history, limit)
    }

    fn configure(&mut self, options: &EngineOptions) -> Result<(), OracleError> {
        self.lock()?.configure(options)
    }

    fn new_game(&mut self) -> Result<(), OracleError> {
        self.lock()?.new_game()
    }
}
