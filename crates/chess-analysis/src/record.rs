//! Per-ply evaluation records.

use crate::Classification;
use serde::{Deserialize, Serialize};

/// Result of evaluating one mainline ply.
///
/// `centipawns` is the evaluation after the move from the mover's point of
/// view. A ply whose oracle query failed carries no centipawns, is
/// `Unclassified` and explains the failure in `note`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub centipawns: Option<i64>,
    pub classification: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_move: Option<String>,
}

impl EvaluationRecord {
    /// A successfully evaluated ply.
    #[must_use]
    pub fn evaluated(
        centipawns: i64,
        classification: Classification,
        accuracy: f64,
        best_move: Option<String>,
    ) -> Self {
        Self {
            centipawns: Some(centipawns),
            classification,
            note: None,
            accuracy: Some(accuracy),
            best_move,
        }
    }

    /// A ply whose analysis failed.
    #[must_use]
    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            centipawns: None,
            classification: Classification::Unclassified,
            note: Some(note.into()),
            accuracy: None,
            best_move: None,
        }
    }

    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.classification != Classification::Unclassified
    }
}
