//! The persisted analysis file (JSON).
//!
//! One file holds the game text, the per-ply evaluation results, the user's
//! notes and the detected opening, so a reviewed game can be reopened without
//! running the engine again.

use crate::ReviewError;
use chess_analysis::{Classification, EvaluationRecord, GameSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// On-disk layout of an analysed game.
///
/// `move_notes` is keyed by 0-based ply index. `move_accuracies` is optional;
/// without it the stored side accuracies are taken as given.
/// `move_best_moves` and `move_failures` hold each record's engine choice and
/// failure reason; older files without them load with neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFile {
    pub pgn: String,
    pub moves: Vec<String>,
    #[serde(default)]
    pub move_evaluations: Vec<String>,
    #[serde(default)]
    pub move_evaluations_scores: Vec<Option<i64>>,
    #[serde(default)]
    pub white_accuracy: f64,
    #[serde(default)]
    pub black_accuracy: f64,
    #[serde(default)]
    pub move_notes: BTreeMap<String, String>,
    #[serde(default)]
    pub opening_name: String,
    #[serde(default)]
    pub opening_eco: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_accuracies: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_best_moves: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_failures: Option<Vec<Option<String>>>,
}

impl AnalysisFile {
    /// Flattens evaluation results into the file's parallel arrays.
    #[must_use]
    pub fn with_records(
        pgn: String,
        moves: Vec<String>,
        records: &[EvaluationRecord],
        summary: &GameSummary,
        notes: &BTreeMap<usize, String>,
    ) -> Self {
        Self {
            pgn,
            moves,
            move_evaluations: records
                .iter()
                .map(|r| r.classification.symbol().to_string())
                .collect(),
            move_evaluations_scores: records.iter().map(|r| r.centipawns).collect(),
            white_accuracy: summary.white_accuracy,
            black_accuracy: summary.black_accuracy,
            move_notes: notes.iter().map(|(i, n)| (i.to_string(), n.clone())).collect(),
            opening_name: String::new(),
            opening_eco: String::new(),
            move_accuracies: Some(records.iter().map(|r| r.accuracy).collect()),
            move_best_moves: Some(records.iter().map(|r| r.best_move.clone()).collect()),
            move_failures: Some(records.iter().map(|r| r.note.clone()).collect()),
        }
    }

    /// Rebuilds the evaluation records.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Format`] if there are more evaluations than
    /// moves or the per-ply arrays disagree in length.
    pub fn records(&self) -> Result<Vec<EvaluationRecord>, ReviewError> {
        let n = self.move_evaluations.len();
        if n > self.moves.len() {
            return Err(ReviewError::Format(format!(
                "{} evaluations for {} moves",
                n,
                self.moves.len()
            )));
        }
        if self.move_evaluations_scores.len() != n {
            return Err(ReviewError::Format(format!(
                "{} scores for {} evaluations",
                self.move_evaluations_scores.len(),
                n
            )));
        }
        check_len("accuracies", self.move_accuracies.as_deref(), n)?;
        check_len("best moves", self.move_best_moves.as_deref(), n)?;
        check_len("failures", self.move_failures.as_deref(), n)?;

        Ok((0..n)
            .map(|i| EvaluationRecord {
                centipawns: self.move_evaluations_scores[i],
                classification: Classification::from_symbol(&self.move_evaluations[i]),
                note: self.move_failures.as_ref().and_then(|f| f[i].clone()),
                accuracy: self.move_accuracies.as_ref().and_then(|a| a[i]),
                best_move: self.move_best_moves.as_ref().and_then(|b| b[i].clone()),
            })
            .collect())
    }

    /// Parses the note keys.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Format`] for a key that is not a ply index of
    /// this game.
    pub fn notes(&self) -> Result<BTreeMap<usize, String>, ReviewError> {
        self.move_notes
            .iter()
            .map(|(key, note)| match key.trim().parse::<usize>() {
                Ok(index) if index < self.moves.len() => Ok((index, note.clone())),
                _ => Err(ReviewError::Format(format!("bad note key '{}'", key))),
            })
            .collect()
    }

    /// The summary stored in the file.
    ///
    /// Counts are always recomputed; side accuracies come from the file.
    pub fn summary(&self) -> Result<GameSummary, ReviewError> {
        Ok(GameSummary {
            white_accuracy: self.white_accuracy,
            black_accuracy: self.black_accuracy,
            ..GameSummary::fold(&self.records()?)
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ReviewError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ReviewError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read(path: &Path) -> Result<Self, ReviewError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ReviewError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn check_len<T>(what: &str, values: Option<&[T]>, n: usize) -> Result<(), ReviewError> {
    match values {
        Some(values) if values.len() != n => Err(ReviewError::Format(format!(
            "{} {} for {} evaluations",
            values.len(),
            what,
            n
        ))),
        _ => Ok(()),
    }
}
