//! Per-side accuracy and classification counts.

use crate::{Classification, EvaluationRecord};
use serde::{Deserialize, Serialize};
use shakmaty::Color;
use std::collections::BTreeMap;

/// Summary of a game's analysis, derived from its evaluation records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub white_accuracy: f64,
    pub black_accuracy: f64,
    /// `(white, black)` count per class; every class is present.
    pub counts: BTreeMap<Classification, (usize, usize)>,
}

impl Default for GameSummary {
    fn default() -> Self {
        Self::fold(&[])
    }
}

impl GameSummary {
    /// Folds records into a summary.
    ///
    /// Even indices are White's plies, odd indices Black's. Accuracy is the
    /// mean over the side's records that carry one; a side without any
    /// scores 0.
    #[must_use]
    pub fn fold(records: &[EvaluationRecord]) -> Self {
        let mut counts: BTreeMap<Classification, (usize, usize)> =
            Classification::ALL.iter().map(|c| (*c, (0, 0))).collect();
        let mut sums = [(0.0, 0usize); 2];

        for (i, record) in records.iter().enumerate() {
            let side = i % 2;
            let entry = counts.entry(record.classification).or_default();
            if side == 0 {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
            if let Some(accuracy) = record.accuracy {
                sums[side].0 += accuracy;
                sums[side].1 += 1;
            }
        }

        let mean = |(sum, n): (f64, usize)| {
            if n == 0 {
                0.0
            } else {
                (sum / n as f64).clamp(0.0, 100.0)
            }
        };
        Self {
            white_accuracy: mean(sums[0]),
            black_accuracy: mean(sums[1]),
            counts,
        }
    }

    /// Accuracy for one side.
    #[must_use]
    pub fn accuracy(&self, color: Color) -> f64 {
        match color {
            Color::White => self.white_accuracy,
            Color::Black => self.black_accuracy,
        }
    }

    /// Number of `color`'s plies in `class`.
    #[must_use]
    pub fn count(&self, class: Classification, color: Color) -> usize {
        let (white, black) = self.counts.get(&class).copied().unwrap_or_default();
        match color {
            Color::White => white,
            Color::Black => black,
        }
    }
}
