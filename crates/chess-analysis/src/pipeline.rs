//! Ply-by-ply game evaluation.
//!
//! For every mainline ply the oracle is asked for the value of the position
//! before and after the move. The difference between the two, both seen from
//! the mover's side, is the move's centipawn loss, which the scoring policy
//! turns into a classification and an accuracy value.

use crate::{
    AnalysisError, EvaluationRecord, Limit, Oracle, OracleError, Score, ScoringPolicy,
    ThresholdPolicy,
};
use chess_game::{replay, Ply};
use shakmaty::{Chess, Position};
use std::sync::atomic::{AtomicBool, Ordering};

/// Plies processed so far out of the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

/// Records produced by a batch run.
///
/// `records` is a prefix of the mainline: one entry per processed ply, in
/// order. A cancelled run keeps everything computed before the cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub records: Vec<EvaluationRecord>,
    pub cancelled: bool,
}

/// Evaluates games ply by ply with a pluggable scoring policy.
#[derive(Debug, Clone, Default)]
pub struct EvaluationPipeline<P: ScoringPolicy = ThresholdPolicy> {
    policy: P,
}

impl<P: ScoringPolicy> EvaluationPipeline<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Scores a move from its pre- and post-move evaluations, both from the
    /// mover's point of view.
    #[must_use]
    pub fn score(&self, pre_eval: i64, post_eval: i64, best_move: Option<String>) -> EvaluationRecord {
        let eval_diff = (post_eval - pre_eval).abs();
        EvaluationRecord::evaluated(
            post_eval,
            self.policy.classify(eval_diff, pre_eval),
            self.policy.accuracy(eval_diff, pre_eval),
            best_move,
        )
    }

    /// Evaluates `ply` played after `history`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Game`] if the plies do not replay and
    /// [`AnalysisError::Oracle`] if either query fails.
    pub fn evaluate_ply(
        &self,
        history: &[Ply],
        ply: &Ply,
        oracle: &mut dyn Oracle,
        limit: Limit,
    ) -> Result<EvaluationRecord, AnalysisError> {
        let mut moves: Vec<String> = history.iter().map(|p| p.uci().to_string()).collect();
        let before = replay(history)?;
        let pre = match terminal_score(&before) {
            Some(score) => (score, None),
            None => first_line(oracle.evaluate(&moves, limit, 1)?)?,
        };

        moves.push(ply.uci().to_string());
        let after = replay(history.iter().chain(std::iter::once(ply)))?;
        let raw_after = match terminal_score(&after) {
            Some(score) => score,
            None => first_line(oracle.evaluate(&moves, limit, 1)?)?.0,
        };

        let pre_eval = pre.0.to_centipawns();
        // Negate the mapped value: `MateIn(0)` has no sign to flip.
        let post_eval = -raw_after.to_centipawns();
        Ok(self.score(pre_eval, post_eval, pre.1))
    }

    /// Evaluates every ply of `plies` in order.
    ///
    /// `cancel` is checked before each ply. A failed oracle query marks that
    /// ply `Unclassified` and the run continues; a ply that does not replay
    /// ends the run. Once the oracle reports itself unusable, the remaining
    /// plies are marked `Unclassified` without further queries.
    pub fn run(
        &self,
        plies: &[Ply],
        oracle: &mut dyn Oracle,
        limit: Limit,
        progress: &mut dyn FnMut(Progress),
        cancel: &AtomicBool,
    ) -> PipelineOutcome {
        let total = plies.len();
        let mut records = Vec::with_capacity(total);
        let mut lost: Option<String> = None;
        tracing::info!("Analyzing {} plies with limit {:?}", total, limit);

        for (i, ply) in plies.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                tracing::info!("Analysis cancelled after {} of {} plies", i, total);
                return PipelineOutcome {
                    records,
                    cancelled: true,
                };
            }

            if let Some(reason) = &lost {
                records.push(EvaluationRecord::failed(reason.clone()));
                progress(Progress { done: i + 1, total });
                continue;
            }

            match self.evaluate_ply(&plies[..i], ply, oracle, limit) {
                Ok(record) => {
                    tracing::debug!(
                        "Ply {} {}: {:?} ({:?} cp)",
                        i + 1,
                        ply.san(),
                        record.classification,
                        record.centipawns
                    );
                    records.push(record);
                }
                Err(AnalysisError::Oracle(e)) if e.is_fatal() => {
                    tracing::error!("Engine lost at ply {}: {}", i + 1, e);
                    records.push(EvaluationRecord::failed(e.to_string()));
                    lost = Some(format!("not analysed: {}", e));
                }
                Err(AnalysisError::Oracle(e)) => {
                    tracing::warn!("Ply {} {} left unclassified: {}", i + 1, ply.san(), e);
                    records.push(EvaluationRecord::failed(e.to_string()));
                }
                Err(e) => {
                    tracing::warn!("Stopping analysis at ply {}: {}", i + 1, e);
                    break;
                }
            }
            progress(Progress { done: i + 1, total });
        }

        PipelineOutcome {
            records,
            cancelled: false,
        }
    }
}

/// Scores positions the oracle has nothing to search in.
fn terminal_score(pos: &Chess) -> Option<Score> {
    if pos.is_checkmate() {
        Some(Score::MateIn(0))
    } else if pos.is_stalemate() || pos.is_insufficient_material() {
        Some(Score::Centipawns(0))
    } else {
        None
    }
}

fn first_line(
    lines: Vec<crate::PrincipalLine>,
) -> Result<(Score, Option<String>), OracleError> {
    let line = lines
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::QueryFailed("no principal line returned".to_string()))?;
    Ok((line.score, line.moves.into_iter().next()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{by_depth, line, FnOracle};
    use crate::Classification;
    use chess_game::replay_uci;
    use std::cell::Cell;

    fn ruy_lopez() -> Vec<Ply> {
        replay_uci(&["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"]).unwrap()
    }

    #[test]
    fn test_quiet_game_with_late_blunder() {
        // Side-to-move scores chosen so the losses are 5, 10, 8, 12 and 450.
        let scores = [20, -15, 25, -17, 5, 445]
            .into_iter()
            .map(Score::Centipawns)
            .collect();
        let mut oracle = by_depth(scores);
        let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());

        let outcome = pipeline.run(
            &ruy_lopez(),
            &mut oracle,
            Limit::default(),
            &mut |_| {},
            &AtomicBool::new(false),
        );

        let classes: Vec<_> = outcome.records.iter().map(|r| r.classification).collect();
        assert_eq!(
            classes,
            vec![
                Classification::Best,
                Classification::Best,
                Classification::Best,
                Classification::Best,
                Classification::Blunder,
            ]
        );
        assert_eq!(outcome.records[0].centipawns, Some(15));
        assert_eq!(outcome.records[4].centipawns, Some(-445));
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_each_ply_queries_before_and_after() {
        let mut oracle = by_depth(vec![Score::Centipawns(0); 6]);
        let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());
        pipeline.run(
            &ruy_lopez()[..2],
            &mut oracle,
            Limit::default(),
            &mut |_| {},
            &AtomicBool::new(false),
        );

        let lens: Vec<_> = oracle.queries.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![0, 1, 1, 2]);
        assert_eq!(oracle.queries[3], vec!["e2e4", "e7e5"]);
    }

    #[test]
    fn test_failed_query_leaves_ply_unclassified() {
        let mut oracle = FnOracle::new(|history: &[String], _| {
            if history.len() == 2 {
                Err(OracleError::QueryTimedOut(std::time::Duration::from_millis(100)))
            } else {
                Ok(line(Score::Centipawns(10)))
            }
        });
        let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());
        let outcome = pipeline.run(
            &ruy_lopez(),
            &mut oracle,
            Limit::default(),
            &mut |_| {},
            &AtomicBool::new(false),
        );

        assert_eq!(outcome.records.len(), 5);
        // Position after ply 2 is both the "after" of ply 2 and the "before" of ply 3.
        assert!(!outcome.records[1].is_classified());
        assert!(!outcome.records[2].is_classified());
        assert_eq!(outcome.records[1].centipawns, None);
        assert!(outcome.records[1].note.as_deref().unwrap().contains("timed out"));
        assert!(outcome.records[3].is_classified());
    }

    #[test]
    fn test_lost_engine_is_not_queried_again() {
        let mut oracle = FnOracle::new(|history: &[String], _| {
            if history.len() == 2 {
                Err(OracleError::EngineUnavailable("engine ignored stop".to_string()))
            } else {
                Ok(line(Score::Centipawns(10)))
            }
        });
        let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());
        let mut reported = Vec::new();
        let outcome = pipeline.run(
            &ruy_lopez(),
            &mut oracle,
            Limit::default(),
            &mut |p| reported.push(p.done),
            &AtomicBool::new(false),
        );

        assert_eq!(outcome.records.len(), 5);
        assert!(outcome.records[0].is_classified());
        assert!(outcome.records[1..].iter().all(|r| !r.is_classified()));
        assert!(outcome.records[1].note.as_deref().unwrap().contains("ignored stop"));
        assert!(outcome.records[4].note.as_deref().unwrap().starts_with("not analysed"));
        // Ply 1: before and after. Ply 2: before, then the failing after query.
        assert_eq!(oracle.queries.len(), 4);
        assert_eq!(reported, vec![1, 2, 3, 4, 5]);
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_cancel_keeps_partial_records() {
        let mut oracle = by_depth(vec![Score::Centipawns(0); 6]);
        let cancel = AtomicBool::new(false);
        let seen = Cell::new(0);
        let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());

        let outcome = pipeline.run(
            &ruy_lopez(),
            &mut oracle,
            Limit::default(),
            &mut |p| {
                seen.set(p.done);
                assert_eq!(p.total, 5);
                if p.done == 2 {
                    cancel.store(true, Ordering::SeqCst);
                }
            },
            &cancel,
        );

        assert!(outcome.cancelled);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_checkmate_is_scored_without_oracle() {
        let plies = replay_uci(&["f2f3", "e7e5", "g2g4", "d8h4"]).unwrap();
        let mut oracle = FnOracle::new(|history: &[String], _| match history.len() {
            3 => Ok(line(Score::MateIn(1))),
            4 => Err(OracleError::QueryFailed("mated position queried".to_string())),
            _ => Ok(line(Score::Centipawns(0))),
        });
        let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());

        let record = pipeline
            .evaluate_ply(&plies[..3], &plies[3], &mut oracle, Limit::default())
            .unwrap();

        assert_eq!(record.centipawns, Some(20_000));
        assert_eq!(record.classification, Classification::Best);
        assert_eq!(oracle.queries.len(), 1);
    }

    #[test]
    fn test_missing_mate_is_a_blunder() {
        // Mover had mate in 1 but played a quiet move.
        let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());
        let record = pipeline.score(Score::MateIn(1).to_centipawns(), 300, None);
        assert_eq!(record.classification, Classification::Blunder);
        assert!(record.accuracy.unwrap() < 1.0);
    }

    #[test]
    fn test_best_move_is_recorded() {
        let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());
        let plies = ruy_lopez();
        let mut oracle = FnOracle::new(|_: &[String], _| {
            Ok(vec![crate::PrincipalLine {
                moves: vec!["d2d4".to_string(), "e5d4".to_string()],
                score: Score::Centipawns(30),
            }])
        });
        let record = pipeline
            .evaluate_ply(&plies[..2], &plies[2], &mut oracle, Limit::default())
            .unwrap();
        assert_eq!(record.best_move.as_deref(), Some("d2d4"));
    }
}
