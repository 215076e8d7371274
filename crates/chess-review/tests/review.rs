//! Review sessions end to end: live evaluation, saving and reloading.

use chess_analysis::{
    Classification, EngineOptions, EvaluationPipeline, EvaluationRecord, Limit, Oracle,
    OracleError, PipelineOutcome, PrincipalLine, Score, ThresholdPolicy,
};
use chess_game::{Placement, Ply};
use chess_review::{AnalysisFile, ReviewError, ReviewSession};
use proptest::prelude::*;
use shakmaty::{Chess, Position};

/// Answers each query with the score scripted for that history length.
struct ScriptedOracle {
    scores: Vec<Option<i64>>,
}

impl Oracle for ScriptedOracle {
    fn evaluate(
        &mut self,
        history: &[String],
        _limit: Limit,
        _lines: usize,
    ) -> Result<Vec<PrincipalLine>, OracleError> {
        match self.scores.get(history.len()).copied().flatten() {
            Some(cp) => Ok(vec![PrincipalLine {
                moves: vec!["a2a3".to_string()],
                score: Score::Centipawns(cp),
            }]),
            None => Err(OracleError::QueryFailed("no score".to_string())),
        }
    }

    fn best_move(&mut self, history: &[String], limit: Limit) -> Result<Option<String>, OracleError> {
        let lines = self.evaluate(history, limit, 1)?;
        Ok(lines.first().and_then(|l| l.moves.first().cloned()))
    }

    fn configure(&mut self, _options: &EngineOptions) -> Result<(), OracleError> {
        Ok(())
    }
}

fn random_game(choices: &[usize]) -> Vec<Ply> {
    let mut pos = Chess::default();
    let mut plies = Vec::new();
    for &choice in choices {
        let moves = pos.legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice % moves.len()];
        plies.push(Ply::from_move(&pos, mv));
        pos.play_unchecked(mv);
    }
    plies
}

fn live_session(plies: &[Ply]) -> ReviewSession {
    let mut session = ReviewSession::new_live();
    for ply in plies {
        session.play(ply.uci()).unwrap();
    }
    session
}

#[test]
fn live_play_evaluates_new_plies() {
    let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());
    let mut oracle = ScriptedOracle {
        scores: vec![Some(20), Some(-15), Some(25), None, Some(5)],
    };
    let mut session = ReviewSession::new_live();
    let limit = Limit::millis(10);

    session.play_evaluated("e4", &pipeline, &mut oracle, limit).unwrap();
    session.play_evaluated("e5", &pipeline, &mut oracle, limit).unwrap();
    session.play_evaluated("Nf3", &pipeline, &mut oracle, limit).unwrap();

    let records = session.records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].classification, Classification::Best);
    assert_eq!(records[0].centipawns, Some(15));
    assert_eq!(records[0].best_move.as_deref(), Some("a2a3"));
    assert_eq!(records[1].classification, Classification::Best);
    // The position after the third ply has no scripted score.
    assert_eq!(records[2].classification, Classification::Unclassified);
    assert!(records[2].note.is_some());
}

#[test]
fn live_truncation_keeps_records_a_prefix() {
    let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());
    let mut oracle = ScriptedOracle {
        scores: vec![Some(20); 12],
    };
    let limit = Limit::millis(10);
    let mut session = ReviewSession::new_live();
    for mv in ["d4", "d5", "c4", "e6", "Nc3", "Nf6"] {
        session.play_evaluated(mv, &pipeline, &mut oracle, limit).unwrap();
    }
    assert_eq!(session.records().len(), 6);
    session.set_note(4, "Queen's Gambit Declined").unwrap();

    session.goto_index(2).unwrap();
    let placement = session
        .play_evaluated("Bf4", &pipeline, &mut oracle, limit)
        .unwrap();
    assert_eq!(
        placement,
        Placement::Mainline {
            index: 2,
            truncated: true
        }
    );
    assert_eq!(session.game().len(), 3);
    assert_eq!(session.records().len(), 3);
    assert!(session.notes().is_empty());
}

#[test]
fn saved_file_reloads_without_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.json");

    let mut session = ReviewSession::from_pgn(
        "[White \"Anderssen\"]\n[Black \"Kieseritzky\"]\n[Result \"*\"]\n\n1. e4 e5 2. f4 exf4 3. Bc4 Qh4+ *\n",
    )
    .unwrap();
    session.apply_analysis(PipelineOutcome {
        records: vec![
            EvaluationRecord::evaluated(30, Classification::Best, 100.0, None),
            EvaluationRecord::evaluated(-40, Classification::Good, 87.5, None),
            EvaluationRecord::evaluated(-90, Classification::Inaccuracy, 61.25, None),
            EvaluationRecord::failed("engine timed out"),
        ],
        cancelled: true,
    });
    session.set_note(2, "the King's Gambit").unwrap();
    session.save_analysis(&path).unwrap();

    let mut restored = ReviewSession::new_live();
    restored.load_analysis(&path).unwrap();
    assert_eq!(restored.plies(), session.plies());
    assert_eq!(restored.headers().white(), Some("Anderssen"));
    assert_eq!(restored.summary(), session.summary());
    assert_eq!(restored.notes(), session.notes());
    assert_eq!(restored.records().len(), 4);
    assert!(!restored.records()[3].is_classified());
    assert_eq!(restored.game().cursor().index, 0);
}

#[test]
fn stored_accuracies_are_kept_without_per_move_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.json");
    std::fs::write(
        &path,
        r#"{
            "pgn": "1. e4 c5 2. Nf3 *",
            "moves": ["e2e4", "c7c5", "g1f3"],
            "move_evaluations": ["✅", "👍", "❌"],
            "move_evaluations_scores": [30, -35, -150],
            "white_accuracy": 72.5,
            "black_accuracy": 88.25,
            "move_notes": {"1": "Sicilian"},
            "opening_name": "Sicilian Defense",
            "opening_eco": "B27"
        }"#,
    )
    .unwrap();

    let session = ReviewSession::from_analysis(&AnalysisFile::read(&path).unwrap()).unwrap();
    let summary = session.summary();
    assert_eq!(summary.white_accuracy, 72.5);
    assert_eq!(summary.black_accuracy, 88.25);
    assert_eq!(session.opening().map(|o| o.eco.as_str()), Some("B27"));
    assert_eq!(session.note(1), Some("Sicilian"));

    let resaved = session.to_analysis_file();
    assert_eq!(resaved.white_accuracy, 72.5);
    assert_eq!(resaved.black_accuracy, 88.25);
    assert_eq!(resaved.move_accuracies, None);
    assert_eq!(resaved.move_evaluations, ["✅", "👍", "❌"]);
}

#[test]
fn mismatched_move_list_is_rejected() {
    let file = AnalysisFile::from_json(
        r#"{"pgn": "1. e4 e5 *", "moves": ["d2d4", "d7d5"]}"#,
    )
    .unwrap();
    assert!(matches!(
        ReviewSession::from_analysis(&file),
        Err(ReviewError::Format(_))
    ));
}

#[test]
fn failed_analysis_load_keeps_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut session = live_session(&random_game(&[3, 1, 4, 1, 5]));
    assert!(matches!(
        session.load_analysis(&path),
        Err(ReviewError::Json(_))
    ));
    assert_eq!(session.game().len(), 5);
}

fn class_strategy() -> impl Strategy<Value = Classification> {
    prop::sample::select(Classification::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn analysis_file_round_trip(
        choices in prop::collection::vec(any::<usize>(), 1..30),
        evaluated in prop::collection::vec(
            (
                prop::option::of(-20_000i64..20_000),
                class_strategy(),
                prop::option::of(0u32..=400),
                prop::option::of("[a-h][1-8][a-h][1-8]"),
                prop::option::of("[a-z ]{1,20}"),
            ),
            0..30,
        ),
        note_at in prop::collection::vec((any::<usize>(), "[a-z ]{1,12}"), 0..4),
    ) {
        let plies = random_game(&choices);
        let mut session = live_session(&plies);

        let records: Vec<EvaluationRecord> = evaluated
            .into_iter()
            .take(plies.len())
            .map(|(centipawns, classification, quarters, best_move, note)| EvaluationRecord {
                centipawns,
                classification,
                note,
                accuracy: quarters.map(|q| f64::from(q) / 4.0),
                best_move,
            })
            .collect();
        session.apply_analysis(PipelineOutcome { records: records.clone(), cancelled: false });
        for (at, text) in note_at {
            if !text.trim().is_empty() {
                session.set_note(at % plies.len(), &text).unwrap();
            }
        }

        let json = session.to_analysis_file().to_json().unwrap();
        let file = AnalysisFile::from_json(&json).unwrap();
        let restored = ReviewSession::from_analysis(&file).unwrap();

        prop_assert_eq!(restored.plies(), plies);
        prop_assert_eq!(restored.notes(), session.notes());
        prop_assert_eq!(restored.summary(), session.summary());
        prop_assert_eq!(restored.records(), records.as_slice());
    }
}
