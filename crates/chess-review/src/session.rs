//! One review tab: a game, its evaluations, the user's notes and the opening.

use crate::{AnalysisFile, ReviewError};
use chess_analysis::{
    AnalysisError, EvaluationPipeline, EvaluationRecord, GameSummary, Limit, Oracle,
    PipelineOutcome, ScoringPolicy,
};
use chess_game::pgn::{self, PlyAnnotation};
use chess_game::{replay_uci, Game, GameError, Headers, Mode, Placement, Ply};
use chess_openings::OpeningService;
use std::collections::BTreeMap;
use std::path::Path;

/// The opening a game was matched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningMatch {
    pub eco: String,
    pub name: String,
}

/// A game under review.
///
/// `records` always covers a prefix of the mainline: `records[i]` belongs
/// to mainline ply `i`. Notes are keyed by mainline ply index. Both follow
/// the mainline when live play truncates it.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    game: Game,
    headers: Headers,
    records: Vec<EvaluationRecord>,
    notes: BTreeMap<usize, String>,
    opening: Option<OpeningMatch>,
    /// Side accuracies read from a file that carried no per-ply accuracies.
    stored_accuracy: Option<(f64, f64)>,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new_live()
    }
}

impl ReviewSession {
    /// An empty game recorded move by move.
    #[must_use]
    pub fn new_live() -> Self {
        Self::with_game(Game::new(Mode::Live), Headers::new())
    }

    fn with_game(game: Game, headers: Headers) -> Self {
        Self {
            game,
            headers,
            records: Vec::new(),
            notes: BTreeMap::new(),
            opening: None,
            stored_accuracy: None,
        }
    }

    /// A finished game read from PGN text, positioned at the start.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Game`] if the text is not a valid game.
    pub fn from_pgn(text: &str) -> Result<Self, ReviewError> {
        let parsed = pgn::parse_game(text)?;
        let game = Game::from_plies(parsed.plies, Mode::Replay)?;
        let mut session = Self::with_game(game, parsed.headers);
        session.opening = header_opening(&session.headers);
        Ok(session)
    }

    /// A game restored from an analysis file without querying an engine.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Game`] if the moves do not replay and
    /// [`ReviewError::Format`] if the file contradicts itself.
    pub fn from_analysis(file: &AnalysisFile) -> Result<Self, ReviewError> {
        let plies = replay_uci(file.moves.as_slice())?;
        let headers = if file.pgn.trim().is_empty() {
            Headers::new()
        } else {
            let parsed = pgn::parse_game(&file.pgn)?;
            let recorded: Vec<&str> = parsed.plies.iter().map(Ply::uci).collect();
            if recorded != file.moves {
                return Err(ReviewError::Format(
                    "game text and move list disagree".to_string(),
                ));
            }
            parsed.headers
        };

        let records = file.records()?;
        let notes = file.notes()?;
        let game = Game::from_plies(plies, Mode::Replay)?;

        let mut session = Self::with_game(game, headers);
        session.records = records;
        session.notes = notes;
        session.opening = if file.opening_name.is_empty() && file.opening_eco.is_empty() {
            header_opening(&session.headers)
        } else {
            Some(OpeningMatch {
                eco: file.opening_eco.clone(),
                name: file.opening_name.clone(),
            })
        };
        if file.move_accuracies.is_none() && !session.records.is_empty() {
            session.stored_accuracy = Some((file.white_accuracy, file.black_accuracy));
        }
        Ok(session)
    }

    /// Replaces this session with the game in `text`.
    ///
    /// On error the session is left as it was.
    pub fn load_pgn(&mut self, text: &str) -> Result<(), ReviewError> {
        *self = Self::from_pgn(text)?;
        Ok(())
    }

    /// Replaces this session with the analysis file at `path`.
    ///
    /// On error the session is left as it was.
    pub fn load_analysis(&mut self, path: &Path) -> Result<(), ReviewError> {
        let file = AnalysisFile::read(path)?;
        *self = Self::from_analysis(&file)?;
        tracing::info!(
            "Loaded {} plies ({} evaluated) from {}",
            self.game.len(),
            self.records.len(),
            path.display()
        );
        Ok(())
    }

    /// The session as an analysis file.
    #[must_use]
    pub fn to_analysis_file(&self) -> AnalysisFile {
        let summary = self.summary();
        let mut file = AnalysisFile::with_records(
            self.export_pgn(),
            self.game.tree().uci_history(self.game.len()),
            &self.records,
            &summary,
            &self.notes,
        );
        if let Some(opening) = &self.opening {
            file.opening_eco = opening.eco.clone();
            file.opening_name = opening.name.clone();
        }
        if self.stored_accuracy.is_some() {
            file.move_accuracies = None;
        }
        file
    }

    pub fn save_analysis(&self, path: &Path) -> Result<(), ReviewError> {
        self.to_analysis_file().write(path)?;
        tracing::info!("Saved analysis to {}", path.display());
        Ok(())
    }

    /// PGN text of the mainline with classification glyphs and comments.
    ///
    /// A ply's comment holds its classification symbol followed by its note.
    #[must_use]
    pub fn export_pgn(&self) -> String {
        let annotations: Vec<PlyAnnotation> = (0..self.game.len())
            .map(|i| {
                let class = self.records.get(i).map(|r| r.classification);
                let symbol = class.map(|c| c.symbol()).unwrap_or("");
                let note = self.notes.get(&i).map(String::as_str).unwrap_or("");
                let comment = format!("{} {}", symbol, note).trim().to_string();
                PlyAnnotation {
                    glyph: class.and_then(|c| c.glyph()).map(str::to_string),
                    comment: (!comment.is_empty()).then_some(comment),
                }
            })
            .collect();

        let mut headers = self.headers.clone();
        if let Some(opening) = &self.opening {
            if headers.opening().is_none() && !opening.name.is_empty() {
                headers.set("Opening", opening.name.clone());
            }
            if headers.eco().is_none() && !opening.eco.is_empty() {
                headers.set("ECO", opening.eco.clone());
            }
        }
        pgn::write_game(&headers, self.game.mainline(), &annotations)
    }

    /// Plays a move (UCI or SAN) at the cursor.
    ///
    /// When live play truncates the mainline, the records and notes of the
    /// removed plies are dropped with it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if the move is not legal on the
    /// displayed board; nothing changes in that case.
    pub fn play(&mut self, mv: &str) -> Result<Placement, ReviewError> {
        let board = self.game.board();
        let ply = Ply::from_uci(board, mv).or_else(|_| Ply::from_san(board, mv))?;
        let placement = self.game.append(ply)?;
        if let Placement::Mainline {
            index,
            truncated: true,
        } = placement
        {
            self.forget_from(index);
        }
        Ok(placement)
    }

    /// Plays a move and evaluates it when it extends the mainline.
    ///
    /// The new ply is evaluated only if every earlier mainline ply already
    /// has a record. A failed query is stored as an unclassified record.
    pub fn play_evaluated<P: ScoringPolicy>(
        &mut self,
        mv: &str,
        pipeline: &EvaluationPipeline<P>,
        oracle: &mut dyn Oracle,
        limit: Limit,
    ) -> Result<Placement, ReviewError> {
        let placement = self.play(mv)?;
        let Placement::Mainline { index, .. } = placement else {
            return Ok(placement);
        };
        if self.records.len() != index {
            return Ok(placement);
        }

        let mainline = self.game.mainline();
        let history: Vec<Ply> = mainline[..index].iter().map(|p| (*p).clone()).collect();
        let ply = mainline[index].clone();
        let record = match pipeline.evaluate_ply(&history, &ply, oracle, limit) {
            Ok(record) => record,
            Err(AnalysisError::Oracle(e)) => {
                tracing::warn!("Live evaluation of ply {} failed: {}", index + 1, e);
                EvaluationRecord::failed(e.to_string())
            }
            Err(e) => return Err(e.into()),
        };
        self.records.push(record);
        self.stored_accuracy = None;
        Ok(placement)
    }

    /// Stores the results of a pipeline run over this game's mainline.
    pub fn apply_analysis(&mut self, outcome: PipelineOutcome) {
        let mut records = outcome.records;
        records.truncate(self.game.len());
        if outcome.cancelled {
            tracing::info!("Keeping {} records from a cancelled run", records.len());
        }
        self.records = records;
        self.stored_accuracy = None;
    }

    /// Attaches a note to mainline ply `index`. An empty note clears it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IndexOutOfRange`] if there is no such ply.
    pub fn set_note(&mut self, index: usize, note: &str) -> Result<(), ReviewError> {
        let len = self.game.len();
        if index >= len {
            return Err(GameError::IndexOutOfRange { index, len }.into());
        }
        if note.trim().is_empty() {
            self.notes.remove(&index);
        } else {
            self.notes.insert(index, note.to_string());
        }
        Ok(())
    }

    pub fn clear_note(&mut self, index: usize) -> Option<String> {
        self.notes.remove(&index)
    }

    /// Per-side accuracy and classification counts.
    #[must_use]
    pub fn summary(&self) -> GameSummary {
        let folded = GameSummary::fold(&self.records);
        match self.stored_accuracy {
            Some((white_accuracy, black_accuracy)) => GameSummary {
                white_accuracy,
                black_accuracy,
                ..folded
            },
            None => folded,
        }
    }

    /// Matches the mainline against the opening table.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Opening`] if the table cannot be loaded; the
    /// previous match is kept.
    pub fn detect_opening(
        &mut self,
        service: &OpeningService,
    ) -> Result<Option<&OpeningMatch>, ReviewError> {
        let played = self.game.tree().san_history(self.game.len());
        let found = service.lookup(&played)?.map(|entry| OpeningMatch {
            eco: entry.eco.clone(),
            name: entry.name.clone(),
        });
        match &found {
            Some(m) => tracing::debug!("Opening: {} {}", m.eco, m.name),
            None => tracing::debug!("No opening matches {} plies", played.len()),
        }
        self.opening = found;
        Ok(self.opening.as_ref())
    }

    /// Finishes a live game and hands it to review.
    pub fn finish(&mut self) {
        self.game.set_mode(Mode::Replay);
    }

    fn forget_from(&mut self, index: usize) {
        self.records.truncate(index);
        self.notes.split_off(&index);
        self.stored_accuracy = None;
        self.opening = None;
    }

    // Navigation

    pub fn goto_index(&mut self, index: usize) -> Result<(), ReviewError> {
        Ok(self.game.goto_index(index)?)
    }

    pub fn next(&mut self) -> bool {
        self.game.next()
    }

    pub fn prev(&mut self) -> bool {
        self.game.prev()
    }

    pub fn first(&mut self) -> bool {
        self.game.first()
    }

    pub fn last(&mut self) -> bool {
        self.game.last()
    }

    // Accessors

    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    #[must_use]
    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    /// Record of mainline ply `index`, `None` if not analysed yet.
    #[must_use]
    pub fn record(&self, index: usize) -> Option<&EvaluationRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn notes(&self) -> &BTreeMap<usize, String> {
        &self.notes
    }

    #[must_use]
    pub fn note(&self, index: usize) -> Option<&str> {
        self.notes.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn opening(&self) -> Option<&OpeningMatch> {
        self.opening.as_ref()
    }

    /// Mainline plies, for handing to the pipeline.
    #[must_use]
    pub fn plies(&self) -> Vec<Ply> {
        self.game.mainline().into_iter().cloned().collect()
    }
}

fn header_opening(headers: &Headers) -> Option<OpeningMatch> {
    let name = headers.opening()?;
    Some(OpeningMatch {
        eco: headers.eco().unwrap_or_default().to_string(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_analysis::Classification;

    const RUY_LOPEZ: &str = r#"[Event "Club night"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 1-0
"#;

    fn analysed() -> ReviewSession {
        let mut session = ReviewSession::from_pgn(RUY_LOPEZ).unwrap();
        session.apply_analysis(PipelineOutcome {
            records: vec![
                EvaluationRecord::evaluated(30, Classification::Best, 100.0, None),
                EvaluationRecord::evaluated(-25, Classification::Good, 90.0, None),
                EvaluationRecord::evaluated(40, Classification::Best, 98.0, None),
                EvaluationRecord::failed("engine timed out"),
            ],
            cancelled: true,
        });
        session
    }

    #[test]
    fn test_load_pgn_starts_at_beginning() {
        let session = ReviewSession::from_pgn(RUY_LOPEZ).unwrap();
        assert_eq!(session.game().len(), 6);
        assert_eq!(session.game().cursor().index, 0);
        assert_eq!(session.game().mode(), Mode::Replay);
        assert_eq!(session.headers().white(), Some("Alice"));
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_load_pgn_ignores_side_lines() {
        let session =
            ReviewSession::from_pgn("[Event \"x\"]\n\n1. e4 e5 2. Nf3 (2. f4 exf4) 2... Nc6 *")
                .unwrap();
        let sans: Vec<_> = session.plies().iter().map(|p| p.san().to_string()).collect();
        assert_eq!(sans, ["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn test_failed_load_keeps_session() {
        let mut session = analysed();
        session.set_note(2, "pin").unwrap();
        assert!(session.load_pgn("1. e4 e5 2. Ke3 *").is_err());
        assert_eq!(session.game().len(), 6);
        assert_eq!(session.records().len(), 4);
        assert_eq!(session.note(2), Some("pin"));
    }

    #[test]
    fn test_notes_need_an_existing_ply() {
        let mut session = analysed();
        session.set_note(5, "last move").unwrap();
        assert!(session.set_note(6, "past the end").is_err());
        session.set_note(5, "  ").unwrap();
        assert_eq!(session.note(5), None);
    }

    #[test]
    fn test_export_pgn_annotations() {
        let mut session = analysed();
        session.set_note(1, "solid").unwrap();
        session.set_note(4, "main line").unwrap();
        let text = session.export_pgn();
        let flat = text.replace('\n', " ");
        assert!(flat.contains("1. e4 {✅} 1... e5 {👍 solid} 2. Nf3 {✅} 2... Nc6"), "{}", text);
        assert!(flat.contains("3. Bb5 {main line} 3... a6 1-0"), "{}", text);
        assert!(text.trim_end().ends_with("1-0"));

        let reparsed = pgn::parse_game(&text).unwrap();
        assert_eq!(reparsed.plies.len(), 6);
        assert_eq!(reparsed.headers.black(), Some("Bob"));
    }

    #[test]
    fn test_live_truncation_drops_records_and_notes() {
        let mut session = ReviewSession::new_live();
        for mv in ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"] {
            session.play(mv).unwrap();
        }
        session.apply_analysis(PipelineOutcome {
            records: (0..6)
                .map(|i| EvaluationRecord::evaluated(i * 10, Classification::Best, 100.0, None))
                .collect(),
            cancelled: false,
        });
        session.set_note(1, "keep").unwrap();
        session.set_note(3, "drop").unwrap();

        session.goto_index(3).unwrap();
        let placement = session.play("d7d6").unwrap();
        assert_eq!(
            placement,
            Placement::Mainline {
                index: 3,
                truncated: true
            }
        );
        assert_eq!(session.game().len(), 4);
        assert_eq!(session.records().len(), 3);
        assert_eq!(session.note(1), Some("keep"));
        assert_eq!(session.note(3), None);
    }

    #[test]
    fn test_replay_mode_play_keeps_mainline() {
        let mut session = analysed();
        session.goto_index(2).unwrap();
        let placement = session.play("Bc4").unwrap();
        assert!(matches!(placement, Placement::Variation { branch: 2, .. }));
        assert_eq!(session.game().len(), 6);
        assert_eq!(session.records().len(), 4);
    }

    #[test]
    fn test_illegal_move_changes_nothing() {
        let mut session = analysed();
        assert!(matches!(
            session.play("e2e5"),
            Err(ReviewError::Game(GameError::IllegalMove { .. }))
        ));
        assert_eq!(session.game().cursor().index, 0);
    }

    #[test]
    fn test_detect_opening() {
        let mut session = ReviewSession::from_pgn(RUY_LOPEZ).unwrap();
        let service = OpeningService::builtin();
        let found = session.detect_opening(&service).unwrap().cloned().unwrap();
        assert_eq!(found.eco, "C70");
        assert_eq!(found.name, "Ruy Lopez: Morphy Defense");
    }

    #[test]
    fn test_summary_counts_by_side() {
        let summary = analysed().summary();
        assert_eq!(summary.white_accuracy, 99.0);
        assert_eq!(summary.black_accuracy, 90.0);
        assert_eq!(
            summary.count(Classification::Unclassified, chess_game::Color::Black),
            1
        );
    }
}
