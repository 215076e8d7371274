//! Top candidate moves at a single position.

use crate::{AnalysisError, Limit, Oracle, Score};
use chess_game::{replay, Ply};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Position};
use std::fmt;

/// One engine line at the analysed position, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLine {
    /// 1-based rank, best first.
    pub rank: usize,
    /// Score from White's point of view.
    pub score: Score,
    /// The line in SAN, truncated at the first move that does not replay.
    pub san: Vec<String>,
    pub uci: Vec<String>,
}

impl fmt::Display for CandidateLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} {}", self.rank, self.score, self.san.join(" "))
    }
}

/// Asks the oracle for the `lines` best continuations after `history`.
///
/// # Errors
///
/// Returns [`AnalysisError::Game`] if `history` does not replay and
/// [`AnalysisError::Oracle`] if the query fails.
pub fn analyze_position(
    history: &[Ply],
    oracle: &mut dyn Oracle,
    limit: Limit,
    lines: usize,
) -> Result<Vec<CandidateLine>, AnalysisError> {
    let pos = replay(history)?;
    let moves: Vec<String> = history.iter().map(|p| p.uci().to_string()).collect();
    let found = oracle.evaluate(&moves, limit, lines.max(1))?;

    Ok(found
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let san = san_line(&pos, &line.moves);
            CandidateLine {
                rank: i + 1,
                score: line.score.white_relative(pos.turn()),
                uci: line.moves[..san.len()].to_vec(),
                san,
            }
        })
        .collect())
}

fn san_line(start: &Chess, moves: &[String]) -> Vec<String> {
    let mut pos = start.clone();
    let mut san = Vec::with_capacity(moves.len());
    for token in moves {
        let Some(mv) = token
            .parse::<UciMove>()
            .ok()
            .and_then(|u| u.to_move(&pos).ok())
        else {
            break;
        };
        san.push(Ply::from_move(&pos, mv).san().to_string());
        pos.play_unchecked(mv);
    }
    san
}
