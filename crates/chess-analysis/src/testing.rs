//! Scripted oracles for unit tests.

use crate::{EngineOptions, Limit, Oracle, OracleError, PrincipalLine, Score};

/// Oracle answering every query through a closure over the move history.
pub(crate) struct FnOracle<F> {
    pub respond: F,
    pub queries: Vec<Vec<String>>,
}

impl<F> FnOracle<F>
where
    F: FnMut(&[String], usize) -> Result<Vec<PrincipalLine>, OracleError> + Send,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            queries: Vec::new(),
        }
    }
}

impl<F> Oracle for FnOracle<F>
where
    F: FnMut(&[String], usize) -> Result<Vec<PrincipalLine>, OracleError> + Send,
{
    fn evaluate(
        &mut self,
        history: &[String],
        _limit: Limit,
        lines: usize,
    ) -> Result<Vec<PrincipalLine>, OracleError> {
        self.queries.push(history.to_vec());
        (self.respond)(history, lines)
    }

    fn best_move(
        &mut self,
        history: &[String],
        limit: Limit,
    ) -> Result<Option<String>, OracleError> {
        let lines = self.evaluate(history, limit, 1)?;
        Ok(lines.first().and_then(|l| l.moves.first().cloned()))
    }

    fn configure(&mut self, _options: &EngineOptions) -> Result<(), OracleError> {
        Ok(())
    }
}

/// A single line with `score` and a placeholder move.
pub(crate) fn line(score: Score) -> Vec<PrincipalLine> {
    vec![PrincipalLine {
        moves: vec!["a2a3".to_string()],
        score,
    }]
}

/// Oracle returning `scores[history.len()]` for every position.
pub(crate) fn by_depth(
    scores: Vec<Score>,
) -> FnOracle<impl FnMut(&[String], usize) -> Result<Vec<PrincipalLine>, OracleError> + Send> {
    FnOracle::new(move |history: &[String], _lines| {
        scores
            .get(history.len())
            .map(|s| line(*s))
            .ok_or_else(|| OracleError::QueryFailed(format!("no score scripted for ply {}", history.len())))
    })
}
