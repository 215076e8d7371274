//! Deterministic position reconstruction.
//!
//! Boards are never updated incrementally during navigation: every request
//! replays the plies from the standard starting position.

use crate::ply::to_move;
use crate::{GameError, Ply};
use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position};

/// Replays `plies` from the starting position.
///
/// # Errors
///
/// Returns [`GameError::IllegalMove`] naming the first ply that is not legal.
pub fn replay<'a, I>(plies: I) -> Result<Chess, GameError>
where
    I: IntoIterator<Item = &'a Ply>,
{
    let mut pos = Chess::default();
    for ply in plies {
        let mv = to_move(&pos, ply.uci())?;
        pos.play_unchecked(mv);
    }
    Ok(pos)
}

/// Replays raw UCI tokens from the starting position, returning every ply.
///
/// # Errors
///
/// Returns [`GameError::IllegalMove`] naming the first token that is not legal.
pub fn replay_uci<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Ply>, GameError> {
    let mut pos = Chess::default();
    let mut plies = Vec::with_capacity(tokens.len());
    for token in tokens {
        let ply = Ply::from_uci(&pos, token.as_ref())?;
        let mv = to_move(&pos, ply.uci())?;
        pos.play_unchecked(mv);
        plies.push(ply);
    }
    Ok(plies)
}

/// Repetition key: placement, side to move, castling and en passant.
#[must_use]
pub fn position_key(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// FEN of `pos` including move counters.
pub(crate) fn fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}
