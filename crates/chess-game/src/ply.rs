//! Half-move representation.

use crate::GameError;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, Move, Position};
use std::fmt;

/// One half-move of a game.
///
/// Holds the UCI token used to replay the move and its SAN form (with `+`/`#`
/// suffix) for display and export. A `Ply` is only ever built against the
/// position it is played from, so a stored ply is legal at its node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ply {
    uci: String,
    san: String,
}

impl Ply {
    /// Builds a ply from a legal move in `pos`.
    #[must_use]
    pub fn from_move(pos: &Chess, mv: Move) -> Self {
        let san = San::from_move(pos, mv).to_string();
        let mut after = pos.clone();
        after.play_unchecked(mv);
        let suffix = if after.is_checkmate() {
            "#"
        } else if after.is_check() {
            "+"
        } else {
            ""
        };

        Self {
            uci: mv.to_uci(CastlingMode::Standard).to_string(),
            san: format!("{}{}", san, suffix),
        }
    }

    /// Parses a SAN token (suffixes optional) against `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if the token is malformed, ambiguous
    /// or illegal in `pos`.
    pub fn from_san(pos: &Chess, san: &str) -> Result<Self, GameError> {
        let mv = san
            .parse::<SanPlus>()
            .ok()
            .and_then(|sp| sp.san.to_move(pos).ok())
            .ok_or_else(|| illegal(pos, san))?;
        Ok(Self::from_move(pos, mv))
    }

    /// Parses a UCI token (e.g. `e2e4`, `e7e8q`, `e1g1`) against `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if the token is malformed or illegal in `pos`.
    pub fn from_uci(pos: &Chess, uci: &str) -> Result<Self, GameError> {
        let mv = to_move(pos, uci)?;
        Ok(Self::from_move(pos, mv))
    }

    /// The UCI replay token.
    #[must_use]
    pub fn uci(&self) -> &str {
        &self.uci
    }

    /// The SAN form, including check or mate suffix.
    #[must_use]
    pub fn san(&self) -> &str {
        &self.san
    }
}

impl fmt::Display for Ply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.san)
    }
}

/// Resolves a UCI token to a legal move in `pos`.
pub(crate) fn to_move(pos: &Chess, uci: &str) -> Result<Move, GameError> {
    uci.parse::<UciMove>()
        .ok()
        .and_then(|u| u.to_move(pos).ok())
        .ok_or_else(|| illegal(pos, uci))
}

/// Zero-based ply number of the side to move in `pos`.
pub(crate) fn ply_number(pos: &Chess) -> usize {
    let full = pos.fullmoves().get() as usize;
    (full - 1) * 2 + usize::from(pos.turn() == Color::Black)
}

fn illegal(pos: &Chess, token: &str) -> GameError {
    GameError::IllegalMove {
        token: token.to_string(),
        ply: ply_number(pos),
    }
}
