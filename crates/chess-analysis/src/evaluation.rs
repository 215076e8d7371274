//! Position scores and their centipawn mapping.

use serde::{Deserialize, Serialize};
use shakmaty::Color;
use std::fmt;

/// Centipawn value of "mate right now"; longer mates step down from here.
pub const MATE_VALUE: i64 = 20_000;

/// Centipawns subtracted per ply of mate distance.
pub const MATE_STEP: i64 = 10;

/// Mate distances beyond this are treated as this distance.
pub const MAX_MATE_DISTANCE: i64 = 999;

/// Centipawn scores are clamped to this magnitude so every mate value
/// orders strictly beyond every material score.
pub const MAX_CENTIPAWNS: i64 = 9_999;

/// Oracle score relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Score {
    /// Signed centipawns; positive favours the side to move.
    Centipawns(i64),
    /// Forced mate in `k` plies; positive when the side to move mates,
    /// `MateIn(0)` when the side to move is already checkmated.
    MateIn(i32),
}

impl Score {
    /// Maps the score onto one totally ordered centipawn axis.
    ///
    /// Mates saturate near [`MATE_VALUE`] and lose [`MATE_STEP`] per ply of
    /// distance, so a shorter mate is always more extreme than a longer one,
    /// symmetrically for both sides.
    #[must_use]
    pub fn to_centipawns(self) -> i64 {
        match self {
            Score::Centipawns(cp) => cp.clamp(-MAX_CENTIPAWNS, MAX_CENTIPAWNS),
            Score::MateIn(k) => {
                let distance = i64::from(k).abs().min(MAX_MATE_DISTANCE);
                let value = MATE_VALUE - MATE_STEP * distance;
                if k > 0 {
                    value
                } else {
                    -value
                }
            }
        }
    }

    /// The same score seen from the other side.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::MateIn(k) => Score::MateIn(-k),
        }
    }

    /// Re-expresses a side-to-move score from White's point of view.
    #[must_use]
    pub fn white_relative(self, turn: Color) -> Self {
        match turn {
            Color::White => self,
            Color::Black => self.negate(),
        }
    }

    #[must_use]
    pub fn is_mate(self) -> bool {
        matches!(self, Score::MateIn(_))
    }
}

impl From<uci::Score> for Score {
    fn from(score: uci::Score) -> Self {
        match score {
            uci::Score::Cp(cp) => Score::Centipawns(i64::from(cp)),
            uci::Score::Mate(m) => Score::MateIn(m),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            Score::MateIn(k) => write!(f, "#{}", k),
        }
    }
}
