//! Discrete move-quality classes.

use serde::{Deserialize, Serialize};

/// Classification of a played move by centipawn loss.
///
/// Ordered from best to worst; `Unclassified` (analysis failed or not run)
/// sorts after every real class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Classification {
    Best,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
    Unclassified,
}

impl Classification {
    /// Every class, in order.
    pub const ALL: [Classification; 6] = [
        Classification::Best,
        Classification::Good,
        Classification::Inaccuracy,
        Classification::Mistake,
        Classification::Blunder,
        Classification::Unclassified,
    ];

    /// Symbol persisted in analysis files and shown next to moves.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Classification::Best => "✅",
            Classification::Good => "👍",
            Classification::Inaccuracy => "⚠️",
            Classification::Mistake => "❌",
            Classification::Blunder => "🔥",
            Classification::Unclassified => "",
        }
    }

    /// Parses a persisted symbol. Unknown symbols read as `Unclassified`.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Self {
        // Accept the warning sign with or without its variation selector.
        match symbol.trim() {
            "✅" => Classification::Best,
            "👍" => Classification::Good,
            "⚠️" | "⚠" => Classification::Inaccuracy,
            "❌" => Classification::Mistake,
            "🔥" => Classification::Blunder,
            _ => Classification::Unclassified,
        }
    }

    /// PGN move-quality glyph, if the class has one.
    #[must_use]
    pub fn glyph(self) -> Option<&'static str> {
        match self {
            Classification::Inaccuracy => Some("?!"),
            Classification::Mistake => Some("?"),
            Classification::Blunder => Some("??"),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Classification::Best => "Best",
            Classification::Good => "Good",
            Classification::Inaccuracy => "Inaccuracy",
            Classification::Mistake => "Mistake",
            Classification::Blunder => "Blunder",
            Classification::Unclassified => "Unclassified",
        }
    }
}
