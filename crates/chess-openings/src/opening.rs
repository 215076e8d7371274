//! Core opening types and move-text tokenizing.

use serde::{Deserialize, Serialize};

/// Game results that may close a move-text field.
const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// A named opening line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningEntry {
    /// The ECO code for this opening (e.g., "B20", "C44").
    pub eco: String,
    /// The name of the opening.
    pub name: String,
    /// The sequence of moves in SAN, without move numbers.
    pub moves: Vec<String>,
}

impl OpeningEntry {
    /// Creates a new opening with the given ECO code, name, and moves.
    #[must_use]
    pub fn new(eco: impl Into<String>, name: impl Into<String>, moves: Vec<String>) -> Self {
        Self {
            eco: eco.into(),
            name: name.into(),
            moves,
        }
    }

    /// Creates an opening from PGN move text such as `1. e4 e5 2. Nf3`.
    #[must_use]
    pub fn from_pgn(eco: impl Into<String>, name: impl Into<String>, pgn: &str) -> Self {
        Self::new(eco, name, san_tokens(pgn))
    }

    /// Number of plies in the line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Whether `played` starts with this line, token for token.
    #[must_use]
    pub fn is_prefix_of<S: AsRef<str>>(&self, played: &[S]) -> bool {
        self.moves.len() <= played.len()
            && self
                .moves
                .iter()
                .zip(played)
                .all(|(expected, actual)| expected == actual.as_ref())
    }

    /// The line as numbered move text.
    #[must_use]
    pub fn pgn(&self) -> String {
        let mut out = Vec::with_capacity(self.moves.len() * 3 / 2);
        for (i, san) in self.moves.iter().enumerate() {
            if i % 2 == 0 {
                out.push(format!("{}.", i / 2 + 1));
            }
            out.push(san.clone());
        }
        out.join(" ")
    }
}

/// Splits PGN move text into SAN tokens.
///
/// Move numbers (`1.`, `12...`, also glued forms like `3.e4`), result
/// tokens and NAGs (`$1`) are dropped.
#[must_use]
pub fn san_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|token| {
            let token = strip_move_number(token);
            if token.is_empty() || token.starts_with('$') || RESULT_TOKENS.contains(&token) {
                None
            } else {
                Some(token.to_string())
            }
        })
        .collect()
}

fn strip_move_number(token: &str) -> &str {
    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || !token[digits..].starts_with('.') {
        return token;
    }
    token[digits..].trim_start_matches('.')
}
