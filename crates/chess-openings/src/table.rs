//! Opening table storage and lookup.

use crate::{OpeningEntry, OpeningError};
use std::cmp::Ordering;

/// Read-only table of named opening lines.
///
/// Lookups return the longest entry whose moves are a prefix of the played
/// sequence. Equal-length candidates are ordered by ECO code, then by name,
/// then by table position, so the result never depends on how the source
/// happened to order its rows beyond that.
#[derive(Debug, Clone, Default)]
pub struct OpeningTable {
    entries: Vec<OpeningEntry>,
}

impl OpeningTable {
    /// Creates a table. Entries without moves are dropped: they would match
    /// every game.
    #[must_use]
    pub fn new(entries: Vec<OpeningEntry>) -> Self {
        let entries = entries.into_iter().filter(|e| !e.is_empty()).collect();
        Self { entries }
    }

    /// Parses tab-separated rows of `eco`, `name` and PGN move text.
    ///
    /// A leading `eco\tname\tpgn` header row and blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`OpeningError::Parse`] for a row with fewer than three fields.
    pub fn from_tsv(text: &str) -> Result<Self, OpeningError> {
        Ok(Self::new(parse_tsv(text)?))
    }

    /// Returns the number of openings in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table contains no openings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all openings in the table.
    #[must_use]
    pub fn entries(&self) -> &[OpeningEntry] {
        &self.entries
    }

    /// Finds the opening played in `played` (SAN tokens).
    #[must_use]
    pub fn lookup<S: AsRef<str>>(&self, played: &[S]) -> Option<&OpeningEntry> {
        let mut best: Option<&OpeningEntry> = None;
        for entry in self.entries.iter().filter(|e| e.is_prefix_of(played)) {
            best = match best {
                Some(current) if rank(current, entry) != Ordering::Greater => Some(current),
                _ => Some(entry),
            };
        }
        best
    }

    /// Finds all openings matching an ECO code prefix.
    ///
    /// For example, `by_eco("C5")` would match "C50", "C51", etc.
    #[must_use]
    pub fn by_eco(&self, eco_prefix: &str) -> Vec<&OpeningEntry> {
        self.entries
            .iter()
            .filter(|o| o.eco.starts_with(eco_prefix))
            .collect()
    }

    /// Searches for openings by name (case-insensitive substring match).
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&OpeningEntry> {
        let query_lower = query.to_lowercase();
        self.entries
            .iter()
            .filter(|o| o.name.to_lowercase().contains(&query_lower))
            .collect()
    }
}

/// `Less` when `a` should be preferred over `b`. Earlier entries win full ties.
fn rank(a: &OpeningEntry, b: &OpeningEntry) -> Ordering {
    b.len()
        .cmp(&a.len())
        .then_with(|| a.eco.cmp(&b.eco))
        .then_with(|| a.name.cmp(&b.name))
}

pub(crate) fn parse_tsv(text: &str) -> Result<Vec<OpeningEntry>, OpeningError> {
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || (i == 0 && line.starts_with("eco\t")) {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(eco), Some(name), Some(pgn)) => {
                entries.push(OpeningEntry::from_pgn(eco.trim(), name.trim(), pgn));
            }
            _ => {
                return Err(OpeningError::Parse {
                    line: i + 1,
                    message: "expected eco, name and pgn separated by tabs".to_string(),
                })
            }
        }
    }
    Ok(entries)
}
