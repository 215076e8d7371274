//! Game-record header tags.

/// Tags every exported game carries, in export order.
pub const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Ordered PGN header tags.
///
/// The Seven Tag Roster is always iterated first, followed by any other tag in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    tags: Vec<(String, String)>,
}

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a tag value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a tag, replacing any earlier value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.tags.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.tags.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.tags.iter().position(|(n, _)| n == name)?;
        Some(self.tags.remove(pos).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterates roster tags first, then the rest in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let roster = SEVEN_TAG_ROSTER
            .iter()
            .filter_map(move |name| self.get(name).map(|v| (*name, v)));
        let rest = self
            .tags
            .iter()
            .filter(|(n, _)| !SEVEN_TAG_ROSTER.contains(&n.as_str()))
            .map(|(n, v)| (n.as_str(), v.as_str()));
        roster.chain(rest)
    }

    #[must_use]
    pub fn white(&self) -> Option<&str> {
        self.get("White")
    }

    #[must_use]
    pub fn black(&self) -> Option<&str> {
        self.get("Black")
    }

    #[must_use]
    pub fn white_elo(&self) -> Option<u32> {
        self.get("WhiteElo").and_then(|v| v.trim().parse().ok())
    }

    #[must_use]
    pub fn black_elo(&self) -> Option<u32> {
        self.get("BlackElo").and_then(|v| v.trim().parse().ok())
    }

    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.get("Date")
    }

    /// The `Result` tag, `*` when absent.
    #[must_use]
    pub fn result(&self) -> &str {
        self.get("Result").unwrap_or("*")
    }

    #[must_use]
    pub fn termination(&self) -> Option<&str> {
        self.get("Termination")
    }

    #[must_use]
    pub fn opening(&self) -> Option<&str> {
        self.get("Opening")
    }

    #[must_use]
    pub fn eco(&self) -> Option<&str> {
        self.get("ECO")
    }
}
