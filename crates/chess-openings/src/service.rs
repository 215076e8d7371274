//! Load-once access to an opening table.

use crate::source::{BuiltinSource, OpeningSource};
use crate::{OpeningEntry, OpeningError, OpeningTable};
use std::sync::{Mutex, OnceLock};

/// Owns an [`OpeningSource`] and the table loaded from it.
///
/// The table is loaded on the first [`ensure_loaded`](Self::ensure_loaded)
/// or [`lookup`](Self::lookup) and is read-only afterwards; concurrent first
/// calls load it once. A failed load is not cached, so a later call retries.
pub struct OpeningService {
    source: Box<dyn OpeningSource + Send + Sync>,
    table: OnceLock<OpeningTable>,
    loading: Mutex<()>,
}

impl OpeningService {
    pub fn new<S>(source: S) -> Self
    where
        S: OpeningSource + Send + Sync + 'static,
    {
        Self {
            source: Box::new(source),
            table: OnceLock::new(),
            loading: Mutex::new(()),
        }
    }

    /// A service over the built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(BuiltinSource)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// Loads the table if needed and returns it.
    ///
    /// # Errors
    ///
    /// Returns the source's error if loading fails.
    pub fn ensure_loaded(&self) -> Result<&OpeningTable, OpeningError> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }

        // The guard protects nothing but the load itself, so poisoning is harmless.
        let _guard = self
            .loading
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(table) = self.table.get() {
            return Ok(table);
        }

        tracing::info!("Loading openings from {}", self.source.describe());
        let table = OpeningTable::new(self.source.load()?);
        tracing::info!("Loaded {} openings", table.len());
        Ok(self.table.get_or_init(|| table))
    }

    /// Finds the opening for the played SAN sequence.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the table has to be loaded and loading
    /// fails.
    pub fn lookup<S: AsRef<str>>(&self, played: &[S]) -> Result<Option<&OpeningEntry>, OpeningError> {
        Ok(self.ensure_loaded()?.lookup(played))
    }
}

impl std::fmt::Debug for OpeningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpeningService")
            .field("source", &self.source.describe())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
