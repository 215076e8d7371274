//! Where opening tables come from.

use crate::builtin::builtin_openings;
use crate::table::parse_tsv;
use crate::{OpeningEntry, OpeningError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base URL of the lichess `chess-openings` dataset.
pub const LICHESS_BASE_URL: &str = "https://raw.githubusercontent.com/lichess-org/chess-openings/master";

/// Files making up the lichess dataset.
pub const LICHESS_FILES: [&str; 5] = ["a.tsv", "b.tsv", "c.tsv", "d.tsv", "e.tsv"];

/// A provider of opening rows.
pub trait OpeningSource {
    /// Loads every row. Called at most once per service.
    fn load(&self) -> Result<Vec<OpeningEntry>, OpeningError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// The table compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl OpeningSource for BuiltinSource {
    fn load(&self) -> Result<Vec<OpeningEntry>, OpeningError> {
        Ok(builtin_openings())
    }

    fn describe(&self) -> String {
        "built-in table".to_string()
    }
}

/// Local TSV files in the lichess layout.
#[derive(Debug, Clone)]
pub struct TsvFileSource {
    paths: Vec<PathBuf>,
}

impl TsvFileSource {
    pub fn new<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Every `*.tsv` file in `dir`, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns [`OpeningError::Io`] if the directory cannot be read.
    pub fn from_dir(dir: &Path) -> Result<Self, OpeningError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "tsv"))
            .collect();
        paths.sort();
        Ok(Self { paths })
    }
}

impl OpeningSource for TsvFileSource {
    fn load(&self) -> Result<Vec<OpeningEntry>, OpeningError> {
        let mut entries = Vec::new();
        for path in &self.paths {
            let text = fs::read_to_string(path)?;
            entries.extend(parse_tsv(&text).map_err(|e| e.in_file(path))?);
        }
        Ok(entries)
    }

    fn describe(&self) -> String {
        format!("{} TSV file(s)", self.paths.len())
    }
}

/// The lichess dataset, downloaded on first use and cached on disk.
///
/// Files already present in the cache directory are never downloaded again.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    cache_dir: PathBuf,
    base_url: String,
    timeout: Duration,
}

impl RemoteSource {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            base_url: LICHESS_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Whether every dataset file is already cached.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        LICHESS_FILES
            .iter()
            .all(|name| self.cache_dir.join(name).is_file())
    }

    fn fetch_missing(&self) -> Result<(), OpeningError> {
        let missing: Vec<&str> = LICHESS_FILES
            .iter()
            .copied()
            .filter(|name| !self.cache_dir.join(name).is_file())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.cache_dir)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        for name in missing {
            let url = format!("{}/{}", self.base_url.trim_end_matches('/'), name);
            tracing::info!("Downloading opening table {}", url);
            let text = client.get(&url).send()?.error_for_status()?.text()?;
            // Write to a temporary name first so a failed download never
            // leaves a truncated file that looks cached.
            let target = self.cache_dir.join(name);
            let partial = target.with_extension("tsv.part");
            fs::write(&partial, text)?;
            fs::rename(&partial, &target)?;
        }
        Ok(())
    }
}

impl OpeningSource for RemoteSource {
    fn load(&self) -> Result<Vec<OpeningEntry>, OpeningError> {
        self.fetch_missing()?;
        let paths = LICHESS_FILES.iter().map(|name| self.cache_dir.join(name));
        TsvFileSource::new(paths).load()
    }

    fn describe(&self) -> String {
        format!("lichess openings cached in {}", self.cache_dir.display())
    }
}
