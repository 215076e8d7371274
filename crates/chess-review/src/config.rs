//! Configuration file loading for game review.
//!
//! Settings live in `review.toml`. Every section and key is optional; a
//! missing file means all defaults.

use chess_analysis::{EngineOptions, Limit, ThresholdPolicy};
use chess_openings::{OpeningError, OpeningService, RemoteSource, TsvFileSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Engine executable and session-global engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable. When unset, `stockfish` is searched for on `PATH`
    /// and in common install directories.
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub options: EngineOptions,
}

/// Search limits used by the review commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Depth for single-position analysis. Zero means use `position_time_ms`.
    pub depth: u32,
    /// Number of candidate lines shown for a position.
    pub lines: usize,
    /// Per-query time for single-position analysis.
    pub position_time_ms: u64,
    /// Per-query time for full-game analysis.
    pub game_time_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: 20,
            lines: 3,
            position_time_ms: 100,
            game_time_ms: 100,
        }
    }
}

impl AnalysisConfig {
    /// Limit for the per-ply queries of a whole-game run.
    #[must_use]
    pub fn game_limit(&self) -> Limit {
        Limit::millis(self.game_time_ms)
    }

    /// Limit for analysing the position under the cursor.
    #[must_use]
    pub fn position_limit(&self) -> Limit {
        if self.depth > 0 {
            Limit::Depth(self.depth)
        } else {
            Limit::millis(self.position_time_ms)
        }
    }
}

/// Which opening table to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningSourceKind {
    #[default]
    Builtin,
    /// TSV files from `path` (a file or a directory of `*.tsv`).
    File,
    /// The lichess dataset, downloaded once into `cache_dir`.
    Remote,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningsConfig {
    pub source: OpeningSourceKind,
    pub path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl OpeningsConfig {
    /// Cache directory for downloaded tables, `.chess-review/openings` by default.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".chess-review").join("openings"))
    }

    /// Builds the opening service for the configured source. Nothing is
    /// loaded until the first lookup.
    ///
    /// # Errors
    ///
    /// Returns [`OpeningError::Io`] if a `file` source has no `path` or its
    /// directory cannot be listed.
    pub fn service(&self) -> Result<OpeningService, OpeningError> {
        match self.source {
            OpeningSourceKind::Builtin => Ok(OpeningService::builtin()),
            OpeningSourceKind::File => {
                let path = self.path.as_deref().ok_or_else(|| {
                    OpeningError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "openings.path is not set",
                    ))
                })?;
                let source = if path.is_dir() {
                    TsvFileSource::from_dir(path)?
                } else {
                    TsvFileSource::new([path])
                };
                Ok(OpeningService::new(source))
            }
            OpeningSourceKind::Remote => Ok(OpeningService::new(RemoteSource::new(self.cache_dir()))),
        }
    }
}

/// Main review configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub engine: EngineConfig,
    pub analysis: AnalysisConfig,
    pub scoring: ThresholdPolicy,
    pub openings: OpeningsConfig,
}

impl ReviewConfig {
    /// Loads the configuration from `path`, or from
    /// [`Self::config_path()`] when `None`.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map_or_else(Self::config_path, Path::to_path_buf);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = toml::from_str(&content)?;
            tracing::debug!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// Currently returns `review.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("review.toml")
    }
}
