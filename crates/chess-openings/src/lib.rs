//! Chess opening tables and lookup.
//!
//! This crate loads named opening lines (ECO code, name, SAN moves) from the
//! built-in table, local TSV files or the lichess dataset, and finds the
//! longest known line a game starts with.

pub mod builtin;
pub mod opening;
pub mod service;
pub mod source;
pub mod table;

use std::path::Path;
use thiserror::Error;

pub use opening::{san_tokens, OpeningEntry};
pub use service::OpeningService;
pub use source::{BuiltinSource, OpeningSource, RemoteSource, TsvFileSource};
pub use table::OpeningTable;

/// Errors that can occur when loading opening tables.
#[derive(Debug, Error)]
pub enum OpeningError {
    /// A row of the opening table could not be parsed.
    #[error("failed to parse opening table at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Failed to read or write an opening table file.
    #[error("failed to read opening table: {0}")]
    Io(#[from] std::io::Error),

    /// Downloading the dataset failed.
    #[error("failed to download opening table: {0}")]
    Http(#[from] reqwest::Error),
}

impl OpeningError {
    /// Adds the file name to a parse error.
    pub(crate) fn in_file(self, path: &Path) -> Self {
        match self {
            OpeningError::Parse { line, message } => OpeningError::Parse {
                line,
                message: format!("{} ({})", message, path.display()),
            },
            other => other,
        }
    }
}
