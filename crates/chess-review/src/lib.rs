//! Chess game review.
//!
//! A [`ReviewSession`] holds one game together with its per-ply evaluations,
//! the reviewer's notes and the detected opening. Sessions are saved to and
//! restored from an [`AnalysisFile`] without running the engine again.

pub mod analysis_file;
pub mod config;
mod error;
pub mod session;

pub use analysis_file::AnalysisFile;
pub use config::{ConfigError, ReviewConfig};
pub use error::ReviewError;
pub use session::{OpeningMatch, ReviewSession};
