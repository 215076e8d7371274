//! Game analysis with a pluggable position evaluator.
//!
//! This crate evaluates every ply of a game, classifies move quality and
//! aggregates per-side accuracy.
//!
//! # Overview
//!
//! - [`Score`] - Oracle score (centipawns or mate) and its centipawn mapping
//! - [`Classification`] - Move quality class (Best, Good, Inaccuracy, ...)
//! - [`ScoringPolicy`] - Thresholds and accuracy curve, swappable
//! - [`Oracle`] - Position evaluator seam; [`UciOracle`] drives Stockfish
//! - [`EvaluationPipeline`] - Per-ply evaluation of a whole game
//! - [`AnalysisTask`] - The pipeline on a background worker with progress
//! - [`GameSummary`] - Per-side accuracy and classification counts
//!
//! # Example
//!
//! ```ignore
//! use chess_analysis::{locate_engine, EvaluationPipeline, GameSummary, Limit, ThresholdPolicy, UciOracle};
//! use std::sync::atomic::AtomicBool;
//!
//! let path = locate_engine(None).expect("stockfish installed");
//! let mut oracle = UciOracle::spawn(&path)?;
//! let pipeline = EvaluationPipeline::new(ThresholdPolicy::default());
//! let outcome = pipeline.run(&plies, &mut oracle, Limit::millis(100), &mut |_| {}, &AtomicBool::new(false));
//! let summary = GameSummary::fold(&outcome.records);
//! println!("White accuracy: {:.1}%", summary.white_accuracy);
//! ```

pub mod classification;
pub mod engine;
mod error;
pub mod evaluation;
pub mod locate;
pub mod oracle;
pub mod pipeline;
pub mod policy;
pub mod position;
pub mod record;
pub mod summary;
pub mod task;
#[cfg(test)]
mod testing;

pub use classification::Classification;
pub use engine::UciOracle;
pub use error::AnalysisError;
pub use evaluation::Score;
pub use locate::{engine_search_dirs, locate_engine};
pub use oracle::{EngineOptions, Limit, Oracle, OracleError, PrincipalLine, SharedOracle};
pub use pipeline::{EvaluationPipeline, PipelineOutcome, Progress};
pub use policy::{ScoringPolicy, ThresholdPolicy};
pub use position::{analyze_position, CandidateLine};
pub use record::EvaluationRecord;
pub use summary::GameSummary;
pub use task::{AnalysisEvent, AnalysisTask};
