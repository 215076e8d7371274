//! Game records for review.
//!
//! This crate provides the navigable game model used by the review tool:
//! - [`Ply`] for a single half-move with its replay token and SAN
//! - [`MoveTree`], an arena holding the mainline and side variations
//! - [`Cursor`] and [`Game`] for navigation with full-replay board rebuilds
//! - [`Headers`] and the [`pgn`] module for game-record import and export
//!
//! Chess rules are delegated to `shakmaty`; nothing here decides legality on
//! its own.

mod cursor;
mod error;
mod game;
mod headers;
pub mod pgn;
mod ply;
mod replay;
mod tree;

pub use cursor::{Cursor, CursorState, Mode, VariationCursor};
pub use error::GameError;
pub use game::{Game, GameStatus, Placement};
pub use headers::{Headers, SEVEN_TAG_ROSTER};
pub use ply::Ply;
pub use replay::{position_key, replay, replay_uci};
pub use tree::{MoveTree, NodeId, NodeKind};

pub use shakmaty::{Chess, Color};
