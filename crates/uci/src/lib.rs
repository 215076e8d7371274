//! UCI (Universal Chess Interface) protocol library, GUI side.
//!
//! This crate provides the types a GUI needs to drive an external engine:
//! command formatting for the engine's stdin and parsing for the lines the
//! engine writes back.
//!
//! # Commands sent to the engine
//!
//! - `uci` / `uciok` - Handshake, engine sends id and options
//! - `isready` / `readyok` - Synchronization
//! - `setoption name <name> [value <v>]` - Configure the engine
//! - `position startpos [moves <move>...]` - Set position
//! - `go [movetime <ms>] [depth <d>]` - Start search
//! - `stop` - Stop search
//! - `quit` - Exit engine

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score, ScoreBound};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found. `None` when the engine answers `bestmove (none)`.
    BestMove {
        mv: Option<String>,
        ponder: Option<String>,
    },
    /// Option declaration, kept as the raw remainder of the line.
    Option(String),
    /// Anything else the engine prints.
    Unknown(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next().unwrap_or("") {
            "uciok" => EngineMessage::UciOk,
            "readyok" => EngineMessage::ReadyOk,
            "info" => match EngineInfo::parse(line) {
                Some(info) => EngineMessage::Info(info),
                None => EngineMessage::Unknown(line.to_string()),
            },
            "bestmove" => {
                let mv = parts
                    .next()
                    .filter(|m| *m != "(none)" && *m != "0000")
                    .map(str::to_string);
                let ponder = match parts.next() {
                    Some("ponder") => parts.next().map(str::to_string),
                    _ => None,
                };
                EngineMessage::BestMove { mv, ponder }
            }
            "id" => {
                let kind = parts.next();
                let rest = parts.collect::<Vec<_>>().join(" ");
                match kind {
                    Some("name") => EngineMessage::Id {
                        name: Some(rest),
                        author: None,
                    },
                    Some("author") => EngineMessage::Id {
                        name: None,
                        author: Some(rest),
                    },
                    _ => EngineMessage::Unknown(line.to_string()),
                }
            }
            "option" => EngineMessage::Option(parts.collect::<Vec<_>>().join(" ")),
            _ => EngineMessage::Unknown(line.to_string()),
        }
    }
}
