//! Navigation cursor.

use crate::NodeId;

/// Whether the game is being recorded or reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Moves are being played; appending below the end truncates the mainline.
    #[default]
    Live,
    /// A finished game is loaded; the mainline is immutable and new moves
    /// become variations.
    Replay,
}

/// Position of the cursor relative to the mainline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// `index == 0` (an empty game is always here).
    AtStart,
    /// `0 < index < len`.
    MidGame,
    /// `index == len` for a non-empty mainline.
    AtEnd,
}

/// Cursor inside a variation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariationCursor {
    /// Mainline index the variation replaces.
    pub branch: usize,
    /// Current node inside the variation.
    pub node: NodeId,
}

/// Currently displayed ply index and mode.
///
/// `index` counts plies applied from the start, so it ranges over
/// `[0, len(mainline)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub index: usize,
    pub mode: Mode,
    pub line: Option<VariationCursor>,
}

impl Cursor {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            index: 0,
            mode,
            line: None,
        }
    }

    /// Classifies the cursor against a mainline of length `len`.
    #[must_use]
    pub fn state(&self, len: usize) -> CursorState {
        if self.index == 0 {
            CursorState::AtStart
        } else if self.index >= len {
            CursorState::AtEnd
        } else {
            CursorState::MidGame
        }
    }

    #[must_use]
    pub fn in_variation(&self) -> bool {
        self.line.is_some()
    }
}
