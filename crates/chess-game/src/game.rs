//! A game under review: move tree, cursor and the displayed board.

use crate::ply::to_move;
use crate::replay::{fen, position_key};
use crate::{replay, Cursor, CursorState, GameError, Mode, MoveTree, NodeId, Ply, VariationCursor};
use shakmaty::{Chess, Color, Position};

/// Terminal condition of the displayed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

impl GameStatus {
    #[must_use]
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }
}

/// Where an appended ply ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Added to the mainline at `index`; `truncated` is set when a tail was
    /// removed first.
    Mainline { index: usize, truncated: bool },
    /// The ply equals the recorded mainline move, so the cursor just advanced.
    FollowedMainline { index: usize },
    /// Added to (or found in) a variation branching at `branch`.
    Variation { branch: usize, node: NodeId },
}

/// Move tree plus cursor plus the board shown at the cursor.
///
/// Every navigation rebuilds the board by replaying from the starting
/// position. Rejected requests leave tree, cursor and board untouched.
#[derive(Debug, Clone)]
pub struct Game {
    tree: MoveTree,
    cursor: Cursor,
    board: Chess,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Mode::Live)
    }
}

impl Game {
    /// Creates an empty game.
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            tree: MoveTree::new(),
            cursor: Cursor::new(mode),
            board: Chess::default(),
        }
    }

    /// Creates a game from a recorded mainline, positioned at the start.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if the plies do not replay.
    pub fn from_plies(plies: Vec<Ply>, mode: Mode) -> Result<Self, GameError> {
        replay(&plies)?;
        Ok(Self {
            tree: MoveTree::from_plies(plies),
            cursor: Cursor::new(mode),
            board: Chess::default(),
        })
    }

    #[must_use]
    pub fn tree(&self) -> &MoveTree {
        &self.tree
    }

    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The board at the cursor.
    #[must_use]
    pub fn board(&self) -> &Chess {
        &self.board
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.cursor.mode
    }

    /// Switches mode, e.g. when a live game is finished and handed to review.
    pub fn set_mode(&mut self, mode: Mode) {
        self.cursor.mode = mode;
    }

    /// Number of mainline plies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        self.cursor.state(self.len())
    }

    /// Mainline plies in order.
    #[must_use]
    pub fn mainline(&self) -> Vec<&Ply> {
        self.tree.mainline()
    }

    /// Plies leading to the displayed position.
    #[must_use]
    pub fn current_path(&self) -> Vec<&Ply> {
        match self.cursor.line {
            Some(vc) => self.tree.node_path(vc.node),
            None => self
                .tree
                .mainline()
                .into_iter()
                .take(self.cursor.index)
                .collect(),
        }
    }

    /// Moves the cursor to mainline index `index` and replays the board.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IndexOutOfRange`] if `index > len()`.
    pub fn goto_index(&mut self, index: usize) -> Result<(), GameError> {
        let len = self.len();
        if index > len {
            return Err(GameError::IndexOutOfRange { index, len });
        }
        let board = replay(self.tree.mainline().into_iter().take(index))?;
        self.board = board;
        self.cursor.index = index;
        self.cursor.line = None;
        Ok(())
    }

    /// Steps forward one ply. Returns `false` at the end of the line.
    pub fn next(&mut self) -> bool {
        match self.cursor.line {
            Some(vc) => match self.tree.children(vc.node).first().copied() {
                Some(child) => self.move_in_variation(vc.branch, child),
                None => false,
            },
            None => self.cursor.index < self.len() && self.goto_index(self.cursor.index + 1).is_ok(),
        }
    }

    /// Steps back one ply, leaving a variation at its first move. Returns
    /// `false` at the start.
    pub fn prev(&mut self) -> bool {
        match self.cursor.line {
            Some(vc) => match self.tree.parent(vc.node) {
                Some(parent) if self.tree.branch_index(parent).is_some() => {
                    self.move_in_variation(vc.branch, parent)
                }
                _ => self.goto_index(vc.branch).is_ok(),
            },
            None => self.cursor.index > 0 && self.goto_index(self.cursor.index - 1).is_ok(),
        }
    }

    /// Jumps to the starting position.
    pub fn first(&mut self) -> bool {
        let moved = self.cursor.index != 0 || self.cursor.in_variation();
        moved && self.goto_index(0).is_ok()
    }

    /// Jumps to the end of the mainline.
    pub fn last(&mut self) -> bool {
        let len = self.len();
        let moved = self.cursor.index != len || self.cursor.in_variation();
        moved && self.goto_index(len).is_ok()
    }

    /// Moves the cursor onto the first move of variation `line` at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoSuchVariation`] if there is no such line.
    pub fn enter_variation(&mut self, index: usize, line: usize) -> Result<(), GameError> {
        let node = self
            .tree
            .variation_starts(index)
            .get(line)
            .copied()
            .ok_or(GameError::NoSuchVariation { index, line })?;
        let board = replay(self.tree.node_path(node))?;
        self.board = board;
        self.cursor.index = index;
        self.cursor.line = Some(VariationCursor {
            branch: index,
            node,
        });
        Ok(())
    }

    /// Returns to the mainline at the variation's branch point.
    pub fn exit_variation(&mut self) -> bool {
        match self.cursor.line {
            Some(vc) => self.goto_index(vc.branch).is_ok(),
            None => false,
        }
    }

    /// Plays `ply` at the cursor.
    ///
    /// In [`Mode::Live`] a ply played below the end of the mainline truncates
    /// the tail (and the variations branching inside it) first. In
    /// [`Mode::Replay`] the mainline is never changed: a ply that differs from
    /// the recorded move starts or extends a variation.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if `ply` is not legal on the
    /// displayed board.
    pub fn append(&mut self, ply: Ply) -> Result<Placement, GameError> {
        // Re-derive the ply from the board so its SAN matches this position.
        let mv = to_move(&self.board, ply.uci())?;
        let ply = Ply::from_move(&self.board, mv);

        if let Some(vc) = self.cursor.line {
            let node = self.tree.extend_line(vc.node, ply);
            self.move_to_node(vc.branch, node)?;
            return Ok(Placement::Variation {
                branch: vc.branch,
                node,
            });
        }

        let index = self.cursor.index;
        match self.cursor.mode {
            Mode::Live => {
                let truncated = index < self.len();
                if truncated {
                    self.tree.truncate(index);
                }
                self.tree.push_mainline(ply);
                self.goto_index(index + 1)?;
                Ok(Placement::Mainline { index, truncated })
            }
            Mode::Replay => {
                if self.tree.ply(index) == Some(&ply) {
                    self.goto_index(index + 1)?;
                    return Ok(Placement::FollowedMainline { index });
                }
                let node = self.tree.add_variation(index, ply)?;
                self.move_to_node(index, node)?;
                Ok(Placement::Variation {
                    branch: index,
                    node,
                })
            }
        }
    }

    /// Parses `san` against the displayed board and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if the move is not legal here.
    pub fn play_san(&mut self, san: &str) -> Result<Placement, GameError> {
        let ply = Ply::from_san(&self.board, san)?;
        self.append(ply)
    }

    /// Parses a UCI token against the displayed board and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if the move is not legal here.
    pub fn play_uci(&mut self, uci: &str) -> Result<Placement, GameError> {
        let ply = Ply::from_uci(&self.board, uci)?;
        self.append(ply)
    }

    /// Legal plies from the displayed position.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Ply> {
        self.board
            .legal_moves()
            .iter()
            .map(|mv| Ply::from_move(&self.board, *mv))
            .collect()
    }

    #[must_use]
    pub fn turn(&self) -> Color {
        self.board.turn()
    }

    /// FEN of the displayed position.
    #[must_use]
    pub fn fen(&self) -> String {
        fen(&self.board)
    }

    /// Terminal condition of the displayed position.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        if self.board.is_checkmate() {
            return GameStatus::Checkmate {
                winner: self.board.turn().other(),
            };
        }
        if self.board.is_stalemate() {
            return GameStatus::Stalemate;
        }
        if self.board.is_insufficient_material() {
            return GameStatus::InsufficientMaterial;
        }
        if self.is_threefold() {
            return GameStatus::ThreefoldRepetition;
        }
        if self.board.halfmoves() >= 100 {
            return GameStatus::FiftyMoveRule;
        }
        GameStatus::Ongoing
    }

    fn is_threefold(&self) -> bool {
        let current = position_key(&self.board);
        let mut pos = Chess::default();
        let mut seen = usize::from(position_key(&pos) == current);
        for ply in self.current_path() {
            match to_move(&pos, ply.uci()) {
                Ok(mv) => pos.play_unchecked(mv),
                Err(_) => return false,
            }
            if position_key(&pos) == current {
                seen += 1;
            }
        }
        seen >= 3
    }

    fn move_in_variation(&mut self, branch: usize, node: NodeId) -> bool {
        self.move_to_node(branch, node).is_ok()
    }

    fn move_to_node(&mut self, branch: usize, node: NodeId) -> Result<(), GameError> {
        let board = replay(self.tree.node_path(node))?;
        self.board = board;
        self.cursor.index = branch;
        self.cursor.line = Some(VariationCursor { branch, node });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay_uci;

    const TEN: [&str; 10] = [
        "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4", "g8f6", "e1g1", "f8e7",
    ];

    fn recorded(mode: Mode) -> Game {
        Game::from_plies(replay_uci(&TEN).unwrap(), mode).unwrap()
    }

    #[test]
    fn test_loaded_game_starts_at_start() {
        let game = recorded(Mode::Replay);
        assert_eq!(game.state(), CursorState::AtStart);
        assert_eq!(game.fen(), fen(&Chess::default()));
    }

    #[test]
    fn test_goto_out_of_range_leaves_cursor() {
        let mut game = recorded(Mode::Replay);
        game.goto_index(3).unwrap();
        let err = game.goto_index(11).unwrap_err();
        assert_eq!(err, GameError::IndexOutOfRange { index: 11, len: 10 });
        assert_eq!(game.cursor().index, 3);
        let expected = replay(game.mainline().into_iter().take(3)).unwrap();
        assert_eq!(game.fen(), fen(&expected));
    }

    #[test]
    fn test_next_prev_are_noops_at_bounds() {
        let mut game = recorded(Mode::Replay);
        assert!(!game.prev());
        assert!(!game.first());
        assert!(game.last());
        assert_eq!(game.state(), CursorState::AtEnd);
        assert!(!game.next());
        assert!(game.prev());
        assert_eq!(game.state(), CursorState::MidGame);
        assert_eq!(game.cursor().index, 9);
    }

    #[test]
    fn test_live_append_truncates_tail() {
        let mut game = recorded(Mode::Live);
        game.goto_index(4).unwrap();
        let placement = game.play_san("Bc4").unwrap();

        assert_eq!(
            placement,
            Placement::Mainline {
                index: 4,
                truncated: true
            }
        );
        assert_eq!(game.len(), 5);
        assert_eq!(game.cursor().index, 5);
        assert_eq!(game.state(), CursorState::AtEnd);
        let sans: Vec<_> = game.mainline().iter().map(|p| p.san()).collect();
        assert_eq!(sans, vec!["e4", "e5", "Nf3", "Nc6", "Bc4"]);
    }

    #[test]
    fn test_live_append_at_end_does_not_truncate() {
        let mut game = Game::new(Mode::Live);
        assert_eq!(
            game.play_uci("d2d4").unwrap(),
            Placement::Mainline {
                index: 0,
                truncated: false
            }
        );
        assert_eq!(game.len(), 1);
    }

    #[test]
    fn test_replay_append_creates_variation() {
        let mut game = recorded(Mode::Replay);
        game.goto_index(2).unwrap();
        let placement = game.play_san("Bc4").unwrap();

        assert!(matches!(placement, Placement::Variation { branch: 2, .. }));
        assert_eq!(game.len(), 10);
        assert!(game.cursor().in_variation());
        assert_eq!(game.tree().variations_at(2).len(), 1);

        // Continue the variation, then walk back out of it.
        game.play_san("Nf6").unwrap();
        assert_eq!(game.tree().variations_at(2)[0].len(), 2);
        assert!(game.prev());
        assert!(game.cursor().in_variation());
        assert!(game.prev());
        assert!(!game.cursor().in_variation());
        assert_eq!(game.cursor().index, 2);
    }

    #[test]
    fn test_replay_append_of_recorded_move_follows_mainline() {
        let mut game = recorded(Mode::Replay);
        game.goto_index(2).unwrap();
        assert_eq!(
            game.play_san("Nf3").unwrap(),
            Placement::FollowedMainline { index: 2 }
        );
        assert_eq!(game.cursor().index, 3);
        assert!(game.tree().variation_indices().is_empty());
    }

    #[test]
    fn test_enter_variation() {
        let mut game = recorded(Mode::Replay);
        game.goto_index(1).unwrap();
        game.play_san("c5").unwrap();
        game.first();

        game.enter_variation(1, 0).unwrap();
        assert_eq!(game.current_path().len(), 2);
        assert_eq!(game.current_path()[1].san(), "c5");

        let err = game.enter_variation(1, 1).unwrap_err();
        assert_eq!(err, GameError::NoSuchVariation { index: 1, line: 1 });
        assert!(game.exit_variation());
        assert_eq!(game.cursor().index, 1);
    }

    #[test]
    fn test_illegal_move_leaves_game_unchanged() {
        let mut game = recorded(Mode::Live);
        game.goto_index(2).unwrap();
        let before_fen = game.fen();
        assert_eq!(
            game.play_san("Ke3").unwrap_err(),
            GameError::IllegalMove {
                token: "Ke3".to_string(),
                ply: 2
            }
        );
        assert!(game.play_san("Qh6").is_err());
        assert!(game.play_uci("a1a8").is_err());
        assert_eq!(game.len(), 10);
        assert_eq!(game.cursor().index, 2);
        assert_eq!(game.fen(), before_fen);
    }

    #[test]
    fn test_checkmate_status() {
        let mut game = Game::new(Mode::Live);
        for san in ["f3", "e5", "g4", "Qh4#"] {
            game.play_san(san).unwrap();
        }
        assert_eq!(
            game.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn test_threefold_repetition() {
        let mut game = Game::new(Mode::Live);
        for san in ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1"] {
            game.play_san(san).unwrap();
            assert_eq!(game.status(), GameStatus::Ongoing);
        }
        game.play_san("Ng8").unwrap();
        assert_eq!(game.status(), GameStatus::ThreefoldRepetition);
        assert!(game.status().is_over());
    }

    #[test]
    fn test_legal_moves_from_start() {
        let game = Game::default();
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.turn(), Color::White);
    }
}
