//! Property tests for navigation and live truncation.

use chess_game::{replay, Game, Mode, MoveTree, Placement, Ply};
use proptest::prelude::*;
use shakmaty::{Chess, Position};

/// Builds a legal game by picking moves from `choices`.
fn random_game(choices: &[usize]) -> Vec<Ply> {
    let mut pos = Chess::default();
    let mut plies = Vec::new();
    for &choice in choices {
        let moves = pos.legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice % moves.len()];
        plies.push(Ply::from_move(&pos, mv));
        pos.play_unchecked(mv);
    }
    plies
}

fn fen_of(pos: &Chess) -> String {
    shakmaty::fen::Fen::from_position(pos, shakmaty::EnPassantMode::Legal).to_string()
}

proptest! {
    #[test]
    fn goto_index_matches_full_replay(choices in prop::collection::vec(any::<usize>(), 0..40), target in any::<usize>()) {
        let plies = random_game(&choices);
        let mut game = Game::from_plies(plies.clone(), Mode::Replay).unwrap();

        // Visit indices in a scrambled order so no incremental state can help.
        let len = plies.len();
        for step in 0..=len {
            let i = (target.wrapping_add(step * 7)) % (len + 1);
            game.goto_index(i).unwrap();
            let expected = replay(&plies[..i]).unwrap();
            prop_assert_eq!(fen_of(game.board()), fen_of(&expected));
            prop_assert_eq!(game.cursor().index, i);
        }
    }

    #[test]
    fn out_of_range_goto_is_rejected(choices in prop::collection::vec(any::<usize>(), 0..20), extra in 1usize..50) {
        let plies = random_game(&choices);
        let len = plies.len();
        let mut game = Game::from_plies(plies, Mode::Replay).unwrap();
        game.goto_index(len / 2).unwrap();

        prop_assert!(game.goto_index(len + extra).is_err());
        prop_assert_eq!(game.cursor().index, len / 2);
    }

    #[test]
    fn live_append_truncates_to_cursor(choices in prop::collection::vec(any::<usize>(), 1..30), cut in any::<usize>(), pick in any::<usize>()) {
        let plies = random_game(&choices);
        prop_assume!(!plies.is_empty());
        let len = plies.len();
        let index = cut % len;

        let mut game = Game::from_plies(plies.clone(), Mode::Live).unwrap();
        game.goto_index(index).unwrap();
        let legal = game.legal_moves();
        prop_assume!(!legal.is_empty());
        let new_ply = legal[pick % legal.len()].clone();

        let placement = game.append(new_ply.clone()).unwrap();

        prop_assert_eq!(placement, Placement::Mainline { index, truncated: true });
        prop_assert_eq!(game.len(), index + 1);
        let mainline: Vec<Ply> = game.mainline().into_iter().cloned().collect();
        prop_assert_eq!(&mainline[..index], &plies[..index]);
        prop_assert_eq!(&mainline[index], &new_ply);
    }
}

#[test]
fn truncation_drops_variations_at_or_after_cursor() {
    // Ten plies, variations keyed at 2, 4 and 7, cursor at 4.
    let plies = random_game(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(plies.len(), 10);

    let mut tree = MoveTree::from_plies(plies.clone());
    for index in [2, 4, 7] {
        let pos = replay(&plies[..index]).unwrap();
        let alternative = pos
            .legal_moves()
            .iter()
            .map(|mv| Ply::from_move(&pos, *mv))
            .find(|p| *p != plies[index])
            .unwrap();
        tree.add_variation(index, alternative).unwrap();
    }
    assert_eq!(tree.variation_indices(), vec![2, 4, 7]);

    tree.truncate(4);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.variation_indices(), vec![2]);

    let kept: Vec<Ply> = tree.mainline().into_iter().cloned().collect();
    assert_eq!(kept, plies[..4].to_vec());
}
