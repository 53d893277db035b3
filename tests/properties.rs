mod common;

use std::collections::BTreeMap;

use indoc::indoc;
use pretty_assertions::assert_eq;
use shogiground::anim::{Snapshot, compute_plan};
use shogiground::api::Shogiground;
use shogiground::color::Color;
use shogiground::config::Config;
use shogiground::display::NoBounds;
use shogiground::piece::Role;
use shogiground::sfen::{
    DefaultSymbols, STANDARD_BOARD_SFEN, SymbolTable, board_to_sfen, hands_to_sfen, infer_dimensions,
    sfen_to_board, sfen_to_hands,
};
use shogiground::state::State;

use common::*;


#[test]
fn turn_flips_only_on_accepted_moves() {
    let mut sg = standard_board();
    sg.select_square(Some(sq!("2h")), None, false);
    // Own piece on the destination: the move is refused.
    sg.select_square(Some(sq!("2g")), None, false);
    assert_eq!(sg.state().turn_color, Color::Sente);
    assert_eq!(sg.state().selected, Some(sq!("2g")));
    sg.select_square(Some(sq!("2f")), None, false);
    assert_eq!(sg.state().turn_color, Color::Gote);
    sg.select_square(Some(sq!("3c")), None, false);
    sg.select_square(Some(sq!("3d")), None, false);
    assert_eq!(sg.state().turn_color, Color::Sente);
}

#[test]
fn hand_counts_never_go_negative() {
    let config = Config::from_sfen("4k4/9/9/9/9/9/9/9/4K4", Some("Pr"));
    let mut sg = Shogiground::new(&config);
    sg.remove_from_hand(piece!(Sente Pawn), 3);
    sg.remove_from_hand(piece!(Gote Rook), 1);
    sg.remove_from_hand(piece!(Gote Rook), 1);
    sg.add_to_hand(piece!(Gote Dragon), 2);
    let state = sg.state();
    assert_eq!(state.hands.count(piece!(Sente Pawn)), 0);
    assert_eq!(state.hands.count(piece!(Gote Rook)), 2);
    assert_eq!(sg.get_hands_sfen(), "2r");
}

#[test]
fn selection_is_exclusive() {
    let config = Config::from_sfen("4k4/9/9/9/9/9/9/9/4K4", Some("P"));
    let mut sg = Shogiground::new(&config);
    let exclusive = |sg: &Shogiground| !(sg.state().selected.is_some() && sg.state().selected_piece.is_some());
    sg.select_square(Some(sq!("5i")), None, false);
    assert!(exclusive(&sg));
    sg.select_piece(Some(piece!(Sente Pawn)), false, false);
    assert!(exclusive(&sg));
    assert_eq!(sg.state().selected_piece, Some(piece!(Sente Pawn)));
    sg.select_piece(None, false, false);
    assert_eq!(sg.state().selected_piece, None);
    assert!(exclusive(&sg));
}

#[test]
fn animation_plan_is_deterministic() {
    let mut state = State::default();
    state.pieces = sfen_to_board("9/9/9/9/1G2G2G1/9/9/9/9", infer_dimensions(STANDARD_BOARD_SFEN), &DefaultSymbols);
    let prev = Snapshot::of(&state);
    state.pieces = sfen_to_board("9/9/9/4G4/9/9/9/9/9", state.dimensions, &DefaultSymbols);
    let first = compute_plan(&prev, &state, &NoBounds);
    for _ in 0..10 {
        assert_eq!(compute_plan(&prev, &state, &NoBounds), first);
    }
    assert_eq!(first.anims.len(), 1);
    assert_eq!(first.anims[&sq!("5d")].start, (0., 1.));
    assert_eq!(first.fadings.len(), 2);
}

#[test]
fn sfen_round_trip_with_custom_symbols() {
    let mut table = SymbolTable::from_mapping(&DefaultSymbols);
    table.0.insert(Role::Gold, "x".to_owned());
    table.0.insert(Role::Tokin, "+y".to_owned());
    let board = indoc! {"
        lnsxkxsnl/
        1r5b1/
        pppp+Yppp1/
        9/
        9/
        9/
        PPPPPPPPP/
        1B5R1/
        LNSXKXSNL"}
    .replace('\n', "");
    let dims = infer_dimensions(&board);
    let pieces = sfen_to_board(&board, dims, &table);
    assert_eq!(pieces[&sq!("5c")], piece!(Sente Tokin));
    assert_eq!(pieces[&sq!("4a")], piece!(Gote Gold));
    assert_eq!(sfen_to_board(&board_to_sfen(&pieces, dims, &table), dims, &table), pieces);

    let hands = sfen_to_hands("2X3p", &table);
    let roles = [Role::Rook, Role::Bishop, Role::Gold, Role::Silver, Role::Knight, Role::Lance, Role::Pawn];
    assert_eq!(hands_to_sfen(&hands, &roles, &table), "2X3p");

    let config = Config {
        forsyth: Some(table),
        ..Config::from_sfen(&board, Some("2X3p"))
    };
    let sg = Shogiground::new(&config);
    assert_eq!(sg.get_hands_sfen(), "2X3p");
    let counts: BTreeMap<_, _> = [(piece!(Sente Gold), 2), (piece!(Gote Pawn), 3)].into();
    for (piece, cnt) in counts {
        assert_eq!(sg.state().hands.count(piece), cnt);
    }
}
