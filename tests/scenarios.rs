mod common;

use std::rc::Rc;

use pretty_assertions::assert_eq;
use shogiground::api::{Gesture, Shogiground};
use shogiground::board::PiecesDiff;
use shogiground::color::Color;
use shogiground::config::Config;
use shogiground::event::BoardEvent;
use shogiground::frame::FrameStatus;
use shogiground::piece::Role;
use shogiground::rules::ZonePromotion;
use shogiground::shape::DrawShape;
use shogiground::test_util::{FixedBounds, mouse, right_mouse};

use common::*;


#[test]
fn pawn_push_from_standard_position() {
    let mut sg = standard_board();
    assert_eq!(sg.state().turn_color, Color::Sente);
    sg.select_square(Some(sq!("5g")), None, false);
    sg.select_square(Some(sq!("5f")), None, false);
    let state = sg.state();
    assert_eq!(state.pieces.get(&sq!("5f")), Some(&piece!(Sente Pawn)));
    assert!(!state.pieces.contains_key(&sq!("5g")));
    assert_eq!(state.turn_color, Color::Gote);
    assert_eq!(state.last_dests, Some(vec![sq!("5g"), sq!("5f")]));
    assert_eq!(sg.get_board_sfen(), "lnsgkgsnl/1r5b1/ppppppppp/9/9/4P4/PPPP1PPPP/1B5R1/LNSGKGSNL");
}

#[test]
fn pawn_drop_from_hand() {
    let config = Config::from_sfen("4k4/9/9/9/9/9/9/9/4K4", Some("P"));
    let mut sg = Shogiground::new(&config);
    sg.select_piece(Some(piece!(Sente Pawn)), false, false);
    assert_eq!(sg.state().selected_piece, Some(piece!(Sente Pawn)));
    sg.select_square(Some(sq!("5e")), None, false);
    let state = sg.state();
    assert_eq!(state.hands.count(piece!(Sente Pawn)), 0);
    assert_eq!(state.pieces.get(&sq!("5e")), Some(&piece!(Sente Pawn)));
    assert_eq!(state.turn_color, Color::Gote);
    assert_eq!(sg.get_hands_sfen(), "-");
    let events = drain_events(&mut sg);
    assert!(events.contains(&BoardEvent::Drop {
        piece: piece!(Sente Pawn),
        dest: sq!("5e"),
        promotion: false,
    }));
}

#[test]
fn promotion_dialog_defers_the_move() {
    let config = Config {
        promotion_rules: Some(Rc::new(ZonePromotion::STANDARD)),
        ..Config::from_sfen("4k4/9/9/5S3/9/9/9/9/4K4", None)
    };
    let mut sg = Shogiground::new(&config);
    sg.select_square(Some(sq!("4d")), None, false);
    sg.select_square(Some(sq!("4c")), None, false);
    let state = sg.state();
    assert!(state.promotion.current.is_some());
    assert_eq!(state.pieces.get(&sq!("4d")), Some(&piece!(Sente Silver)));
    assert!(!state.pieces.contains_key(&sq!("4c")));
    assert_eq!(state.turn_color, Color::Sente);

    assert!(sg.select_promotion(true));
    let state = sg.state();
    assert_eq!(state.pieces.get(&sq!("4c")), Some(&piece!(Sente PromotedSilver)));
    assert!(state.promotion.current.is_none());
    let events = drain_events(&mut sg);
    assert!(events.contains(&BoardEvent::PromotionInitiated));
    assert!(events.contains(&BoardEvent::PromotionAfter { piece: piece!(Sente PromotedSilver), promoted: true }));
}

#[test]
fn premove_is_queued_then_played() {
    let mut sg = standard_board();
    sg.set(&Config::from_json(r#"{"activeColor": "sente", "turnColor": "gote"}"#).unwrap(), true);
    let before = sg.get_board_sfen();
    sg.select_square(Some(sq!("7g")), None, false);
    sg.select_square(Some(sq!("7f")), None, false);
    let state = sg.state();
    let premove = state.premovable.current.expect("premove queued");
    assert_eq!((premove.orig, premove.dest), (sq!("7g"), sq!("7f")));
    assert_eq!(sg.get_board_sfen(), before);
    assert_eq!(state.turn_color, Color::Gote);

    sg.set(&Config::from_json(r#"{"turnColor": "sente"}"#).unwrap(), true);
    assert!(sg.play_premove());
    let state = sg.state();
    assert_eq!(state.pieces.get(&sq!("7f")), Some(&piece!(Sente Pawn)));
    assert!(state.premovable.current.is_none());
    assert_eq!(state.turn_color, Color::Gote);
}

fn draw_circle(sg: &mut Shogiground, bounds: &FixedBounds, key: shogiground::square::Square) {
    let at = bounds.square_center(sg.state(), key);
    let gesture = sg.pointer_down(&right_mouse(at)).expect("drawing starts");
    assert!(matches!(gesture, Gesture::Draw(_)));
    assert_eq!(sg.gesture_frame(&gesture), FrameStatus::Continue);
    sg.pointer_up(Some(&right_mouse(at)));
    assert_eq!(sg.gesture_frame(&gesture), FrameStatus::Done);
}

#[test]
fn identical_circle_toggles_off() {
    let bounds = FixedBounds::standard();
    let mut sg = Shogiground::with_bounds(&Config::default(), Rc::new(bounds.clone()));
    draw_circle(&mut sg, &bounds, sq!("5e"));
    assert_eq!(sg.state().drawable.shapes, [DrawShape::circle(sq!("5e"), "primary")]);
    draw_circle(&mut sg, &bounds, sq!("5e"));
    assert!(sg.state().drawable.shapes.is_empty());
    let lengths: Vec<usize> = drain_events(&mut sg)
        .into_iter()
        .filter_map(|e| match e {
            BoardEvent::DrawChange { shapes } => Some(shapes.len()),
            _ => None,
        })
        .collect();
    assert_eq!(lengths, [1, 0]);
}

#[test]
fn drag_is_cancelled_when_piece_disappears() {
    let bounds = FixedBounds::standard();
    let config = Config::from_sfen("4k4/9/9/9/4G4/9/9/9/4K4", None);
    let mut sg = Shogiground::with_bounds(&config, Rc::new(bounds.clone()));
    let from = bounds.square_center(sg.state(), sq!("5e"));
    let gesture = sg.pointer_down(&mouse(from)).expect("drag starts");
    let to = bounds.square_center(sg.state(), sq!("5d"));
    sg.pointer_move(&mouse(to));
    assert_eq!(sg.gesture_frame(&gesture), FrameStatus::Continue);

    let diff: PiecesDiff = vec![(sq!("5e"), None)];
    sg.set_pieces(diff);
    assert_eq!(sg.gesture_frame(&gesture), FrameStatus::Done);
    assert!(sg.state().draggable.current.is_none());

    sg.pointer_up(Some(&mouse(to)));
    let state = sg.state();
    assert!(!state.pieces.contains_key(&sq!("5d")));
    assert_eq!(state.turn_color, Color::Sente);
    assert_eq!(state.pieces.values().filter(|p| p.role == Role::Gold).count(), 0);
}

#[test]
fn squares_past_the_edge_are_ignored() {
    let mut sg = board_from_json(
        r#"{"sfen": {"board": "9/9/9/9/9/9/5s3/9/9", "hands": "p"}, "turnColor": "gote"}"#,
    );
    sg.select_square(Some(sq!("4g")), None, false);
    sg.select_square(Some(sq!("4p")), None, false);
    assert_eq!(sg.state().selected, Some(sq!("4g")));
    assert!(!sg.move_piece(sq!("4g"), sq!("4p"), false));

    sg.select_piece(Some(piece!(Gote Pawn)), false, false);
    sg.select_square(Some(sq!("5p")), None, false);
    let state = sg.state();
    assert_eq!(state.pieces.len(), 1);
    assert_eq!(state.pieces.get(&sq!("4g")), Some(&piece!(Gote Silver)));
    assert_eq!(state.hands.count(piece!(Gote Pawn)), 1);
}
