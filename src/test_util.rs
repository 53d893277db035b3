// Test utilities shared by unit tests and integration tests.

use std::collections::BTreeMap;

use enum_map::{EnumMap, enum_map};

use crate::board::Pieces;
use crate::color::Color;
use crate::display::{BoardBounds, Rect, square_center};
use crate::drag::{Modifiers, PointerInput};
use crate::event::BoardEvent;
use crate::piece::{HAND_ROLES, Piece};
use crate::sfen::{DefaultSymbols, infer_dimensions, sfen_to_board};
use crate::square::Square;
use crate::state::State;


pub const SQUARE_SIZE: f64 = 100.;

// Layout of a 9x9 board at the origin with 100px squares. Gote's hand is above the board,
// sente's hand is below it; hand pieces are laid out left to right in the default role order.
#[derive(Clone, Debug)]
pub struct FixedBounds {
    pub board: Rect,
    pub hands: EnumMap<Color, Rect>,
    pub hand_pieces: BTreeMap<Piece, Rect>,
}

impl FixedBounds {
    pub fn standard() -> Self {
        let hands = enum_map! {
            Color::Gote => Rect::new(0., -200., 900., 100.),
            Color::Sente => Rect::new(0., 1000., 900., 100.),
        };
        let mut hand_pieces = BTreeMap::new();
        for (color, hand) in &hands {
            for (i, &role) in HAND_ROLES.iter().enumerate() {
                let rect = Rect::new(i as f64 * SQUARE_SIZE, hand.top, SQUARE_SIZE, SQUARE_SIZE);
                hand_pieces.insert(Piece::new(role, color), rect);
            }
        }
        FixedBounds {
            board: Rect::new(0., 0., 9. * SQUARE_SIZE, 9. * SQUARE_SIZE),
            hands,
            hand_pieces,
        }
    }

    pub fn with_hand_piece(mut self, piece: Piece, rect: Rect) -> Self {
        self.hand_pieces.insert(piece, rect);
        self
    }

    pub fn square_center(&self, state: &State, sq: Square) -> (f64, f64) {
        square_center(sq, state.dimensions, state.orientation, &self.board)
    }

    pub fn hand_piece_center(&self, piece: Piece) -> (f64, f64) {
        self.hand_pieces.get(&piece).map_or((f64::NAN, f64::NAN), Rect::center)
    }
}

impl BoardBounds for FixedBounds {
    fn board(&self) -> Option<Rect> { Some(self.board) }
    fn hand(&self, color: Color) -> Option<Rect> { Some(self.hands[color]) }
    fn hand_piece(&self, piece: Piece) -> Option<Rect> { self.hand_pieces.get(&piece).copied() }
}

pub fn mouse(pos: (f64, f64)) -> PointerInput {
    PointerInput {
        pos,
        button: 0,
        modifiers: Modifiers::default(),
        is_touch: false,
    }
}

pub fn right_mouse(pos: (f64, f64)) -> PointerInput { PointerInput { button: 2, ..mouse(pos) } }

pub fn pieces_from_sfen(board_sfen: &str) -> Pieces {
    sfen_to_board(board_sfen, infer_dimensions(board_sfen), &DefaultSymbols)
}

pub fn drain_events(state: &mut State) -> Vec<BoardEvent> { state.events.drain(..).collect() }
