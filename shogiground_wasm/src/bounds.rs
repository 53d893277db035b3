// Layout queries backed by `getBoundingClientRect`, memoized until the layout changes.

use std::cell::RefCell;
use std::collections::BTreeMap;

use enum_map::EnumMap;

use shogiground::color::Color;
use shogiground::display::{BoardBounds, Rect};
use shogiground::piece::Piece;
use shogiground::util::Memo;


fn client_rect(element: &web_sys::Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

#[derive(Default)]
pub struct DomBounds {
    board_element: RefCell<Option<web_sys::Element>>,
    hand_elements: RefCell<EnumMap<Color, Option<web_sys::Element>>>,
    hand_piece_elements: RefCell<BTreeMap<Piece, web_sys::Element>>,
    board: Memo<Option<Rect>>,
    hands: Memo<EnumMap<Color, Option<Rect>>>,
    hand_pieces: Memo<BTreeMap<Piece, Rect>>,
}

impl DomBounds {
    pub fn new() -> Self { Self::default() }

    pub fn attach(
        &self, board: web_sys::Element, hands: EnumMap<Color, Option<web_sys::Element>>,
        hand_pieces: BTreeMap<Piece, web_sys::Element>,
    ) {
        *self.board_element.borrow_mut() = Some(board);
        *self.hand_elements.borrow_mut() = hands;
        *self.hand_piece_elements.borrow_mut() = hand_pieces;
        self.invalidate();
    }

    pub fn detach(&self) {
        self.board_element.borrow_mut().take();
        *self.hand_elements.borrow_mut() = EnumMap::default();
        self.hand_piece_elements.borrow_mut().clear();
        self.invalidate();
    }

    // Must be called after anything that may move the board: resize, scroll, style changes.
    pub fn invalidate(&self) {
        self.board.clear();
        self.hands.clear();
        self.hand_pieces.clear();
    }
}

impl BoardBounds for DomBounds {
    fn board(&self) -> Option<Rect> {
        self.board.get_or_compute(|| self.board_element.borrow().as_ref().map(client_rect))
    }

    fn hand(&self, color: Color) -> Option<Rect> {
        let rects = self.hands.get_or_compute(|| {
            let elements = self.hand_elements.borrow();
            EnumMap::from_fn(|c| elements[c].as_ref().map(client_rect))
        });
        rects[color]
    }

    fn hand_piece(&self, piece: Piece) -> Option<Rect> {
        let rects = self.hand_pieces.get_or_compute(|| {
            let elements = self.hand_piece_elements.borrow();
            elements.iter().map(|(&piece, element)| (piece, client_rect(element))).collect()
        });
        rects.get(&piece).copied()
    }
}
