// Screen geometry: orientation, board bounds and conversions between squares and pointer
// positions.
//
// "Display" coords describe squares the way they are drawn: x grows to the right, y grows down,
// (0, 0) is the top-left square whatever the orientation.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::piece::Piece;
use crate::square::{Dimensions, Square};
use crate::util::Point;


#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect { left, top, width, height }
    }

    // Elements that are not laid out yet report zero sizes; dividing by them would poison
    // transforms with NaN.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0. && self.height > 0.) || !self.left.is_finite() || !self.top.is_finite()
    }

    pub fn contains(&self, (x, y): Point) -> bool {
        self.left <= x && x <= self.left + self.width && self.top <= y && y <= self.top + self.height
    }

    pub fn center(&self) -> Point { (self.left + self.width / 2., self.top + self.height / 2.) }
}

// Layout queries. Implementations are expected to memoize and to invalidate on layout changes;
// callers must not cache results themselves.
pub trait BoardBounds {
    fn board(&self) -> Option<Rect>;
    // The hand area of the given color.
    fn hand(&self, color: Color) -> Option<Rect>;
    fn hand_piece(&self, piece: Piece) -> Option<Rect>;
}

// Bounds for a board that is not attached to any screen.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBounds;

impl BoardBounds for NoBounds {
    fn board(&self) -> Option<Rect> { None }
    fn hand(&self, _color: Color) -> Option<Rect> { None }
    fn hand_piece(&self, _piece: Piece) -> Option<Rect> { None }
}

pub fn non_degenerate(rect: Option<Rect>) -> Option<Rect> { rect.filter(|r| !r.is_degenerate()) }

pub fn to_display(sq: Square, dims: Dimensions, orientation: Color) -> (u8, u8) {
    match orientation {
        Color::Sente => (dims.files.saturating_sub(sq.file + 1), sq.rank),
        Color::Gote => (sq.file, dims.ranks.saturating_sub(sq.rank + 1)),
    }
}

pub fn from_display(x: i32, y: i32, dims: Dimensions, orientation: Color) -> Option<Square> {
    if x < 0 || y < 0 || x >= dims.files as i32 || y >= dims.ranks as i32 {
        return None;
    }
    let (x, y) = (x as u8, y as u8);
    let sq = match orientation {
        Color::Sente => Square::new(dims.files - 1 - x, y),
        Color::Gote => Square::new(x, dims.ranks - 1 - y),
    };
    Some(sq)
}

pub fn square_size(bounds: &Rect, dims: Dimensions) -> (f64, f64) {
    (bounds.width / dims.files as f64, bounds.height / dims.ranks as f64)
}

pub fn square_at(pos: Point, dims: Dimensions, orientation: Color, bounds: &Rect) -> Option<Square> {
    if bounds.is_degenerate() {
        return None;
    }
    let x = (dims.files as f64 * (pos.0 - bounds.left) / bounds.width).floor();
    let y = (dims.ranks as f64 * (pos.1 - bounds.top) / bounds.height).floor();
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    from_display(x as i32, y as i32, dims, orientation)
}

// Top-left corner of a square relative to the board, in pixels.
pub fn square_translate(sq: Square, dims: Dimensions, orientation: Color, bounds: &Rect) -> Point {
    let (x, y) = to_display(sq, dims, orientation);
    let (w, h) = square_size(bounds, dims);
    (x as f64 * w, y as f64 * h)
}

// Center of a square in client coordinates.
pub fn square_center(sq: Square, dims: Dimensions, orientation: Color, bounds: &Rect) -> Point {
    let (x, y) = square_translate(sq, dims, orientation, bounds);
    let (w, h) = square_size(bounds, dims);
    (bounds.left + x + w / 2., bounds.top + y + h / 2.)
}

// Position of an arbitrary screen rectangle in display square units relative to the board.
// Used to make pieces fly between hands and the board.
pub fn project_to_board(rect: &Rect, dims: Dimensions, bounds: &Rect) -> Option<Point> {
    if bounds.is_degenerate() {
        return None;
    }
    let (w, h) = square_size(bounds, dims);
    Some(((rect.left - bounds.left) / w, (rect.top - bounds.top) / h))
}


#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Rect = Rect { left: 100., top: 50., width: 900., height: 900. };

    #[test]
    fn display_roundtrip() {
        let dims = Dimensions::STANDARD;
        for orientation in [Color::Sente, Color::Gote] {
            for sq in dims.squares() {
                let (x, y) = to_display(sq, dims, orientation);
                assert_eq!(from_display(x as i32, y as i32, dims, orientation), Some(sq));
            }
        }
    }

    #[test]
    fn pointer_to_square() {
        let dims = Dimensions::STANDARD;
        // Top-left square is 9a for sente and 1i for gote.
        assert_eq!(square_at((105., 55.), dims, Color::Sente, &BOUNDS), Square::from_key("9a"));
        assert_eq!(square_at((105., 55.), dims, Color::Gote, &BOUNDS), Square::from_key("1i"));
        assert_eq!(square_at((995., 945.), dims, Color::Sente, &BOUNDS), Square::from_key("1i"));
        assert_eq!(square_at((99., 55.), dims, Color::Sente, &BOUNDS), None);
        let degenerate = Rect::new(0., 0., 0., 0.);
        assert_eq!(square_at((0., 0.), dims, Color::Sente, &degenerate), None);
    }

    #[test]
    fn centers() {
        let dims = Dimensions::STANDARD;
        let sq = Square::from_key("5e").unwrap();
        assert_eq!(square_center(sq, dims, Color::Sente, &BOUNDS), (550., 500.));
        assert_eq!(square_at((550., 500.), dims, Color::Gote, &BOUNDS), Some(sq));
    }
}
