// Freehand annotations: arrows and circles drawn with the secondary button (or with any button
// when drawing is forced), optionally stamping a piece glyph.

use log::debug;
use strum::IntoEnumIterator;

use crate::board;
use crate::color::Color;
use crate::display::{BoardBounds, non_degenerate, square_at};
use crate::drag::{self, Modifiers, PointerInput};
use crate::event::BoardEvent;
use crate::frame::{CancelToken, FrameStatus, TaskHandle};
use crate::piece::Piece;
use crate::shape::{Anchor, BRUSH_KEYS, DrawShape};
use crate::state::{Drawable, RedrawRequest, State};
use crate::util::Point;


#[derive(Debug)]
pub struct DrawCurrent {
    pub orig: Anchor,
    // `None` while the pointer is over nothing an arrow could point to.
    pub dest: Option<Anchor>,
    pub pos: Point,
    pub piece: Option<Piece>,
    pub brush: String,
    task: TaskHandle,
}

impl DrawCurrent {
    pub fn to_shape(&self) -> Option<DrawShape> {
        let dest = self.dest?;
        let piece = self.piece.filter(|_| dest == self.orig && matches!(self.orig, Anchor::Square(_)));
        Some(DrawShape {
            orig: self.orig,
            dest,
            brush: self.brush.clone(),
            piece,
            description: None,
            custom_svg: None,
        })
    }
}

// Shift or ctrl picks the first alternative, alt, meta or AltGraph the second one. Together they
// pick the third.
pub fn event_brush(modifiers: &Modifiers) -> &'static str {
    let mod_a = modifiers.shift || modifiers.ctrl;
    let mod_b = modifiers.alt || modifiers.meta || modifiers.alt_graph;
    BRUSH_KEYS[usize::from(mod_a) + 2 * usize::from(mod_b)]
}

// Whether a pointer down starts drawing rather than dragging.
pub fn should_draw(state: &State, input: &PointerInput) -> bool {
    state.drawable.enabled && (input.button == 2 || state.drawable.forced)
}

fn anchor_at(state: &State, bounds: &dyn BoardBounds, pos: Point) -> Option<Anchor> {
    let board = non_degenerate(bounds.board())?;
    if let Some(sq) = square_at(pos, state.dimensions, state.orientation, &board) {
        return Some(Anchor::Square(sq));
    }
    Color::iter()
        .flat_map(|color| state.hands.roles.iter().map(move |&role| Piece::new(role, color)))
        .find(|&piece| non_degenerate(bounds.hand_piece(piece)).is_some_and(|r| r.contains(pos)))
        .map(Anchor::Hand)
}

fn begin(state: &mut State, orig: Anchor, input: &PointerInput) -> CancelToken {
    if input.modifiers.ctrl {
        board::unselect(state);
    } else {
        board::cancel_move_or_drop(state);
    }
    drag::abandon(state);
    let current = DrawCurrent {
        orig,
        dest: None,
        pos: input.pos,
        piece: state.drawable.piece,
        brush: event_brush(&input.modifiers).to_owned(),
        task: TaskHandle::new(),
    };
    let token = current.task.token();
    state.drawable.current = Some(current);
    token
}

pub fn start(state: &mut State, bounds: &dyn BoardBounds, input: &PointerInput) -> Option<CancelToken> {
    let board = non_degenerate(bounds.board())?;
    let orig = square_at(input.pos, state.dimensions, state.orientation, &board)?;
    Some(begin(state, Anchor::Square(orig), input))
}

pub fn start_from_hand(state: &mut State, piece: Piece, input: &PointerInput) -> CancelToken {
    begin(state, Anchor::Hand(piece), input)
}

pub fn pointer_move(state: &mut State, input: &PointerInput) {
    if let Some(cur) = state.drawable.current.as_mut() {
        cur.pos = input.pos;
    }
}

pub fn process_frame(state: &mut State, bounds: &dyn BoardBounds, token: &CancelToken) -> FrameStatus {
    if token.is_cancelled() {
        return FrameStatus::Done;
    }
    let Some(pos) = state.drawable.current.as_ref().map(|cur| cur.pos) else {
        return FrameStatus::Done;
    };
    let dest = anchor_at(state, bounds, pos);
    if let Some(cur) = state.drawable.current.as_mut() {
        if cur.dest != dest {
            cur.dest = dest;
            state.request_redraw(RedrawRequest::Now);
        }
    }
    FrameStatus::Continue
}

// Merges a finished shape into the list. Returns whether the list changed.
fn add_shape(drawable: &mut Drawable, shape: DrawShape) -> bool {
    let before = drawable.shapes.clone();
    // One shape per position. Redrawing an identical shape removes it.
    let toggled_off = drawable
        .shapes
        .iter()
        .any(|s| s.same_position(&shape) && s.brush == shape.brush && s.piece == shape.piece);
    drawable.shapes.retain(|s| !s.same_position(&shape));
    if !toggled_off {
        drawable.shapes.push(shape);
    }
    drawable.shapes != before
}

fn on_change(state: &mut State) {
    let shapes = state.drawable.shapes.clone();
    state.emit(BoardEvent::DrawChange { shapes });
}

pub fn end(state: &mut State) {
    let Some(cur) = state.drawable.current.take() else {
        return;
    };
    match cur.to_shape() {
        Some(shape) => {
            if add_shape(&mut state.drawable, shape) {
                on_change(state);
            }
        }
        None => debug!("Drawing ended outside of any anchor"),
    }
    state.request_redraw(RedrawRequest::Debounced);
}

pub fn cancel(state: &mut State) {
    if state.drawable.current.take().is_some() {
        state.request_redraw(RedrawRequest::Debounced);
    }
}

pub fn clear(state: &mut State) {
    let had_shapes = !state.drawable.shapes.is_empty();
    if had_shapes || state.drawable.piece.is_some() {
        state.drawable.shapes.clear();
        state.drawable.piece = None;
        state.request_redraw(RedrawRequest::Debounced);
        if had_shapes {
            on_change(state);
        }
    }
}

// Selects the piece to stamp with the next circle; selecting it again deselects it.
pub fn set_piece_stamp(state: &mut State, piece: Piece) {
    state.drawable.piece = match state.drawable.piece {
        Some(p) if p == piece => None,
        _ => Some(piece),
    };
    state.request_redraw(RedrawRequest::Debounced);
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Role;
    use crate::square::Square;
    use crate::test_util::{FixedBounds, drain_events, right_mouse};

    fn sq(key: &str) -> Square { Square::from_key(key).unwrap() }

    fn draw(state: &mut State, bounds: &FixedBounds, from: Point, to: Point, modifiers: Modifiers) {
        let input = PointerInput { modifiers, ..right_mouse(from) };
        let token = start(state, bounds, &input).unwrap();
        pointer_move(state, &PointerInput { pos: to, ..input });
        process_frame(state, bounds, &token);
        end(state);
    }

    #[test]
    fn brushes() {
        assert_eq!(event_brush(&Modifiers::default()), "primary");
        assert_eq!(event_brush(&Modifiers { shift: true, ..Modifiers::default() }), "alternative0");
        assert_eq!(event_brush(&Modifiers { alt_graph: true, ..Modifiers::default() }), "alternative1");
        assert_eq!(
            event_brush(&Modifiers { ctrl: true, meta: true, ..Modifiers::default() }),
            "alternative2"
        );
    }

    #[test]
    fn arrow_brush_change_replaces() {
        let bounds = FixedBounds::standard();
        let mut state = State::default();
        let (a, b) = (bounds.square_center(&state, sq("7g")), bounds.square_center(&state, sq("7f")));
        draw(&mut state, &bounds, a, b, Modifiers::default());
        let alt = Modifiers { shift: true, ..Modifiers::default() };
        draw(&mut state, &bounds, a, b, alt);
        assert_eq!(state.drawable.shapes, [DrawShape::arrow(sq("7g"), sq("7f"), "alternative0")]);
        draw(&mut state, &bounds, a, b, alt);
        assert!(state.drawable.shapes.is_empty());
        assert_eq!(drain_events(&mut state).len(), 3);
    }

    #[test]
    fn stamps() {
        let bounds = FixedBounds::standard();
        let mut state = State::default();
        let at = bounds.square_center(&state, sq("5e"));
        draw(&mut state, &bounds, at, at, Modifiers::default());
        let gold = Piece::new(Role::Gold, Color::Sente);
        set_piece_stamp(&mut state, gold);
        draw(&mut state, &bounds, at, at, Modifiers::default());
        let silver = Piece::new(Role::Silver, Color::Sente);
        set_piece_stamp(&mut state, silver);
        draw(&mut state, &bounds, at, at, Modifiers::default());
        assert_eq!(state.drawable.shapes, [DrawShape::stamp(sq("5e"), silver, "primary")]);
        draw(&mut state, &bounds, at, at, Modifiers::default());
        assert!(state.drawable.shapes.is_empty());
    }

    #[test]
    fn stamp_and_circle_replace_each_other() {
        let bounds = FixedBounds::standard();
        let mut state = State::default();
        let at = bounds.square_center(&state, sq("5e"));
        let pawn = Piece::new(Role::Pawn, Color::Sente);
        set_piece_stamp(&mut state, pawn);
        draw(&mut state, &bounds, at, at, Modifiers::default());
        assert_eq!(state.drawable.shapes, [DrawShape::stamp(sq("5e"), pawn, "primary")]);
        set_piece_stamp(&mut state, pawn);
        draw(&mut state, &bounds, at, at, Modifiers::default());
        assert_eq!(state.drawable.shapes, [DrawShape::circle(sq("5e"), "primary")]);
        set_piece_stamp(&mut state, pawn);
        draw(&mut state, &bounds, at, at, Modifiers::default());
        assert_eq!(state.drawable.shapes, [DrawShape::stamp(sq("5e"), pawn, "primary")]);
    }

    #[test]
    fn ending_outside_adds_nothing() {
        let bounds = FixedBounds::standard();
        let mut state = State::default();
        let from = bounds.square_center(&state, sq("5e"));
        draw(&mut state, &bounds, from, (2000., 2000.), Modifiers::default());
        assert!(state.drawable.shapes.is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn arrow_to_hand_piece() {
        let bounds = FixedBounds::standard();
        let mut state = State::default();
        let pawn = Piece::new(Role::Pawn, Color::Sente);
        let from = bounds.square_center(&state, sq("5e"));
        draw(&mut state, &bounds, from, bounds.hand_piece_center(pawn), Modifiers::default());
        assert_eq!(state.drawable.shapes, [DrawShape::arrow(sq("5e"), pawn, "primary")]);
    }

    #[test]
    fn clear_notifies_only_when_needed() {
        let mut state = State::default();
        clear(&mut state);
        assert!(state.events.is_empty());
        state.drawable.shapes.push(DrawShape::circle(sq("1a"), "primary"));
        clear(&mut state);
        assert_eq!(drain_events(&mut state), [BoardEvent::DrawChange { shapes: vec![] }]);
    }
}
