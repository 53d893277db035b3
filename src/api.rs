// The board facade. Owns the state of one board and is the only surface embedders should call.
//
// Mutations that change the position go through `anim::anim` so pieces slide to their new
// squares; cosmetic changes go through `anim::render`. Nothing here touches the DOM: the caller
// reads `take_redraw`, `take_rebuild` and `next_event` after each call and reflects them.

use std::rc::Rc;

use instant::Instant;
use log::{debug, info};

use crate::anim;
use crate::board::{self, PiecesDiff};
use crate::config::{Config, configure};
use crate::display::{BoardBounds, NoBounds};
use crate::drag::{self, PointerInput};
use crate::draw;
use crate::event::BoardEvent;
use crate::frame::{CancelToken, FrameStatus};
use crate::piece::Piece;
use crate::sfen::{board_to_sfen, hands_to_sfen};
use crate::shape::{DrawShape, SquareHighlight};
use crate::square::Square;
use crate::state::{RedrawRequest, State};


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SetOutcome {
    // Pieces and highlights changed in place.
    Incremental,
    // The board structure is stale and must be rebuilt.
    RedrawAll,
}

// A pointer gesture that needs a frame loop until `FrameStatus::Done`.
#[derive(Clone, Debug)]
pub enum Gesture {
    Drag(CancelToken),
    Draw(CancelToken),
}

pub struct Shogiground {
    state: State,
    bounds: Rc<dyn BoardBounds>,
    rebuild: bool,
    destroyed: bool,
}

impl Shogiground {
    // A board without geometry: gestures that need screen positions are ignored.
    pub fn new(config: &Config) -> Self { Self::with_bounds(config, Rc::new(NoBounds)) }

    pub fn with_bounds(config: &Config, bounds: Rc<dyn BoardBounds>) -> Self {
        let mut state = State::default();
        configure(&mut state, config);
        state.request_redraw(RedrawRequest::Now);
        Shogiground { state, bounds, rebuild: true, destroyed: false }
    }

    pub fn state(&self) -> &State { &self.state }
    pub fn bounds(&self) -> &Rc<dyn BoardBounds> { &self.bounds }
    pub fn is_destroyed(&self) -> bool { self.destroyed }

    pub fn set_bounds(&mut self, bounds: Rc<dyn BoardBounds>) { self.bounds = bounds; }

    pub fn set(&mut self, config: &Config, skip_animation: bool) -> SetOutcome {
        if config.needs_redraw_all(&self.state) {
            info!("Board structure changed, redrawing everything");
            board::reset(&mut self.state);
            configure(&mut self.state, config);
            self.redraw_all();
            SetOutcome::RedrawAll
        } else {
            let bounds = Rc::clone(&self.bounds);
            if skip_animation {
                anim::render(&mut self.state, |s| configure(s, config));
            } else {
                anim::anim(&mut self.state, &*bounds, |s| configure(s, config));
            }
            SetOutcome::Incremental
        }
    }

    pub fn get_board_sfen(&self) -> String {
        let state = &self.state;
        board_to_sfen(&state.pieces, state.dimensions, &*state.forsyth)
    }

    pub fn get_hands_sfen(&self) -> String {
        let state = &self.state;
        hands_to_sfen(&state.hands.hand_map, &state.hands.roles, &*state.forsyth)
    }

    pub fn toggle_orientation(&mut self) {
        board::toggle_orientation(&mut self.state);
        self.redraw_all();
    }

    // Moves without any legality check. Returns false if `orig` is empty or equals `dest`.
    pub fn move_piece(&mut self, orig: Square, dest: Square, promotion: bool) -> bool {
        let bounds = Rc::clone(&self.bounds);
        anim::anim(&mut self.state, &*bounds, |s| board::base_move(s, orig, dest, promotion)).is_some()
    }

    pub fn drop_piece(&mut self, piece: Piece, dest: Square, promotion: bool, spare: bool) -> bool {
        let bounds = Rc::clone(&self.bounds);
        anim::anim(&mut self.state, &*bounds, |s| {
            s.droppable.spare = spare;
            board::base_drop(s, piece, dest, promotion)
        })
    }

    // `None` clears the selection.
    pub fn select_square(&mut self, sq: Option<Square>, promotion: Option<bool>, force: bool) {
        match sq {
            Some(sq) => {
                let bounds = Rc::clone(&self.bounds);
                anim::anim(&mut self.state, &*bounds, |s| board::select_square(s, sq, promotion, force));
            }
            None if self.state.selected.is_some() => {
                anim::render(&mut self.state, board::unselect);
            }
            None => {}
        }
    }

    pub fn select_piece(&mut self, piece: Option<Piece>, spare: bool, force: bool) {
        match piece {
            Some(piece) => {
                anim::render(&mut self.state, |s| board::select_piece(s, piece, spare, force, true));
            }
            None if self.state.selected_piece.is_some() => {
                anim::render(&mut self.state, board::unselect);
            }
            None => {}
        }
    }

    pub fn set_pieces(&mut self, diff: PiecesDiff) {
        let bounds = Rc::clone(&self.bounds);
        anim::anim(&mut self.state, &*bounds, |s| board::set_pieces(s, diff));
    }

    pub fn add_to_hand(&mut self, piece: Piece, count: u8) {
        anim::render(&mut self.state, |s| board::add_to_hand(s, piece, count));
    }

    pub fn remove_from_hand(&mut self, piece: Piece, count: u8) {
        anim::render(&mut self.state, |s| board::remove_from_hand(s, piece, count));
    }

    pub fn play_premove(&mut self) -> bool {
        if self.state.premovable.current.is_none() {
            return false;
        }
        let bounds = Rc::clone(&self.bounds);
        if anim::anim(&mut self.state, &*bounds, board::play_premove) {
            return true;
        }
        self.state.request_redraw(RedrawRequest::Debounced);
        false
    }

    pub fn play_predrop(&mut self) -> bool {
        if self.state.predroppable.current.is_none() {
            return false;
        }
        let bounds = Rc::clone(&self.bounds);
        if anim::anim(&mut self.state, &*bounds, board::play_predrop) {
            return true;
        }
        self.state.request_redraw(RedrawRequest::Debounced);
        false
    }

    pub fn cancel_premove(&mut self) { anim::render(&mut self.state, board::unset_premove); }
    pub fn cancel_predrop(&mut self) { anim::render(&mut self.state, board::unset_predrop); }

    pub fn cancel_move_or_drop(&mut self) {
        anim::render(&mut self.state, |s| {
            board::cancel_move_or_drop(s);
            drag::cancel(s);
        });
    }

    pub fn stop(&mut self) {
        anim::render(&mut self.state, |s| {
            board::stop(s);
            drag::cancel(s);
            draw::cancel(s);
        });
    }

    pub fn set_shapes(&mut self, shapes: Vec<DrawShape>) {
        anim::render(&mut self.state, |s| s.drawable.shapes = shapes);
    }

    pub fn set_auto_shapes(&mut self, shapes: Vec<DrawShape>) {
        anim::render(&mut self.state, |s| s.drawable.auto_shapes = shapes);
    }

    pub fn set_square_highlights(&mut self, squares: Vec<SquareHighlight>) {
        anim::render(&mut self.state, |s| s.drawable.squares = squares);
    }

    // Starts dragging a piece that is not on the board yet: from a hand, or a spare from an
    // external palette.
    pub fn start_drag(&mut self, piece: Piece, input: &PointerInput, spare: bool) -> Option<Gesture> {
        if self.destroyed {
            return None;
        }
        let bounds = Rc::clone(&self.bounds);
        drag::drag_new_piece(&mut self.state, &*bounds, piece, input, spare).map(Gesture::Drag)
    }

    pub fn select_promotion(&mut self, promoted: bool) -> bool {
        let bounds = Rc::clone(&self.bounds);
        anim::anim(&mut self.state, &*bounds, |s| board::select_promotion(s, promoted))
    }

    pub fn cancel_promotion(&mut self) { anim::render(&mut self.state, board::cancel_promotion); }

    pub fn redraw_all(&mut self) {
        self.rebuild = true;
        self.state.request_redraw(RedrawRequest::Now);
    }

    // Stops all interaction. The embedder must release its DOM listeners.
    pub fn destroy(&mut self) {
        board::stop(&mut self.state);
        drag::cancel(&mut self.state);
        draw::cancel(&mut self.state);
        self.destroyed = true;
    }

    pub fn next_event(&mut self) -> Option<BoardEvent> { self.state.events.pop_front() }

    pub fn take_redraw(&mut self) -> RedrawRequest { self.state.take_redraw() }

    pub fn take_rebuild(&mut self) -> bool { std::mem::take(&mut self.rebuild) }

    // Animation frame loop that the caller should start, if any.
    pub fn take_anim_loop(&mut self) -> Option<CancelToken> { anim::take_new_loop(&mut self.state) }

    pub fn anim_frame(&mut self, now: Instant, token: &CancelToken) -> FrameStatus {
        anim::step(&mut self.state, now, token)
    }

    // Pointer down on the board.
    pub fn pointer_down(&mut self, input: &PointerInput) -> Option<Gesture> {
        if self.destroyed {
            return None;
        }
        let bounds = Rc::clone(&self.bounds);
        let state = &mut self.state;
        if state.draggable.current.is_some() {
            drag::cancel(state);
            None
        } else if state.drawable.current.is_some() {
            draw::cancel(state);
            None
        } else if input.modifiers.shift || draw::should_draw(state, input) {
            if !state.drawable.enabled {
                return None;
            }
            draw::start(state, &*bounds, input).map(Gesture::Draw)
        } else if !state.view_only {
            drag::start(state, &*bounds, input).map(Gesture::Drag)
        } else {
            None
        }
    }

    // Pointer down on a piece in a hand.
    pub fn hand_pointer_down(&mut self, piece: Piece, input: &PointerInput) -> Option<Gesture> {
        if self.destroyed || self.state.promotion.current.is_some() {
            return None;
        }
        let bounds = Rc::clone(&self.bounds);
        let state = &mut self.state;
        let gesture = if state.draggable.current.is_some() {
            drag::cancel(state);
            None
        } else if state.drawable.current.is_some() {
            draw::cancel(state);
            None
        } else if input.button == 1 {
            if state.drawable.enabled {
                draw::set_piece_stamp(state, piece);
            }
            None
        } else if draw::should_draw(state, input) {
            Some(Gesture::Draw(draw::start_from_hand(state, piece, input)))
        } else if !state.view_only {
            drag::start_from_hand(state, &*bounds, piece, input).map(Gesture::Drag)
        } else {
            None
        };
        state.request_redraw(RedrawRequest::Debounced);
        gesture
    }

    pub fn pointer_move(&mut self, input: &PointerInput) {
        let bounds = Rc::clone(&self.bounds);
        drag::pointer_move(&mut self.state, &*bounds, input);
        draw::pointer_move(&mut self.state, input);
    }

    // Pointer up anywhere in the document. `None` when the position is unknown (touchend).
    pub fn pointer_up(&mut self, input: Option<&PointerInput>) {
        let bounds = Rc::clone(&self.bounds);
        drag::end(&mut self.state, &*bounds, input);
        draw::end(&mut self.state);
    }

    pub fn gesture_frame(&mut self, gesture: &Gesture) -> FrameStatus {
        let bounds = Rc::clone(&self.bounds);
        match gesture {
            Gesture::Drag(token) => drag::process_frame(&mut self.state, &*bounds, token),
            Gesture::Draw(token) => draw::process_frame(&mut self.state, &*bounds, token),
        }
    }

    // Context menu and similar: drop gestures without committing anything.
    pub fn cancel_gestures(&mut self) {
        debug!("Cancelling gestures");
        drag::cancel(&mut self.state);
        draw::cancel(&mut self.state);
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::color::Color;
    use crate::piece::Role;

    fn sq(key: &str) -> Square { Square::from_key(key).unwrap() }

    #[test]
    fn sfen_getters() {
        let config = Config::from_sfen("4k4/9/9/9/9/9/9/9/4K4", Some("2P"));
        let sg = Shogiground::new(&config);
        assert_eq!(sg.get_board_sfen(), "4k4/9/9/9/9/9/9/9/4K4");
        assert_eq!(sg.get_hands_sfen(), "2P");
    }

    #[test]
    fn orientation_change_redraws_all() {
        let mut sg = Shogiground::new(&Config::default());
        assert!(sg.take_rebuild());
        let config = Config::from_json(r#"{"orientation": "gote"}"#).unwrap();
        assert_eq!(sg.set(&config, false), SetOutcome::RedrawAll);
        assert!(sg.take_rebuild());
        assert_eq!(sg.state().orientation, Color::Gote);
        let config = Config::from_json(r#"{"turnColor": "gote"}"#).unwrap();
        assert_eq!(sg.set(&config, false), SetOutcome::Incremental);
        assert!(!sg.take_rebuild());
    }

    #[test]
    fn select_none_unselects() {
        let config = Config::from_sfen("9/9/9/9/4G4/9/9/9/9", None);
        let mut sg = Shogiground::new(&config);
        sg.select_square(Some(sq("5e")), None, false);
        assert_eq!(sg.state().selected, Some(sq("5e")));
        sg.select_square(None, None, false);
        assert_eq!(sg.state().selected, None);
    }

    #[test]
    fn destroy_ignores_gestures() {
        let mut sg = Shogiground::new(&Config::default());
        sg.destroy();
        let piece = Piece::new(Role::Pawn, Color::Sente);
        assert!(sg.start_drag(piece, &crate::test_util::mouse((0., 0.)), true).is_none());
        assert!(sg.is_destroyed());
        assert_eq!(sg.state().active_color, None);
    }
}
