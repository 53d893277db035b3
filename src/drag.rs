// Drag and drop of board and hand pieces.
//
// The controller only translates pointer input into interaction core calls; all legality
// decisions are made by `board`. A drag does not move the piece until the pointer leaves a small
// dead zone, so plain clicks keep working as click-to-move.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::anim;
use crate::board;
use crate::display::{BoardBounds, Rect, non_degenerate, square_at};
use crate::draw;
use crate::event::BoardEvent;
use crate::frame::{CancelToken, FrameStatus, TaskHandle};
use crate::piece::Piece;
use crate::square::Square;
use crate::state::{RedrawRequest, State};
use crate::util::{Point, distance_sq};


#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub alt_graph: bool,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PointerInput {
    // Client coordinates.
    pub pos: Point,
    // 0 is the main button, 2 is the secondary one.
    pub button: i16,
    pub modifiers: Modifiers,
    pub is_touch: bool,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DragOrigin {
    Board {
        orig: Square,
        previously_selected: Option<Square>,
        // The pointer has been over another square since the drag started.
        key_has_changed: bool,
    },
    // From a hand or from a spare palette.
    Outside {
        origin_rect: Option<Rect>,
        left_origin: bool,
        previously_selected_piece: Option<Piece>,
    },
}

#[derive(Debug)]
pub struct DragCurrent {
    pub piece: Piece,
    pub origin: DragOrigin,
    pub orig_pos: Point,
    pub pos: Point,
    // Past the dead zone: the floating piece follows the pointer.
    pub started: bool,
    pub spare: bool,
    pub touch: bool,
    task: TaskHandle,
}

impl DragCurrent {
    pub fn orig_square(&self) -> Option<Square> {
        match self.origin {
            DragOrigin::Board { orig, .. } => Some(orig),
            DragOrigin::Outside { .. } => None,
        }
    }

    pub fn token(&self) -> CancelToken { self.task.token() }
}

fn pointer_square(state: &State, bounds: &dyn BoardBounds, pos: Point) -> Option<Square> {
    let board = non_degenerate(bounds.board())?;
    square_at(pos, state.dimensions, state.orientation, &board)
}

fn skip_dead_zone(state: &State, touch: bool) -> bool {
    state.draggable.auto_distance && !touch && state.stats.dragged
}

// Whether a touch at `pos` should be kept from scrolling the page.
pub fn should_block_touch(state: &State, bounds: &dyn BoardBounds, pos: Point) -> bool {
    let occupied = pointer_square(state, bounds, pos).is_some_and(|sq| state.pieces.contains_key(&sq));
    state.block_touch_scroll || state.selected.is_some() || state.selected_piece.is_some() || occupied
}

// Pointer down on the board. Returns a token for the drag frame loop if a drag began.
pub fn start(state: &mut State, bounds: &dyn BoardBounds, input: &PointerInput) -> Option<CancelToken> {
    let orig = pointer_square(state, bounds, input.pos)?;
    let piece = state.pieces.get(&orig).copied();
    let previously_selected = state.selected;
    if previously_selected.is_none()
        && state.drawable.enabled
        && (state.drawable.erase_on_click || piece.is_none_or(|p| p.color != state.turn_color))
    {
        draw::clear(state);
    }
    draw::cancel(state);
    let had_premove = state.premovable.current.is_some();
    let had_predrop = state.predroppable.current.is_some();

    if let Some(selected) = state.selected {
        if !board::promotion_dialog_move(state, selected, orig) {
            if board::can_move(state, selected, orig) {
                anim::anim(state, bounds, |s| board::select_square(s, orig, None, false));
            } else {
                board::select_square(state, orig, None, false);
            }
        }
    } else if let Some(selected) = state.selected_piece {
        if !board::promotion_dialog_drop(state, selected, orig) {
            if board::can_drop(state, selected, orig) {
                anim::anim(state, bounds, |s| board::select_square(s, orig, None, false));
            } else {
                board::select_square(state, orig, None, false);
            }
        }
    } else {
        board::select_square(state, orig, None, false);
    }

    let still_selected = state.selected == Some(orig);
    let token = match piece {
        Some(piece) if still_selected && board::is_draggable(state, piece) => {
            let current = DragCurrent {
                piece,
                origin: DragOrigin::Board { orig, previously_selected, key_has_changed: false },
                orig_pos: input.pos,
                pos: input.pos,
                started: skip_dead_zone(state, input.is_touch),
                spare: false,
                touch: input.is_touch,
                task: TaskHandle::new(),
            };
            let token = current.token();
            state.draggable.current = Some(current);
            Some(token)
        }
        _ => {
            if had_premove {
                board::unset_premove(state);
            }
            if had_predrop {
                board::unset_predrop(state);
            }
            None
        }
    };
    state.request_redraw(RedrawRequest::Debounced);
    token
}

// Pointer down on a hand piece, or on a spare piece when `spare` is set.
pub fn drag_new_piece(
    state: &mut State, bounds: &dyn BoardBounds, piece: Piece, input: &PointerInput, spare: bool,
) -> Option<CancelToken> {
    let previously_selected_piece = state.selected_piece;
    if previously_selected_piece.is_none() && !spare && state.drawable.enabled && state.drawable.erase_on_click {
        draw::clear(state);
    }
    draw::cancel(state);
    let had_premove = state.premovable.current.is_some();
    let had_predrop = state.predroppable.current.is_some();
    board::select_piece(state, piece, spare, false, false);

    let still_selected = state.selected_piece == Some(piece);
    let draggable = state.draggable.enabled
        && (board::is_droppable(state, piece, spare) || board::is_predroppable(state, piece));
    let token = if still_selected && draggable {
        let origin_rect = if spare { None } else { non_degenerate(bounds.hand_piece(piece)) };
        let current = DragCurrent {
            piece,
            origin: DragOrigin::Outside {
                origin_rect,
                left_origin: false,
                previously_selected_piece: if spare { None } else { previously_selected_piece },
            },
            orig_pos: input.pos,
            pos: input.pos,
            started: skip_dead_zone(state, input.is_touch),
            spare,
            touch: input.is_touch,
            task: TaskHandle::new(),
        };
        let token = current.token();
        state.draggable.current = Some(current);
        Some(token)
    } else {
        if had_premove {
            board::unset_premove(state);
        }
        if had_predrop {
            board::unset_predrop(state);
        }
        None
    };
    state.request_redraw(RedrawRequest::Debounced);
    token
}

pub fn start_from_hand(
    state: &mut State, bounds: &dyn BoardBounds, piece: Piece, input: &PointerInput,
) -> Option<CancelToken> {
    drag_new_piece(state, bounds, piece, input, false)
}

pub fn pointer_move(state: &mut State, bounds: &dyn BoardBounds, input: &PointerInput) {
    if let Some(cur) = state.draggable.current.as_mut() {
        cur.pos = input.pos;
    } else if state.selected.is_some() || state.selected_piece.is_some() || state.highlight.hovered {
        let hover = pointer_square(state, bounds, input.pos);
        if board::update_hovered(state, hover) {
            state.request_redraw(RedrawRequest::Debounced);
        }
    }
}

// One animation frame of an active drag.
pub fn process_frame(state: &mut State, bounds: &dyn BoardBounds, token: &CancelToken) -> FrameStatus {
    if token.is_cancelled() {
        return FrameStatus::Done;
    }
    let Some(cur) = state.draggable.current.as_ref() else {
        return FrameStatus::Done;
    };
    let orig = cur.orig_square();
    let dragged_piece = cur.piece;

    // The dragged piece must not be animated away under the pointer.
    if let Some(orig) = orig {
        if state.animation.current.as_ref().is_some_and(|a| a.plan.anims.contains_key(&orig)) {
            state.animation.current = None;
        }
    }
    // Someone else may have changed the board since the drag started.
    let still_there = match orig {
        Some(orig) => state.pieces.get(&orig) == Some(&dragged_piece),
        None => true,
    };
    if !still_there {
        debug!("Dragged piece is gone, cancelling drag");
        cancel(state);
        return FrameStatus::Done;
    }

    let distance = state.draggable.distance;
    let Some(cur) = state.draggable.current.as_mut() else {
        return FrameStatus::Done;
    };
    if !cur.started && distance_sq(cur.pos, cur.orig_pos) >= distance * distance {
        cur.started = true;
        state.request_redraw(RedrawRequest::Debounced);
    }
    let Some(cur) = state.draggable.current.as_ref() else {
        return FrameStatus::Done;
    };
    if cur.started {
        let pos = cur.pos;
        let hover = pointer_square(state, bounds, pos);
        if let Some(cur) = state.draggable.current.as_mut() {
            match &mut cur.origin {
                DragOrigin::Board { orig, key_has_changed, .. } => {
                    *key_has_changed |= hover != Some(*orig);
                }
                DragOrigin::Outside { origin_rect, left_origin, .. } => {
                    *left_origin |= origin_rect.is_some_and(|r| !r.contains(pos));
                }
            }
        }
        if hover != state.hovered {
            board::update_hovered(state, hover);
        }
        // The floating piece follows the pointer on every frame.
        state.request_redraw(RedrawRequest::NowWithoutShapes);
    }
    FrameStatus::Continue
}

fn unselect_after(state: &mut State, origin: DragOrigin, piece: Piece, pos: Point, dest: Option<Square>) {
    match origin {
        DragOrigin::Board { orig, .. } if Some(orig) == dest => {
            state.emit(BoardEvent::Unselect { square: orig });
        }
        DragOrigin::Outside { origin_rect: Some(rect), .. } if rect.contains(pos) => {
            state.emit(BoardEvent::PieceUnselect { piece });
        }
        _ => {}
    }
    board::unselect(state);
}

// Pointer up. `input.pos` may be stale for touch events, the last known position is used then.
pub fn end(state: &mut State, bounds: &dyn BoardBounds, input: Option<&PointerInput>) {
    let Some(cur) = state.draggable.current.take() else {
        return;
    };
    board::unset_premove(state);
    board::unset_predrop(state);
    let pos = input.map_or(cur.pos, |i| i.pos);
    let dest = pointer_square(state, bounds, pos);

    match (dest, cur.origin) {
        (Some(dest), DragOrigin::Board { orig, .. }) if cur.started && orig != dest => {
            if !board::promotion_dialog_move(state, orig, dest) {
                anim::render(state, |s| board::user_move(s, orig, dest, None));
            }
        }
        (Some(dest), DragOrigin::Outside { .. }) if cur.started => {
            if !board::promotion_dialog_drop(state, cur.piece, dest) {
                anim::render(state, |s| board::user_drop(s, cur.piece, dest, None));
            }
        }
        (None, origin) if state.draggable.delete_on_drop_off => {
            match origin {
                DragOrigin::Board { orig, .. } => {
                    state.pieces.remove(&orig);
                }
                DragOrigin::Outside { .. } if !cur.spare => board::remove_from_hand(state, cur.piece, 1),
                DragOrigin::Outside { .. } => {}
            }
            if state.draggable.add_to_hand_on_drop_off {
                let hand = [state.orientation.opposite(), state.orientation]
                    .into_iter()
                    .find(|&color| non_degenerate(bounds.hand(color)).is_some_and(|r| r.contains(pos)));
                if let Some(color) = hand {
                    board::add_to_hand(state, Piece::new(cur.piece.role, color), 1);
                }
                board::unselect(state);
            }
            state.emit(BoardEvent::Change);
        }
        _ => {}
    }

    match cur.origin {
        DragOrigin::Board { orig, previously_selected, key_has_changed }
            if (previously_selected == Some(orig) || key_has_changed)
                && (dest == Some(orig) || dest.is_none()) =>
        {
            unselect_after(state, cur.origin, cur.piece, pos, dest);
        }
        DragOrigin::Outside { left_origin, previously_selected_piece, .. }
            if (left_origin && dest.is_none())
                || (!left_origin && previously_selected_piece == Some(cur.piece)) =>
        {
            unselect_after(state, cur.origin, cur.piece, pos, dest);
        }
        _ if !state.selectable.enabled && state.promotion.current.is_none() => board::unselect(state),
        _ => {}
    }

    if cur.started {
        state.stats.dragged = true;
    }
    if !state.highlight.hovered && state.promotion.current.is_none() {
        state.hovered = None;
    }
    state.request_redraw(RedrawRequest::Debounced);
}

// Drops the gesture without touching the selection, used when a touch ends on another target.
pub fn abandon(state: &mut State) {
    if state.draggable.current.take().is_some() && !state.highlight.hovered {
        state.hovered = None;
    }
    state.request_redraw(RedrawRequest::Debounced);
}

pub fn cancel(state: &mut State) {
    if state.draggable.current.take().is_some() {
        if !state.highlight.hovered {
            state.hovered = None;
        }
        board::unselect(state);
        state.request_redraw(RedrawRequest::Debounced);
    }
}
