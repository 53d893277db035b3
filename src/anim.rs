// Animated transitions between two positions.
//
// Pieces have no identity, so the plan is guessed by diffing snapshots: every newly occupied
// square is matched with the closest vacated square holding the same piece (or its promoted /
// unpromoted form). Vacated squares that nothing was matched with fade out.

use std::collections::BTreeMap;
use std::time::Duration;

use instant::Instant;
use strum::IntoEnumIterator;

use crate::board::{Pieces, promote_piece};
use crate::color::Color;
use crate::display::{BoardBounds, non_degenerate, project_to_board, to_display};
use crate::frame::{CancelToken, FrameStatus, TaskHandle};
use crate::hand::HandMap;
use crate::piece::{Piece, Role};
use crate::square::Square;
use crate::state::{RedrawRequest, State};
use crate::util::{Point, distance_sq};


// Offset from the destination square to where the piece is drawn, in squares.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AnimVector {
    pub start: Point,
    pub current: Point,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct AnimPlan {
    pub anims: BTreeMap<Square, AnimVector>,
    pub fadings: BTreeMap<Square, Piece>,
    // Pieces that change form on the way: the glyph to show until the animation ends.
    pub promotions: BTreeMap<Square, Piece>,
}

impl AnimPlan {
    pub fn is_empty(&self) -> bool { self.anims.is_empty() && self.fadings.is_empty() }
}

#[derive(Debug)]
pub struct AnimCurrent {
    pub start: Instant,
    pub duration: Duration,
    pub plan: AnimPlan,
    task: TaskHandle,
    // A frame loop is already running for `task`.
    driven: bool,
}

#[derive(Clone, Debug)]
pub struct Snapshot {
    pub pieces: Pieces,
    pub hands: HandMap,
}

impl Snapshot {
    pub fn of(state: &State) -> Self {
        Snapshot {
            pieces: state.pieces.clone(),
            hands: state.hands.hand_map,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PlacedPiece {
    square: Option<Square>,
    pos: Point,
    piece: Piece,
}

fn square_pos(state: &State, sq: Square) -> Point {
    let (x, y) = to_display(sq, state.dimensions, state.orientation);
    (x as f64, y as f64)
}

fn related(state: &State, a: Piece, b: Piece) -> bool {
    a == b || promote_piece(state, a) == Some(b) || promote_piece(state, b) == Some(a)
}

pub fn compute_plan(prev: &Snapshot, state: &State, bounds: &dyn BoardBounds) -> AnimPlan {
    let mut missing = Vec::new();
    let mut new = Vec::new();
    for sq in state.dimensions.squares() {
        let cur = state.pieces.get(&sq).copied();
        let pre = prev.pieces.get(&sq).copied();
        let pos = square_pos(state, sq);
        if let Some(pre) = pre.filter(|&p| Some(p) != cur) {
            missing.push(PlacedPiece { square: Some(sq), pos, piece: pre });
        }
        if let Some(cur) = cur.filter(|&p| Some(p) != pre) {
            new.push(PlacedPiece { square: Some(sq), pos, piece: cur });
        }
    }

    if state.animation.hands {
        if let Some(board) = non_degenerate(bounds.board()) {
            for color in Color::iter() {
                for role in Role::iter() {
                    let piece = Piece::new(role, color);
                    if state.hands.hand_map[color][role] >= prev.hands[color][role] {
                        continue;
                    }
                    let pos = non_degenerate(bounds.hand_piece(piece))
                        .and_then(|rect| project_to_board(&rect, state.dimensions, &board));
                    if let Some(pos) = pos {
                        missing.push(PlacedPiece { square: None, pos, piece });
                    }
                }
            }
        }
    }

    let mut plan = AnimPlan::default();
    let mut animated_origs = Vec::new();
    for new_piece in &new {
        let Some(new_sq) = new_piece.square else {
            continue;
        };
        // First of the equally close candidates wins, which keeps the plan deterministic.
        let closest = missing
            .iter()
            .filter(|m| related(state, new_piece.piece, m.piece))
            .min_by(|a, b| {
                distance_sq(a.pos, new_piece.pos).total_cmp(&distance_sq(b.pos, new_piece.pos))
            });
        if let Some(origin) = closest {
            let vector = (origin.pos.0 - new_piece.pos.0, origin.pos.1 - new_piece.pos.1);
            plan.anims.insert(new_sq, AnimVector { start: vector, current: vector });
            if let Some(sq) = origin.square {
                animated_origs.push(sq);
            }
            if origin.piece != new_piece.piece {
                plan.promotions.insert(new_sq, origin.piece);
            }
        }
    }
    for m in missing {
        if let Some(sq) = m.square.filter(|sq| !animated_origs.contains(sq)) {
            plan.fadings.insert(sq, m.piece);
        }
    }
    plan
}

// Cubic ease-in-out.
pub fn easing(t: f64) -> f64 {
    if t < 0.5 {
        4. * t * t * t
    } else {
        (t - 1.) * (2. * t - 2.) * (2. * t - 2.) + 1.
    }
}

pub fn render<R>(state: &mut State, mutation: impl FnOnce(&mut State) -> R) -> R {
    let result = mutation(state);
    state.request_redraw(RedrawRequest::Debounced);
    result
}

pub fn anim<R>(
    state: &mut State, bounds: &dyn BoardBounds, mutation: impl FnOnce(&mut State) -> R,
) -> R {
    anim_at(state, bounds, Instant::now(), mutation)
}

pub fn anim_at<R>(
    state: &mut State, bounds: &dyn BoardBounds, now: Instant, mutation: impl FnOnce(&mut State) -> R,
) -> R {
    if !state.animation.enabled {
        return render(state, mutation);
    }
    let prev = Snapshot::of(state);
    let result = mutation(state);
    let plan = compute_plan(&prev, state, bounds);
    if plan.is_empty() {
        state.request_redraw(RedrawRequest::Debounced);
        return result;
    }
    // A running animation is restarted with the new plan but keeps its frame loop.
    let (task, driven) = match state.animation.current.take() {
        Some(cur) => (cur.task, cur.driven),
        None => (TaskHandle::new(), false),
    };
    state.animation.current = Some(AnimCurrent {
        start: now,
        duration: state.animation.duration,
        plan,
        task,
        driven,
    });
    state.request_redraw(RedrawRequest::NowWithoutShapes);
    result
}

// Returns a token for a frame loop to start, if an animation began that nothing drives yet.
pub fn take_new_loop(state: &mut State) -> Option<CancelToken> {
    let cur = state.animation.current.as_mut()?;
    if cur.driven {
        return None;
    }
    cur.driven = true;
    Some(cur.task.token())
}

pub fn step(state: &mut State, now: Instant, token: &CancelToken) -> FrameStatus {
    if token.is_cancelled() {
        return FrameStatus::Done;
    }
    let Some(cur) = state.animation.current.as_mut() else {
        state.request_redraw(RedrawRequest::Now);
        return FrameStatus::Done;
    };
    let elapsed = if now > cur.start { now - cur.start } else { Duration::ZERO };
    let rest = 1. - elapsed.as_secs_f64() / cur.duration.as_secs_f64().max(f64::MIN_POSITIVE);
    if rest <= 0. {
        state.animation.current = None;
        state.request_redraw(RedrawRequest::Now);
        return FrameStatus::Done;
    }
    let ease = easing(rest);
    for v in cur.plan.anims.values_mut() {
        v.current = (v.start.0 * ease, v.start.1 * ease);
    }
    // Shapes are only redrawn once the pieces settle.
    state.request_redraw(RedrawRequest::NowWithoutShapes);
    FrameStatus::Continue
}
