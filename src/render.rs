// What the DOM should look like, computed from `State` without touching the DOM.
//
// The browser crate keeps the actual nodes and applies the operations produced here. Piece
// nodes are reconciled rather than rebuilt: a node that still shows the right piece stays, a
// node whose piece moved elsewhere is reused for the new square, and only the leftovers are
// created or removed.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use strum::IntoEnumIterator;

use crate::board;
use crate::color::Color;
use crate::display::{Rect, square_size, to_display};
use crate::piece::Piece;
use crate::square::Square;
use crate::state::{PromotionSource, State};
use crate::util::Point;


pub type SquareClasses = BTreeMap<Square, String>;

fn add_class(classes: &mut SquareClasses, sq: Square, class: &str) {
    classes
        .entry(sq)
        .and_modify(|c| {
            c.push(' ');
            c.push_str(class);
        })
        .or_insert_with(|| class.to_owned());
}

fn dest_class(state: &State, base: &str, sq: Square) -> String {
    if state.pieces.contains_key(&sq) { format!("{base} oc") } else { base.to_owned() }
}

pub fn square_classes(state: &State) -> SquareClasses {
    let mut classes = SquareClasses::new();
    if state.highlight.last_dests {
        for &sq in state.last_dests.iter().flatten() {
            add_class(&mut classes, sq, "last-dest");
        }
    }
    if state.highlight.check {
        for &sq in state.checks.iter().flatten() {
            add_class(&mut classes, sq, "check");
        }
    }
    if let Some(sq) = state.hovered {
        add_class(&mut classes, sq, "hover");
    }
    if let Some(selected) = state.selected {
        let is_pre = state.pieces.get(&selected).is_some_and(|&p| board::is_premovable(state, p));
        add_class(&mut classes, selected, if is_pre { "preselected" } else { "selected" });
        if state.movable.show_dests {
            let dests = state.movable.dests.as_ref().and_then(|d| d.get(&selected));
            for &sq in dests.into_iter().flatten() {
                add_class(&mut classes, sq, &dest_class(state, "dest", sq));
            }
        }
        if state.premovable.show_dests {
            for &sq in state.premovable.dests.iter().flatten() {
                add_class(&mut classes, sq, &dest_class(state, "pre-dest", sq));
            }
        }
    } else if let Some(piece) = state.selected_piece {
        if state.droppable.show_dests {
            let dests = state.droppable.dests.as_ref().and_then(|d| d.get(&piece));
            for &sq in dests.into_iter().flatten() {
                add_class(&mut classes, sq, "dest");
            }
        }
        if state.predroppable.show_dests {
            for &sq in state.predroppable.dests.iter().flatten() {
                add_class(&mut classes, sq, &dest_class(state, "pre-dest", sq));
            }
        }
    }
    let prom = |promotion: bool| if promotion { "current-pre prom" } else { "current-pre" };
    if let Some(premove) = state.premovable.current {
        add_class(&mut classes, premove.orig, "current-pre");
        add_class(&mut classes, premove.dest, prom(premove.promotion));
    } else if let Some(predrop) = state.predroppable.current {
        add_class(&mut classes, predrop.dest, prom(predrop.promotion));
    }
    for highlight in &state.drawable.squares {
        add_class(&mut classes, highlight.key, &highlight.class_name);
    }
    classes
}

// A piece node currently in the DOM.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PieceNode {
    pub id: usize,
    pub square: Square,
    pub piece: Piece,
    pub fading: bool,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PieceView {
    pub square: Square,
    pub piece: Piece,
    // Pixels relative to the board's top-left corner.
    pub translate: Point,
    pub animating: bool,
    pub fading: bool,
    pub ghost: bool,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PieceOp {
    Update { id: usize, view: PieceView },
    Create { view: PieceView },
    Remove { id: usize },
}

fn ghost_square(state: &State) -> Option<Square> {
    let dragged = state
        .draggable
        .current
        .as_ref()
        .filter(|cur| cur.started && state.draggable.show_ghost)
        .and_then(|cur| cur.orig_square());
    let promoting = state.promotion.current.and_then(|p| match p.source {
        PromotionSource::Move { orig } => Some(orig),
        PromotionSource::Drop => None,
    });
    dragged.or(promoting)
}

pub fn plan_pieces(state: &State, nodes: &[PieceNode], square_px: (f64, f64)) -> Vec<PieceOp> {
    let plan = state.animation.current.as_ref().map(|a| &a.plan);
    let anim_vector = |sq: &Square| plan.and_then(|p| p.anims.get(sq)).map(|v| v.current);
    let fading_piece = |sq: &Square| plan.and_then(|p| p.fadings.get(sq)).copied();
    // While animating, a promoting piece keeps its old form.
    let shown_piece = |sq: &Square| -> Option<Piece> {
        let promoted_from = plan.filter(|p| p.anims.contains_key(sq)).and_then(|p| p.promotions.get(sq));
        promoted_from.or(state.pieces.get(sq)).copied()
    };
    let ghost = ghost_square(state);
    let view = |sq: Square, piece: Piece, fading: bool| {
        let (x, y) = to_display(sq, state.dimensions, state.orientation);
        let (dx, dy) = anim_vector(&sq).unwrap_or((0., 0.));
        PieceView {
            square: sq,
            piece,
            translate: ((x as f64 + dx) * square_px.0, (y as f64 + dy) * square_px.1),
            animating: anim_vector(&sq).is_some(),
            fading,
            ghost: ghost == Some(sq),
        }
    };

    let mut ops = Vec::new();
    let mut same = BTreeSet::new();
    let mut moved: HashMap<Piece, Vec<usize>> = HashMap::new();
    for node in nodes {
        let sq = node.square;
        if fading_piece(&sq) == Some(node.piece) && state.pieces.get(&sq) != Some(&node.piece) {
            ops.push(PieceOp::Update { id: node.id, view: view(sq, node.piece, true) });
        } else if shown_piece(&sq) == Some(node.piece) && same.insert(sq) {
            ops.push(PieceOp::Update { id: node.id, view: view(sq, node.piece, false) });
        } else {
            moved.entry(node.piece).or_default().push(node.id);
        }
    }
    for &sq in state.pieces.keys() {
        if same.contains(&sq) {
            continue;
        }
        let Some(piece) = shown_piece(&sq) else {
            continue;
        };
        match moved.get_mut(&piece).and_then(Vec::pop) {
            Some(id) => ops.push(PieceOp::Update { id, view: view(sq, piece, false) }),
            None => ops.push(PieceOp::Create { view: view(sq, piece, false) }),
        }
    }
    let mut leftovers: Vec<usize> = moved.into_values().flatten().collect();
    leftovers.sort_unstable();
    ops.extend(leftovers.into_iter().map(|id| PieceOp::Remove { id }));
    ops
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FloatingPiece {
    pub piece: Piece,
    // Pixels relative to the board's top-left corner.
    pub translate: Point,
    pub touch: bool,
}

// The copy of the dragged piece that follows the pointer.
pub fn floating_piece(state: &State, board: &Rect) -> Option<FloatingPiece> {
    let cur = state.draggable.current.as_ref().filter(|cur| cur.started)?;
    let (w, h) = square_size(board, state.dimensions);
    Some(FloatingPiece {
        piece: cur.piece,
        translate: (cur.pos.0 - board.left - w / 2., cur.pos.1 - board.top - h / 2.),
        touch: cur.touch,
    })
}

// Compared with the previous value to skip redrawing an unchanged dialog.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PromotionOverlay {
    pub dest: Square,
    // Display column and row of the target square.
    pub display: (u8, u8),
    // The promoted option comes first.
    pub options: [Piece; 2],
    pub dragged: bool,
}

pub fn promotion_overlay(state: &State) -> Option<PromotionOverlay> {
    let cur = state.promotion.current?;
    Some(PromotionOverlay {
        dest: cur.dest,
        display: to_display(cur.dest, state.dimensions, state.orientation),
        options: [cur.promoted_piece, cur.piece],
        dragged: cur.dragged,
    })
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HandPieceView {
    pub piece: Piece,
    pub count: u8,
    pub classes: String,
}

pub fn hand_counts(state: &State, color: Color) -> Vec<HandPieceView> {
    let dragged_from_hand = state
        .draggable
        .current
        .as_ref()
        .filter(|cur| cur.started && cur.orig_square().is_none() && !cur.spare)
        .map(|cur| cur.piece);
    state
        .hands
        .roles
        .iter()
        .map(|&role| {
            let piece = Piece::new(role, color);
            let mut classes = Vec::new();
            if state.selected_piece == Some(piece) {
                let pre = board::is_predroppable(state, piece);
                classes.push(if pre { "preselected" } else { "selected" });
            }
            if state.predroppable.current.is_some_and(|p| p.piece == piece) {
                classes.push("current-pre");
            }
            if state.drawable.piece == Some(piece) {
                classes.push("drawing");
            }
            if state.highlight.last_piece && state.last_piece == Some(piece) {
                classes.push("last-piece");
            }
            if dragged_from_hand == Some(piece) && state.draggable.show_ghost {
                classes.push("ghost");
            }
            HandPieceView {
                piece,
                count: state.hands.count(piece),
                classes: classes.join(" "),
            }
        })
        .collect()
}

// Hand shown above the board, then the one below it.
pub fn hand_colors(state: &State) -> [Color; 2] { [state.orientation.opposite(), state.orientation] }

// Labels in display order: files left to right, ranks top to bottom.
pub fn coordinate_labels(state: &State) -> (Vec<String>, Vec<String>) {
    let dims = state.dimensions;
    let files: Vec<String> = match &state.coordinates.files {
        Some(labels) => labels.iter().take(dims.files as usize).cloned().collect(),
        None => (1..=dims.files).rev().map(|f| f.to_string()).collect(),
    };
    let ranks: Vec<String> = match &state.coordinates.ranks {
        Some(labels) => labels.iter().take(dims.ranks as usize).cloned().collect(),
        None => (0..dims.ranks).map(|r| char::from(b'a' + r).to_string()).collect(),
    };
    match state.orientation {
        Color::Sente => (files, ranks),
        Color::Gote => (files.into_iter().rev().collect(), ranks.into_iter().rev().collect()),
    }
}

pub fn all_hand_views(state: &State) -> BTreeMap<Color, Vec<HandPieceView>> {
    Color::iter().map(|color| (color, hand_counts(state, color))).collect()
}
