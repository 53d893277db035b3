// The interaction core: moves, drops, selection, premoves, predrops and promotion dialogs.
//
// Every function here mutates `State` directly and reports through queued events. Illegal input
// is never an error: functions return `false` and deselect, the caller decides whether this
// means "snap back" or "do nothing".

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{ActiveColor, Color};
use crate::event::{BoardEvent, DropMetadata, MoveMetadata};
use crate::piece::Piece;
use crate::square::Square;
use crate::state::{Predrop, Premove, PromotionCurrent, PromotionSource, State};


pub type Pieces = BTreeMap<Square, Piece>;
pub type MoveDests = BTreeMap<Square, Vec<Square>>;
pub type DropDests = BTreeMap<Piece, Vec<Square>>;
// Sparse update: `None` removes the piece from the square.
pub type PiecesDiff = Vec<(Square, Option<Piece>)>;

// Which squares to mark as "in check".
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Checks {
    // `true` means the color to move, `false` means none.
    Flag(bool),
    Color(Color),
    Squares(Vec<Square>),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Committed {
    pub captured: Option<Piece>,
}

pub fn promote_piece(state: &State, piece: Piece) -> Option<Piece> {
    state.promotion.rules.promotes_to(piece.role).map(|role| piece.with_role(role))
}

pub fn unpromote_piece(state: &State, piece: Piece) -> Option<Piece> {
    state.promotion.rules.unpromotes_to(piece.role).map(|role| piece.with_role(role))
}

fn hand_count(state: &State, piece: Piece) -> u8 { state.hands.count(piece) }

fn active_for_turn(state: &State, color: Color) -> bool {
    match state.active_color {
        Some(ActiveColor::Both) => true,
        Some(active) => active.single() == Some(color) && state.turn_color == color,
        None => false,
    }
}

fn active_off_turn(state: &State, color: Color) -> bool {
    state.active_color.and_then(ActiveColor::single) == Some(color) && state.turn_color != color
}

pub fn is_movable(state: &State, piece: Piece) -> bool {
    !state.view_only && active_for_turn(state, piece.color)
}

pub fn is_droppable(state: &State, piece: Piece, spare: bool) -> bool {
    !state.view_only
        && (spare || state.droppable.spare || hand_count(state, piece) > 0)
        && active_for_turn(state, piece.color)
}

pub fn is_premovable(state: &State, piece: Piece) -> bool {
    !state.view_only && state.premovable.enabled && active_off_turn(state, piece.color)
}

pub fn is_predroppable(state: &State, piece: Piece) -> bool {
    !state.view_only
        && state.predroppable.enabled
        && hand_count(state, piece) > 0
        && active_off_turn(state, piece.color)
}

pub fn is_draggable(state: &State, piece: Piece) -> bool {
    state.draggable.enabled && (is_movable(state, piece) || is_premovable(state, piece))
}

pub fn can_move(state: &State, orig: Square, dest: Square) -> bool {
    let Some(&piece) = state.pieces.get(&orig) else {
        return false;
    };
    orig != dest
        && state.dimensions.contains(dest)
        && is_movable(state, piece)
        && state.pieces.get(&dest).is_none_or(|p| p.color != piece.color)
        && (state.movable.free
            || state.movable.dests.as_ref().is_some_and(|d| d.get(&orig).is_some_and(|v| v.contains(&dest))))
}

// Drops only go to empty squares, even in free and spare modes.
pub fn can_drop(state: &State, piece: Piece, dest: Square) -> bool {
    state.dimensions.contains(dest)
        && !state.pieces.contains_key(&dest)
        && is_droppable(state, piece, false)
        && (state.droppable.free
            || state.droppable.spare
            || state.droppable.dests.as_ref().is_some_and(|d| d.get(&piece).is_some_and(|v| v.contains(&dest))))
}

// Premove destinations are generated once per selection and reused for every pointer move over
// the board. Moves from anywhere else (API, drags that skipped selection) are generated on
// demand.
pub fn can_premove(state: &State, orig: Square, dest: Square) -> bool {
    let Some(&piece) = state.pieces.get(&orig) else {
        return false;
    };
    if orig == dest || !state.dimensions.contains(dest) || !is_premovable(state, piece) {
        return false;
    }
    match (&state.premovable.dests, state.selected) {
        (Some(dests), Some(selected)) if selected == orig => dests.contains(&dest),
        _ => state
            .premove_generator
            .premove_dests(orig, &state.pieces, state.dimensions)
            .contains(&dest),
    }
}

pub fn can_predrop(state: &State, piece: Piece, dest: Square) -> bool {
    if !state.dimensions.contains(dest)
        || !is_predroppable(state, piece)
        || state.pieces.get(&dest).is_some_and(|p| p.color == piece.color)
    {
        return false;
    }
    match (&state.predroppable.dests, state.selected_piece) {
        (Some(dests), Some(selected)) if selected == piece => dests.contains(&dest),
        _ => state
            .premove_generator
            .predrop_dests(piece, &state.pieces, state.dimensions)
            .contains(&dest),
    }
}

fn can_move_promote(state: &State, orig: Square, dest: Square) -> bool {
    state.pieces.get(&orig).is_some_and(|&piece| {
        state.promotion.rules.move_promotion_dialog(orig, dest, piece, state.dimensions)
    })
}

fn can_drop_promote(state: &State, piece: Piece, dest: Square) -> bool {
    !state.droppable.spare && state.promotion.rules.drop_promotion_dialog(piece, dest, state.dimensions)
}

pub fn set_checks(state: &mut State, checks: Checks) {
    let color = match checks {
        Checks::Squares(squares) => {
            state.checks = Some(squares);
            return;
        }
        Checks::Flag(false) => None,
        Checks::Flag(true) => Some(state.turn_color),
        Checks::Color(color) => Some(color),
    };
    state.checks = color.map(|color| {
        state
            .pieces
            .iter()
            .filter(|(_, p)| p.color == color && state.highlight.check_roles.contains(&p.role))
            .map(|(&sq, _)| sq)
            .collect()
    });
}

pub fn toggle_orientation(state: &mut State) {
    state.orientation = state.orientation.opposite();
    state.animation.current = None;
    state.draggable.current = None;
    state.promotion.current = None;
    state.hovered = None;
    state.selected = None;
    state.selected_piece = None;
    state.premovable.dests = None;
    state.predroppable.dests = None;
}

pub fn reset(state: &mut State) {
    unselect(state);
    unset_premove(state);
    unset_predrop(state);
    cancel_promotion(state);
    state.animation.current = None;
    state.draggable.current = None;
    state.hovered = None;
}

pub fn set_pieces(state: &mut State, diff: PiecesDiff) {
    for (sq, piece) in diff {
        if !state.dimensions.contains(sq) {
            debug!("Ignoring piece update outside the board: {sq}");
            continue;
        }
        match piece {
            Some(piece) => state.pieces.insert(sq, piece),
            None => state.pieces.remove(&sq),
        };
    }
    state.emit(BoardEvent::Change);
}

pub fn delete_piece(state: &mut State, sq: Square) {
    if state.pieces.remove(&sq).is_some() {
        state.emit(BoardEvent::Change);
    }
}

pub fn add_to_hand(state: &mut State, piece: Piece, cnt: u8) {
    let rules = state.promotion.rules.clone();
    match state.hands.normalize_role(piece.role, |r| rules.unpromotes_to(r)) {
        Some(role) => state.hands.add(piece.color, role, cnt),
        None => debug!("{piece} cannot be put into a hand"),
    }
}

pub fn remove_from_hand(state: &mut State, piece: Piece, cnt: u8) {
    let rules = state.promotion.rules.clone();
    if let Some(role) = state.hands.normalize_role(piece.role, |r| rules.unpromotes_to(r)) {
        state.hands.remove(piece.color, role, cnt);
    }
}

fn set_premove(state: &mut State, orig: Square, dest: Square, promotion: bool) {
    unset_predrop(state);
    state.premovable.current = Some(Premove { orig, dest, promotion });
    state.emit(BoardEvent::PremoveSet { orig, dest, promotion });
}

pub fn unset_premove(state: &mut State) {
    if state.premovable.current.take().is_some() {
        state.emit(BoardEvent::PremoveUnset);
    }
}

fn set_predrop(state: &mut State, piece: Piece, dest: Square, promotion: bool) {
    unset_premove(state);
    state.predroppable.current = Some(Predrop { piece, dest, promotion });
    state.emit(BoardEvent::PredropSet { piece, dest, promotion });
}

pub fn unset_predrop(state: &mut State) {
    if state.predroppable.current.take().is_some() {
        state.emit(BoardEvent::PredropUnset);
    }
}

// Moves a piece without any legality checks. Does not change the turn.
pub fn base_move(state: &mut State, orig: Square, dest: Square, promotion: bool) -> Option<Committed> {
    let orig_piece = *state.pieces.get(&orig)?;
    if orig == dest || !state.dimensions.contains(dest) {
        return None;
    }
    let captured = state.pieces.get(&dest).copied().filter(|p| p.color != orig_piece.color);
    let new_piece = match promotion {
        true => promote_piece(state, orig_piece).unwrap_or(orig_piece),
        false => orig_piece,
    };
    if state.selected == Some(dest) || state.selected == Some(orig) {
        unselect(state);
    }
    state.pieces.insert(dest, new_piece);
    state.pieces.remove(&orig);
    state.last_dests = Some(vec![orig, dest]);
    state.last_piece = None;
    state.checks = None;
    state.emit(BoardEvent::Move { orig, dest, promotion, captured });
    state.emit(BoardEvent::Change);
    Some(Committed { captured })
}

// Drops a piece without legality checks other than the hand count. Does not change the turn.
pub fn base_drop(state: &mut State, piece: Piece, dest: Square, promotion: bool) -> bool {
    let count = hand_count(state, piece);
    let spare = state.droppable.spare;
    if (count == 0 && !spare) || !state.dimensions.contains(dest) {
        return false;
    }
    let new_piece = match promotion {
        true => promote_piece(state, piece).unwrap_or(piece),
        false => piece,
    };
    if state.selected == Some(dest) || (!spare && count == 1 && state.selected_piece == Some(piece)) {
        unselect(state);
    }
    state.pieces.insert(dest, new_piece);
    state.last_dests = Some(vec![dest]);
    state.last_piece = Some(piece);
    state.checks = None;
    if !spare {
        remove_from_hand(state, piece, 1);
    }
    state.emit(BoardEvent::Drop { piece, dest, promotion });
    state.emit(BoardEvent::Change);
    true
}

fn after_user_turn(state: &mut State) {
    state.movable.dests = None;
    state.droppable.dests = None;
    state.turn_color = state.turn_color.opposite();
    state.animation.current = None;
}

fn base_user_move(state: &mut State, orig: Square, dest: Square, promotion: bool) -> Option<Committed> {
    let committed = base_move(state, orig, dest, promotion)?;
    after_user_turn(state);
    Some(committed)
}

fn base_user_drop(state: &mut State, piece: Piece, dest: Square, promotion: bool) -> bool {
    let ok = base_drop(state, piece, dest, promotion);
    if ok {
        after_user_turn(state);
    }
    ok
}

fn resolve_move_promotion(state: &State, orig: Square, dest: Square, promotion: Option<bool>) -> bool {
    promotion.unwrap_or_else(|| {
        state.pieces.get(&orig).is_some_and(|&piece| {
            state.promotion.rules.force_move_promotion(orig, dest, piece, state.dimensions)
        })
    })
}

fn resolve_drop_promotion(state: &State, piece: Piece, dest: Square, promotion: Option<bool>) -> bool {
    promotion
        .unwrap_or_else(|| state.promotion.rules.force_drop_promotion(piece, dest, state.dimensions))
}

// Returns true if the move was played or queued as a premove.
pub fn user_move(state: &mut State, orig: Square, dest: Square, promotion: Option<bool>) -> bool {
    let promotion = resolve_move_promotion(state, orig, dest, promotion);
    if can_move(state, orig, dest) {
        if let Some(Committed { captured }) = base_user_move(state, orig, dest, promotion) {
            unselect(state);
            let metadata = MoveMetadata { premade: false, captured };
            state.emit(BoardEvent::AfterMove { orig, dest, promotion, metadata });
            return true;
        }
    } else if can_premove(state, orig, dest) {
        set_premove(state, orig, dest, promotion);
        unselect(state);
        return true;
    }
    debug!("Rejected move {orig}-{dest}");
    unselect(state);
    false
}

// Returns true if the drop was played or queued as a predrop.
pub fn user_drop(state: &mut State, piece: Piece, dest: Square, promotion: Option<bool>) -> bool {
    let promotion = resolve_drop_promotion(state, piece, dest, promotion);
    if can_drop(state, piece, dest) {
        if base_user_drop(state, piece, dest, promotion) {
            unselect(state);
            let metadata = DropMetadata { premade: false };
            state.emit(BoardEvent::AfterDrop { piece, dest, promotion, metadata });
            return true;
        }
    } else if can_predrop(state, piece, dest) {
        set_predrop(state, piece, dest, promotion);
        unselect(state);
        return true;
    }
    debug!("Rejected drop {piece} at {dest}");
    unselect(state);
    false
}

// Plays the queued premove if it became legal. The queue is cleared either way.
pub fn play_premove(state: &mut State) -> bool {
    let Some(Premove { orig, dest, promotion }) = state.premovable.current else {
        return false;
    };
    let mut played = false;
    if can_move(state, orig, dest) {
        if let Some(Committed { captured }) = base_user_move(state, orig, dest, promotion) {
            let metadata = MoveMetadata { premade: true, captured };
            state.emit(BoardEvent::AfterMove { orig, dest, promotion, metadata });
            played = true;
        }
    }
    unset_premove(state);
    played
}

pub fn play_predrop(state: &mut State) -> bool {
    let Some(Predrop { piece, dest, promotion }) = state.predroppable.current else {
        return false;
    };
    let mut played = false;
    if can_drop(state, piece, dest) && base_user_drop(state, piece, dest, promotion) {
        let metadata = DropMetadata { premade: true };
        state.emit(BoardEvent::AfterDrop { piece, dest, promotion, metadata });
        played = true;
    }
    unset_predrop(state);
    played
}

fn open_promotion_dialog(state: &mut State, piece: Piece, dest: Square, source: PromotionSource) -> bool {
    let Some(promoted_piece) = promote_piece(state, piece) else {
        return false;
    };
    if state.view_only || state.promotion.current.is_some() {
        return false;
    }
    state.promotion.current = Some(PromotionCurrent {
        piece,
        promoted_piece,
        dest,
        source,
        dragged: state.draggable.current.is_some(),
    });
    state.hovered = Some(dest);
    state.emit(BoardEvent::PromotionInitiated);
    true
}

// Opens the promotion dialog if the move is legal (or premovable) and the rules say the user
// has a choice. The board is not changed until `select_promotion`.
pub fn promotion_dialog_move(state: &mut State, orig: Square, dest: Square) -> bool {
    if !state.dimensions.contains(dest) {
        return false;
    }
    if !can_move_promote(state, orig, dest) || !(can_move(state, orig, dest) || can_premove(state, orig, dest)) {
        return false;
    }
    match state.pieces.get(&orig) {
        Some(&piece) => open_promotion_dialog(state, piece, dest, PromotionSource::Move { orig }),
        None => false,
    }
}

pub fn promotion_dialog_drop(state: &mut State, piece: Piece, dest: Square) -> bool {
    if !state.dimensions.contains(dest) {
        return false;
    }
    if !can_drop_promote(state, piece, dest) || !(can_drop(state, piece, dest) || can_predrop(state, piece, dest)) {
        return false;
    }
    open_promotion_dialog(state, piece, dest, PromotionSource::Drop)
}

// Resolves the open promotion dialog with the user's choice.
pub fn select_promotion(state: &mut State, promoted: bool) -> bool {
    let Some(current) = state.promotion.current.take() else {
        return false;
    };
    let chosen = if promoted { current.promoted_piece } else { current.piece };
    state.emit(BoardEvent::PromotionAfter { piece: chosen, promoted });
    match current.source {
        PromotionSource::Move { orig } => user_move(state, orig, current.dest, Some(promoted)),
        PromotionSource::Drop => user_drop(state, current.piece, current.dest, Some(promoted)),
    }
}

pub fn cancel_promotion(state: &mut State) {
    if state.promotion.current.is_none() {
        return;
    }
    unselect(state);
    state.promotion.current = None;
    state.hovered = None;
    state.emit(BoardEvent::PromotionCancel);
}

pub fn set_pre_dests(state: &mut State) {
    state.premovable.dests = None;
    state.predroppable.dests = None;
    if let Some(sq) = state.selected {
        if state.pieces.get(&sq).is_some_and(|&p| is_premovable(state, p)) {
            state.premovable.dests =
                Some(state.premove_generator.premove_dests(sq, &state.pieces, state.dimensions));
        }
    } else if let Some(piece) = state.selected_piece.filter(|&p| is_predroppable(state, p)) {
        state.predroppable.dests =
            Some(state.premove_generator.predrop_dests(piece, &state.pieces, state.dimensions));
    }
}

pub fn set_selected(state: &mut State, sq: Square) {
    unselect(state);
    state.selected = Some(sq);
    set_pre_dests(state);
}

pub fn set_selected_piece(state: &mut State, piece: Piece) {
    unselect(state);
    state.selected_piece = Some(piece);
    set_pre_dests(state);
}

pub fn unselect(state: &mut State) {
    state.selected = None;
    state.selected_piece = None;
    state.premovable.dests = None;
    state.predroppable.dests = None;
    state.promotion.current = None;
}

pub fn select_square(state: &mut State, sq: Square, promotion: Option<bool>, force: bool) {
    if !state.dimensions.contains(sq) {
        debug!("Ignoring selection outside the board: {sq}");
        return;
    }
    state.emit(BoardEvent::Select { square: sq });
    // Clicking the selected square again deselects it, unless it is about to be dragged.
    if !state.draggable.enabled && state.selected == Some(sq) {
        state.emit(BoardEvent::Unselect { square: sq });
        unselect(state);
        return;
    }
    let spares_forced =
        state.selectable.force_spares && state.selected_piece.is_some() && state.droppable.spare;
    if state.selectable.enabled || force || spares_forced {
        if let Some(piece) = state.selected_piece {
            if promotion.is_none() && promotion_dialog_drop(state, piece, sq) {
                return;
            }
            if user_drop(state, piece, sq, promotion) {
                return;
            }
        } else if let Some(orig) = state.selected {
            if promotion.is_none() && promotion_dialog_move(state, orig, sq) {
                return;
            }
            if user_move(state, orig, sq, promotion) {
                return;
            }
        }
    }
    let selectable = state.selectable.enabled || state.draggable.enabled || force;
    let eligible = state
        .pieces
        .get(&sq)
        .is_some_and(|&p| is_movable(state, p) || is_premovable(state, p));
    if selectable && eligible {
        set_selected(state, sq);
    }
}

// `spare` selects from an unlimited palette rather than from the hand. `api` calls never
// toggle the selection off.
pub fn select_piece(state: &mut State, piece: Piece, spare: bool, force: bool, api: bool) {
    state.emit(BoardEvent::PieceSelect { piece });
    if state.selectable.add_spares_to_hand && state.droppable.spare && state.selected_piece.is_some() {
        if let Some(selected) = state.selected_piece {
            add_to_hand(state, Piece::new(selected.role, piece.color), 1);
        }
        state.emit(BoardEvent::Change);
        unselect(state);
    } else if !api && !state.draggable.enabled && state.selected_piece == Some(piece) {
        state.emit(BoardEvent::PieceUnselect { piece });
        unselect(state);
    } else if (state.selectable.enabled || state.draggable.enabled || force)
        && (is_droppable(state, piece, spare) || is_predroppable(state, piece))
    {
        set_selected_piece(state, piece);
        state.droppable.spare = spare;
    } else {
        unselect(state);
    }
}

pub fn cancel_move_or_drop(state: &mut State) {
    unset_premove(state);
    unset_predrop(state);
    unselect(state);
}

// Freezes the board: nothing can be moved until a new active color is configured.
pub fn stop(state: &mut State) {
    state.active_color = None;
    state.movable.dests = None;
    state.droppable.dests = None;
    state.animation.current = None;
    cancel_move_or_drop(state);
}

pub fn is_hover_target(state: &State, sq: Square) -> bool {
    if state.highlight.hovered {
        return true;
    }
    if let Some(orig) = state.selected {
        can_move(state, orig, sq) || can_premove(state, orig, sq)
    } else if let Some(piece) = state.selected_piece {
        can_drop(state, piece, sq) || can_predrop(state, piece, sq)
    } else {
        false
    }
}

// Returns true if the hovered square changed.
pub fn update_hovered(state: &mut State, sq: Option<Square>) -> bool {
    let hovered = sq.filter(|&sq| is_hover_target(state, sq));
    let changed = state.hovered != hovered;
    state.hovered = hovered;
    changed
}


#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::piece::Role;
    use crate::rules::ZonePromotion;
    use crate::test_util::pieces_from_sfen;

    fn sq(key: &str) -> Square { Square::from_key(key).unwrap() }

    fn state_with(pieces: &[(&str, Piece)]) -> State {
        let mut state = State::default();
        state.pieces = pieces.iter().map(|&(key, p)| (sq(key), p)).collect();
        state
    }

    #[test]
    fn move_flips_turn_and_reports_capture() {
        let gold = Piece::new(Role::Gold, Color::Sente);
        let pawn = Piece::new(Role::Pawn, Color::Gote);
        let mut state = state_with(&[("5e", gold), ("5d", pawn)]);
        assert!(user_move(&mut state, sq("5e"), sq("5d"), None));
        assert_eq!(state.turn_color, Color::Gote);
        assert_eq!(state.pieces.get(&sq("5d")), Some(&gold));
        assert_eq!(state.last_dests, Some(vec![sq("5e"), sq("5d")]));
        assert!(state.events.contains(&BoardEvent::AfterMove {
            orig: sq("5e"),
            dest: sq("5d"),
            promotion: false,
            metadata: MoveMetadata { premade: false, captured: Some(pawn) },
        }));
    }

    #[test]
    fn rejected_move_keeps_turn() {
        let gold = Piece::new(Role::Gold, Color::Sente);
        let mut state = state_with(&[("5e", gold)]);
        state.movable.free = false;
        state.movable.dests = Some(MoveDests::from([(sq("5e"), vec![sq("5d")])]));
        state.selected = Some(sq("5e"));
        assert!(!user_move(&mut state, sq("5e"), sq("4e"), None));
        assert!(!user_move(&mut state, sq("5e"), sq("5e"), None));
        assert_eq!(state.turn_color, Color::Sente);
        assert_eq!(state.selected, None);
        assert!(user_move(&mut state, sq("5e"), sq("5d"), None));
    }

    #[test]
    fn drop_requires_hand_unless_spare() {
        let pawn = Piece::new(Role::Pawn, Color::Sente);
        let mut state = State::default();
        assert!(!user_drop(&mut state, pawn, sq("5e"), None));
        state.droppable.spare = true;
        assert!(user_drop(&mut state, pawn, sq("5e"), None));
        assert_eq!(state.hands.count(pawn), 0);
    }

    #[test]
    fn hands_normalize_promoted_roles() {
        let mut state = State::default();
        add_to_hand(&mut state, Piece::new(Role::Tokin, Color::Gote), 2);
        add_to_hand(&mut state, Piece::new(Role::King, Color::Gote), 1);
        assert_eq!(state.hands.count(Piece::new(Role::Pawn, Color::Gote)), 2);
        assert_eq!(state.hands.count(Piece::new(Role::King, Color::Gote)), 0);
        remove_from_hand(&mut state, Piece::new(Role::Tokin, Color::Gote), 3);
        assert_eq!(state.hands.count(Piece::new(Role::Pawn, Color::Gote)), 0);
    }

    #[test]
    fn selection_is_exclusive() {
        let gold = Piece::new(Role::Gold, Color::Sente);
        let pawn = Piece::new(Role::Pawn, Color::Sente);
        let mut state = state_with(&[("5e", gold)]);
        state.hands.add(Color::Sente, Role::Pawn, 1);
        select_square(&mut state, sq("5e"), None, false);
        assert_eq!(state.selected, Some(sq("5e")));
        select_piece(&mut state, pawn, false, false, false);
        assert_eq!((state.selected, state.selected_piece), (None, Some(pawn)));
        state.droppable.free = false;
        select_square(&mut state, sq("5e"), None, false);
        assert_eq!((state.selected, state.selected_piece), (Some(sq("5e")), None));
        assert_eq!(state.hands.count(pawn), 1);
    }

    #[test]
    fn checks() {
        let king = Piece::new(Role::King, Color::Gote);
        let mut state = state_with(&[("5a", king), ("5i", Piece::new(Role::King, Color::Sente))]);
        set_checks(&mut state, Checks::Color(Color::Gote));
        assert_eq!(state.checks, Some(vec![sq("5a")]));
        set_checks(&mut state, Checks::Flag(true));
        assert_eq!(state.checks, Some(vec![sq("5i")]));
        set_checks(&mut state, Checks::Flag(false));
        assert_eq!(state.checks, None);
    }

    #[test]
    fn stop_freezes_the_board() {
        let gold = Piece::new(Role::Gold, Color::Sente);
        let mut state = state_with(&[("5e", gold)]);
        stop(&mut state);
        assert!(!user_move(&mut state, sq("5e"), sq("5d"), None));
        assert_eq!(state.pieces.get(&sq("5e")), Some(&gold));
    }

    #[test]
    fn squares_outside_the_board_are_ignored() {
        let silver = Piece::new(Role::Silver, Color::Gote);
        let mut state = State::default();
        state.pieces = pieces_from_sfen("9/9/9/9/9/9/5s3/9/9");
        state.turn_color = Color::Gote;
        state.promotion.rules = Rc::new(ZonePromotion::STANDARD);
        state.hands.add(Color::Gote, Role::Pawn, 1);
        let outside = sq("4p");
        assert!(!state.dimensions.contains(outside));

        select_square(&mut state, sq("4g"), None, false);
        select_square(&mut state, outside, None, false);
        assert_eq!(state.selected, Some(sq("4g")));
        assert_eq!(state.promotion.current, None);
        assert!(!can_move(&state, sq("4g"), outside));
        assert!(!can_premove(&state, sq("4g"), outside));
        assert!(!user_move(&mut state, sq("4g"), outside, None));

        let pawn = Piece::new(Role::Pawn, Color::Gote);
        assert!(!can_drop(&state, pawn, outside));
        assert!(!can_predrop(&state, pawn, outside));
        assert!(!promotion_dialog_drop(&mut state, pawn, outside));
        assert_eq!(state.pieces.get(&sq("4g")), Some(&silver));
        assert_eq!(state.pieces.len(), 1);
        assert_eq!(state.hands.count(pawn), 1);
    }

    #[test]
    fn drops_need_an_empty_square() {
        let gold = Piece::new(Role::Gold, Color::Sente);
        let pawn = Piece::new(Role::Pawn, Color::Sente);
        let mut state = state_with(&[("5e", gold), ("4e", Piece::new(Role::Pawn, Color::Gote))]);
        state.hands.add(Color::Sente, Role::Pawn, 1);
        assert!(!user_drop(&mut state, pawn, sq("5e"), None));
        assert!(!user_drop(&mut state, pawn, sq("4e"), None));
        state.droppable.spare = true;
        assert!(!user_drop(&mut state, pawn, sq("5e"), None));
        assert_eq!(state.pieces.get(&sq("5e")), Some(&gold));
        assert!(user_drop(&mut state, pawn, sq("5d"), None));
    }
}
