// Partial configuration applied on top of the live state.
//
// Every field is optional: absent fields leave the state alone. Fields that can be cleared use
// `Option<Option<T>>`, where `Some(None)` (JSON `null`) clears the value. Lists and maps are
// always replaced as a whole, never merged element-wise. Nested sections are merged field by
// field.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::board::{self, Checks, DropDests, MoveDests};
use crate::color::{ActiveColor, Color};
use crate::error::ConfigError;
use crate::piece::{Piece, Role};
use crate::rules::{PremoveGenerator, PromotionRules};
use crate::sfen::{SymbolMapping, SymbolTable, infer_dimensions, sfen_to_board, sfen_to_hands};
use crate::shape::{Brush, DrawShape, SquareHighlight};
use crate::square::Square;
use crate::state::State;


// Shorter animations are not worth playing.
pub const MIN_ANIMATION_DURATION: Duration = Duration::from_millis(70);

// Distinguishes an explicit `null` from a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SfenConfig {
    pub board: Option<String>,
    pub hands: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatesConfig {
    pub enabled: Option<bool>,
    pub files: Option<Vec<String>>,
    pub ranks: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightConfig {
    pub last_dests: Option<bool>,
    pub last_piece: Option<bool>,
    pub check: Option<bool>,
    pub check_roles: Option<Vec<Role>>,
    pub hovered: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub enabled: Option<bool>,
    pub hands: Option<bool>,
    // Milliseconds.
    pub duration: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandsConfig {
    pub inlined: Option<bool>,
    pub roles: Option<Vec<Role>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovableConfig {
    pub free: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub dests: Option<Option<MoveDests>>,
    pub show_dests: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppableConfig {
    pub free: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub dests: Option<Option<DropDests>>,
    pub show_dests: Option<bool>,
    pub spare: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremovableConfig {
    pub enabled: Option<bool>,
    pub show_dests: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraggableConfig {
    pub enabled: Option<bool>,
    pub distance: Option<f64>,
    pub auto_distance: Option<bool>,
    pub show_ghost: Option<bool>,
    pub show_touch_square_overlay: Option<bool>,
    pub delete_on_drop_off: Option<bool>,
    pub add_to_hand_on_drop_off: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectableConfig {
    pub enabled: Option<bool>,
    pub force_spares: Option<bool>,
    pub add_spares_to_hand: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawableConfig {
    pub enabled: Option<bool>,
    pub visible: Option<bool>,
    pub forced: Option<bool>,
    pub erase_on_click: Option<bool>,
    pub shapes: Option<Vec<DrawShape>>,
    pub auto_shapes: Option<Vec<DrawShape>>,
    pub squares: Option<Vec<SquareHighlight>>,
    // Merged by key into the existing brushes.
    pub brushes: Option<BTreeMap<String, Brush>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub sfen: Option<SfenConfig>,
    pub orientation: Option<Color>,
    pub turn_color: Option<Color>,
    #[serde(default, deserialize_with = "nullable")]
    pub active_color: Option<Option<ActiveColor>>,
    #[serde(default, deserialize_with = "nullable")]
    pub checks: Option<Option<Checks>>,
    #[serde(default, deserialize_with = "nullable")]
    pub last_dests: Option<Option<Vec<Square>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub last_piece: Option<Option<Piece>>,
    #[serde(default, deserialize_with = "nullable")]
    pub selected: Option<Option<Square>>,
    #[serde(default, deserialize_with = "nullable")]
    pub selected_piece: Option<Option<Piece>>,
    pub view_only: Option<bool>,
    pub disable_context_menu: Option<bool>,
    pub block_touch_scroll: Option<bool>,
    pub coordinates: Option<CoordinatesConfig>,
    pub highlight: Option<HighlightConfig>,
    pub animation: Option<AnimationConfig>,
    pub hands: Option<HandsConfig>,
    pub movable: Option<MovableConfig>,
    pub droppable: Option<DroppableConfig>,
    pub premovable: Option<PremovableConfig>,
    pub predroppable: Option<PremovableConfig>,
    pub draggable: Option<DraggableConfig>,
    pub selectable: Option<SelectableConfig>,
    pub drawable: Option<DrawableConfig>,
    // Custom piece symbols for the position codec.
    pub forsyth: Option<SymbolTable>,

    // Capabilities that cannot come from JSON.
    #[serde(skip)]
    pub symbols: Option<Rc<dyn SymbolMapping>>,
    #[serde(skip)]
    pub promotion_rules: Option<Rc<dyn PromotionRules>>,
    #[serde(skip)]
    pub premove_generator: Option<Rc<dyn PremoveGenerator>>,
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> { Ok(serde_json::from_str(json)?) }

    pub fn from_sfen(board: &str, hands: Option<&str>) -> Self {
        Config {
            sfen: Some(SfenConfig {
                board: Some(board.to_owned()),
                hands: hands.map(str::to_owned),
            }),
            ..Config::default()
        }
    }

    // Whether applying the config invalidates the DOM structure rather than just its contents.
    pub fn needs_redraw_all(&self, state: &State) -> bool {
        fn differs<T: PartialEq>(new: Option<&T>, old: &T) -> bool { new.is_some_and(|v| v != old) }
        let coordinates = self.coordinates.as_ref();
        let dims_changed = self
            .sfen
            .as_ref()
            .and_then(|s| s.board.as_deref())
            .is_some_and(|board| infer_dimensions(board) != state.dimensions);
        differs(self.orientation.as_ref(), &state.orientation)
            || differs(self.view_only.as_ref(), &state.view_only)
            || differs(coordinates.and_then(|c| c.enabled.as_ref()), &state.coordinates.enabled)
            || coordinates.and_then(|c| c.files.as_ref()).is_some_and(|f| Some(f) != state.coordinates.files.as_ref())
            || coordinates.and_then(|c| c.ranks.as_ref()).is_some_and(|r| Some(r) != state.coordinates.ranks.as_ref())
            || differs(self.drawable.as_ref().and_then(|d| d.visible.as_ref()), &state.drawable.visible)
            || differs(self.hands.as_ref().and_then(|h| h.inlined.as_ref()), &state.hands.inlined)
            || dims_changed
    }
}

fn merge(state: &mut State, config: &Config) {
    set(&mut state.orientation, config.orientation);
    set(&mut state.turn_color, config.turn_color);
    set(&mut state.active_color, config.active_color);
    set(&mut state.view_only, config.view_only);
    set(&mut state.disable_context_menu, config.disable_context_menu);
    set(&mut state.block_touch_scroll, config.block_touch_scroll);
    if let Some(c) = &config.coordinates {
        set(&mut state.coordinates.enabled, c.enabled);
        set(&mut state.coordinates.files, c.files.clone().map(Some));
        set(&mut state.coordinates.ranks, c.ranks.clone().map(Some));
    }
    if let Some(h) = &config.highlight {
        let highlight = &mut state.highlight;
        set(&mut highlight.last_dests, h.last_dests);
        set(&mut highlight.last_piece, h.last_piece);
        set(&mut highlight.check, h.check);
        set(&mut highlight.check_roles, h.check_roles.clone());
        set(&mut highlight.hovered, h.hovered);
    }
    if let Some(a) = &config.animation {
        set(&mut state.animation.enabled, a.enabled);
        set(&mut state.animation.hands, a.hands);
        set(&mut state.animation.duration, a.duration.map(Duration::from_millis));
    }
    if let Some(h) = &config.hands {
        set(&mut state.hands.inlined, h.inlined);
        set(&mut state.hands.roles, h.roles.clone());
    }
    if let Some(m) = &config.movable {
        set(&mut state.movable.free, m.free);
        set(&mut state.movable.dests, m.dests.clone());
        set(&mut state.movable.show_dests, m.show_dests);
    }
    if let Some(d) = &config.droppable {
        set(&mut state.droppable.free, d.free);
        set(&mut state.droppable.dests, d.dests.clone());
        set(&mut state.droppable.show_dests, d.show_dests);
        set(&mut state.droppable.spare, d.spare);
    }
    if let Some(p) = &config.premovable {
        set(&mut state.premovable.enabled, p.enabled);
        set(&mut state.premovable.show_dests, p.show_dests);
    }
    if let Some(p) = &config.predroppable {
        set(&mut state.predroppable.enabled, p.enabled);
        set(&mut state.predroppable.show_dests, p.show_dests);
    }
    if let Some(d) = &config.draggable {
        let draggable = &mut state.draggable;
        set(&mut draggable.enabled, d.enabled);
        set(&mut draggable.distance, d.distance);
        set(&mut draggable.auto_distance, d.auto_distance);
        set(&mut draggable.show_ghost, d.show_ghost);
        set(&mut draggable.show_touch_square_overlay, d.show_touch_square_overlay);
        set(&mut draggable.delete_on_drop_off, d.delete_on_drop_off);
        set(&mut draggable.add_to_hand_on_drop_off, d.add_to_hand_on_drop_off);
    }
    if let Some(s) = &config.selectable {
        set(&mut state.selectable.enabled, s.enabled);
        set(&mut state.selectable.force_spares, s.force_spares);
        set(&mut state.selectable.add_spares_to_hand, s.add_spares_to_hand);
    }
    if let Some(d) = &config.drawable {
        let drawable = &mut state.drawable;
        set(&mut drawable.enabled, d.enabled);
        set(&mut drawable.visible, d.visible);
        set(&mut drawable.forced, d.forced);
        set(&mut drawable.erase_on_click, d.erase_on_click);
        set(&mut drawable.shapes, d.shapes.clone());
        set(&mut drawable.auto_shapes, d.auto_shapes.clone());
        set(&mut drawable.squares, d.squares.clone());
        if let Some(brushes) = &d.brushes {
            drawable.brushes.extend(brushes.iter().map(|(k, b)| (k.clone(), b.clone())));
        }
    }
    if let Some(table) = &config.forsyth {
        state.forsyth = Rc::new(table.clone());
    }
    set(&mut state.forsyth, config.symbols.clone());
    set(&mut state.promotion.rules, config.promotion_rules.clone());
    set(&mut state.premove_generator, config.premove_generator.clone());
}

pub fn configure(state: &mut State, config: &Config) {
    merge(state, config);

    if let Some(sfen) = &config.sfen {
        if let Some(board_sfen) = &sfen.board {
            state.dimensions = infer_dimensions(board_sfen);
            state.pieces = sfen_to_board(board_sfen, state.dimensions, &*state.forsyth);
            state.drawable.shapes =
                config.drawable.as_ref().and_then(|d| d.shapes.clone()).unwrap_or_default();
        }
        if let Some(hands_sfen) = &sfen.hands {
            state.hands.hand_map = sfen_to_hands(hands_sfen, &*state.forsyth);
        }
    }

    if let Some(checks) = &config.checks {
        board::set_checks(state, checks.clone().unwrap_or(Checks::Flag(false)));
    }
    if let Some(last_dests) = &config.last_dests {
        state.last_dests = last_dests.clone();
    }
    if let Some(last_piece) = config.last_piece {
        state.last_piece = last_piece;
    }

    match config.selected {
        Some(Some(sq)) => board::set_selected(state, sq),
        Some(None) => state.selected = None,
        None => {}
    }
    match config.selected_piece {
        Some(Some(piece)) => board::set_selected_piece(state, piece),
        Some(None) => state.selected_piece = None,
        None => {}
    }
    board::set_pre_dests(state);

    if state.animation.duration < MIN_ANIMATION_DURATION {
        state.animation.enabled = false;
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sfen::STANDARD_BOARD_SFEN;
    use crate::square::Dimensions;

    fn sq(key: &str) -> Square { Square::from_key(key).unwrap() }

    #[test]
    fn nullable_fields() {
        let config = Config::from_json(r#"{"lastDests": null, "activeColor": "gote"}"#).unwrap();
        assert_eq!(config.last_dests, Some(None));
        assert_eq!(config.active_color, Some(Some(ActiveColor::Gote)));
        assert_eq!(config.last_piece, None);
        assert!(Config::from_json(r#"{"selected": "0z"}"#).is_err());
    }

    #[test]
    fn board_replaces_pieces_and_shapes() {
        let mut state = State::default();
        state.drawable.shapes = vec![DrawShape::circle(sq("5e"), "primary")];
        state.pieces.insert(sq("5e"), Piece::new(Role::Gold, Color::Sente));
        configure(&mut state, &Config::from_sfen("4k4/9/9/9/9/9/9/9/4K4", Some("2p")));
        assert_eq!(state.pieces.len(), 2);
        assert!(state.drawable.shapes.is_empty());
        assert_eq!(state.hands.count(Piece::new(Role::Pawn, Color::Gote)), 2);

        configure(&mut state, &Config::from_sfen("3/3/3", None));
        assert_eq!(state.dimensions, Dimensions::new(3, 3));
        assert!(state.pieces.is_empty());
        assert_eq!(state.hands.count(Piece::new(Role::Pawn, Color::Gote)), 2);
    }

    #[test]
    fn checks_and_last_move() {
        let mut state = State::default();
        let config = Config::from_json(&format!(
            r#"{{"sfen": {{"board": "{STANDARD_BOARD_SFEN}"}}, "turnColor": "gote", "checks": true, "lastDests": ["7g", "7f"]}}"#
        ))
        .unwrap();
        configure(&mut state, &config);
        assert_eq!(state.checks, Some(vec![sq("5a")]));
        assert_eq!(state.last_dests, Some(vec![sq("7g"), sq("7f")]));
        configure(&mut state, &Config::from_json(r#"{"checks": null, "lastDests": null}"#).unwrap());
        assert_eq!(state.checks, None);
        assert_eq!(state.last_dests, None);
    }

    #[test]
    fn short_animation_disables_it() {
        let mut state = State::default();
        configure(&mut state, &Config::from_json(r#"{"animation": {"duration": 50}}"#).unwrap());
        assert!(!state.animation.enabled);
    }

    #[test]
    fn lists_are_replaced() {
        let mut state = State::default();
        let config = Config::from_json(r#"{"hands": {"roles": ["pawn"]}, "movable": {"dests": {"7g": ["7f"]}}}"#)
            .unwrap();
        configure(&mut state, &config);
        assert_eq!(state.hands.roles, [Role::Pawn]);
        assert_eq!(state.movable.dests, Some(MoveDests::from([(sq("7g"), vec![sq("7f")])])));
        configure(&mut state, &Config::from_json(r#"{"movable": {"dests": {}}}"#).unwrap());
        assert_eq!(state.movable.dests, Some(MoveDests::new()));
    }

    #[test]
    fn redraw_all_detection() {
        let state = State::default();
        assert!(!Config::from_json(r#"{"orientation": "sente"}"#).unwrap().needs_redraw_all(&state));
        assert!(Config::from_json(r#"{"orientation": "gote"}"#).unwrap().needs_redraw_all(&state));
        assert!(Config::from_sfen("3/3/3", None).needs_redraw_all(&state));
        assert!(!Config::from_sfen(STANDARD_BOARD_SFEN, None).needs_redraw_all(&state));
        assert!(Config::from_json(r#"{"hands": {"inlined": true}}"#).unwrap().needs_redraw_all(&state));
    }
}
