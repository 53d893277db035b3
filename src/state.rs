// The headless board model. One `State` per board instance; nothing here knows about the DOM.

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::anim::AnimCurrent;
use crate::board::{DropDests, MoveDests, Pieces};
use crate::color::{ActiveColor, Color};
use crate::drag::DragCurrent;
use crate::draw::DrawCurrent;
use crate::event::BoardEvent;
use crate::hand::Hands;
use crate::piece::{Piece, Role};
use crate::premove::ShogiPremoves;
use crate::rules::{PremoveGenerator, PromotionRules, ShogiPromotion};
use crate::sfen::{DefaultSymbols, SymbolMapping};
use crate::shape::{Brush, DrawShape, SquareHighlight, default_brushes};
use crate::square::{Dimensions, Square};


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Premove {
    pub orig: Square,
    pub dest: Square,
    pub promotion: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Predrop {
    pub piece: Piece,
    pub dest: Square,
    pub promotion: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromotionSource {
    Move { orig: Square },
    Drop,
}

// An open promotion dialog: the board is not mutated until the user picks a piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PromotionCurrent {
    pub piece: Piece,
    pub promoted_piece: Piece,
    pub dest: Square,
    pub source: PromotionSource,
    // The dialog was opened by a drag rather than a click.
    pub dragged: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub enum RedrawRequest {
    #[default]
    None,
    // Coalesced with other requests until the next animation frame.
    Debounced,
    // Synchronous redraw; shapes may be skipped during animations.
    NowWithoutShapes,
    Now,
}

#[derive(Clone, Debug)]
pub struct Movable {
    // Any piece may go anywhere, ignoring `dests`.
    pub free: bool,
    pub dests: Option<MoveDests>,
    pub show_dests: bool,
}

#[derive(Clone, Debug)]
pub struct Droppable {
    pub free: bool,
    pub dests: Option<DropDests>,
    pub show_dests: bool,
    // Hand counts are not enforced.
    pub spare: bool,
}

#[derive(Clone, Debug)]
pub struct Premovable {
    pub enabled: bool,
    pub show_dests: bool,
    // Destinations of the selected piece, recomputed on selection.
    pub dests: Option<Vec<Square>>,
    pub current: Option<Premove>,
}

#[derive(Clone, Debug)]
pub struct Predroppable {
    pub enabled: bool,
    pub show_dests: bool,
    pub dests: Option<Vec<Square>>,
    pub current: Option<Predrop>,
}

#[derive(Debug)]
pub struct Draggable {
    pub enabled: bool,
    // Minimum pointer travel, in pixels, before a drag starts moving the piece.
    pub distance: f64,
    // Skip the dead zone once the user has completed a drag.
    pub auto_distance: bool,
    pub show_ghost: bool,
    pub show_touch_square_overlay: bool,
    pub delete_on_drop_off: bool,
    pub add_to_hand_on_drop_off: bool,
    pub current: Option<DragCurrent>,
}

#[derive(Clone, Debug)]
pub struct Selectable {
    pub enabled: bool,
    // Allow clicking spares onto the board even when selection is disabled.
    pub force_spares: bool,
    pub add_spares_to_hand: bool,
}

#[derive(Debug)]
pub struct Promotion {
    pub rules: Rc<dyn PromotionRules>,
    pub current: Option<PromotionCurrent>,
}

#[derive(Debug)]
pub struct Animation {
    pub enabled: bool,
    // Animate pieces flying between hands and the board.
    pub hands: bool,
    pub duration: Duration,
    pub current: Option<AnimCurrent>,
}

#[derive(Debug)]
pub struct Drawable {
    pub enabled: bool,
    pub visible: bool,
    // Draw with the main button, not only with the secondary one.
    pub forced: bool,
    pub erase_on_click: bool,
    pub shapes: Vec<DrawShape>,
    pub auto_shapes: Vec<DrawShape>,
    pub squares: Vec<SquareHighlight>,
    pub brushes: BTreeMap<String, Brush>,
    // Piece to stamp with the next drawn circle.
    pub piece: Option<Piece>,
    pub current: Option<DrawCurrent>,
}

#[derive(Clone, Debug)]
pub struct Highlight {
    pub last_dests: bool,
    pub last_piece: bool,
    pub check: bool,
    pub check_roles: Vec<Role>,
    pub hovered: bool,
}

#[derive(Clone, Debug)]
pub struct Coordinates {
    pub enabled: bool,
    pub files: Option<Vec<String>>,
    pub ranks: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default)]
pub struct Stats {
    // The user has completed at least one drag.
    pub dragged: bool,
}

#[derive(Debug)]
pub struct State {
    pub pieces: Pieces,
    pub dimensions: Dimensions,
    pub orientation: Color,
    pub turn_color: Color,
    // `None` when the board is frozen.
    pub active_color: Option<ActiveColor>,
    pub checks: Option<Vec<Square>>,
    pub last_dests: Option<Vec<Square>>,
    pub last_piece: Option<Piece>,
    pub selected: Option<Square>,
    pub selected_piece: Option<Piece>,
    pub hovered: Option<Square>,
    pub view_only: bool,
    pub disable_context_menu: bool,
    pub block_touch_scroll: bool,
    pub coordinates: Coordinates,
    pub hands: Hands,
    pub movable: Movable,
    pub droppable: Droppable,
    pub premovable: Premovable,
    pub predroppable: Predroppable,
    pub draggable: Draggable,
    pub selectable: Selectable,
    pub promotion: Promotion,
    pub premove_generator: Rc<dyn PremoveGenerator>,
    pub animation: Animation,
    pub drawable: Drawable,
    pub highlight: Highlight,
    pub forsyth: Rc<dyn SymbolMapping>,
    pub stats: Stats,
    pub events: VecDeque<BoardEvent>,
    pub redraw: RedrawRequest,
}

impl State {
    pub fn emit(&mut self, event: BoardEvent) { self.events.push_back(event); }

    pub fn request_redraw(&mut self, request: RedrawRequest) {
        self.redraw = self.redraw.max(request);
    }

    pub fn take_redraw(&mut self) -> RedrawRequest { std::mem::take(&mut self.redraw) }
}

impl Default for State {
    fn default() -> Self {
        State {
            pieces: Pieces::new(),
            dimensions: Dimensions::STANDARD,
            orientation: Color::Sente,
            turn_color: Color::Sente,
            active_color: Some(ActiveColor::Both),
            checks: None,
            last_dests: None,
            last_piece: None,
            selected: None,
            selected_piece: None,
            hovered: None,
            view_only: false,
            disable_context_menu: true,
            block_touch_scroll: false,
            coordinates: Coordinates { enabled: true, files: None, ranks: None },
            hands: Hands::default(),
            movable: Movable { free: true, dests: None, show_dests: true },
            droppable: Droppable {
                free: true,
                dests: None,
                show_dests: true,
                spare: false,
            },
            premovable: Premovable {
                enabled: true,
                show_dests: true,
                dests: None,
                current: None,
            },
            predroppable: Predroppable {
                enabled: true,
                show_dests: true,
                dests: None,
                current: None,
            },
            draggable: Draggable {
                enabled: true,
                distance: 3.,
                auto_distance: true,
                show_ghost: true,
                show_touch_square_overlay: true,
                delete_on_drop_off: false,
                add_to_hand_on_drop_off: false,
                current: None,
            },
            selectable: Selectable {
                enabled: true,
                force_spares: false,
                add_spares_to_hand: false,
            },
            promotion: Promotion { rules: Rc::new(ShogiPromotion), current: None },
            premove_generator: Rc::new(ShogiPremoves),
            animation: Animation {
                enabled: true,
                hands: true,
                duration: Duration::from_millis(250),
                current: None,
            },
            drawable: Drawable {
                enabled: true,
                visible: true,
                forced: false,
                erase_on_click: true,
                shapes: Vec::new(),
                auto_shapes: Vec::new(),
                squares: Vec::new(),
                brushes: default_brushes(),
                piece: None,
                current: None,
            },
            highlight: Highlight {
                last_dests: true,
                last_piece: true,
                check: true,
                check_roles: vec![Role::King],
                hovered: false,
            },
            forsyth: Rc::new(DefaultSymbols),
            stats: Stats::default(),
            events: VecDeque::new(),
            redraw: RedrawRequest::None,
        }
    }
}
