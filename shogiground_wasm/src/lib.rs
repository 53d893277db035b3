// Browser binding: owns the DOM of one board and forwards page input to `Shogiground`.
//
// Every entry point follows the same pattern: mutate the board under a short `RefCell` borrow,
// then `sync`, which reflects pending rebuild/redraw requests in the DOM, starts frame loops and
// hands queued events to the page. Page callbacks run from a zero timeout, never from inside a
// borrow.
#![cfg_attr(feature = "strict", deny(warnings))]


#[macro_use]
pub mod web_error_handling;

pub mod bounds;
pub mod dom_render;
pub mod events;
pub mod svg;
pub mod web_document;
pub mod web_element_ext;
pub mod wrap;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;
use instant::Instant;
use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use shogiground::api::{Gesture, SetOutcome, Shogiground};
use shogiground::config::Config;
use shogiground::display::BoardBounds;
use shogiground::drag;
use shogiground::frame::{CancelToken, Debounce, FrameStatus};
use shogiground::piece::Piece;
use shogiground::rules::{PromotionRules, ShogiPromotion, ZonePromotion};
use shogiground::shape::{DrawShape, SquareHighlight};
use shogiground::square::Square;
use shogiground::state::RedrawRequest;

use crate::bounds::DomBounds;
use crate::events::{ResizeWatch, listen, listen_all, pointer_input};
use crate::web_document::{web_document, web_window};
use crate::web_error_handling::JsResult;
use crate::wrap::BoardDom;


fn parse_square(key: &str) -> JsResult<Square> {
    Square::from_key(key).ok_or_else(|| rust_error!("Invalid square: {key}"))
}

fn parse_piece(name: &str) -> JsResult<Piece> { name.parse().map_err(|err: String| rust_error!("{err}")) }

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> JsResult<T> {
    serde_json::from_str(json).map_err(|err| rust_error!("Invalid {what}: {err}"))
}

fn report(result: JsResult<()>) {
    if let Err(err) = result {
        web_sys::console::error_2(&"Shogiground:".into(), &err);
    }
}

struct Inner {
    sg: RefCell<Shogiground>,
    bounds: Rc<DomBounds>,
    container: web_sys::Element,
    hand_parents: [Option<web_sys::Element>; 2],
    dom: RefCell<Option<BoardDom>>,
    // Listeners on elements owned by `dom`; replaced on every rebuild.
    dom_listeners: RefCell<Vec<EventListener>>,
    global_listeners: RefCell<Vec<EventListener>>,
    resize_watch: RefCell<Option<ResizeWatch>>,
    redraw: Debounce,
    redraw_frame: RefCell<Option<AnimationFrame>>,
    anim_frame: RefCell<Option<AnimationFrame>>,
    gesture_frame: RefCell<Option<AnimationFrame>>,
    event_handler: RefCell<Option<js_sys::Function>>,
}

impl Inner {
    fn sync(self: &Rc<Self>) -> JsResult<()> {
        let rebuild = self.sg.borrow_mut().take_rebuild();
        if rebuild {
            self.rebuild_dom()?;
        }
        let redraw = self.sg.borrow_mut().take_redraw();
        match redraw {
            RedrawRequest::None => {}
            RedrawRequest::Debounced => self.schedule_redraw(),
            RedrawRequest::NowWithoutShapes => self.render(false)?,
            RedrawRequest::Now => self.render(true)?,
        }
        let anim_loop = self.sg.borrow_mut().take_anim_loop();
        if let Some(token) = anim_loop {
            self.run_anim(token);
        }
        self.dispatch_events();
        Ok(())
    }

    fn rebuild_dom(self: &Rc<Self>) -> JsResult<()> {
        debug!("Rebuilding board DOM");
        self.dom_listeners.borrow_mut().clear();
        let dom = {
            let sg = self.sg.borrow();
            wrap::build(sg.state(), &self.container, &self.hand_parents)?
        };
        self.bounds.attach(dom.board.clone(), dom.hand_elements(), dom.hand_piece_elements());
        *self.dom_listeners.borrow_mut() = self.dom_listeners_for(&dom);
        *self.dom.borrow_mut() = Some(dom);
        Ok(())
    }

    fn render(&self, with_shapes: bool) -> JsResult<()> {
        let sg = self.sg.borrow();
        let mut dom = self.dom.borrow_mut();
        match dom.as_mut() {
            Some(dom) => dom_render::render(dom, sg.state(), &*self.bounds, with_shapes),
            None => Ok(()),
        }
    }

    fn schedule_redraw(self: &Rc<Self>) {
        if !self.redraw.request() {
            return;
        }
        let weak = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.redraw_frame.borrow_mut().take();
            if inner.redraw.fire() {
                report(inner.render(true));
            }
        });
        *self.redraw_frame.borrow_mut() = Some(handle);
    }

    fn run_anim(self: &Rc<Self>, token: CancelToken) {
        let weak = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.anim_frame.borrow_mut().take();
            let status = inner.sg.borrow_mut().anim_frame(Instant::now(), &token);
            report(inner.sync());
            if status == FrameStatus::Continue {
                inner.run_anim(token);
            }
        });
        *self.anim_frame.borrow_mut() = Some(handle);
    }

    fn run_gesture(self: &Rc<Self>, gesture: Gesture) {
        let weak = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.gesture_frame.borrow_mut().take();
            let status = inner.sg.borrow_mut().gesture_frame(&gesture);
            report(inner.sync());
            if status == FrameStatus::Continue {
                inner.run_gesture(gesture);
            }
        });
        *self.gesture_frame.borrow_mut() = Some(handle);
    }

    fn dispatch_events(&self) {
        loop {
            let Some(event) = self.sg.borrow_mut().next_event() else {
                break;
            };
            let Some(handler) = self.event_handler.borrow().clone() else {
                continue;
            };
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    report(Err(rust_error!("Cannot serialize event: {err}")));
                    continue;
                }
            };
            Timeout::new(0, move || {
                if let Err(err) = handler.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    web_sys::console::error_1(&err);
                }
            })
            .forget();
        }
    }

    fn pointer_down(self: &Rc<Self>, event: &web_sys::Event, hand_piece: Option<Piece>) {
        let Some(input) = pointer_input(event) else {
            return;
        };
        if input.is_touch {
            let sg = self.sg.borrow();
            if drag::should_block_touch(sg.state(), &*self.bounds, input.pos) && event.cancelable() {
                event.prevent_default();
            }
        }
        let gesture = match hand_piece {
            Some(piece) => self.sg.borrow_mut().hand_pointer_down(piece, &input),
            None => self.sg.borrow_mut().pointer_down(&input),
        };
        if gesture.is_some() && !input.is_touch {
            // Keeps the browser from selecting text while dragging.
            event.prevent_default();
        }
        report(self.sync());
        if let Some(gesture) = gesture {
            self.run_gesture(gesture);
        }
    }

    fn dom_listeners_for(self: &Rc<Self>, dom: &BoardDom) -> Vec<EventListener> {
        let mut listeners = Vec::new();
        let weak = Rc::downgrade(self);
        let on_promotion = move |event: &web_sys::Event| {
            event.prevent_default();
            event.stop_propagation();
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let choice = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|t| t.closest("piece[data-promoted]").ok().flatten())
                .and_then(|piece| piece.get_attribute("data-promoted"));
            match choice {
                Some(promoted) => {
                    inner.sg.borrow_mut().select_promotion(promoted == "true");
                }
                None => inner.sg.borrow_mut().cancel_promotion(),
            }
            report(inner.sync());
        };
        listeners.extend(listen_all(&dom.promotion, &["mousedown", "touchstart"], on_promotion));

        let weak = Rc::downgrade(self);
        let on_board = move |event: &web_sys::Event| {
            if let Some(inner) = weak.upgrade() {
                inner.pointer_down(event, None);
            }
        };
        listeners.extend(listen_all(&dom.board, &["mousedown", "touchstart"], on_board));

        for (piece, element) in dom.hand_piece_elements() {
            let weak = Rc::downgrade(self);
            let on_hand_piece = move |event: &web_sys::Event| {
                if let Some(inner) = weak.upgrade() {
                    inner.pointer_down(event, Some(piece));
                }
            };
            listeners.extend(listen_all(&element, &["mousedown", "touchstart"], on_hand_piece));
        }
        listeners
    }

    fn install_global_listeners(self: &Rc<Self>) -> JsResult<()> {
        let document = web_document()?;
        let window = web_window()?;
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        let on_move = move |event: &web_sys::Event| {
            let (Some(inner), Some(input)) = (weak.upgrade(), pointer_input(event)) else {
                return;
            };
            let dragging = {
                let mut sg = inner.sg.borrow_mut();
                sg.pointer_move(&input);
                sg.state().draggable.current.is_some()
            };
            if dragging && input.is_touch && event.cancelable() {
                event.prevent_default();
            }
            report(inner.sync());
        };
        listeners.extend(listen_all(document.inner(), &["mousemove", "touchmove"], on_move));

        let weak = Rc::downgrade(self);
        let on_up = move |event: &web_sys::Event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let input = pointer_input(event);
            inner.sg.borrow_mut().pointer_up(input.as_ref());
            report(inner.sync());
        };
        listeners.extend(listen_all(document.inner(), &["mouseup", "touchend"], on_up));

        let weak = Rc::downgrade(self);
        listeners.push(listen(&self.container, "contextmenu", move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let sg = inner.sg.borrow();
            if sg.state().disable_context_menu || sg.state().drawable.enabled {
                event.prevent_default();
            }
        }));

        let weak = Rc::downgrade(self);
        let on_layout_change = move |_: &web_sys::Event| {
            if let Some(inner) = weak.upgrade() {
                inner.layout_changed();
            }
        };
        listeners.extend(listen_all(&window, &["resize", "scroll"], on_layout_change));

        *self.global_listeners.borrow_mut() = listeners;
        let weak = Rc::downgrade(self);
        let watch = ResizeWatch::new(&self.container, move || {
            if let Some(inner) = weak.upgrade() {
                inner.layout_changed();
            }
        })?;
        *self.resize_watch.borrow_mut() = Some(watch);
        Ok(())
    }

    fn layout_changed(self: &Rc<Self>) {
        self.bounds.invalidate();
        self.schedule_redraw();
    }

    fn update<R>(self: &Rc<Self>, f: impl FnOnce(&mut Shogiground) -> R) -> JsResult<R> {
        let result = f(&mut self.sg.borrow_mut());
        self.sync()?;
        Ok(result)
    }
}

#[wasm_bindgen]
pub struct WebShogiground {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl WebShogiground {
    // `hand_top` and `hand_bottom` receive the hands when they are not inlined into `container`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: web_sys::Element, config_json: &str, hand_top: Option<web_sys::Element>,
        hand_bottom: Option<web_sys::Element>,
    ) -> JsResult<WebShogiground> {
        let config = Config::from_json(config_json).map_err(|err| rust_error!("{err}"))?;
        let bounds = Rc::new(DomBounds::new());
        let sg = Shogiground::with_bounds(&config, Rc::clone(&bounds) as Rc<dyn BoardBounds>);
        let inner = Rc::new(Inner {
            sg: RefCell::new(sg),
            bounds,
            container,
            hand_parents: [hand_top, hand_bottom],
            dom: RefCell::new(None),
            dom_listeners: RefCell::new(Vec::new()),
            global_listeners: RefCell::new(Vec::new()),
            resize_watch: RefCell::new(None),
            redraw: Debounce::new(),
            redraw_frame: RefCell::new(None),
            anim_frame: RefCell::new(None),
            gesture_frame: RefCell::new(None),
            event_handler: RefCell::new(None),
        });
        inner.install_global_listeners()?;
        inner.sync()?;
        Ok(WebShogiground { inner })
    }

    // Receives every board event as a JSON string.
    pub fn on_event(&self, handler: Option<js_sys::Function>) { *self.inner.event_handler.borrow_mut() = handler; }

    // Returns whether the board had to be rebuilt.
    pub fn set(&self, config_json: &str, skip_animation: bool) -> JsResult<bool> {
        let config = Config::from_json(config_json).map_err(|err| rust_error!("{err}"))?;
        let outcome = self.inner.update(|sg| sg.set(&config, skip_animation))?;
        Ok(outcome == SetOutcome::RedrawAll)
    }

    // Rule objects cannot travel as JSON. `None` restores the rules that never ask about
    // promotion.
    pub fn set_promotion_zone(&self, zone_ranks: Option<u8>) -> JsResult<()> {
        let rules: Rc<dyn PromotionRules> = match zone_ranks {
            Some(zone_ranks) => Rc::new(ZonePromotion { zone_ranks }),
            None => Rc::new(ShogiPromotion),
        };
        let config = Config { promotion_rules: Some(rules), ..Config::default() };
        self.inner.update(|sg| {
            sg.set(&config, true);
        })
    }

    pub fn board_sfen(&self) -> String { self.inner.sg.borrow().get_board_sfen() }
    pub fn hands_sfen(&self) -> String { self.inner.sg.borrow().get_hands_sfen() }

    pub fn toggle_orientation(&self) -> JsResult<()> { self.inner.update(Shogiground::toggle_orientation) }

    pub fn move_piece(&self, orig: &str, dest: &str, promotion: bool) -> JsResult<bool> {
        let (orig, dest) = (parse_square(orig)?, parse_square(dest)?);
        self.inner.update(|sg| sg.move_piece(orig, dest, promotion))
    }

    pub fn drop_piece(&self, piece: &str, dest: &str, promotion: bool, spare: bool) -> JsResult<bool> {
        let (piece, dest) = (parse_piece(piece)?, parse_square(dest)?);
        self.inner.update(|sg| sg.drop_piece(piece, dest, promotion, spare))
    }

    pub fn select_square(&self, key: Option<String>, promotion: Option<bool>, force: bool) -> JsResult<()> {
        let sq = key.as_deref().map(parse_square).transpose()?;
        self.inner.update(|sg| sg.select_square(sq, promotion, force))
    }

    pub fn select_piece(&self, piece: Option<String>, spare: bool, force: bool) -> JsResult<()> {
        let piece = piece.as_deref().map(parse_piece).transpose()?;
        self.inner.update(|sg| sg.select_piece(piece, spare, force))
    }

    // `diff_json` maps square keys to piece names, or to `null` to empty the square.
    pub fn set_pieces(&self, diff_json: &str) -> JsResult<()> {
        let diff: BTreeMap<Square, Option<Piece>> = parse_json("pieces", diff_json)?;
        self.inner.update(|sg| sg.set_pieces(diff.into_iter().collect()))
    }

    pub fn add_to_hand(&self, piece: &str, count: u8) -> JsResult<()> {
        let piece = parse_piece(piece)?;
        self.inner.update(|sg| sg.add_to_hand(piece, count))
    }

    pub fn remove_from_hand(&self, piece: &str, count: u8) -> JsResult<()> {
        let piece = parse_piece(piece)?;
        self.inner.update(|sg| sg.remove_from_hand(piece, count))
    }

    pub fn play_premove(&self) -> JsResult<bool> { self.inner.update(Shogiground::play_premove) }
    pub fn play_predrop(&self) -> JsResult<bool> { self.inner.update(Shogiground::play_predrop) }
    pub fn cancel_premove(&self) -> JsResult<()> { self.inner.update(Shogiground::cancel_premove) }
    pub fn cancel_predrop(&self) -> JsResult<()> { self.inner.update(Shogiground::cancel_predrop) }
    pub fn cancel_move_or_drop(&self) -> JsResult<()> { self.inner.update(Shogiground::cancel_move_or_drop) }
    pub fn stop(&self) -> JsResult<()> { self.inner.update(Shogiground::stop) }

    pub fn set_shapes(&self, shapes_json: &str) -> JsResult<()> {
        let shapes: Vec<DrawShape> = parse_json("shapes", shapes_json)?;
        self.inner.update(|sg| sg.set_shapes(shapes))
    }

    pub fn set_auto_shapes(&self, shapes_json: &str) -> JsResult<()> {
        let shapes: Vec<DrawShape> = parse_json("shapes", shapes_json)?;
        self.inner.update(|sg| sg.set_auto_shapes(shapes))
    }

    pub fn set_square_highlights(&self, squares_json: &str) -> JsResult<()> {
        let squares: Vec<SquareHighlight> = parse_json("square highlights", squares_json)?;
        self.inner.update(|sg| sg.set_square_highlights(squares))
    }

    // Starts dragging a piece from outside the board, e.g. from a spare piece palette.
    pub fn drag_new_piece(&self, piece: &str, event: web_sys::Event, spare: bool) -> JsResult<()> {
        let piece = parse_piece(piece)?;
        let Some(input) = pointer_input(&event) else {
            return Ok(());
        };
        let gesture = self.inner.update(|sg| sg.start_drag(piece, &input, spare))?;
        if let Some(gesture) = gesture {
            self.inner.run_gesture(gesture);
        }
        Ok(())
    }

    pub fn select_promotion(&self, promoted: bool) -> JsResult<bool> {
        self.inner.update(|sg| sg.select_promotion(promoted))
    }

    pub fn cancel_promotion(&self) -> JsResult<()> { self.inner.update(Shogiground::cancel_promotion) }

    pub fn redraw_all(&self) -> JsResult<()> { self.inner.update(Shogiground::redraw_all) }

    // Call after moving the board by means the page cannot observe otherwise.
    pub fn invalidate_bounds(&self) { self.inner.layout_changed(); }

    pub fn destroy(&self) -> JsResult<()> {
        self.inner.update(Shogiground::destroy)?;
        self.inner.dom_listeners.borrow_mut().clear();
        self.inner.global_listeners.borrow_mut().clear();
        self.inner.resize_watch.borrow_mut().take();
        for frame in [&self.inner.redraw_frame, &self.inner.anim_frame, &self.inner.gesture_frame] {
            frame.borrow_mut().take();
        }
        self.inner.bounds.detach();
        self.inner.event_handler.borrow_mut().take();
        Ok(())
    }
}
