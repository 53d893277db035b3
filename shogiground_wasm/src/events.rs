// DOM input: pointer event decoding, listener registration and layout observation.

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use shogiground::drag::{Modifiers, PointerInput};


fn touch_input(event: &web_sys::TouchEvent) -> Option<PointerInput> {
    // `changedTouches` is the only list that still holds the touch on `touchend`.
    let touch = event.changed_touches().get(0)?;
    Some(PointerInput {
        pos: (touch.client_x() as f64, touch.client_y() as f64),
        button: 0,
        modifiers: Modifiers {
            shift: event.shift_key(),
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
            alt_graph: false,
        },
        is_touch: true,
    })
}

fn mouse_input(event: &web_sys::MouseEvent) -> PointerInput {
    PointerInput {
        pos: (event.client_x() as f64, event.client_y() as f64),
        button: event.button(),
        modifiers: Modifiers {
            shift: event.shift_key(),
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
            alt_graph: event.get_modifier_state("AltGraph"),
        },
        is_touch: false,
    }
}

pub fn pointer_input(event: &web_sys::Event) -> Option<PointerInput> {
    if let Some(touch) = event.dyn_ref::<web_sys::TouchEvent>() {
        touch_input(touch)
    } else {
        event.dyn_ref::<web_sys::MouseEvent>().map(mouse_input)
    }
}

// Non-passive, so that handlers may call `prevent_default`.
pub fn listen(
    target: &web_sys::EventTarget, event_type: &'static str, callback: impl FnMut(&web_sys::Event) + 'static,
) -> EventListener {
    let options = EventListenerOptions {
        phase: EventListenerPhase::Bubble,
        passive: false,
    };
    EventListener::new_with_options(target, event_type, options, callback)
}

pub fn listen_all(
    target: &web_sys::EventTarget, event_types: &[&'static str],
    callback: impl Fn(&web_sys::Event) + Clone + 'static,
) -> Vec<EventListener> {
    event_types
        .iter()
        .map(|&event_type| listen(target, event_type, callback.clone()))
        .collect()
}

// Calls `on_resize` whenever the observed element changes size. Stops observing on drop.
pub struct ResizeWatch {
    observer: web_sys::ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, web_sys::ResizeObserver)>,
}

impl ResizeWatch {
    pub fn new(element: &web_sys::Element, mut on_resize: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(js_sys::Array, web_sys::ResizeObserver)>::new(
            move |_entries: js_sys::Array, _observer: web_sys::ResizeObserver| on_resize(),
        );
        let observer = web_sys::ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(element);
        Ok(ResizeWatch { observer, _callback: callback })
    }
}

impl Drop for ResizeWatch {
    fn drop(&mut self) { self.observer.disconnect(); }
}
