#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use shogiground_wasm::WebShogiground;
use shogiground_wasm::web_document::web_document;


wasm_bindgen_test_configure!(run_in_browser);

fn container() -> web_sys::Element {
    let document = web_document().unwrap();
    let element = document.create_element("div").unwrap();
    let body = document.inner().body().unwrap();
    body.append_child(&element).unwrap();
    element.dyn_ref::<web_sys::HtmlElement>().unwrap().style().set_property("width", "450px").unwrap();
    element
}

const STANDARD: &str = r#"{"sfen": {"board": "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL"}}"#;

#[wasm_bindgen_test]
fn builds_squares_and_pieces() {
    let root = container();
    let _board = WebShogiground::new(root.clone(), STANDARD, None, None).unwrap();
    assert_eq!(root.query_selector_all("sq").unwrap().length(), 81);
    assert_eq!(root.query_selector_all("sg-pieces piece").unwrap().length(), 40);
    assert!(root.class_list().contains("manipulable"));
}

#[wasm_bindgen_test]
fn move_updates_dom() {
    let root = container();
    let board = WebShogiground::new(root.clone(), STANDARD, None, None).unwrap();
    assert!(board.move_piece("7g", "7f", false).unwrap());
    assert_eq!(board.board_sfen(), "lnsgkgsnl/1r5b1/ppppppppp/9/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL");
    assert!(root.query_selector("sq[data-key='7f'].last-dest").unwrap().is_some());
}

#[wasm_bindgen_test]
fn orientation_change_rebuilds() {
    let root = container();
    let board = WebShogiground::new(root.clone(), STANDARD, None, None).unwrap();
    board.toggle_orientation().unwrap();
    assert!(root.class_list().contains("orientation-gote"));
    assert_eq!(root.query_selector_all("sg-pieces piece").unwrap().length(), 40);
    board.destroy().unwrap();
}
