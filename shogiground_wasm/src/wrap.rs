// Builds the board's DOM skeleton. Rebuilt from scratch whenever the structure changes
// (orientation, dimensions, coordinates, hands); everything else is updated by `dom_render`.

use std::collections::BTreeMap;

use enum_map::EnumMap;
use itertools::Itertools;

use shogiground::color::Color;
use shogiground::display::from_display;
use shogiground::piece::Piece;
use shogiground::render::{coordinate_labels, hand_colors};
use shogiground::square::Square;
use shogiground::state::State;

use crate::dom_render::RenderCache;
use crate::svg;
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;


pub struct HandDom {
    pub element: web_sys::Element,
    pub pieces: Vec<(Piece, web_sys::Element)>,
}

pub struct BoardDom {
    pub container: web_sys::Element,
    pub board: web_sys::Element,
    pub squares: BTreeMap<Square, web_sys::Element>,
    pub pieces: web_sys::Element,
    // `None` when shapes are hidden.
    pub shapes: Option<web_sys::Element>,
    pub floating: web_sys::Element,
    pub promotion: web_sys::Element,
    pub hands: EnumMap<Color, Option<HandDom>>,
    pub cache: RenderCache,
}

impl BoardDom {
    pub fn hand_piece_elements(&self) -> BTreeMap<Piece, web_sys::Element> {
        self.hands
            .values()
            .flatten()
            .flat_map(|hand| hand.pieces.iter().cloned())
            .collect()
    }

    pub fn hand_elements(&self) -> EnumMap<Color, Option<web_sys::Element>> {
        EnumMap::from_fn(|color| self.hands[color].as_ref().map(|h| h.element.clone()))
    }
}

fn color_class(color: Color) -> &'static str {
    match color {
        Color::Sente => "sente",
        Color::Gote => "gote",
    }
}

fn build_hand(state: &State, parent: &web_sys::Element, color: Color, position: &str) -> JsResult<HandDom> {
    parent.remove_all_children();
    let element = parent.append_new_element("sg-hand", &format!("hand-{position} {}", color_class(color)))?;
    let pieces = state
        .hands
        .roles
        .iter()
        .map(|&role| {
            let piece = Piece::new(role, color);
            let wrap = element.append_new_element("sg-hp-wrap", "")?;
            let node = wrap.append_new_element("piece", &piece.name())?;
            Ok((piece, node))
        })
        .collect::<JsResult<Vec<_>>>()?;
    Ok(HandDom { element, pieces })
}

// `hand_parents` hold the hands shown above and below the board when they are not inlined.
pub fn build(
    state: &State, container: &web_sys::Element, hand_parents: &[Option<web_sys::Element>; 2],
) -> JsResult<BoardDom> {
    let dims = state.dimensions;
    container.remove_all_children();
    let mut classes = vec![
        "sg-wrap".to_owned(),
        format!("orientation-{}", color_class(state.orientation)),
        format!("d-{}x{}", dims.files, dims.ranks),
    ];
    if !state.view_only {
        classes.push("manipulable".to_owned());
    }
    container.set_class_name(&classes.join(" "));

    let mut hands: EnumMap<Color, Option<HandDom>> = EnumMap::default();
    let positions = ["top", "bottom"];
    let colors = hand_colors(state);
    if state.hands.inlined {
        let parent = container.append_new_element("sg-hand-wrap", "inlined hand-top")?;
        hands[colors[0]] = Some(build_hand(state, &parent, colors[0], positions[0])?);
    }

    let board = container.append_new_element("sg-board", "")?;
    let squares_layer = board.append_new_element("sg-squares", "")?;
    let squares = (0..dims.ranks as i32)
        .cartesian_product(0..dims.files as i32)
        .filter_map(|(y, x)| from_display(x, y, dims, state.orientation))
        .map(|sq| {
            let element = squares_layer.append_new_element("sq", "")?.with_attribute("data-key", &sq.to_key())?;
            Ok((sq, element))
        })
        .collect::<JsResult<BTreeMap<_, _>>>()?;
    let pieces = board.append_new_element("sg-pieces", "")?;

    let shapes = if state.drawable.visible {
        let svg_root = board.append_new_svg_element("svg")?.with_svg_attributes([
            ("class", "sg-shapes".to_owned()),
            ("viewBox", format!("0 0 {} {}", dims.files, dims.ranks)),
            ("preserveAspectRatio", "none".to_owned()),
            ("overflow", "visible".to_owned()),
        ])?;
        let defs = svg_root.append_new_svg_element("defs")?;
        for brush in state.drawable.brushes.values() {
            svg::append_arrow_marker(&defs, brush)?;
        }
        Some(svg_root.append_new_svg_element("g")?)
    } else {
        None
    };

    let free_pieces = board.append_new_element("sg-free-pieces", "")?;
    let floating = free_pieces.append_new_element("piece", "dragging")?;
    floating.set_displayed(false)?;
    let promotion = board.append_new_element("sg-promotion", "")?;
    promotion.set_displayed(false)?;

    if state.coordinates.enabled {
        let (files, ranks) = coordinate_labels(state);
        for (class, labels) in [("files", files), ("ranks", ranks)] {
            let coords = board.append_new_element("coords", class)?;
            for label in labels {
                coords.append_new_element("coord", "")?.set_text_content(Some(&label));
            }
        }
    }

    if state.hands.inlined {
        let parent = container.append_new_element("sg-hand-wrap", "inlined hand-bottom")?;
        hands[colors[1]] = Some(build_hand(state, &parent, colors[1], positions[1])?);
    } else {
        for ((parent, color), position) in hand_parents.iter().zip(colors).zip(positions) {
            if let Some(parent) = parent {
                hands[color] = Some(build_hand(state, parent, color, position)?);
            }
        }
    }

    Ok(BoardDom {
        container: container.clone(),
        board,
        squares,
        pieces,
        shapes,
        floating,
        promotion,
        hands,
        cache: RenderCache::default(),
    })
}
