// Brings an existing board DOM in line with the state. Pieces are reconciled rather than
// recreated, so CSS transitions and element identity survive between frames.

use std::collections::BTreeMap;

use log::trace;

use shogiground::display::{BoardBounds, non_degenerate, square_size};
use shogiground::render::{
    PieceNode, PieceOp, PieceView, PromotionOverlay, floating_piece, hand_counts, plan_pieces, promotion_overlay,
    square_classes,
};
use shogiground::shape::{ShapeKey, compute_shapes};
use shogiground::square::Square;
use shogiground::state::State;

use crate::svg;
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;
use crate::wrap::BoardDom;


#[derive(Default)]
pub struct RenderCache {
    piece_nodes: BTreeMap<usize, (PieceNode, web_sys::Element)>,
    next_id: usize,
    square_classes: BTreeMap<Square, String>,
    shapes: Option<Vec<ShapeKey>>,
    promotion: Option<PromotionOverlay>,
}

fn piece_class(view: &PieceView) -> String {
    let mut class = view.piece.name();
    for (flag, name) in [(view.animating, "anim"), (view.fading, "fading"), (view.ghost, "ghost")] {
        if flag {
            class.push(' ');
            class.push_str(name);
        }
    }
    class
}

fn apply_view(element: &web_sys::Element, view: &PieceView) -> JsResult<()> {
    let class = piece_class(view);
    if element.class_name() != class {
        element.set_class_name(&class);
    }
    element.set_translate(view.translate)
}

fn render_squares(dom: &mut BoardDom, state: &State) {
    let classes = square_classes(state);
    if classes == dom.cache.square_classes {
        return;
    }
    for (sq, element) in &dom.squares {
        let class = match classes.get(sq) {
            Some(extra) => format!("sq {extra}"),
            None => "sq".to_owned(),
        };
        if element.class_name() != class {
            element.set_class_name(&class);
        }
    }
    dom.cache.square_classes = classes;
}

fn render_pieces(dom: &mut BoardDom, state: &State, square_px: (f64, f64)) -> JsResult<()> {
    let nodes: Vec<PieceNode> = dom.cache.piece_nodes.values().map(|(node, _)| *node).collect();
    for op in plan_pieces(state, &nodes, square_px) {
        match op {
            PieceOp::Update { id, view } => {
                if let Some((node, element)) = dom.cache.piece_nodes.get_mut(&id) {
                    *node = PieceNode { id, square: view.square, piece: view.piece, fading: view.fading };
                    apply_view(element, &view)?;
                }
            }
            PieceOp::Create { view } => {
                let id = dom.cache.next_id;
                dom.cache.next_id += 1;
                let element = dom.pieces.append_new_element("piece", "")?;
                apply_view(&element, &view)?;
                let node = PieceNode { id, square: view.square, piece: view.piece, fading: view.fading };
                dom.cache.piece_nodes.insert(id, (node, element));
            }
            PieceOp::Remove { id } => {
                if let Some((_, element)) = dom.cache.piece_nodes.remove(&id) {
                    element.remove();
                }
            }
        }
    }
    Ok(())
}

fn render_floating(dom: &BoardDom, state: &State, bounds: &dyn BoardBounds) -> JsResult<()> {
    let floating = non_degenerate(bounds.board()).and_then(|board| floating_piece(state, &board));
    match floating {
        Some(f) => {
            let touch = if f.touch { " touch" } else { "" };
            dom.floating.set_class_name(&format!("{} dragging{touch}", f.piece.name()));
            dom.floating.set_translate(f.translate)?;
            dom.floating.set_displayed(true)
        }
        None => dom.floating.set_displayed(false),
    }
}

fn render_promotion(dom: &mut BoardDom, state: &State) -> JsResult<()> {
    let overlay = promotion_overlay(state);
    if overlay == dom.cache.promotion {
        return Ok(());
    }
    dom.promotion.remove_all_children();
    if let Some(overlay) = &overlay {
        let (files, ranks) = (state.dimensions.files as f64, state.dimensions.ranks as f64);
        let (x, y) = overlay.display;
        let square = dom.promotion.append_new_element("sg-promotion-square", "")?.with_attribute(
            "style",
            &format!(
                "left:{}%;top:{}%;width:{}%;height:{}%",
                x as f64 * 100. / files,
                y as f64 * 100. / ranks,
                100. / files,
                100. / ranks,
            ),
        )?;
        if overlay.dragged {
            square.class_list().add_1("dragged")?;
        }
        let choices = square.append_new_element("sg-promotion-choices", "")?;
        for (piece, promoted) in overlay.options.iter().zip([true, false]) {
            choices
                .append_new_element("piece", &piece.name())?
                .with_attribute("data-promoted", if promoted { "true" } else { "false" })?;
        }
        trace!("Promotion dialog at {}", overlay.dest.to_key());
    }
    dom.promotion.set_displayed(overlay.is_some())?;
    dom.cache.promotion = overlay;
    Ok(())
}

fn render_hands(dom: &BoardDom, state: &State) -> JsResult<()> {
    for (color, hand) in &dom.hands {
        let Some(hand) = hand else {
            continue;
        };
        let views: BTreeMap<_, _> = hand_counts(state, color).into_iter().map(|v| (v.piece, v)).collect();
        for (piece, element) in &hand.pieces {
            let Some(view) = views.get(piece) else {
                continue;
            };
            let class = if view.classes.is_empty() {
                piece.name()
            } else {
                format!("{} {}", piece.name(), view.classes)
            };
            if element.class_name() != class {
                element.set_class_name(&class);
            }
            element.set_attribute("data-nb", &view.count.to_string())?;
        }
    }
    Ok(())
}

fn render_shapes(dom: &mut BoardDom, state: &State, bounds: &dyn BoardBounds) -> JsResult<()> {
    let Some(layer) = &dom.shapes else {
        return Ok(());
    };
    let shapes = compute_shapes(state, bounds);
    let keys: Vec<ShapeKey> = shapes.iter().map(|s| s.key.clone()).collect();
    if dom.cache.shapes.as_ref() == Some(&keys) {
        return Ok(());
    }
    layer.remove_all_children();
    for shape in &shapes {
        svg::append_shape(layer, shape)?;
    }
    dom.cache.shapes = Some(keys);
    Ok(())
}

// Shapes are skipped while pieces are animating: they are redrawn once the animation ends.
pub fn render(dom: &mut BoardDom, state: &State, bounds: &dyn BoardBounds, with_shapes: bool) -> JsResult<()> {
    let square_px = non_degenerate(bounds.board()).map_or((0., 0.), |board| square_size(&board, state.dimensions));
    render_squares(dom, state);
    render_pieces(dom, state, square_px)?;
    render_floating(dom, state, bounds)?;
    render_promotion(dom, state)?;
    render_hands(dom, state)?;
    if with_shapes {
        render_shapes(dom, state, bounds)?;
    }
    Ok(())
}
