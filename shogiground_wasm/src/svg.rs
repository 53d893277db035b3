// SVG for freehand shapes. Coordinates are in squares: the shape layer's view box spans the
// board with one unit per square.

use shogiground::shape::{Brush, DescriptionPill, ShapeGeometry, ShapeRender};
use shogiground::util::Point;

use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;


// Stroke widths relative to a square.
const ARROW_WIDTH: f64 = 10. / 64.;
const CIRCLE_WIDTH: f64 = 4. / 64.;
const CURRENT_CIRCLE_WIDTH: f64 = 3. / 64.;
const PILL_HEIGHT: f64 = 0.3;
const PILL_CHAR_WIDTH: f64 = 0.12;

fn opacity(brush: &Brush, current: bool) -> f64 { brush.opacity * if current { 0.9 } else { 1. } }

fn arrow_width(brush: &Brush, current: bool) -> f64 {
    brush.line_width / 10. * ARROW_WIDTH * if current { 0.85 } else { 1. }
}

pub fn marker_id(brush: &Brush) -> String { format!("sg-arrowhead-{}", brush.key) }

pub fn append_arrow_marker(defs: &web_sys::Element, brush: &Brush) -> JsResult<()> {
    let marker = defs.append_new_svg_element("marker")?.with_svg_attributes([
        ("id", marker_id(brush)),
        ("orient", "auto".to_owned()),
        ("overflow", "visible".to_owned()),
        ("markerWidth", "4".to_owned()),
        ("markerHeight", "4".to_owned()),
        ("refX", "2.05".to_owned()),
        ("refY", "2".to_owned()),
    ])?;
    marker.append_new_svg_element("path")?.with_svg_attributes([
        ("d", "M0,0 V4 L3,2 Z".to_owned()),
        ("fill", brush.color.clone()),
    ])?;
    Ok(())
}

fn append_pill(group: &web_sys::Element, pill: &DescriptionPill) -> JsResult<()> {
    let width = PILL_CHAR_WIDTH * pill.text.chars().count() as f64 + 0.2;
    let (x, y) = pill.pos;
    group.append_new_svg_element("rect")?.with_svg_attributes([
        ("class", "sg-pill".to_owned()),
        ("x", (x - width / 2.).to_string()),
        ("y", (y - PILL_HEIGHT / 2.).to_string()),
        ("width", width.to_string()),
        ("height", PILL_HEIGHT.to_string()),
        ("rx", (PILL_HEIGHT / 2.).to_string()),
    ])?;
    let text = group.append_new_svg_element("text")?.with_svg_attributes([
        ("class", "sg-pill-text".to_owned()),
        ("x", x.to_string()),
        ("y", y.to_string()),
        ("text-anchor", "middle".to_owned()),
        ("dominant-baseline", "central".to_owned()),
        ("font-size", (PILL_HEIGHT * 0.7).to_string()),
    ])?;
    text.set_text_content(Some(&pill.text));
    Ok(())
}

fn square_box((cx, cy): Point) -> [(&'static str, String); 4] {
    [
        ("x", (cx - 0.5).to_string()),
        ("y", (cy - 0.5).to_string()),
        ("width", "1".to_owned()),
        ("height", "1".to_owned()),
    ]
}

// Appends one shape as a `<g>` to `layer` and returns the group.
pub fn append_shape(layer: &web_sys::Element, shape: &ShapeRender) -> JsResult<web_sys::Element> {
    let group = layer.append_new_svg_element("g")?;
    let brush = &shape.brush;
    let current = shape.key.current;
    match &shape.geometry {
        ShapeGeometry::Circle { center: (cx, cy) } => {
            let width = if current { CURRENT_CIRCLE_WIDTH } else { CIRCLE_WIDTH };
            group.append_new_svg_element("circle")?.with_svg_attributes([
                ("stroke", brush.color.clone()),
                ("stroke-width", width.to_string()),
                ("fill", "none".to_owned()),
                ("opacity", opacity(brush, current).to_string()),
                ("cx", cx.to_string()),
                ("cy", cy.to_string()),
                ("r", (0.5 - width / 2.).to_string()),
            ])?;
        }
        ShapeGeometry::Arrow { from: (x1, y1), to: (x2, y2) } => {
            group.append_new_svg_element("line")?.with_svg_attributes([
                ("stroke", brush.color.clone()),
                ("stroke-width", arrow_width(brush, current).to_string()),
                ("stroke-linecap", "round".to_owned()),
                ("marker-end", format!("url(#{})", marker_id(brush))),
                ("opacity", opacity(brush, current).to_string()),
                ("x1", x1.to_string()),
                ("y1", y1.to_string()),
                ("x2", x2.to_string()),
                ("y2", y2.to_string()),
            ])?;
        }
        ShapeGeometry::Stamp { center, piece } => {
            let object = group.append_new_svg_element("foreignObject")?.with_svg_attributes(square_box(*center))?;
            object
                .append_new_element("piece", &piece.name())?
                .with_attribute("style", &format!("opacity:{}", opacity(brush, current)))?;
        }
        ShapeGeometry::Custom { center, svg } => {
            let inner = group.append_new_svg_element("svg")?.with_svg_attributes(square_box(*center))?;
            inner.set_attribute("viewBox", "0 0 100 100")?;
            inner.set_inner_html(svg);
        }
    }
    if let Some(pill) = &shape.description {
        append_pill(&group, pill)?;
    }
    Ok(group)
}
