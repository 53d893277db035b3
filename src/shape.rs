// Annotation shapes and their screen geometry.
//
// Geometry is expressed in board units: one unit is one square, (0, 0) is the top-left corner of
// the board as displayed. The SVG layer uses a matching view box, so nothing here depends on
// pixel sizes except anchors in hands, which are projected through the board bounds.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::display::{BoardBounds, non_degenerate, to_display};
use crate::piece::Piece;
use crate::square::Square;
use crate::state::State;
use crate::util::Point;


pub const BRUSH_KEYS: [&str; 4] = ["primary", "alternative0", "alternative1", "alternative2"];

// How far an arrow stem stops short of the target center.
const ARROW_MARGIN: f64 = 0.1;
const SHORTENED_ARROW_MARGIN: f64 = 0.25;
// Position of the description pill along the arrow.
const PILL_POSITION: f64 = 0.5;
const SHORTENED_PILL_POSITION: f64 = 0.4;
const CIRCLE_PILL_OFFSET: f64 = 0.35;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Anchor {
    Square(Square),
    // A piece in a hand.
    Hand(Piece),
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawShape {
    pub orig: Anchor,
    pub dest: Anchor,
    #[serde(default = "default_brush_key")]
    pub brush: String,
    // Piece glyph drawn at `dest`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<Piece>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    // Raw SVG markup drawn at `dest` instead of a circle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_svg: Option<String>,
}

fn default_brush_key() -> String { BRUSH_KEYS[0].to_owned() }

impl DrawShape {
    pub fn arrow(orig: impl Into<Anchor>, dest: impl Into<Anchor>, brush: &str) -> Self {
        DrawShape {
            orig: orig.into(),
            dest: dest.into(),
            brush: brush.to_owned(),
            piece: None,
            description: None,
            custom_svg: None,
        }
    }

    pub fn circle(at: impl Into<Anchor>, brush: &str) -> Self {
        let at = at.into();
        DrawShape::arrow(at, at, brush)
    }

    pub fn stamp(at: Square, piece: Piece, brush: &str) -> Self {
        DrawShape { piece: Some(piece), ..DrawShape::circle(at, brush) }
    }

    pub fn is_arrow(&self) -> bool { self.orig != self.dest }

    // Both endpoints coincide: shapes at the same place replace each other.
    pub fn same_position(&self, other: &DrawShape) -> bool {
        self.orig == other.orig && self.dest == other.dest
    }
}

impl From<Square> for Anchor {
    fn from(sq: Square) -> Self { Anchor::Square(sq) }
}

impl From<Piece> for Anchor {
    fn from(piece: Piece) -> Self { Anchor::Hand(piece) }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brush {
    pub key: String,
    pub color: String,
    pub opacity: f64,
    pub line_width: f64,
}

pub fn default_brushes() -> BTreeMap<String, Brush> {
    let colors = ["#203085", "#b31010", "#168226", "#000000"];
    BRUSH_KEYS
        .iter()
        .zip(colors)
        .map(|(&key, color)| {
            let brush = Brush {
                key: key.to_owned(),
                color: color.to_owned(),
                opacity: 1.,
                line_width: 10.,
            };
            (key.to_owned(), brush)
        })
        .collect()
}

// A caller-supplied CSS class for a square.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquareHighlight {
    pub key: Square,
    pub class_name: String,
}

// Everything that affects how a shape looks. Equal keys mean the existing SVG node can stay.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ShapeKey {
    pub orig: Anchor,
    pub dest: Anchor,
    pub brush: String,
    pub piece: Option<Piece>,
    pub shortened: bool,
    pub description: Option<String>,
    pub custom_svg: Option<String>,
    // The shape being drawn right now.
    pub current: bool,
    // Endpoints in hundredths of a square. Hand anchors move with the layout.
    pub position: [(i32, i32); 2],
}

#[derive(Clone, PartialEq, Debug)]
pub enum ShapeGeometry {
    Circle { center: Point },
    // `to` is already pulled back to leave room for the arrowhead.
    Arrow { from: Point, to: Point },
    Stamp { center: Point, piece: Piece },
    Custom { center: Point, svg: String },
}

#[derive(Clone, PartialEq, Debug)]
pub struct DescriptionPill {
    pub pos: Point,
    pub text: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ShapeRender {
    pub key: ShapeKey,
    pub geometry: ShapeGeometry,
    pub brush: Brush,
    pub description: Option<DescriptionPill>,
}

fn anchor_position(state: &State, bounds: &dyn BoardBounds, anchor: Anchor) -> Option<Point> {
    match anchor {
        Anchor::Square(sq) => {
            if !state.dimensions.contains(sq) {
                return None;
            }
            let (x, y) = to_display(sq, state.dimensions, state.orientation);
            Some((x as f64 + 0.5, y as f64 + 0.5))
        }
        Anchor::Hand(piece) => {
            let board = non_degenerate(bounds.board())?;
            let rect = non_degenerate(bounds.hand_piece(piece))?;
            let (cx, cy) = rect.center();
            let dims = state.dimensions;
            Some((
                (cx - board.left) / board.width * dims.files as f64,
                (cy - board.top) / board.height * dims.ranks as f64,
            ))
        }
    }
}

fn to_hundredths((x, y): Point) -> (i32, i32) { ((x * 100.).round() as i32, (y * 100.).round() as i32) }

fn lerp((ax, ay): Point, (bx, by): Point, t: f64) -> Point { (ax + (bx - ax) * t, ay + (by - ay) * t) }

fn pull_back(from: Point, to: Point, margin: f64) -> Point {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = dx.hypot(dy);
    if len <= margin {
        return to;
    }
    (to.0 - dx / len * margin, to.1 - dy / len * margin)
}

// All shapes to display: user shapes, auto shapes and the one being drawn. Shapes whose anchors
// cannot be placed (missing brush aside) are skipped.
pub fn compute_shapes(state: &State, bounds: &dyn BoardBounds) -> Vec<ShapeRender> {
    let drawable = &state.drawable;
    let current = drawable.current.as_ref().and_then(|cur| cur.to_shape());
    let all: Vec<(&DrawShape, bool)> = drawable
        .shapes
        .iter()
        .chain(&drawable.auto_shapes)
        .map(|s| (s, false))
        .chain(current.iter().map(|s| (s, true)))
        .collect();

    let mut arrows_per_dest: HashMap<Anchor, usize> = HashMap::new();
    for (shape, _) in &all {
        if shape.is_arrow() {
            *arrows_per_dest.entry(shape.dest).or_default() += 1;
        }
    }

    let fallback_brush = drawable.brushes.get(BRUSH_KEYS[0]).cloned();
    let mut renders = Vec::new();
    for (shape, is_current) in all {
        let Some(brush) = drawable.brushes.get(&shape.brush).cloned().or(fallback_brush.clone()) else {
            continue;
        };
        let (Some(from), Some(to)) = (
            anchor_position(state, bounds, shape.orig),
            anchor_position(state, bounds, shape.dest),
        ) else {
            continue;
        };
        let shortened = shape.is_arrow() && arrows_per_dest.get(&shape.dest).copied().unwrap_or(0) > 1;
        let geometry = match (&shape.custom_svg, shape.piece) {
            (Some(svg), _) => ShapeGeometry::Custom { center: to, svg: svg.clone() },
            (None, Some(piece)) => ShapeGeometry::Stamp { center: to, piece },
            (None, None) if shape.is_arrow() => {
                let margin = if shortened { SHORTENED_ARROW_MARGIN } else { ARROW_MARGIN };
                ShapeGeometry::Arrow { from, to: pull_back(from, to, margin) }
            }
            (None, None) => ShapeGeometry::Circle { center: to },
        };
        let description = shape.description.as_ref().map(|text| {
            let pos = if shape.is_arrow() {
                lerp(from, to, if shortened { SHORTENED_PILL_POSITION } else { PILL_POSITION })
            } else {
                (to.0, to.1 + CIRCLE_PILL_OFFSET)
            };
            DescriptionPill { pos, text: text.clone() }
        });
        let key = ShapeKey {
            orig: shape.orig,
            dest: shape.dest,
            brush: brush.key.clone(),
            piece: shape.piece,
            shortened,
            description: shape.description.clone(),
            custom_svg: shape.custom_svg.clone(),
            current: is_current,
            position: [to_hundredths(from), to_hundredths(to)],
        };
        renders.push(ShapeRender { key, geometry, brush, description });
    }
    renders
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::display::NoBounds;
    use crate::piece::Role;

    fn sq(key: &str) -> Square { Square::from_key(key).unwrap() }

    #[test]
    fn anchor_json() {
        let shape: DrawShape =
            serde_json::from_str(r#"{"orig": "7g", "dest": "sente pawn", "brush": "alternative0"}"#)
                .unwrap();
        assert_eq!(shape.orig, Anchor::Square(sq("7g")));
        assert_eq!(shape.dest, Anchor::Hand(Piece::new(Role::Pawn, Color::Sente)));
        let shape: DrawShape = serde_json::from_str(r#"{"orig": "5e", "dest": "5e"}"#).unwrap();
        assert_eq!(shape.brush, "primary");
        assert!(!shape.is_arrow());
    }

    #[test]
    fn converging_arrows_are_shortened() {
        let mut state = State::default();
        state.drawable.shapes = vec![
            DrawShape::arrow(sq("7g"), sq("5e"), "primary"),
            DrawShape::arrow(sq("3g"), sq("5e"), "primary"),
            DrawShape::arrow(sq("2h"), sq("2d"), "primary"),
            DrawShape::circle(sq("5e"), "primary"),
        ];
        let renders = compute_shapes(&state, &NoBounds);
        let shortened: Vec<bool> = renders.iter().map(|r| r.key.shortened).collect();
        assert_eq!(shortened, [true, true, false, false]);
        assert_eq!(renders[3].geometry, ShapeGeometry::Circle { center: (4.5, 4.5) });
    }

    #[test]
    fn hand_anchors_need_bounds() {
        let mut state = State::default();
        let pawn = Piece::new(Role::Pawn, Color::Sente);
        state.drawable.shapes = vec![DrawShape::arrow(pawn, sq("5e"), "primary")];
        assert!(compute_shapes(&state, &NoBounds).is_empty());
    }

    #[test]
    fn unknown_brush_falls_back_to_primary() {
        let mut state = State::default();
        state.drawable.shapes = vec![DrawShape::circle(sq("1a"), "purple")];
        let renders = compute_shapes(&state, &NoBounds);
        assert_eq!(renders[0].brush.key, "primary");
        assert_eq!(renders[0].geometry, ShapeGeometry::Circle { center: (8.5, 0.5) });
    }
}
