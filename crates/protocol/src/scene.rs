use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Shape kind reported to the editor for every traced region.
pub const SHAPE_TYPE_POLYGON: &str = "polygon";

/// A drawable primitive: two control points followed by the terminal anchor.
///
/// Straight lines are encoded as degenerate curves whose control points sit
/// on the anchor, which is how the vectorization engine emits them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub x: f64,
    pub y: f64,
}

impl Segment {
    /// A straight segment ending at `(x, y)`.
    pub fn line(x: f64, y: f64) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x,
            y2: y,
            x,
            y,
        }
    }

    /// A cubic segment with explicit control points.
    pub fn cubic(c1: Point, c2: Point, to: Point) -> Self {
        Self {
            x1: c1.x,
            y1: c1.y,
            x2: c2.x,
            y2: c2.y,
            x: to.x,
            y: to.y,
        }
    }

    /// Whether both control points coincide with the anchor.
    pub fn is_degenerate(&self) -> bool {
        self.x1 == self.x && self.y1 == self.y && self.x2 == self.x && self.y2 == self.y
    }
}

/// One editable shape, built from a single `<path>` element.
///
/// Field names follow the editor's object schema, hence the camelCase
/// renames and the segment list living under `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    pub move_x: f64,
    pub move_y: f64,
    /// Same as `move_x`; the editor reads both.
    pub x: f64,
    /// Same as `move_y`; the editor reads both.
    pub y: f64,
    #[serde(rename = "path")]
    pub segments: Vec<Segment>,
    pub rotate: f64,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub fill: Option<String>,
    pub closed: bool,
}

impl ShapeRecord {
    /// Build a closed polygon anchored at `start`. Stroke mirrors fill.
    pub fn new(start: Point, segments: Vec<Segment>, fill: Option<String>) -> Self {
        Self {
            move_x: start.x,
            move_y: start.y,
            x: start.x,
            y: start.y,
            segments,
            rotate: 0.0,
            stroke: fill.clone(),
            stroke_width: 1.0,
            kind: SHAPE_TYPE_POLYGON.to_string(),
            fill,
            closed: true,
        }
    }

}

/// All shapes of one SVG document, in document (z-) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    pub width: f64,
    pub height: f64,
    #[serde(rename = "objects")]
    pub shapes: Vec<ShapeRecord>,
}

impl SceneGraph {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Total number of segments across every shape.
    pub fn segment_count(&self) -> usize {
        self.shapes.iter().map(|s| s.segments.len()).sum()
    }
}
