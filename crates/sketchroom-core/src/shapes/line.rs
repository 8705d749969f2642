//! Line shape.

use super::{HIT_TOLERANCE, ShapeId, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{BezPath, Line as KurboLine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub(crate) id: ShapeId,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Line {
    /// Create a new line.
    pub fn new(start: Point, end: Point) -> Self {
        Self::with_id(ShapeId::new(), start, end, ShapeStyle::default())
    }

    pub fn with_id(id: ShapeId, start: Point, end: Point, style: ShapeStyle) -> Self {
        Self {
            id,
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            style,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    pub fn set_start(&mut self, point: Point) {
        self.start_x = point.x;
        self.start_y = point.y;
    }

    pub fn set_end(&mut self, point: Point) {
        self.end_x = point.x;
        self.end_y = point.y;
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start(), self.end())
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start(), self.end())
    }

    fn hit_test(&self, point: Point) -> bool {
        point_to_segment_dist(point, self.start(), self.end()) < HIT_TOLERANCE
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start());
        path.line_to(self.end());
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.start_x += delta.x;
        self.start_y += delta.y;
        self.end_x += delta.x;
        self.end_y += delta.y;
    }
}
