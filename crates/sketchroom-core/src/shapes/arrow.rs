//! Arrow shape: a segment with a two-stroke head at its end.

use super::{HIT_TOLERANCE, ShapeId, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// An arrow from start to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub(crate) id: ShapeId,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Arrow {
    /// Length of each head stroke.
    pub const HEAD_LENGTH: f64 = 15.0;
    /// Angle between the shaft and each head stroke.
    pub const HEAD_ANGLE: f64 = PI / 6.0;

    /// Create a new arrow.
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

    /// The two outer points of the arrow head.
    pub fn head_points(&self) -> (Point, Point) {
        let end = self.end();
        let angle = (self.end_y - self.start_y).atan2(self.end_x - self.start_x);
        let wing = |offset: f64| {
            let a = angle + offset;
            Point::new(
                end.x - Self::HEAD_LENGTH * a.cos(),
                end.y - Self::HEAD_LENGTH * a.sin(),
            )
        };
        (wing(-Self::HEAD_ANGLE), wing(Self::HEAD_ANGLE))
    }
}

impl ShapeTrait for Arrow {
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
        let (left, right) = self.head_points();
        path.move_to(left);
        path.line_to(self.end());
        path.line_to(right);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_points_symmetric() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let (left, right) = arrow.head_points();
        let expected_x = 100.0 - Arrow::HEAD_LENGTH * Arrow::HEAD_ANGLE.cos();
        assert!((left.x - expected_x).abs() < 1e-9);
        assert!((right.x - expected_x).abs() < 1e-9);
        assert!((left.y + right.y).abs() < 1e-9);
        assert!((left.y.abs() - Arrow::HEAD_LENGTH * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_on_shaft() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(0.0, 50.0));
        assert!(arrow.hit_test(Point::new(2.0, 25.0)));
        assert!(!arrow.hit_test(Point::new(6.0, 25.0)));
    }

    #[test]
    fn test_path_contains_head() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        // shaft (2) + head (3)
        assert_eq!(arrow.to_path().elements().len(), 5);
    }
}
