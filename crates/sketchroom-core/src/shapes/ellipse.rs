//! Ellipse shape (drawn as a circle).

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Circle, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// A circle defined by its center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(center: Point, radius: f64) -> Self {
        Self::with_id(ShapeId::new(), center, radius, ShapeStyle::default())
    }

    pub fn with_id(id: ShapeId, center: Point, radius: f64, style: ShapeStyle) -> Self {
        Self {
            id,
            center_x: center.x,
            center_y: center.y,
            radius,
            style,
        }
    }

    /// Circle centered on the drag anchor, reaching the current pointer.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self::new(anchor, anchor.distance(current))
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Get as a kurbo Circle.
    pub fn as_kurbo(&self) -> Circle {
        Circle::new(self.center(), self.radius.abs())
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        let r = self.radius.abs();
        Rect::new(
            self.center_x - r,
            self.center_y - r,
            self.center_x + r,
            self.center_y + r,
        )
    }

    fn hit_test(&self, point: Point) -> bool {
        self.center().distance(point) <= self.radius.abs()
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.center_x += delta.x;
        self.center_y += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_drag_radius() {
        let e = Ellipse::from_drag(Point::new(10.0, 10.0), Point::new(13.0, 14.0));
        assert!((e.radius - 5.0).abs() < f64::EPSILON);
        assert_eq!(e.center(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_hit_test() {
        let e = Ellipse::new(Point::new(0.0, 0.0), 10.0);
        assert!(e.hit_test(Point::new(0.0, 0.0)));
        assert!(e.hit_test(Point::new(10.0, 0.0)));
        assert!(!e.hit_test(Point::new(8.0, 8.0)));
    }

    #[test]
    fn test_bounds() {
        let e = Ellipse::new(Point::new(50.0, 50.0), 25.0);
        let b = e.bounds();
        assert!((b.x0 - 25.0).abs() < f64::EPSILON);
        assert!((b.y1 - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wire_fields() {
        let e = Ellipse::new(Point::new(1.0, 2.0), 3.0);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["centerX"], 1.0);
        assert_eq!(json["centerY"], 2.0);
        assert_eq!(json["radius"], 3.0);
    }
}
