//! Rectangle shape.

use super::{CornerStyle, ShapeId, ShapeStyle, ShapeTrait, rect_contains_inclusive};
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle. Width and height are signed: dragging up or
/// left stores negative sizes, which are normalized only for bounds and hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Origin x (the drag anchor).
    pub x: f64,
    /// Origin y (the drag anchor).
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Largest corner radius for `CornerStyle::Round`, in world units.
    pub const DEFAULT_ADAPTIVE_RADIUS: f64 = 32.0;

    /// Corner radius as a fraction of the shorter side.
    pub const DEFAULT_PROPORTIONAL_RADIUS: f64 = 0.25;

    /// Create a new rectangle.
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self::with_id(ShapeId::new(), origin, width, height, ShapeStyle::default())
    }

    /// Build a rectangle with a known id (remote or persisted shapes).
    pub fn with_id(id: ShapeId, origin: Point, width: f64, height: f64, style: ShapeStyle) -> Self {
        Self {
            id,
            x: origin.x,
            y: origin.y,
            width,
            height,
            style,
        }
    }

    /// Rectangle spanning from a drag anchor to the current pointer.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self::new(anchor, current.x - anchor.x, current.y - anchor.y)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Normalized kurbo rect.
    pub fn as_rect(&self) -> Rect {
        Rect::from_points(self.origin(), (self.x + self.width, self.y + self.height))
    }

    /// Corner radius used when the style asks for round corners.
    pub fn corner_radius(&self) -> f64 {
        match self.style.corner_style {
            CornerStyle::Sharp => 0.0,
            CornerStyle::Round => {
                let short = self.width.abs().min(self.height.abs());
                (short * Self::DEFAULT_PROPORTIONAL_RADIUS).min(Self::DEFAULT_ADAPTIVE_RADIUS)
            }
        }
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point) -> bool {
        rect_contains_inclusive(self.as_rect(), point)
    }

    fn to_path(&self) -> BezPath {
        let radius = self.corner_radius();
        if radius > 0.0 {
            RoundedRect::from_rect(self.as_rect(), radius).to_path(0.1)
        } else {
            self.as_rect().to_path(0.1)
        }
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        assert!((rect.x - 10.0).abs() < f64::EPSILON);
        assert!((rect.y - 20.0).abs() < f64::EPSILON);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rectangle_from_drag_keeps_sign() {
        let rect = Rectangle::from_drag(Point::new(100.0, 100.0), Point::new(50.0, 40.0));
        assert!((rect.x - 100.0).abs() < f64::EPSILON);
        assert!((rect.width + 50.0).abs() < f64::EPSILON);
        assert!((rect.height + 60.0).abs() < f64::EPSILON);
        let bounds = rect.bounds();
        assert!((bounds.x0 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_inside_and_outside() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0);
        assert!(rect.hit_test(Point::new(50.0, 25.0)));
        assert!(rect.hit_test(Point::new(100.0, 50.0)));
        assert!(!rect.hit_test(Point::new(101.0, 25.0)));
        assert!(!rect.hit_test(Point::new(-1.0, 25.0)));
        assert!(!rect.hit_test(Point::new(50.0, 51.0)));
        assert!(!rect.hit_test(Point::new(50.0, -1.0)));
    }

    #[test]
    fn test_hit_test_negative_size() {
        let rect = Rectangle::new(Point::new(100.0, 100.0), -40.0, -30.0);
        assert!(rect.hit_test(Point::new(80.0, 85.0)));
        assert!(!rect.hit_test(Point::new(101.0, 85.0)));
        assert!(!rect.hit_test(Point::new(59.0, 85.0)));
    }

    #[test]
    fn test_corner_radius() {
        let mut rect = Rectangle::new(Point::ZERO, 40.0, 400.0);
        assert!((rect.corner_radius() - 10.0).abs() < f64::EPSILON);
        rect.width = 1000.0;
        assert!((rect.corner_radius() - Rectangle::DEFAULT_ADAPTIVE_RADIUS).abs() < f64::EPSILON);
        rect.style.corner_style = CornerStyle::Sharp;
        assert!(rect.corner_radius().abs() < f64::EPSILON);
    }

    #[test]
    fn test_wire_fields() {
        let rect = Rectangle::new(Point::new(1.0, 2.0), 3.0, 4.0);
        let json = serde_json::to_value(&rect).unwrap();
        assert_eq!(json["x"], 1.0);
        assert_eq!(json["y"], 2.0);
        assert_eq!(json["width"], 3.0);
        assert_eq!(json["height"], 4.0);
        assert!(json["id"].is_string());
    }
}
