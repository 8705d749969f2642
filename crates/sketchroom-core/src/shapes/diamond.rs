//! Diamond shape: a rhombus inscribed in a signed box.

use super::{ShapeId, ShapeStyle, ShapeTrait, rect_contains_inclusive};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A diamond whose vertices sit on the midpoints of its bounding box edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diamond {
    pub(crate) id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub style: ShapeStyle,
}

impl Diamond {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self::with_id(ShapeId::new(), origin, width, height, ShapeStyle::default())
    }

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

    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self::new(anchor, current.x - anchor.x, current.y - anchor.y)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_points(self.origin(), (self.x + self.width, self.y + self.height))
    }

    /// Top, right, bottom and left vertices.
    pub fn vertices(&self) -> [Point; 4] {
        let r = self.as_rect();
        let c = r.center();
        [
            Point::new(c.x, r.y0),
            Point::new(r.x1, c.y),
            Point::new(c.x, r.y1),
            Point::new(r.x0, c.y),
        ]
    }
}

impl ShapeTrait for Diamond {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    // Selection uses the bounding box, matching how boxes are picked.
    fn hit_test(&self, point: Point) -> bool {
        rect_contains_inclusive(self.as_rect(), point)
    }

    fn to_path(&self) -> BezPath {
        let [top, right, bottom, left] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(top);
        path.line_to(right);
        path.line_to(bottom);
        path.line_to(left);
        path.close_path();
        path
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
    fn test_vertices() {
        let d = Diamond::new(Point::new(0.0, 0.0), 100.0, 60.0);
        let [top, right, bottom, left] = d.vertices();
        assert_eq!(top, Point::new(50.0, 0.0));
        assert_eq!(right, Point::new(100.0, 30.0));
        assert_eq!(bottom, Point::new(50.0, 60.0));
        assert_eq!(left, Point::new(0.0, 30.0));
    }

    #[test]
    fn test_hit_test_uses_box() {
        let d = Diamond::new(Point::new(0.0, 0.0), 100.0, 60.0);
        // Box corner is outside the rhombus but still picks the shape.
        assert!(d.hit_test(Point::new(2.0, 2.0)));
        assert!(!d.hit_test(Point::new(101.0, 30.0)));
    }

    #[test]
    fn test_path_is_closed() {
        let d = Diamond::new(Point::new(0.0, 0.0), -20.0, 20.0);
        let path = d.to_path();
        assert_eq!(path.elements().len(), 5);
        assert!(matches!(path.elements().last(), Some(kurbo::PathEl::ClosePath)));
    }
}
