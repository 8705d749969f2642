//! Text shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, rect_contains_inclusive};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A single line of text anchored at its baseline-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    pub x: f64,
    /// Baseline y.
    pub y: f64,
    #[serde(rename = "text")]
    pub content: String,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Text {
    /// Width of the pick box; text is not measured.
    pub const HIT_WIDTH: f64 = 100.0;
    /// Height of the pick box above the baseline.
    pub const HIT_HEIGHT: f64 = 20.0;
    /// Font size used by renderers.
    pub const FONT_SIZE: f64 = 20.0;

    /// Create a new text shape.
    pub fn new(position: Point, content: String) -> Self {
        Self::with_id(ShapeId::new(), position, content, ShapeStyle::default())
    }

    pub fn with_id(id: ShapeId, position: Point, content: String, style: ShapeStyle) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            content,
            style,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y - Self::HIT_HEIGHT, self.x + Self::HIT_WIDTH, self.y)
    }

    fn hit_test(&self, point: Point) -> bool {
        rect_contains_inclusive(self.bounds(), point)
    }

    // Glyph outlines are produced by the renderer.
    fn to_path(&self) -> BezPath {
        BezPath::new()
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
    fn test_hit_box_above_baseline() {
        let text = Text::new(Point::new(10.0, 50.0), "hi".to_string());
        assert!(text.hit_test(Point::new(10.0, 50.0)));
        assert!(text.hit_test(Point::new(110.0, 30.0)));
        assert!(!text.hit_test(Point::new(50.0, 51.0)));
        assert!(!text.hit_test(Point::new(50.0, 29.0)));
        assert!(!text.hit_test(Point::new(111.0, 40.0)));
    }

    #[test]
    fn test_wire_content_key() {
        let text = Text::new(Point::new(0.0, 0.0), "note".to_string());
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["text"], "note");
    }
}
