//! Renderer trait abstraction.
//!
//! Renderers receive primitive draw calls in world coordinates and apply
//! their own output transform. The hand-drawn look is a renderer concern.

use kurbo::BezPath;
use sketchroom_core::shapes::{Shape, ShapeStyle, Text};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Trait for rendering backends.
pub trait Renderer {
    /// Fill a closed path with the style's fill color.
    fn fill_path(&mut self, path: &BezPath, style: &ShapeStyle);

    /// Stroke a path with the style's stroke color, width and dash.
    fn stroke_path(&mut self, path: &BezPath, style: &ShapeStyle);

    /// Draw a text shape at its baseline anchor.
    fn draw_text(&mut self, text: &Text);

    /// Called before the draw calls of each shape.
    fn begin_shape(&mut self, _shape: &Shape) {}

    /// Called after the draw calls of each shape.
    fn end_shape(&mut self) {}

    /// Issue the draw calls for one shape.
    fn render_shape(&mut self, shape: &Shape) {
        self.begin_shape(shape);
        match shape {
            Shape::Text(text) => self.draw_text(text),
            _ => {
                let path = shape.to_path();
                if shape.is_closed() && shape.style().fill_color.is_some() {
                    self.fill_path(&path, shape.style());
                }
                self.stroke_path(&path, shape.style());
            }
        }
        self.end_shape();
    }
}

/// Render shapes back to front.
pub fn render_shapes<R: Renderer + ?Sized>(renderer: &mut R, shapes: &[Shape]) {
    for shape in shapes {
        renderer.render_shape(shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use sketchroom_core::shapes::{Line, Rectangle, SerializableColor};

    /// Records the calls it receives.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Renderer for Recorder {
        fn fill_path(&mut self, _path: &BezPath, _style: &ShapeStyle) {
            self.calls.push("fill");
        }

        fn stroke_path(&mut self, _path: &BezPath, _style: &ShapeStyle) {
            self.calls.push("stroke");
        }

        fn draw_text(&mut self, _text: &Text) {
            self.calls.push("text");
        }

        fn begin_shape(&mut self, _shape: &Shape) {
            self.calls.push("begin");
        }

        fn end_shape(&mut self) {
            self.calls.push("end");
        }
    }

    #[test]
    fn test_draw_call_sequence() {
        let mut filled = Rectangle::new(Point::ZERO, 10.0, 10.0);
        filled.style.fill_color = Some(SerializableColor::black());
        let mut line = Line::new(Point::ZERO, Point::new(5.0, 5.0));
        // Open paths are never filled.
        line.style.fill_color = Some(SerializableColor::black());
        let shapes = vec![
            Shape::Rectangle(filled),
            Shape::Rectangle(Rectangle::new(Point::ZERO, 1.0, 1.0)),
            Shape::Line(line),
            Shape::Text(Text::new(Point::ZERO, "a".to_string())),
        ];

        let mut recorder = Recorder::default();
        render_shapes(&mut recorder, &shapes);
        assert_eq!(
            recorder.calls,
            vec![
                "begin", "fill", "stroke", "end", "begin", "stroke", "end", "begin", "stroke",
                "end", "begin", "text", "end",
            ]
        );
    }
}
