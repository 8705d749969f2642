//! Tool system for the canvas.

use crate::shapes::{
    Arrow, Diamond, Ellipse, Freehand, Line, Rectangle, Shape, ShapeId, ShapeStyle, Text,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Diamond,
    Ellipse,
    Arrow,
    Line,
    Freehand,
    Text,
    Eraser,
    Clear,
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Select,
        ToolKind::Rectangle,
        ToolKind::Diamond,
        ToolKind::Ellipse,
        ToolKind::Arrow,
        ToolKind::Line,
        ToolKind::Freehand,
        ToolKind::Text,
        ToolKind::Eraser,
        ToolKind::Clear,
    ];

    /// Keyboard shortcut for the tool. Clear has none.
    pub fn shortcut(&self) -> Option<char> {
        match self {
            ToolKind::Select => Some('v'),
            ToolKind::Rectangle => Some('r'),
            ToolKind::Diamond => Some('d'),
            ToolKind::Ellipse => Some('o'),
            ToolKind::Arrow => Some('a'),
            ToolKind::Line => Some('l'),
            ToolKind::Freehand => Some('p'),
            ToolKind::Text => Some('t'),
            ToolKind::Eraser => Some('e'),
            ToolKind::Clear => None,
        }
    }

    /// Tool selected by a key name, case-insensitive.
    pub fn from_key(key: &str) -> Option<ToolKind> {
        let mut chars = key.chars();
        let c = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        ToolKind::ALL.into_iter().find(|t| t.shortcut() == Some(c))
    }

    /// Tools that create a shape by dragging from an anchor.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle
                | ToolKind::Diamond
                | ToolKind::Ellipse
                | ToolKind::Arrow
                | ToolKind::Line
                | ToolKind::Freehand
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Diamond => "Diamond",
            ToolKind::Ellipse => "Circle",
            ToolKind::Arrow => "Arrow",
            ToolKind::Line => "Line",
            ToolKind::Freehand => "Pencil",
            ToolKind::Text => "Text",
            ToolKind::Eraser => "Eraser",
            ToolKind::Clear => "Clear",
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// A shape is being drawn.
    Active {
        /// Anchor of the drag, in world coordinates.
        start: Point,
        /// Current pointer, in world coordinates.
        current: Point,
        /// Id the finished shape will carry; stable across previews.
        id: ShapeId,
    },
}

/// Manages the current tool and the shape being drawn with it.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Accumulated points for freehand drawing.
    freehand_points: Vec<Point>,
    /// Style copied into new shapes.
    pub current_style: ShapeStyle,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, abandoning any drawing in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Begin drawing at `point` (world coordinates).
    pub fn begin(&mut self, point: Point) {
        self.freehand_points.clear();
        if self.current_tool == ToolKind::Freehand {
            self.freehand_points.push(point);
        }
        self.state = ToolState::Active {
            start: point,
            current: point,
            id: ShapeId::new(),
        };
    }

    /// Update the current interaction.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
            if self.current_tool == ToolKind::Freehand {
                self.freehand_points.push(point);
            }
        }
    }

    /// Finish drawing at `point` and return the new shape. Freehand strokes
    /// with fewer than two points are discarded.
    pub fn end(&mut self, point: Point) -> Option<Shape> {
        let ToolState::Active { start, current, .. } = &self.state else {
            return None;
        };
        if self.current_tool == ToolKind::Freehand && *current != point {
            self.freehand_points.push(point);
        }
        let shape = self.build_shape(*start, point);
        self.cancel();
        shape
    }

    /// Abort the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.freehand_points.clear();
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// Shape that would be created if drawing ended now. Not in the store.
    pub fn preview_shape(&self) -> Option<Shape> {
        match &self.state {
            ToolState::Active { start, current, .. } => self.build_shape(*start, *current),
            ToolState::Idle => None,
        }
    }

    pub fn freehand_points(&self) -> &[Point] {
        &self.freehand_points
    }

    /// Text shape at `point` with the current style.
    pub fn text_shape(&self, point: Point, content: String) -> Shape {
        Shape::Text(Text::with_id(
            ShapeId::new(),
            point,
            content,
            self.current_style.clone(),
        ))
    }

    fn build_shape(&self, start: Point, end: Point) -> Option<Shape> {
        let ToolState::Active { id, .. } = &self.state else {
            return None;
        };
        let id = id.clone();
        let style = self.current_style.clone();
        let (dx, dy) = (end.x - start.x, end.y - start.y);
        let shape = match self.current_tool {
            ToolKind::Rectangle => Shape::Rectangle(Rectangle::with_id(id, start, dx, dy, style)),
            ToolKind::Diamond => Shape::Diamond(Diamond::with_id(id, start, dx, dy, style)),
            ToolKind::Ellipse => {
                Shape::Ellipse(Ellipse::with_id(id, start, start.distance(end), style))
            }
            ToolKind::Arrow => Shape::Arrow(Arrow::with_id(id, start, end, style)),
            ToolKind::Line => Shape::Line(Line::with_id(id, start, end, style)),
            ToolKind::Freehand => {
                if self.freehand_points.len() < 2 {
                    return None;
                }
                Shape::Freehand(Freehand::with_id(id, self.freehand_points.clone(), style))
            }
            ToolKind::Select | ToolKind::Text | ToolKind::Eraser | ToolKind::Clear => return None,
        };
        Some(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::StrokeDash;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);
        tm.set_tool(ToolKind::Rectangle);
        assert_eq!(tm.current_tool, ToolKind::Rectangle);
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(ToolKind::from_key("v"), Some(ToolKind::Select));
        assert_eq!(ToolKind::from_key("R"), Some(ToolKind::Rectangle));
        assert_eq!(ToolKind::from_key("d"), Some(ToolKind::Diamond));
        assert_eq!(ToolKind::from_key("o"), Some(ToolKind::Ellipse));
        assert_eq!(ToolKind::from_key("a"), Some(ToolKind::Arrow));
        assert_eq!(ToolKind::from_key("l"), Some(ToolKind::Line));
        assert_eq!(ToolKind::from_key("p"), Some(ToolKind::Freehand));
        assert_eq!(ToolKind::from_key("t"), Some(ToolKind::Text));
        assert_eq!(ToolKind::from_key("e"), Some(ToolKind::Eraser));
        assert_eq!(ToolKind::from_key("x"), None);
        assert_eq!(ToolKind::from_key("Escape"), None);
        assert_eq!(ToolKind::from_key(""), None);
    }

    #[test]
    fn test_rectangle_creation() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Rectangle);
        tm.begin(Point::new(10.0, 10.0));
        tm.update(Point::new(60.0, 30.0));
        let preview = tm.preview_shape().unwrap();
        let shape = tm.end(Point::new(50.0, 40.0)).unwrap();
        assert_eq!(preview.id(), shape.id());
        match shape {
            Shape::Rectangle(r) => {
                assert!((r.x - 10.0).abs() < f64::EPSILON);
                assert!((r.width - 40.0).abs() < f64::EPSILON);
                assert!((r.height - 30.0).abs() < f64::EPSILON);
            }
            other => panic!("expected rectangle, got {other:?}"),
        }
        assert!(!tm.is_active());
    }

    #[test]
    fn test_ellipse_radius_from_drag() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Ellipse);
        tm.begin(Point::new(0.0, 0.0));
        match tm.end(Point::new(6.0, 8.0)) {
            Some(Shape::Ellipse(e)) => assert!((e.radius - 10.0).abs() < f64::EPSILON),
            other => panic!("expected ellipse, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_size_shape_is_created() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Rectangle);
        tm.begin(Point::new(5.0, 5.0));
        assert!(tm.end(Point::new(5.0, 5.0)).is_some());
    }

    #[test]
    fn test_freehand_needs_two_points() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Freehand);
        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.preview_shape().is_none());
        assert!(tm.end(Point::new(0.0, 0.0)).is_none());

        tm.begin(Point::new(0.0, 0.0));
        tm.update(Point::new(5.0, 5.0));
        tm.update(Point::new(10.0, 5.0));
        match tm.end(Point::new(10.0, 5.0)) {
            Some(Shape::Freehand(f)) => assert_eq!(f.len(), 3),
            other => panic!("expected freehand, got {other:?}"),
        }
    }

    #[test]
    fn test_style_copied_by_value() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Line);
        tm.current_style.stroke_dash = StrokeDash::Dashed;
        tm.begin(Point::ZERO);
        let shape = tm.end(Point::new(10.0, 0.0)).unwrap();
        tm.current_style.stroke_dash = StrokeDash::Dotted;
        assert_eq!(shape.style().stroke_dash, StrokeDash::Dashed);
    }

    #[test]
    fn test_non_drawing_tools_create_nothing() {
        let mut tm = ToolManager::new();
        for tool in [ToolKind::Select, ToolKind::Eraser, ToolKind::Text, ToolKind::Clear] {
            tm.set_tool(tool);
            tm.begin(Point::ZERO);
            assert!(tm.end(Point::new(10.0, 10.0)).is_none());
        }
    }

    #[test]
    fn test_cancel() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Arrow);
        tm.begin(Point::ZERO);
        assert!(tm.is_active());
        tm.cancel();
        assert!(!tm.is_active());
        assert!(tm.preview_shape().is_none());
    }
}
