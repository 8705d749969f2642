//! Selection handles and the resize/move operations they drive.

use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handle pick radius in screen pixels; divide by zoom for world units.
pub const HANDLE_PICK_RADIUS: f64 = 10.0;
/// Handle size in screen pixels, for renderers.
pub const HANDLE_SIZE: f64 = 8.0;

/// Type of selection handle.
///
/// Box shapes get the eight corner/edge handles, circles the four compass
/// handles, lines and arrows their two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    BottomRight,
    #[serde(rename = "tc")]
    TopCenter,
    #[serde(rename = "bc")]
    BottomCenter,
    #[serde(rename = "lc")]
    LeftCenter,
    #[serde(rename = "rc")]
    RightCenter,
    #[serde(rename = "t")]
    Top,
    #[serde(rename = "b")]
    Bottom,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "end")]
    End,
}

/// Which box edges a handle moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeMask {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl HandleKind {
    pub const ALL: [HandleKind; 14] = [
        HandleKind::TopLeft,
        HandleKind::TopRight,
        HandleKind::BottomLeft,
        HandleKind::BottomRight,
        HandleKind::TopCenter,
        HandleKind::BottomCenter,
        HandleKind::LeftCenter,
        HandleKind::RightCenter,
        HandleKind::Top,
        HandleKind::Bottom,
        HandleKind::Left,
        HandleKind::Right,
        HandleKind::Start,
        HandleKind::End,
    ];

    /// Short identifier (`tl`, `rc`, `start`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::TopLeft => "tl",
            HandleKind::TopRight => "tr",
            HandleKind::BottomLeft => "bl",
            HandleKind::BottomRight => "br",
            HandleKind::TopCenter => "tc",
            HandleKind::BottomCenter => "bc",
            HandleKind::LeftCenter => "lc",
            HandleKind::RightCenter => "rc",
            HandleKind::Top => "t",
            HandleKind::Bottom => "b",
            HandleKind::Left => "l",
            HandleKind::Right => "r",
            HandleKind::Start => "start",
            HandleKind::End => "end",
        }
    }

    /// Edges moved when this handle resizes a box.
    pub fn edges(&self) -> EdgeMask {
        use HandleKind::*;
        EdgeMask {
            top: matches!(self, TopLeft | TopRight | TopCenter | Top),
            bottom: matches!(self, BottomLeft | BottomRight | BottomCenter | Bottom),
            left: matches!(self, TopLeft | BottomLeft | LeftCenter | Left),
            right: matches!(self, TopRight | BottomRight | RightCenter | Right),
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown handle: {s}"))
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in world coordinates) is strictly within `radius`.
    pub fn hit_test(&self, point: Point, radius: f64) -> bool {
        self.position.distance(point) < radius
    }
}

fn box_handles(x: f64, y: f64, width: f64, height: f64) -> Vec<Handle> {
    let (x1, y1) = (x + width, y + height);
    let (cx, cy) = (x + width / 2.0, y + height / 2.0);
    vec![
        Handle::new(Point::new(x, y), HandleKind::TopLeft),
        Handle::new(Point::new(x1, y), HandleKind::TopRight),
        Handle::new(Point::new(x, y1), HandleKind::BottomLeft),
        Handle::new(Point::new(x1, y1), HandleKind::BottomRight),
        Handle::new(Point::new(cx, y), HandleKind::TopCenter),
        Handle::new(Point::new(cx, y1), HandleKind::BottomCenter),
        Handle::new(Point::new(x, cy), HandleKind::LeftCenter),
        Handle::new(Point::new(x1, cy), HandleKind::RightCenter),
    ]
}

/// Get the selection handles for a shape.
///
/// Box handles follow the stored (possibly negative) width and height, so a
/// handle named `tl` sits on the stored origin.
pub fn handles_for(shape: &Shape) -> Vec<Handle> {
    match shape {
        Shape::Rectangle(r) => box_handles(r.x, r.y, r.width, r.height),
        Shape::Diamond(d) => box_handles(d.x, d.y, d.width, d.height),
        Shape::Ellipse(e) => {
            let c = e.center();
            let r = e.radius;
            vec![
                Handle::new(Point::new(c.x, c.y - r), HandleKind::Top),
                Handle::new(Point::new(c.x, c.y + r), HandleKind::Bottom),
                Handle::new(Point::new(c.x - r, c.y), HandleKind::Left),
                Handle::new(Point::new(c.x + r, c.y), HandleKind::Right),
            ]
        }
        Shape::Line(l) => vec![
            Handle::new(l.start(), HandleKind::Start),
            Handle::new(l.end(), HandleKind::End),
        ],
        Shape::Arrow(a) => vec![
            Handle::new(a.start(), HandleKind::Start),
            Handle::new(a.end(), HandleKind::End),
        ],
        Shape::Freehand(_) | Shape::Text(_) => Vec::new(),
    }
}

/// Find the handle under `point`, using a pick radius of
/// `HANDLE_PICK_RADIUS / zoom` world units.
pub fn pick_handle(shape: &Shape, point: Point, zoom: f64) -> Option<HandleKind> {
    let radius = HANDLE_PICK_RADIUS / zoom;
    handles_for(shape)
        .into_iter()
        .find(|h| h.hit_test(point, radius))
        .map(|h| h.kind)
}

/// Resize `shape` by dragging `handle` of `original` to `pointer`.
///
/// Box geometry is always recomputed from the pre-drag shape so repeated
/// pointer moves never accumulate error; each edge named by the handle moves
/// while the opposite edge stays put. Circles take the pointer distance from
/// the live center as their radius. A handle that does not apply to the
/// variant leaves the shape unchanged.
pub fn resize(shape: &Shape, original: &Shape, handle: HandleKind, pointer: Point) -> Shape {
    let mut next = shape.clone();
    match (&mut next, original) {
        (Shape::Rectangle(r), Shape::Rectangle(o)) if is_box_handle(handle) => {
            (r.x, r.y, r.width, r.height) =
                resize_box((o.x, o.y, o.width, o.height), handle, pointer);
        }
        (Shape::Diamond(d), Shape::Diamond(o)) if is_box_handle(handle) => {
            (d.x, d.y, d.width, d.height) =
                resize_box((o.x, o.y, o.width, o.height), handle, pointer);
        }
        (Shape::Ellipse(e), Shape::Ellipse(_)) if is_circle_handle(handle) => {
            e.radius = e.center().distance(pointer);
        }
        (Shape::Line(l), Shape::Line(_)) => match handle {
            HandleKind::Start => l.set_start(pointer),
            HandleKind::End => l.set_end(pointer),
            _ => {}
        },
        (Shape::Arrow(a), Shape::Arrow(_)) => match handle {
            HandleKind::Start => a.set_start(pointer),
            HandleKind::End => a.set_end(pointer),
            _ => {}
        },
        _ => {}
    }
    next
}

/// Offset a shape, returning the moved copy.
pub fn translate(shape: &Shape, dx: f64, dy: f64) -> Shape {
    shape.translated(dx, dy)
}

fn is_box_handle(handle: HandleKind) -> bool {
    use HandleKind::*;
    matches!(
        handle,
        TopLeft | TopRight | BottomLeft | BottomRight | TopCenter | BottomCenter | LeftCenter
            | RightCenter
    )
}

fn is_circle_handle(handle: HandleKind) -> bool {
    matches!(
        handle,
        HandleKind::Top | HandleKind::Bottom | HandleKind::Left | HandleKind::Right
    )
}

fn resize_box(
    (x, y, width, height): (f64, f64, f64, f64),
    handle: HandleKind,
    p: Point,
) -> (f64, f64, f64, f64) {
    let edges = handle.edges();
    let (mut nx, mut ny, mut nw, mut nh) = (x, y, width, height);
    if edges.top {
        ny = p.y;
        nh = y + height - p.y;
    }
    if edges.bottom {
        nh = p.y - y;
    }
    if edges.left {
        nx = p.x;
        nw = x + width - p.x;
    }
    if edges.right {
        nw = p.x - x;
    }
    (nx, ny, nw, nh)
}

/// State for an in-progress move or resize drag.
#[derive(Debug, Clone)]
pub struct ManipulationState {
    /// The shape being manipulated.
    pub shape_id: ShapeId,
    /// The handle being dragged (None = moving the whole shape).
    pub handle: Option<HandleKind>,
    /// Starting point of the drag, in world coordinates.
    pub start_point: Point,
    /// Current point of the drag, in world coordinates.
    pub current_point: Point,
    /// Shape as it was when the drag began.
    pub original_shape: Shape,
    /// Detached working copy; survives a remote delete of the shape.
    pub live_shape: Shape,
}

impl ManipulationState {
    pub fn new(handle: Option<HandleKind>, start_point: Point, original_shape: Shape) -> Self {
        Self {
            shape_id: original_shape.id().clone(),
            handle,
            start_point,
            current_point: start_point,
            live_shape: original_shape.clone(),
            original_shape,
        }
    }

    /// Delta from the start of the drag.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Move the pointer and recompute the live shape from the original.
    pub fn update(&mut self, point: Point) -> &Shape {
        self.current_point = point;
        self.live_shape = match self.handle {
            Some(handle) => resize(&self.live_shape, &self.original_shape, handle, point),
            None => {
                let d = self.delta();
                translate(&self.original_shape, d.x, d.y)
            }
        };
        &self.live_shape
    }

    /// Whether the drag changed the shape at all.
    pub fn is_modified(&self) -> bool {
        self.live_shape != self.original_shape
    }
}
