//! Freehand drawing shape.

use super::{HIT_TOLERANCE, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand stroke: the sampled pointer positions in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Points in the freehand path.
    pub points: Vec<Point>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Freehand {
    /// Create a new empty freehand shape.
    pub fn new() -> Self {
        Self::from_points(Vec::new())
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self::with_id(ShapeId::new(), points, ShapeStyle::default())
    }

    pub fn with_id(id: ShapeId, points: Vec<Point>, style: ShapeStyle) -> Self {
        Self { id, points, style }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for Freehand {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
    }

    // Samples are dense enough that checking points alone is sufficient.
    fn hit_test(&self, point: Point) -> bool {
        self.points
            .iter()
            .any(|p| p.distance(point) < HIT_TOLERANCE)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(*first);
        if self.points.len() < 3 {
            for p in &self.points[1..] {
                path.line_to(*p);
            }
            return path;
        }
        // Quadratic curves through segment midpoints smooth out pointer jitter.
        for pair in self.points[1..].windows(2) {
            let mid = pair[0].midpoint(pair[1]);
            path.quad_to(pair[0], mid);
        }
        if let Some(last) = self.points.last() {
            path.line_to(*last);
        }
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }
}
