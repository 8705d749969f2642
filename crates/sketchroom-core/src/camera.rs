//! Viewport mapping between screen pixels and world coordinates.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 10.0;
/// Multiplicative zoom change per scroll step.
pub const ZOOM_STEP: f64 = 1.1;

/// Pan and zoom of the canvas view.
///
/// `screen = world * zoom + offset`. Mutated in place by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen position of the world origin.
    pub offset: Vec2,
    /// Screen pixels per world unit, within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-to-screen transform, for renderers.
    pub fn transform(&self) -> Affine {
        Affine::new([self.zoom, 0.0, 0.0, self.zoom, self.offset.x, self.offset.y])
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.zoom,
            (p.y - self.offset.y) / self.zoom,
        )
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.offset.x, p.y * self.zoom + self.offset.y)
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom by `factor`, clamped, keeping the world point under
    /// `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return;
        }
        let world = self.screen_to_world(anchor);
        self.zoom = zoom;
        self.offset = anchor.to_vec2() - world.to_vec2() * zoom;
    }

    /// One scroll step at `anchor`. A positive delta zooms out, a negative
    /// one zooms in; zero is ignored.
    pub fn scroll_zoom(&mut self, anchor: Point, delta: f64) {
        let factor = match delta.partial_cmp(&0.0) {
            Some(std::cmp::Ordering::Greater) => ZOOM_STEP.recip(),
            Some(std::cmp::Ordering::Less) => ZOOM_STEP,
            _ => return,
        };
        self.zoom_at(anchor, factor);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Frame `bounds` centered in a viewport of `viewport` size, leaving
    /// `padding` pixels on every side. Degenerate bounds reset the view.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            self.reset();
            return;
        }
        let avail_w = (viewport.width - 2.0 * padding).max(1.0);
        let avail_h = (viewport.height - 2.0 * padding).max(1.0);
        self.zoom = (avail_w / bounds.width())
            .min(avail_h / bounds.height())
            .clamp(MIN_ZOOM, MAX_ZOOM);

        let screen_center = Vec2::new(viewport.width, viewport.height) / 2.0;
        self.offset = screen_center - bounds.center().to_vec2() * self.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn test_default_is_identity() {
        let camera = Camera::new();
        let p = Point::new(12.5, -3.0);
        assert!(close(camera.screen_to_world(p), p));
        assert!(close(camera.world_to_screen(p), p));
    }

    #[test]
    fn test_mapping_and_transform_agree() {
        let camera = Camera {
            offset: Vec2::new(30.0, -20.0),
            zoom: 1.5,
        };
        let world = Point::new(10.0, 40.0);
        let screen = camera.world_to_screen(world);
        assert!(close(screen, Point::new(45.0, 40.0)));
        assert!(close(camera.transform() * world, screen));
        assert!(close(camera.screen_to_world(screen), world));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 1e-6);
        assert_eq!(camera.zoom, MIN_ZOOM);
        camera.zoom_at(Point::ZERO, 1e6);
        assert_eq!(camera.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_scroll_keeps_anchor_fixed() {
        let mut camera = Camera {
            offset: Vec2::new(40.0, -25.0),
            zoom: 1.0,
        };
        let anchor = Point::new(320.0, 240.0);
        let under = camera.screen_to_world(anchor);
        for delta in [-1.0, -3.0, 2.0, -0.5, 1.0] {
            camera.scroll_zoom(anchor, delta);
            assert!(close(camera.screen_to_world(anchor), under));
        }
    }

    #[test]
    fn test_scroll_direction() {
        let mut camera = Camera::new();
        camera.scroll_zoom(Point::ZERO, -100.0);
        assert!((camera.zoom - 1.1).abs() < 1e-12);
        camera.scroll_zoom(Point::ZERO, 0.0);
        assert!((camera.zoom - 1.1).abs() < 1e-12);
        camera.scroll_zoom(Point::ZERO, 5.0);
        assert!((camera.zoom - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pan_and_reset() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        camera.pan(Vec2::new(-4.0, 1.0));
        assert_eq!(camera.offset, Vec2::new(6.0, 21.0));
        camera.zoom = 3.0;
        camera.reset();
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn test_fit_to_bounds() {
        let mut camera = Camera::new();
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        camera.fit_to_bounds(bounds, Size::new(440.0, 440.0), 20.0);
        assert!((camera.zoom - 4.0).abs() < 1e-12);
        assert!(close(camera.world_to_screen(bounds.center()), Point::new(220.0, 220.0)));

        camera.fit_to_bounds(Rect::new(5.0, 5.0, 5.0, 9.0), Size::new(100.0, 100.0), 0.0);
        assert_eq!(camera, Camera::default());
    }
}
