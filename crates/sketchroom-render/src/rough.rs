//! Hand-drawn path distortion for sketchy rendering.

use kurbo::{BezPath, PathEl, Point};
use sketchroom_core::shapes::ShapeId;

/// Simple seeded random number generator (xorshift32).
/// Used for deterministic hand-drawn effects.
struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Random float in range [-1, 1]
    fn next_f64(&mut self) -> f64 {
        (self.next_u32() as f64 / u32::MAX as f64) * 2.0 - 1.0
    }

    fn offset(&mut self, amount: f64) -> f64 {
        self.next_f64() * amount
    }

    fn jitter(&mut self, p: Point, amount: f64) -> Point {
        Point::new(p.x + self.offset(amount), p.y + self.offset(amount))
    }
}

/// Stable seed for a shape, so its wobble survives moves and reloads.
pub fn seed_for(id: &ShapeId) -> u32 {
    // FNV-1a
    id.as_str()
        .bytes()
        .fold(0x811c_9dc5_u32, |hash, b| (hash ^ u32::from(b)).wrapping_mul(0x0100_0193))
}

/// Distort a path the way rough.js does: endpoints overshoot randomly and
/// straight segments bow in the middle.
///
/// `roughness` 0 returns the path unchanged. `scale` is the output scale; the
/// effect shrinks as it grows so strokes look alike at every export size.
/// Each `stroke_index` gives a different but deterministic sequence.
pub fn hand_drawn(path: &BezPath, roughness: f64, scale: f64, seed: u32, stroke_index: u32) -> BezPath {
    if roughness <= 0.0 {
        return path.clone();
    }

    let scale = 1.0 / scale.max(f64::EPSILON).sqrt();
    let max_offset = roughness * 2.0 * scale;
    let bowing = roughness;

    let mut rng = SimpleRng::new(seed.wrapping_add(stroke_index.wrapping_mul(99991)));
    let mut result = BezPath::new();
    let mut last_point = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                result.move_to(rng.jitter(p, max_offset));
                last_point = p;
            }
            PathEl::LineTo(p) => {
                let d = p - last_point;
                let len = d.hypot();
                let bow = rng.offset(bowing * roughness * len / 200.0) * scale;
                let perp = if len > 0.001 {
                    kurbo::Vec2::new(-d.y / len, d.x / len)
                } else {
                    kurbo::Vec2::ZERO
                };
                let mid = last_point.midpoint(p) + perp * bow;
                result.quad_to(mid, rng.jitter(p, max_offset));
                last_point = p;
            }
            PathEl::QuadTo(p1, p2) => {
                let c = rng.jitter(p1, max_offset * 0.7);
                result.quad_to(c, rng.jitter(p2, max_offset));
                last_point = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let c1 = rng.jitter(p1, max_offset * 0.5);
                let c2 = rng.jitter(p2, max_offset * 0.5);
                result.curve_to(c1, c2, rng.jitter(p3, max_offset));
                last_point = p3;
            }
            PathEl::ClosePath => result.close_path(),
        }
    }

    result
}
