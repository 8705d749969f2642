//! tiny-skia raster renderer for PNG export.

use crate::renderer::{Renderer, RendererError, RenderResult};
use crate::rough;
use kurbo::{Affine, BezPath, PathEl};
use rusttype::{Font, OutlineBuilder, Scale, point as rt_point};
use sketchroom_core::shapes::{
    CornerStyle, SerializableColor, Shape, ShapeStyle, ShapeTrait, Text,
};
use std::sync::OnceLock;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Bundled text face, parsed once.
fn text_font() -> Option<&'static Font<'static>> {
    static FONT: OnceLock<Option<Font<'static>>> = OnceLock::new();
    FONT.get_or_init(|| Font::try_from_bytes(DEJAVU_SANS)).as_ref()
}

/// Software rasterizer drawing into a `tiny_skia::Pixmap`.
///
/// Shapes with a sketchiness above zero are drawn through the hand-drawn
/// distortion, seeded from the shape id so output is reproducible.
pub struct RasterRenderer {
    pixmap: Pixmap,
    transform: Transform,
    scale: f64,
    seed: u32,
}

impl RasterRenderer {
    /// Create a `width` x `height` surface, cleared to `background` if given.
    pub fn new(
        width: u32,
        height: u32,
        transform: Affine,
        scale: f64,
        background: Option<SerializableColor>,
    ) -> RenderResult<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RendererError::InvalidSize { width, height })?;
        if let Some(bg) = background {
            pixmap.fill(to_color(bg));
        }
        let [a, b, c, d, e, f] = transform.as_coeffs();
        Ok(Self {
            pixmap,
            transform: Transform::from_row(
                a as f32, b as f32, c as f32, d as f32, e as f32, f as f32,
            ),
            scale,
            seed: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight (non-premultiplied) RGBA8 pixel data, row-major.
    pub fn rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    fn sketched(&self, path: &BezPath, style: &ShapeStyle) -> BezPath {
        rough::hand_drawn(path, style.sketchiness.roughness(), self.scale, self.seed, 0)
    }
}

impl Renderer for RasterRenderer {
    fn fill_path(&mut self, path: &BezPath, style: &ShapeStyle) {
        let Some(fill) = style.fill_with_opacity() else {
            return;
        };
        let Some(path) = to_skia_path(&self.sketched(path, style)) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(to_color(fill));
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }

    fn stroke_path(&mut self, path: &BezPath, style: &ShapeStyle) {
        let Some(path) = to_skia_path(&self.sketched(path, style)) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(to_color(style.stroke_with_opacity()));
        paint.anti_alias = true;

        let line_join = match style.corner_style {
            CornerStyle::Round => LineJoin::Round,
            CornerStyle::Sharp => LineJoin::Miter,
        };
        let dash = style
            .stroke_dash
            .pattern(style.stroke_width)
            .and_then(|[on, off]| tiny_skia::StrokeDash::new(vec![on as f32, off as f32], 0.0));
        let stroke = Stroke {
            width: style.stroke_width as f32,
            line_cap: LineCap::Round,
            line_join,
            dash,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, self.transform, None);
    }

    fn draw_text(&mut self, text: &Text) {
        let Some(font) = text_font() else {
            log::warn!("Bundled font failed to parse; skipping text {}", text.id());
            return;
        };
        // Glyphs are laid out in world units on the baseline, then share the
        // shape transform with every other path.
        let scale = Scale::uniform(Text::FONT_SIZE as f32);
        let start = rt_point(text.x as f32, text.y as f32);
        let mut outline = GlyphOutline::default();
        for glyph in font.layout(&text.content, scale, start) {
            glyph.build_outline(&mut outline);
        }
        let Some(path) = outline.builder.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(to_color(text.style.stroke_with_opacity()));
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }

    fn begin_shape(&mut self, shape: &Shape) {
        self.seed = rough::seed_for(shape.id());
    }
}

/// Collects glyph contours into one tiny-skia path.
#[derive(Default)]
struct GlyphOutline {
    builder: PathBuilder,
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn to_color(c: SerializableColor) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Convert a kurbo path to a tiny-skia path. Empty paths yield `None`.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
