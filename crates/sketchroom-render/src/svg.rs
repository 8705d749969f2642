//! SVG renderer for vector export.

use crate::renderer::Renderer;
use kurbo::{Affine, BezPath};
use sketchroom_core::shapes::{CornerStyle, Shape, ShapeStyle, Text};
use std::fmt::Write as _;

/// Renders shapes into an SVG document body.
///
/// Each shape becomes a `<g>` carrying its id, type, fill pattern and
/// sketchiness as `data-*` attributes. Paths are emitted clean; the
/// sketchiness is kept as metadata for consumers that redraw it.
pub struct SvgRenderer {
    body: String,
    transform: Affine,
    scale: f64,
}

impl SvgRenderer {
    /// Create a renderer mapping world coordinates through `transform`.
    /// `scale` is the uniform scale contained in `transform`.
    pub fn new(transform: Affine, scale: f64) -> Self {
        Self {
            body: String::new(),
            transform,
            scale,
        }
    }

    /// Wrap the rendered shapes in an `<svg>` root of the given size.
    pub fn finish(self, width: u32, height: u32, background: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        if let Some(bg) = background {
            let _ = writeln!(out, r#"<rect width="100%" height="100%" fill="{bg}"/>"#);
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }

    fn stroke_attrs(&self, style: &ShapeStyle) -> String {
        let mut attrs = format!(
            r#"stroke="{}" stroke-width="{}" stroke-linecap="round""#,
            style.stroke_color.to_hex(),
            fmt_num(style.stroke_width * self.scale)
        );
        if style.corner_style == CornerStyle::Round {
            attrs.push_str(r#" stroke-linejoin="round""#);
        }
        if let Some([on, off]) = style.stroke_dash.pattern(style.stroke_width) {
            let _ = write!(
                attrs,
                r#" stroke-dasharray="{} {}""#,
                fmt_num(on * self.scale),
                fmt_num(off * self.scale)
            );
        }
        attrs
    }
}

impl Renderer for SvgRenderer {
    fn fill_path(&mut self, path: &BezPath, style: &ShapeStyle) {
        let Some(fill) = style.fill_color else {
            return;
        };
        let mut path = path.clone();
        path.apply_affine(self.transform);
        let _ = writeln!(
            self.body,
            r#"<path d="{}" fill="{}" stroke="none"/>"#,
            path.to_svg(),
            fill.to_hex()
        );
    }

    fn stroke_path(&mut self, path: &BezPath, style: &ShapeStyle) {
        let mut path = path.clone();
        path.apply_affine(self.transform);
        let _ = writeln!(
            self.body,
            r#"<path d="{}" fill="none" {}/>"#,
            path.to_svg(),
            self.stroke_attrs(style)
        );
    }

    fn draw_text(&mut self, text: &Text) {
        let anchor = self.transform * text.position();
        let _ = writeln!(
            self.body,
            r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" fill="{}">{}</text>"#,
            fmt_num(anchor.x),
            fmt_num(anchor.y),
            fmt_num(Text::FONT_SIZE * self.scale),
            text.style.stroke_color.to_hex(),
            escape(&text.content)
        );
    }

    fn begin_shape(&mut self, shape: &Shape) {
        let style = shape.style();
        let fill = match style.fill_color {
            Some(_) if shape.is_closed() => style.fill_pattern.as_str(),
            _ => "none",
        };
        let _ = writeln!(
            self.body,
            r#"<g data-id="{}" data-type="{}" data-fill-pattern="{}" data-sketchiness="{}" opacity="{}">"#,
            escape(shape.id().as_str()),
            shape.kind_name(),
            fill,
            u8::from(style.sketchiness),
            fmt_num(style.alpha())
        );
    }

    fn end_shape(&mut self) {
        self.body.push_str("</g>\n");
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn fmt_num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Escape XML special characters.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
