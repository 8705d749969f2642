//! Shape definitions for the canvas.
//!
//! Shapes serialize to the same JSON the relay persists and fans out, so field
//! names follow the wire format (`type` tag, camelCase geometry, hex colors).

mod arrow;
mod diamond;
mod ellipse;
mod freehand;
mod line;
mod rectangle;
mod text;

pub use arrow::Arrow;
pub use diamond::Diamond;
pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::Text;

use kurbo::{BezPath, Point, Rect, Vec2};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Hit radius in world units for strokes (lines, arrows, freehand samples).
pub const HIT_TOLERANCE: f64 = 5.0;

/// RGBA8 color, serialized as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }
        let hex = color.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SerializableColor::from_hex(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid color: {raw}")))
    }
}

/// `None` is written as `"transparent"`; `"none"`, `""` and fully transparent
/// colors read back as `None`.
mod fill_color {
    use super::SerializableColor;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    pub fn serialize<S: Serializer>(
        color: &Option<SerializableColor>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match color {
            Some(c) => serializer.serialize_str(&c.to_hex()),
            None => serializer.serialize_str("transparent"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SerializableColor>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        let color = SerializableColor::from_hex(trimmed)
            .ok_or_else(|| de::Error::custom(format!("invalid fill color: {raw}")))?;
        Ok((color.a > 0).then_some(color))
    }
}

/// Opacity is a 0..=100 percentage; out-of-range numbers are clamped.
fn deserialize_opacity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Err(de::Error::custom("opacity is NaN"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// Dash pattern for strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeDash {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeDash {
    /// Cycle to the next dash pattern.
    pub fn next(self) -> Self {
        match self {
            StrokeDash::Solid => StrokeDash::Dashed,
            StrokeDash::Dashed => StrokeDash::Dotted,
            StrokeDash::Dotted => StrokeDash::Solid,
        }
    }

    /// On/off lengths scaled by the stroke width, `None` for solid strokes.
    pub fn pattern(self, stroke_width: f64) -> Option<[f64; 2]> {
        let w = stroke_width.max(1.0);
        match self {
            StrokeDash::Solid => None,
            StrokeDash::Dashed => Some([4.0 * w, 4.0 * w]),
            StrokeDash::Dotted => Some([w, 3.0 * w]),
        }
    }
}

/// Sketchiness level for the hand-drawn look. Stored on the wire as `roughness`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Sketchiness {
    /// Clean, precise lines.
    Architect = 0,
    /// Slight hand-drawn feel.
    #[default]
    Artist = 1,
    /// Very sketchy.
    Cartoonist = 2,
}

impl Sketchiness {
    /// Roughness amount handed to sketchy renderers.
    pub fn roughness(&self) -> f64 {
        *self as u8 as f64
    }

    /// Cycle to the next sketchiness level.
    pub fn next(self) -> Self {
        match self {
            Sketchiness::Architect => Sketchiness::Artist,
            Sketchiness::Artist => Sketchiness::Cartoonist,
            Sketchiness::Cartoonist => Sketchiness::Architect,
        }
    }
}

impl TryFrom<u8> for Sketchiness {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Sketchiness::Architect),
            1 => Ok(Sketchiness::Artist),
            2 => Ok(Sketchiness::Cartoonist),
            other => Err(format!("roughness out of range: {other}")),
        }
    }
}

impl From<Sketchiness> for u8 {
    fn from(value: Sketchiness) -> Self {
        value as u8
    }
}

/// Corner treatment for boxes and line joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerStyle {
    Sharp,
    #[default]
    Round,
}

/// Fill pattern style for closed shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillPattern {
    /// Parallel diagonal lines.
    #[default]
    #[serde(rename = "hachure")]
    Hachure,
    /// Solid fill color.
    #[serde(rename = "solid")]
    Solid,
    /// Zigzag pattern.
    #[serde(rename = "zigzag")]
    ZigZag,
    /// Cross-hatched lines.
    #[serde(rename = "cross-hatch")]
    CrossHatch,
}

impl FillPattern {
    /// Cycle to the next fill pattern.
    pub fn next(self) -> Self {
        match self {
            FillPattern::Hachure => FillPattern::Solid,
            FillPattern::Solid => FillPattern::ZigZag,
            FillPattern::ZigZag => FillPattern::CrossHatch,
            FillPattern::CrossHatch => FillPattern::Hachure,
        }
    }

    /// Wire name, also used for export attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            FillPattern::Hachure => "hachure",
            FillPattern::Solid => "solid",
            FillPattern::ZigZag => "zigzag",
            FillPattern::CrossHatch => "cross-hatch",
        }
    }
}

/// Style properties for shapes.
///
/// Copied by value into each shape when it is created, so changing the active
/// tool style never touches existing shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    /// Stroke color.
    #[serde(rename = "stroke")]
    pub stroke_color: SerializableColor,
    /// Fill color (None = no fill).
    #[serde(rename = "backgroundColor", with = "fill_color")]
    pub fill_color: Option<SerializableColor>,
    /// Stroke width in pixels.
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
    #[serde(rename = "strokeStyle")]
    pub stroke_dash: StrokeDash,
    #[serde(rename = "roughness")]
    pub sketchiness: Sketchiness,
    #[serde(rename = "roundness")]
    pub corner_style: CornerStyle,
    /// Opacity percentage, 0..=100.
    #[serde(deserialize_with = "deserialize_opacity")]
    pub opacity: u8,
    #[serde(rename = "fillStyle")]
    pub fill_pattern: FillPattern,
}

impl ShapeStyle {
    /// Opacity as a 0.0..=1.0 factor.
    pub fn alpha(&self) -> f64 {
        f64::from(self.opacity.min(100)) / 100.0
    }

    pub fn set_opacity(&mut self, percent: u8) {
        self.opacity = percent.min(100);
    }

    /// Stroke color with opacity applied to its alpha channel.
    pub fn stroke_with_opacity(&self) -> SerializableColor {
        self.with_opacity(self.stroke_color)
    }

    /// Fill color with opacity applied to its alpha channel.
    pub fn fill_with_opacity(&self) -> Option<SerializableColor> {
        self.fill_color.map(|c| self.with_opacity(c))
    }

    fn with_opacity(&self, color: SerializableColor) -> SerializableColor {
        let alpha = (f64::from(color.a) * self.alpha()).round() as u8;
        SerializableColor { a: alpha, ..color }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::new(0xEC, 0xEC, 0xEC, 255),
            fill_color: None,
            stroke_width: 2.0,
            stroke_dash: StrokeDash::default(),
            sketchiness: Sketchiness::default(),
            corner_style: CornerStyle::default(),
            opacity: 100,
            fill_pattern: FillPattern::default(),
        }
    }
}

/// Opaque unique identifier for shapes, generated client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ShapeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Containment test that includes all four edges (kurbo's `contains` excludes
/// the max edges).
pub(crate) fn rect_contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> &ShapeId;

    /// Get the normalized bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) hits this shape.
    fn hit_test(&self, point: Point) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Offset every positional field by `delta`.
    fn translate(&mut self, delta: Vec2);
}

/// Enum wrapper for all shape types; this is the persisted and wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    #[serde(rename = "rect")]
    Rectangle(Rectangle),
    #[serde(rename = "diamond")]
    Diamond(Diamond),
    #[serde(rename = "circle")]
    Ellipse(Ellipse),
    #[serde(rename = "arrow")]
    Arrow(Arrow),
    #[serde(rename = "line")]
    Line(Line),
    #[serde(rename = "pencil")]
    Freehand(Freehand),
    #[serde(rename = "text")]
    Text(Text),
}

impl Shape {
    pub fn id(&self) -> &ShapeId {
        match self {
            Shape::Rectangle(s) => s.id(),
            Shape::Diamond(s) => s.id(),
            Shape::Ellipse(s) => s.id(),
            Shape::Arrow(s) => s.id(),
            Shape::Line(s) => s.id(),
            Shape::Freehand(s) => s.id(),
            Shape::Text(s) => s.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Diamond(s) => s.bounds(),
            Shape::Ellipse(s) => s.bounds(),
            Shape::Arrow(s) => s.bounds(),
            Shape::Line(s) => s.bounds(),
            Shape::Freehand(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point) -> bool {
        match self {
            Shape::Rectangle(s) => s.hit_test(point),
            Shape::Diamond(s) => s.hit_test(point),
            Shape::Ellipse(s) => s.hit_test(point),
            Shape::Arrow(s) => s.hit_test(point),
            Shape::Line(s) => s.hit_test(point),
            Shape::Freehand(s) => s.hit_test(point),
            Shape::Text(s) => s.hit_test(point),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Rectangle(s) => s.to_path(),
            Shape::Diamond(s) => s.to_path(),
            Shape::Ellipse(s) => s.to_path(),
            Shape::Arrow(s) => s.to_path(),
            Shape::Line(s) => s.to_path(),
            Shape::Freehand(s) => s.to_path(),
            Shape::Text(s) => s.to_path(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style(),
            Shape::Diamond(s) => s.style(),
            Shape::Ellipse(s) => s.style(),
            Shape::Arrow(s) => s.style(),
            Shape::Line(s) => s.style(),
            Shape::Freehand(s) => s.style(),
            Shape::Text(s) => s.style(),
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style_mut(),
            Shape::Diamond(s) => s.style_mut(),
            Shape::Ellipse(s) => s.style_mut(),
            Shape::Arrow(s) => s.style_mut(),
            Shape::Line(s) => s.style_mut(),
            Shape::Freehand(s) => s.style_mut(),
            Shape::Text(s) => s.style_mut(),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Rectangle(s) => s.translate(delta),
            Shape::Diamond(s) => s.translate(delta),
            Shape::Ellipse(s) => s.translate(delta),
            Shape::Arrow(s) => s.translate(delta),
            Shape::Line(s) => s.translate(delta),
            Shape::Freehand(s) => s.translate(delta),
            Shape::Text(s) => s.translate(delta),
        }
    }

    /// Copy of this shape offset by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Shape {
        let mut shape = self.clone();
        shape.translate(Vec2::new(dx, dy));
        shape
    }

    /// Wire name of the variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rect",
            Shape::Diamond(_) => "diamond",
            Shape::Ellipse(_) => "circle",
            Shape::Arrow(_) => "arrow",
            Shape::Line(_) => "line",
            Shape::Freehand(_) => "pencil",
            Shape::Text(_) => "text",
        }
    }

    /// Text content, for text shapes.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Whether the outline forms a closed region that can be filled.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Shape::Rectangle(_) | Shape::Diamond(_) | Shape::Ellipse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<Shape> {
        vec![
            Shape::Rectangle(Rectangle::new(Point::new(10.0, 20.0), 30.0, -40.0)),
            Shape::Diamond(Diamond::new(Point::new(-5.0, 5.0), 50.0, 60.0)),
            Shape::Ellipse(Ellipse::new(Point::new(3.0, 4.0), 12.0)),
            Shape::Arrow(Arrow::new(Point::new(0.0, 0.0), Point::new(80.0, 15.0))),
            Shape::Line(Line::new(Point::new(1.0, 2.0), Point::new(3.0, 4.0))),
            Shape::Freehand(Freehand::from_points(vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 7.0),
                Point::new(9.0, 2.0),
            ])),
            Shape::Text(Text::new(Point::new(40.0, 50.0), "hello".to_string())),
        ]
    }

    fn assert_close(a: &Shape, b: &Shape) {
        let (ba, bb) = (a.bounds(), b.bounds());
        assert!((ba.x0 - bb.x0).abs() < 1e-9);
        assert!((ba.y0 - bb.y0).abs() < 1e-9);
        assert!((ba.x1 - bb.x1).abs() < 1e-9);
        assert!((ba.y1 - bb.y1).abs() < 1e-9);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_translate_roundtrip_all_variants() {
        for shape in all_variants() {
            let back = shape.translated(17.5, -3.25).translated(-17.5, 3.25);
            assert_close(&shape, &back);
        }
    }

    #[test]
    fn test_translate_moves_bounds() {
        for shape in all_variants() {
            let moved = shape.translated(10.0, 20.0);
            let (before, after) = (shape.bounds(), moved.bounds());
            assert!((after.x0 - before.x0 - 10.0).abs() < 1e-9);
            assert!((after.y0 - before.y0 - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_color_hex_parsing() {
        assert_eq!(
            SerializableColor::from_hex("#ff8000"),
            Some(SerializableColor::new(255, 128, 0, 255))
        );
        assert_eq!(
            SerializableColor::from_hex("#fff"),
            Some(SerializableColor::white())
        );
        assert_eq!(
            SerializableColor::from_hex("#00000080"),
            Some(SerializableColor::new(0, 0, 0, 128))
        );
        assert_eq!(
            SerializableColor::from_hex("transparent"),
            Some(SerializableColor::transparent())
        );
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::from_hex("#12345"), None);
    }

    #[test]
    fn test_color_to_hex() {
        assert_eq!(SerializableColor::new(236, 236, 236, 255).to_hex(), "#ececec");
        assert_eq!(SerializableColor::new(1, 2, 3, 4).to_hex(), "#01020304");
    }

    #[test]
    fn test_style_wire_format() {
        let style = ShapeStyle::default();
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["stroke"], "#ececec");
        assert_eq!(json["backgroundColor"], "transparent");
        assert_eq!(json["strokeWidth"], 2.0);
        assert_eq!(json["strokeStyle"], "solid");
        assert_eq!(json["roughness"], 1);
        assert_eq!(json["roundness"], "round");
        assert_eq!(json["opacity"], 100);
        assert_eq!(json["fillStyle"], "hachure");
    }

    #[test]
    fn test_style_parses_browser_payload() {
        let json = r##"{
            "stroke": "#e03131",
            "backgroundColor": "#a5d8ff",
            "strokeWidth": 4,
            "strokeStyle": "dotted",
            "roughness": 2,
            "roundness": "sharp",
            "opacity": 150,
            "fillStyle": "cross-hatch"
        }"##;
        let style: ShapeStyle = serde_json::from_str(json).unwrap();
        assert_eq!(style.stroke_color, SerializableColor::new(0xe0, 0x31, 0x31, 255));
        assert_eq!(style.fill_color, Some(SerializableColor::new(0xa5, 0xd8, 0xff, 255)));
        assert!((style.stroke_width - 4.0).abs() < f64::EPSILON);
        assert_eq!(style.stroke_dash, StrokeDash::Dotted);
        assert_eq!(style.sketchiness, Sketchiness::Cartoonist);
        assert_eq!(style.corner_style, CornerStyle::Sharp);
        assert_eq!(style.opacity, 100);
        assert_eq!(style.fill_pattern, FillPattern::CrossHatch);
    }

    #[test]
    fn test_fill_none_variants() {
        for raw in ["transparent", "none", ""] {
            let json = format!(r#"{{"backgroundColor":"{raw}"}}"#);
            let style: ShapeStyle = serde_json::from_str(&json).unwrap();
            assert_eq!(style.fill_color, None, "{raw}");
        }
    }

    #[test]
    fn test_invalid_roughness_rejected() {
        let result = serde_json::from_str::<ShapeStyle>(r#"{"roughness":7}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_opacity_applied_to_colors() {
        let mut style = ShapeStyle {
            stroke_color: SerializableColor::black(),
            fill_color: Some(SerializableColor::white()),
            ..ShapeStyle::default()
        };
        style.set_opacity(50);
        assert_eq!(style.stroke_with_opacity().a, 128);
        assert_eq!(style.fill_with_opacity().map(|c| c.a), Some(128));
        style.set_opacity(200);
        assert_eq!(style.opacity, 100);
    }

    #[test]
    fn test_shape_wire_tags() {
        let expected = ["rect", "diamond", "circle", "arrow", "line", "pencil", "text"];
        for (shape, tag) in all_variants().iter().zip(expected) {
            let json = serde_json::to_value(shape).unwrap();
            assert_eq!(json["type"], tag);
            assert_eq!(shape.kind_name(), tag);
        }
    }

    #[test]
    fn test_parse_persisted_rect() {
        let json = r##"{"id":"k2j4h1","type":"rect","x":10,"y":20,"width":30,"height":40,
            "style":{"stroke":"#ECECEC","backgroundColor":"transparent","strokeWidth":2,
            "strokeStyle":"solid","roughness":1,"roundness":"round","opacity":100,"fillStyle":"hachure"}}"##;
        let shape: Shape = serde_json::from_str(json).unwrap();
        assert_eq!(shape.id().as_str(), "k2j4h1");
        match shape {
            Shape::Rectangle(r) => {
                assert!((r.x - 10.0).abs() < f64::EPSILON);
                assert!((r.height - 40.0).abs() < f64::EPSILON);
            }
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_shape_type_rejected() {
        let json = r#"{"id":"a","type":"hexagon","x":0,"y":0}"#;
        assert!(serde_json::from_str::<Shape>(json).is_err());
    }

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < f64::EPSILON);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_ids_unique() {
        let a = ShapeId::new();
        let b = ShapeId::new();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }
}
