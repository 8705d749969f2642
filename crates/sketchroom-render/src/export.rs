//! SVG and PNG export of a shape snapshot.

use crate::raster::RasterRenderer;
use crate::renderer::{RendererError, render_shapes};
use crate::svg::SvgRenderer;
use kurbo::{Affine, Rect};
use sketchroom_core::shapes::{SerializableColor, Shape};
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    EmptyCanvas,
    #[error("Invalid export scale {0}")]
    InvalidScale(f64),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Margin around the shapes' bounds, in world units.
    pub padding: f64,
    /// Resolution multiplier (1 = 1x, 2 = 2x).
    pub scale: f64,
    /// Background color, `None` for transparent.
    pub background: Option<SerializableColor>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            padding: 20.0,
            scale: 1.0,
            background: Some(SerializableColor::new(0x12, 0x12, 0x12, 255)),
        }
    }
}

/// Output frame shared by both exporters.
struct Frame {
    transform: Affine,
    width: u32,
    height: u32,
}

impl Frame {
    fn new(shapes: &[Shape], options: &ExportOptions) -> ExportResult<Self> {
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(ExportError::InvalidScale(options.scale));
        }
        let bounds = shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|a, b| a.union(b))
            .ok_or(ExportError::EmptyCanvas)?;
        let padded: Rect = bounds.inflate(options.padding, options.padding);

        let width = (padded.width() * options.scale).ceil().max(1.0) as u32;
        let height = (padded.height() * options.scale).ceil().max(1.0) as u32;
        let transform = Affine::scale(options.scale) * Affine::translate((-padded.x0, -padded.y0));

        log::debug!(
            "Export frame {}x{} for {} shapes at {}x",
            width,
            height,
            shapes.len(),
            options.scale
        );
        Ok(Self {
            transform,
            width,
            height,
        })
    }
}

/// Render shapes to an SVG document.
pub fn export_svg(shapes: &[Shape], options: &ExportOptions) -> ExportResult<String> {
    let frame = Frame::new(shapes, options)?;
    let mut renderer = SvgRenderer::new(frame.transform, options.scale);
    render_shapes(&mut renderer, shapes);
    let background = options.background.map(|c| c.to_hex());
    Ok(renderer.finish(frame.width, frame.height, background.as_deref()))
}

/// Render shapes to PNG bytes.
pub fn export_png(shapes: &[Shape], options: &ExportOptions) -> ExportResult<Vec<u8>> {
    let frame = Frame::new(shapes, options)?;
    let mut renderer = RasterRenderer::new(
        frame.width,
        frame.height,
        frame.transform,
        options.scale,
        options.background,
    )?;
    render_shapes(&mut renderer, shapes);
    encode_png(&renderer.rgba(), renderer.width(), renderer.height())
}

/// Encode straight RGBA8 pixel data as PNG.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> ExportResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba)?;
    }
    Ok(buf)
}
