//! Sketchroom Render Library
//!
//! Renderer abstraction plus SVG and PNG export for Sketchroom.
//! The raster backend uses tiny-skia for CPU rendering.

mod export;
mod raster;
mod renderer;
pub mod rough;
mod svg;

pub use export::{ExportError, ExportOptions, ExportResult, encode_png, export_png, export_svg};
pub use raster::RasterRenderer;
pub use renderer::{RenderResult, Renderer, RendererError, render_shapes};
pub use svg::SvgRenderer;
