//! # Voroscope Renderer
//!
//! Turns parsed tessellation records into static images: triangulation
//! edge plots, cell diagram outlines, or both overlaid on one canvas.
//! Output is PNG/BMP raster or SVG vector depending on the target path,
//! drawn with an equal-aspect view window so shapes are not distorted.

pub mod options;
pub mod scene;
pub mod viewport;

pub use options::{Color, MarkerStyle, RenderOptions};
pub use scene::{render_cell_diagram, render_combined, render_triangulation, RenderError};
pub use viewport::Viewport;
