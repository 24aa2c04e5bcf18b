use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use voroscope_core::Point;

/// RGB color for a drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn rgb(&self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

/// Style of a point marker overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: Color,
    /// Marker radius in pixels.
    pub size: u32,
}

/// The renderer's configuration surface. One structure covers every plot
/// variant: which overlays to draw, how to style them, and what window of
/// the plane to show.
///
/// Defaults: black triangulation edges, blue cell outlines, red cross
/// centroid markers, and a translucent grey background triangulation in
/// combined mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Marker style for tessellation vertices.
    pub vertex_style: MarkerStyle,
    /// Marker style for cell centroids (drawn as crosses).
    pub centroid_style: MarkerStyle,
    /// Triangulation edge color.
    pub edge_color: Color,
    /// Cell outline color.
    pub cell_color: Color,
    /// Color of the background triangulation in combined mode.
    pub overlay_color: Color,
    /// Opacity of the background triangulation in combined mode.
    pub overlay_alpha: f64,
    /// Color of the reference grid polygons.
    pub grid_color: Color,
    /// Draw vertex markers.
    pub show_vertices: bool,
    /// Draw centroid markers when the diagram carries centroids.
    pub show_centroids: bool,
    /// In combined mode, draw the triangulation beneath the cell diagram.
    pub show_triangulation_overlay: bool,
    /// Close each cell outline back to its first vertex. Cells are bounded
    /// polygonal regions, so closing is the default; switch off to draw
    /// open polylines instead.
    pub close_cell_polygons: bool,
    /// Explicit view window as `[xmin, xmax, ymin, ymax]`. When absent the
    /// window is fitted to the data with a small margin.
    pub axis_bounds: Option<[f64; 4]>,
    /// Extra polygons drawn beneath everything, e.g. a domain boundary or
    /// a coarse partition to compare against.
    pub overlay_reference_grid: Vec<Vec<Point>>,
    /// Width of the plotting area in pixels. The height follows from the
    /// view window so that both axes share one scale.
    pub plot_width: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            vertex_style: MarkerStyle {
                color: Color::new(0, 0, 0),
                size: 2,
            },
            centroid_style: MarkerStyle {
                color: Color::new(220, 20, 20),
                size: 4,
            },
            edge_color: Color::new(0, 0, 0),
            cell_color: Color::new(30, 60, 220),
            overlay_color: Color::new(128, 128, 128),
            overlay_alpha: 0.5,
            grid_color: Color::new(200, 200, 200),
            show_vertices: true,
            show_centroids: true,
            show_triangulation_overlay: true,
            close_cell_polygons: true,
            axis_bounds: None,
            overlay_reference_grid: Vec::new(),
            plot_width: 800,
        }
    }
}

impl RenderOptions {
    pub fn with_axis_bounds(mut self, xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        self.axis_bounds = Some([xmin, xmax, ymin, ymax]);
        self
    }

    pub fn with_plot_width(mut self, plot_width: u32) -> Self {
        self.plot_width = plot_width;
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
