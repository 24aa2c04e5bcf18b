use std::ops::Range;

use serde::{Deserialize, Serialize};

use voroscope_core::geometry::{BBox, Point};

/// Padding between the canvas border and the plotting area, in pixels.
pub const PLOT_MARGIN: u32 = 10;

/// Fractional margin added around the data when no explicit window is set.
const FIT_MARGIN: f64 = 0.05;

/// The view window of a render: which rectangle of the plane is shown and
/// how many pixels wide the plotting area is. The plot height is derived
/// from the window so one data unit spans the same number of pixels on
/// both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// View window in data coordinates.
    pub bounds: BBox,
    /// Width of the plotting area in pixels.
    pub plot_width: u32,
}

impl Viewport {
    pub fn new(bounds: BBox, plot_width: u32) -> Self {
        Self {
            bounds: pad_degenerate(bounds),
            plot_width: plot_width.max(1),
        }
    }

    /// Window from explicit `[xmin, xmax, ymin, ymax]` bounds. Swapped
    /// limits are normalized.
    pub fn from_axis_bounds(bounds: [f64; 4], plot_width: u32) -> Self {
        let [x0, x1, y0, y1] = bounds;
        Self::new(
            BBox::new(
                Point::new(x0.min(x1), y0.min(y1)),
                Point::new(x0.max(x1), y0.max(y1)),
            ),
            plot_width,
        )
    }

    /// Window fitted around the data with a small margin.
    pub fn fit(data: BBox, plot_width: u32) -> Self {
        Self::new(data.expand(FIT_MARGIN), plot_width)
    }

    pub fn x_range(&self) -> Range<f64> {
        self.bounds.min.x..self.bounds.max.x
    }

    pub fn y_range(&self) -> Range<f64> {
        self.bounds.min.y..self.bounds.max.y
    }

    /// Plot area height preserving equal aspect.
    pub fn plot_height(&self) -> u32 {
        let height = self.plot_width as f64 * self.bounds.height() / self.bounds.width();
        (height.round() as u32).max(1)
    }

    /// Total canvas size: plot area plus the surrounding margin.
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            self.plot_width + 2 * PLOT_MARGIN,
            self.plot_height() + 2 * PLOT_MARGIN,
        )
    }
}

/// A window must have positive spans; a single point or a horizontal or
/// vertical line of data would otherwise collapse it.
fn pad_degenerate(bounds: BBox) -> BBox {
    let mut min = bounds.min;
    let mut max = bounds.max;
    if max.x - min.x <= 0.0 {
        min.x -= 0.5;
        max.x += 0.5;
    }
    if max.y - min.y <= 0.0 {
        min.y -= 0.5;
        max.y += 0.5;
    }
    BBox::new(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_aspect() {
        let vp = Viewport::from_axis_bounds([0.0, 2.0, 0.0, 1.0], 800);
        assert_eq!(vp.plot_height(), 400);
        assert_eq!(vp.canvas_size(), (820, 420));
    }

    #[test]
    fn test_fit_adds_margin() {
        let data = BBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let vp = Viewport::fit(data, 100);
        assert!((vp.bounds.min.x - -0.05).abs() < 1e-12);
        assert!((vp.bounds.max.y - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_window_is_padded() {
        let point = BBox::new(Point::new(3.0, 4.0), Point::new(3.0, 4.0));
        let vp = Viewport::new(point, 200);
        assert!(vp.bounds.width() > 0.0);
        assert!(vp.bounds.height() > 0.0);
        assert_eq!(vp.plot_height(), 200);
    }

    #[test]
    fn test_swapped_axis_bounds_normalized() {
        let vp = Viewport::from_axis_bounds([1.0, 0.0, 5.0, 2.0], 100);
        assert_eq!(vp.x_range(), 0.0..1.0);
        assert_eq!(vp.y_range(), 2.0..5.0);
    }
}
