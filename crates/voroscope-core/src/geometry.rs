use serde::{Deserialize, Serialize};

/// A 2D point in tessellation coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &BBox) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grow the box on every side by a fraction of the larger span.
    pub fn expand(&self, fraction: f64) -> Self {
        let pad = self.width().max(self.height()) * fraction;
        Self {
            min: Point::new(self.min.x - pad, self.min.y - pad),
            max: Point::new(self.max.x + pad, self.max.y + pad),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_bbox_from_points() {
        let points = [
            Point::new(1.0, 2.0),
            Point::new(-1.0, 0.5),
            Point::new(0.0, 3.0),
        ];
        let bb = BBox::from_points(&points).unwrap();
        assert!((bb.min.x - -1.0).abs() < 1e-10);
        assert!((bb.min.y - 0.5).abs() < 1e-10);
        assert!((bb.max.x - 1.0).abs() < 1e-10);
        assert!((bb.max.y - 3.0).abs() < 1e-10);
        assert!(BBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_bbox_union_and_contains() {
        let a = BBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let b = BBox::new(Point::new(0.5, -1.0), Point::new(2.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Point::new(0.0, -1.0));
        assert_eq!(u.max, Point::new(2.0, 1.0));
        assert!(u.contains_point(&Point::new(1.5, 0.0)));
        assert!(!u.contains_point(&Point::new(3.0, 0.0)));
    }

    #[test]
    fn test_bbox_expand() {
        let bb = BBox::new(Point::new(0.0, 0.0), Point::new(2.0, 1.0));
        let grown = bb.expand(0.05);
        assert!((grown.min.x - -0.1).abs() < 1e-10);
        assert!((grown.max.y - 1.1).abs() < 1e-10);
        assert!((grown.width() - 2.2).abs() < 1e-10);
    }
}
