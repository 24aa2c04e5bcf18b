use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::{BBox, Point};

/// An entry in the R-tree spatial index, referencing a tessellation
/// element (triangle or cell) by its index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index into the owning collection's element vector.
    pub element_index: usize,
    /// Bounding box of the element.
    pub bbox: BBox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

impl PointDistance for SpatialEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }
}

/// Spatial index used to cull elements outside an explicit view window.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build the index from a list of element bounding boxes.
    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Insert a single entry.
    pub fn insert(&mut self, entry: SpatialEntry) {
        self.tree.insert(entry);
    }

    /// Find all entries whose bounding box contains the given point.
    pub fn query_point(&self, point: &Point) -> Vec<&SpatialEntry> {
        self.tree.locate_all_at_point(&[point.x, point.y]).collect()
    }

    /// Find all entries that intersect the given window.
    pub fn query_window(&self, window: &BBox) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners(
            [window.min.x, window.min.y],
            [window.max.x, window.max.y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_query() {
        let entries = vec![
            SpatialEntry {
                element_index: 0,
                bbox: BBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            },
            SpatialEntry {
                element_index: 1,
                bbox: BBox::new(Point::new(5.0, 5.0), Point::new(6.0, 6.0)),
            },
        ];
        let index = SpatialIndex::build(entries);
        assert_eq!(index.len(), 2);

        let window = BBox::new(Point::new(-1.0, -1.0), Point::new(2.0, 2.0));
        let results = index.query_window(&window);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].element_index, 0);
    }

    #[test]
    fn test_point_query() {
        let mut index = SpatialIndex::new();
        assert!(index.is_empty());
        index.insert(SpatialEntry {
            element_index: 7,
            bbox: BBox::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0)),
        });

        let results = index.query_point(&Point::new(1.0, 1.0));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].element_index, 7);
        assert!(index.query_point(&Point::new(3.0, 3.0)).is_empty());
    }
}
