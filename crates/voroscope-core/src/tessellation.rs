use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{BBox, Point};

/// Which kind of element holds a vertex reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Triangle,
    Cell,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Triangle => write!(f, "triangle"),
            ElementKind::Cell => write!(f, "cell"),
        }
    }
}

/// Structural defects in a tessellation: dangling vertex references,
/// degenerate polygons, or a centroid list that cannot be paired with
/// the cell list. All of these are fatal to the file being processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidReference {
    #[error("{element} {element_index} references vertex {vertex_index}, but only {vertex_count} vertices exist")]
    VertexOutOfRange {
        element: ElementKind,
        element_index: usize,
        vertex_index: usize,
        vertex_count: usize,
    },

    #[error("cell {cell_index} has {arity} vertices, a polygon needs at least 3")]
    DegenerateCell { cell_index: usize, arity: usize },

    #[error("{centroid_count} centroids cannot be paired with {cell_count} cells")]
    CentroidMismatch {
        centroid_count: usize,
        cell_count: usize,
    },
}

/// An ordered triple of vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [usize; 3],
}

impl Triangle {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self { vertices: [a, b, c] }
    }
}

/// A polygonal cell as an ordered vertex index sequence (at least 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub vertices: Vec<usize>,
}

impl Cell {
    pub fn new(vertices: Vec<usize>) -> Self {
        Self { vertices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// A Delaunay triangulation handed over as flat records: a dense vertex
/// table plus index triples into it.
///
/// The collections are immutable after construction; `validate` must pass
/// before any index-based accessor is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangulation {
    pub vertices: Vec<Point>,
    pub triangles: Vec<Triangle>,
}

impl Triangulation {
    pub fn new(vertices: Vec<Point>, triangles: Vec<Triangle>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check that every triangle references an existing vertex.
    pub fn validate(&self) -> Result<(), InvalidReference> {
        let n = self.vertices.len();
        for (i, triangle) in self.triangles.iter().enumerate() {
            for &v in &triangle.vertices {
                if v >= n {
                    return Err(InvalidReference::VertexOutOfRange {
                        element: ElementKind::Triangle,
                        element_index: i,
                        vertex_index: v,
                        vertex_count: n,
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolve a triangle to its corner coordinates. Indices must have been
    /// validated.
    pub fn triangle_points(&self, triangle: &Triangle) -> [Point; 3] {
        [
            self.vertices[triangle.vertices[0]],
            self.vertices[triangle.vertices[1]],
            self.vertices[triangle.vertices[2]],
        ]
    }

    pub fn triangle_bbox(&self, triangle: &Triangle) -> BBox {
        let corners = self.triangle_points(triangle);
        BBox::from_points(&corners).expect("three corner points")
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.vertices)
    }
}

/// A Voronoi (or other polygonal) cell diagram: a dense vertex table,
/// variable-length cells indexing into it, and optionally one centroid
/// per cell.
///
/// An empty `centroids` vector means the dump carried no centroid section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDiagram {
    pub vertices: Vec<Point>,
    pub cells: Vec<Cell>,
    pub centroids: Vec<Point>,
}

impl CellDiagram {
    pub fn new(vertices: Vec<Point>, cells: Vec<Cell>, centroids: Vec<Point>) -> Self {
        Self {
            vertices,
            cells,
            centroids,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn has_centroids(&self) -> bool {
        !self.centroids.is_empty()
    }

    /// Check cell arity, vertex references, and centroid pairing.
    pub fn validate(&self) -> Result<(), InvalidReference> {
        let n = self.vertices.len();
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.vertex_count() < 3 {
                return Err(InvalidReference::DegenerateCell {
                    cell_index: i,
                    arity: cell.vertex_count(),
                });
            }
            for &v in &cell.vertices {
                if v >= n {
                    return Err(InvalidReference::VertexOutOfRange {
                        element: ElementKind::Cell,
                        element_index: i,
                        vertex_index: v,
                        vertex_count: n,
                    });
                }
            }
        }
        if self.has_centroids() && self.centroids.len() != self.cells.len() {
            return Err(InvalidReference::CentroidMismatch {
                centroid_count: self.centroids.len(),
                cell_count: self.cells.len(),
            });
        }
        Ok(())
    }

    /// Resolve a cell to its boundary coordinates. Indices must have been
    /// validated.
    pub fn cell_points(&self, cell: &Cell) -> Vec<Point> {
        cell.vertices.iter().map(|&v| self.vertices[v]).collect()
    }

    pub fn cell_bbox(&self, cell: &Cell) -> Option<BBox> {
        BBox::from_points(&self.cell_points(cell))
    }

    /// The centroid paired with the cell at `cell_index`, if centroids
    /// were provided.
    pub fn centroid_of(&self, cell_index: usize) -> Option<Point> {
        self.centroids.get(cell_index).copied()
    }

    pub fn bbox(&self) -> Option<BBox> {
        let vertex_box = BBox::from_points(&self.vertices);
        let centroid_box = BBox::from_points(&self.centroids);
        match (vertex_box, centroid_box) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_triangulation_validate() {
        let tri = Triangulation::new(unit_square(), vec![Triangle::new(0, 1, 2)]);
        assert!(tri.validate().is_ok());

        let bad = Triangulation::new(unit_square(), vec![Triangle::new(0, 1, 4)]);
        assert_eq!(
            bad.validate(),
            Err(InvalidReference::VertexOutOfRange {
                element: ElementKind::Triangle,
                element_index: 0,
                vertex_index: 4,
                vertex_count: 4,
            })
        );
    }

    #[test]
    fn test_triangle_points_and_bbox() {
        let tri = Triangulation::new(unit_square(), vec![Triangle::new(0, 1, 3)]);
        let corners = tri.triangle_points(&tri.triangles[0]);
        assert_eq!(corners[0], Point::new(0.0, 0.0));
        assert_eq!(corners[2], Point::new(0.0, 1.0));
        let bb = tri.triangle_bbox(&tri.triangles[0]);
        assert_eq!(bb.max, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_cell_diagram_validate() {
        let diagram = CellDiagram::new(unit_square(), vec![Cell::new(vec![0, 1, 2, 3])], vec![]);
        assert!(diagram.validate().is_ok());

        let dangling = CellDiagram::new(unit_square(), vec![Cell::new(vec![0, 1, 5])], vec![]);
        assert_eq!(
            dangling.validate(),
            Err(InvalidReference::VertexOutOfRange {
                element: ElementKind::Cell,
                element_index: 0,
                vertex_index: 5,
                vertex_count: 4,
            })
        );

        let degenerate = CellDiagram::new(unit_square(), vec![Cell::new(vec![0, 1])], vec![]);
        assert_eq!(
            degenerate.validate(),
            Err(InvalidReference::DegenerateCell {
                cell_index: 0,
                arity: 2,
            })
        );
    }

    #[test]
    fn test_centroid_pairing() {
        let cells = vec![Cell::new(vec![0, 1, 2]), Cell::new(vec![0, 2, 3])];
        let centroids = vec![Point::new(0.6, 0.3), Point::new(0.3, 0.6)];
        let diagram = CellDiagram::new(unit_square(), cells, centroids);
        assert!(diagram.validate().is_ok());
        assert_eq!(diagram.centroid_of(1), Some(Point::new(0.3, 0.6)));
        assert_eq!(diagram.centroid_of(2), None);

        let lopsided = CellDiagram::new(
            unit_square(),
            vec![Cell::new(vec![0, 1, 2])],
            vec![Point::new(0.5, 0.5), Point::new(0.1, 0.1)],
        );
        assert_eq!(
            lopsided.validate(),
            Err(InvalidReference::CentroidMismatch {
                centroid_count: 2,
                cell_count: 1,
            })
        );
    }

    #[test]
    fn test_diagram_bbox_covers_centroids() {
        let diagram = CellDiagram::new(
            unit_square(),
            vec![Cell::new(vec![0, 1, 2, 3])],
            vec![Point::new(2.0, 0.5)],
        );
        let bb = diagram.bbox().unwrap();
        assert_eq!(bb.max, Point::new(2.0, 1.0));
    }
}
