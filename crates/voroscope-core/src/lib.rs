//! # Voroscope Core
//!
//! Data model for precomputed planar tessellations: vertices, triangles,
//! polygonal cells and their centroids, with reference validation and an
//! R-tree spatial index for view-window culling.
//!
//! This crate holds no construction algorithms. Triangulations and cell
//! diagrams are computed elsewhere and arrive here fully materialized.

pub mod geometry;
pub mod tessellation;
pub mod spatial;

pub use geometry::{BBox, Point};
pub use tessellation::{Cell, CellDiagram, InvalidReference, Triangle, Triangulation};
