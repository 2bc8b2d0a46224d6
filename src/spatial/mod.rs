//! Spatial indexing for O(log n) hit testing.
//!
//! An R-tree over drawn node positions answers "which node is under this
//! point" for the spatial renderer.

mod rtree;

pub use rtree::SpatialIndex;
