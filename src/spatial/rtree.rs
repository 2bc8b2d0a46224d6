//! Hit-test index over drawn node centers, backed by an rstar R-tree.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;

/// Where a node was last drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawnCenter {
    node: NodeId,
    at: [f64; 2],
}

impl RTreeObject for DrawnCenter {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.at)
    }
}

impl PointDistance for DrawnCenter {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.at[0] - point[0];
        let dy = self.at[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Drawn node centers, queried by proximity.
///
/// Entries are keyed by node and exact center, so removing or relocating
/// a node needs the center it was last recorded at.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<DrawnCenter>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn insert(&mut self, node: NodeId, x: f64, y: f64) {
        self.tree.insert(DrawnCenter { node, at: [x, y] });
    }

    /// Drop the entry for `node` recorded at `(x, y)`. Returns whether it
    /// was there.
    pub fn remove(&mut self, node: NodeId, x: f64, y: f64) -> bool {
        self.tree.remove(&DrawnCenter { node, at: [x, y] }).is_some()
    }

    /// Move a node's entry from one center to another.
    pub fn relocate(&mut self, node: NodeId, from: (f64, f64), to: (f64, f64)) {
        self.remove(node, from.0, from.1);
        self.insert(node, to.0, to.1);
    }

    /// The node drawn closest to `(x, y)`, if it is no farther than `radius`.
    pub fn nearest_within(&self, x: f64, y: f64, radius: f64) -> Option<NodeId> {
        let point = [x, y];
        self.tree
            .nearest_neighbor(&point)
            .filter(|center| center.distance_2(&point) <= radius * radius)
            .map(|center| center.node)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_within() {
        let mut index = SpatialIndex::new();
        index.insert(NodeId(0), 0.0, 0.0);
        index.insert(NodeId(1), 10.0, 10.0);

        assert_eq!(index.nearest_within(0.0, 0.0, 5.0), Some(NodeId(0)));
        assert_eq!(index.nearest_within(5.0, 5.0, 1.0), None);
        // Both are ~7.07 away; either answer is in range.
        assert!(index.nearest_within(5.0, 5.0, 8.0).is_some());
        assert_eq!(index.nearest_within(9.0, 9.0, 2.0), Some(NodeId(1)));
    }

    #[test]
    fn test_relocate() {
        let mut index = SpatialIndex::new();
        index.insert(NodeId(4), 1.0, 1.0);
        index.relocate(NodeId(4), (1.0, 1.0), (50.0, 50.0));

        assert_eq!(index.len(), 1);
        assert_eq!(index.nearest_within(1.0, 1.0, 2.0), None);
        assert_eq!(index.nearest_within(50.0, 50.0, 2.0), Some(NodeId(4)));
    }

    #[test]
    fn test_remove_needs_recorded_center() {
        let mut index = SpatialIndex::new();
        index.insert(NodeId(0), 0.0, 0.0);
        index.insert(NodeId(1), 1.0, 1.0);

        assert!(!index.remove(NodeId(0), 3.0, 3.0));
        assert!(index.remove(NodeId(0), 0.0, 0.0));
        assert!(!index.remove(NodeId(0), 0.0, 0.0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.nearest_within(0.0, 0.0, 0.5), None);
    }
}
