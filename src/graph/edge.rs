//! Edge type and related structures.
//!
//! Edges connect two nodes. Each edge has:
//! - A stable unique identifier
//! - An ordered (from, to) pair; direction matters for drawing only, the
//!   layout treats every edge as undirected

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Stable edge identifier.
///
/// This ID remains valid even after other edges are removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// A connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    /// Whether `node` is either endpoint.
    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id_display() {
        assert_eq!(format!("{}", EdgeId(42)), "Edge(42)");
    }

    #[test]
    fn test_edge_touches_endpoints() {
        let edge = Edge {
            id: EdgeId(0),
            from: NodeId(1),
            to: NodeId(2),
        };

        assert!(edge.touches(NodeId(1)));
        assert!(edge.touches(NodeId(2)));
        assert!(!edge.touches(NodeId(3)));
    }
}
