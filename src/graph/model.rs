//! GraphModel - node/edge ownership and adjacency.
//!
//! Topology lives in petgraph's StableGraph so removals never shift the
//! indices of surviving nodes. Alongside it the model keeps insertion-ordered
//! node and edge sequences; that order is what the layout iterates and what
//! callers see from [`GraphModel::nodes`] and [`GraphModel::edges`].

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::{Directed, Direction};
use std::collections::HashMap;
use tracing::debug;

use super::edge::{Edge, EdgeId};
use super::node::{NodeId, NodeIdAllocator};
use crate::error::{GraphError, Result};

/// The set of nodes and edges being edited.
///
/// Invariants:
/// - no node id appears twice
/// - every edge's endpoints are members of the node sequence
#[derive(Debug, Clone)]
pub struct GraphModel {
    /// Adjacency. Node weights are the stable NodeId, edge weights the EdgeId.
    graph: StableGraph<NodeId, EdgeId, Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable EdgeId to petgraph EdgeIndex
    edge_index: HashMap<EdgeId, EdgeIndex>,

    /// Nodes in insertion order
    nodes: Vec<NodeId>,

    /// Edges in insertion order
    edges: Vec<Edge>,

    node_ids: NodeIdAllocator,
    next_edge_id: u32,
}

impl GraphModel {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            node_ids: NodeIdAllocator::new(),
            next_edge_id: 0,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Allocate a fresh node id without adding it.
    ///
    /// The id is reserved forever; pass it to [`GraphModel::add_node`] to make
    /// the node part of the graph, or simply drop it.
    pub fn new_node(&mut self) -> Result<NodeId> {
        self.node_ids.allocate()
    }

    /// Allocate a node id and add it in one go.
    pub fn create_node(&mut self) -> Result<NodeId> {
        let id = self.new_node()?;
        self.insert_node(id);
        Ok(id)
    }

    /// Add a previously allocated node.
    pub fn add_node(&mut self, id: NodeId) -> Result<()> {
        if self.node_index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.insert_node(id);
        Ok(())
    }

    fn insert_node(&mut self, id: NodeId) {
        let index = self.graph.add_node(id);
        self.node_index.insert(id, index);
        self.nodes.push(id);
        debug!(node = %id, "node added");
    }

    /// Remove a node and every edge touching it.
    ///
    /// Returns the removed edges so callers can drop whatever they keep for
    /// them.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<Edge>> {
        let index = self
            .node_index
            .remove(&id)
            .ok_or(GraphError::UnknownNode(id))?;

        let mut incident: Vec<EdgeId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| *e.weight())
            .collect();
        incident.sort_unstable();
        incident.dedup();

        for edge_id in &incident {
            self.edge_index.remove(edge_id);
        }

        let mut removed = Vec::with_capacity(incident.len());
        self.edges.retain(|edge| {
            if edge.touches(id) {
                removed.push(*edge);
                false
            } else {
                true
            }
        });

        self.graph.remove_node(index);
        self.nodes.retain(|&n| n != id);
        debug!(node = %id, edges = removed.len(), "node removed");
        Ok(removed)
    }

    /// Whether the node is part of the graph.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Nodes joined to `id` by an edge, in either direction.
    pub fn neighbors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let index = self
            .node_index
            .get(&id)
            .ok_or(GraphError::UnknownNode(id))?;

        let mut seen = Vec::new();
        for n in self.graph.neighbors_undirected(*index) {
            if let Some(&neighbor) = self.graph.node_weight(n) {
                if !seen.contains(&neighbor) {
                    seen.push(neighbor);
                }
            }
        }
        Ok(seen)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two existing nodes.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<Edge> {
        let from_index = *self
            .node_index
            .get(&from)
            .ok_or(GraphError::InvalidReference { from, to, missing: from })?;
        let to_index = *self
            .node_index
            .get(&to)
            .ok_or(GraphError::InvalidReference { from, to, missing: to })?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id = self
            .next_edge_id
            .checked_add(1)
            .ok_or(GraphError::EdgeIdsExhausted)?;

        let index = self.graph.add_edge(from_index, to_index, id);
        self.edge_index.insert(id, index);

        let edge = Edge { id, from, to };
        self.edges.push(edge);
        debug!(edge = %id, %from, %to, "edge added");
        Ok(edge)
    }

    /// Remove a single edge; its endpoints stay.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let index = self
            .edge_index
            .remove(&id)
            .ok_or(GraphError::UnknownEdge(id))?;
        self.graph.remove_edge(index);

        let position = self
            .edges
            .iter()
            .position(|edge| edge.id == id)
            .ok_or(GraphError::UnknownEdge(id))?;
        let edge = self.edges.remove(position);
        debug!(edge = %id, "edge removed");
        Ok(edge)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Whether any edge joins the two nodes, in either direction.
    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        match (self.node_index.get(&a), self.node_index.get(&b)) {
            (Some(&ia), Some(&ib)) => {
                self.graph.find_edge(ia, ib).is_some() || self.graph.find_edge(ib, ia).is_some()
            }
            _ => false,
        }
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Remove every node and edge.
    ///
    /// Id allocation continues from where it was, so ids handed out before
    /// the clear are never reissued.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.nodes.clear();
        self.edges.clear();
        debug!("graph cleared");
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node() {
        let mut graph = GraphModel::new();
        let id = graph.create_node().unwrap();

        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains_node(id));
        assert_eq!(graph.nodes(), &[id]);
    }

    #[test]
    fn test_new_node_is_not_added() {
        let mut graph = GraphModel::new();
        let pending = graph.new_node().unwrap();

        assert!(!graph.contains_node(pending));
        graph.add_node(pending).unwrap();
        assert!(graph.contains_node(pending));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = GraphModel::new();
        let id = graph.create_node().unwrap();

        assert!(matches!(graph.add_node(id), Err(GraphError::DuplicateNode(n)) if n == id));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_insertion_order() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let b = graph.create_node().unwrap();
        let c = graph.create_node().unwrap();
        graph.remove_node(b).unwrap();
        let d = graph.create_node().unwrap();

        assert_eq!(graph.nodes(), &[a, c, d]);
    }

    #[test]
    fn test_add_edge() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let b = graph.create_node().unwrap();

        let edge = graph.add_edge(a, b).unwrap();
        assert_eq!(edge.from, a);
        assert_eq!(edge.to, b);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge(edge.id), Some(&edge));
    }

    #[test]
    fn test_add_edge_missing_endpoint() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let ghost = graph.new_node().unwrap();

        let err = graph.add_edge(a, ghost).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidReference { missing, .. } if missing == ghost
        ));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_get_neighbors() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let b = graph.create_node().unwrap();
        let c = graph.create_node().unwrap();

        graph.add_edge(a, b).unwrap();
        graph.add_edge(c, a).unwrap();

        let neighbors = graph.neighbors(a).unwrap();
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&b));
        assert!(neighbors.contains(&c));

        assert_eq!(graph.neighbors(b).unwrap(), vec![a]);
    }

    #[test]
    fn test_neighbors_deduplicates_parallel_edges() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let b = graph.create_node().unwrap();
        graph.add_edge(a, b).unwrap();
        graph.add_edge(b, a).unwrap();

        assert_eq!(graph.neighbors(a).unwrap(), vec![b]);
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let b = graph.create_node().unwrap();
        let c = graph.create_node().unwrap();
        graph.add_edge(a, b).unwrap();
        graph.add_edge(b, c).unwrap();
        let kept = graph.add_edge(a, c).unwrap();

        let removed = graph.remove_node(b).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.edges(), &[kept]);
        assert!(graph.edges().iter().all(|e| !e.touches(b)));
        assert!(!graph.are_connected(a, b));
        assert!(graph.are_connected(a, c));
    }

    #[test]
    fn test_remove_node_with_self_loop() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        graph.add_edge(a, a).unwrap();

        let removed = graph.remove_node(a).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_remove_unknown_node() {
        let mut graph = GraphModel::new();
        assert!(matches!(
            graph.remove_node(NodeId(7)),
            Err(GraphError::UnknownNode(NodeId(7)))
        ));
    }

    #[test]
    fn test_remove_edge_keeps_endpoints() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let b = graph.create_node().unwrap();
        let edge = graph.add_edge(a, b).unwrap();

        let removed = graph.remove_edge(edge.id).unwrap();
        assert_eq!(removed, edge);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.remove_edge(edge.id).is_err());
    }

    #[test]
    fn test_random_mutations_never_leave_dangling_edges() {
        let mut graph = GraphModel::new();
        let mut live = Vec::new();
        let mut seed = 17u32;

        for round in 0..200u32 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            match seed % 4 {
                0 | 1 => live.push(graph.create_node().unwrap()),
                2 if live.len() >= 2 => {
                    let from = live[(seed as usize / 7) % live.len()];
                    let to = live[(round as usize) % live.len()];
                    graph.add_edge(from, to).unwrap();
                }
                _ if !live.is_empty() => {
                    let victim = live.remove((seed as usize / 3) % live.len());
                    graph.remove_node(victim).unwrap();
                }
                _ => {}
            }

            for edge in graph.edges() {
                assert!(graph.contains_node(edge.from));
                assert!(graph.contains_node(edge.to));
            }
        }
    }

    #[test]
    fn test_clear_keeps_ids_unique() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let b = graph.create_node().unwrap();
        graph.add_edge(a, b).unwrap();

        graph.clear();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);

        let c = graph.create_node().unwrap();
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn test_edge_ids_refuse_to_wrap() {
        let mut graph = GraphModel::new();
        let a = graph.create_node().unwrap();
        let b = graph.create_node().unwrap();
        graph.next_edge_id = u32::MAX - 1;

        let last = graph.add_edge(a, b).unwrap();
        assert_eq!(last.id, EdgeId(u32::MAX - 1));
        assert!(matches!(graph.add_edge(a, b), Err(GraphError::EdgeIdsExhausted)));
        assert_eq!(graph.edge_count(), 1);
    }
}
