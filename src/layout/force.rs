//! Force-directed layout engine.
//!
//! Every [`ForceLayoutEngine::step`] runs three phases in order:
//!
//! 1. **Repulsion**: every unlocked node is pushed away from every other node
//!    with `repulse_const / d²`, where `d` never drops below `min_distance`.
//! 2. **Attraction**: every edge longer than `rest_length` pulls its unlocked
//!    endpoints together with `attract_const * (d - rest_length)`. Shorter
//!    edges exert nothing; repulsion alone spaces them.
//! 3. **Integration**: unlocked nodes lose `friction_const` of their
//!    velocity, then move by it.
//!
//! Locked nodes keep their position and velocity untouched but still repel
//! others. After integration every node and edge is redrawn, moved or not.

use std::collections::{HashMap, HashSet};
use tracing::trace;

use super::config::{ForceConfig, Viewport};
use super::placement::Placement;
use super::vector::Vec2;
use crate::error::{GraphError, Result};
use crate::graph::{GraphModel, NodeId};
use crate::render::{RenderAdapter, RenderSurface};

/// Per-node simulation data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutState {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Position/velocity bookkeeping and the simulation step.
#[derive(Debug, Clone)]
pub struct ForceLayoutEngine {
    config: ForceConfig,
    states: HashMap<NodeId, LayoutState>,
    /// Tracked nodes in insertion order
    order: Vec<NodeId>,
    locked: HashSet<NodeId>,
    placement: Placement,
    viewport: Option<Viewport>,
    ticks: u64,
}

impl ForceLayoutEngine {
    /// Create an engine with default tunables.
    pub fn new() -> Self {
        Self::with_config(ForceConfig::default())
    }

    /// Create an engine with the given tunables.
    pub fn with_config(config: ForceConfig) -> Self {
        let placement = Placement::new(config.placement_seed);
        Self {
            config,
            states: HashMap::new(),
            order: Vec::new(),
            locked: HashSet::new(),
            placement,
            viewport: None,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Replace all tunables at once.
    pub fn set_config(&mut self, config: ForceConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn rest_length(&self) -> f64 {
        self.config.rest_length
    }

    /// Change the spring length; takes effect on the next step.
    pub fn set_rest_length(&mut self, rest_length: f64) -> Result<()> {
        let config = ForceConfig {
            rest_length,
            ..self.config.clone()
        };
        self.set_config(config)
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Extent used to wrap initial placement; `None` when unknown.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Start simulating a node, returning its initial position.
    pub fn add_node(&mut self, node: NodeId) -> Result<Vec2> {
        if self.states.contains_key(&node) {
            return Err(GraphError::DuplicateNode(node));
        }
        let position = self
            .placement
            .next(self.config.rest_length, self.viewport);
        self.states.insert(
            node,
            LayoutState {
                position,
                velocity: Vec2::ZERO,
            },
        );
        self.order.push(node);
        trace!(%node, %position, "placed");
        Ok(position)
    }

    /// Stop simulating a node.
    pub fn remove_node(&mut self, node: NodeId) -> Result<LayoutState> {
        let state = self
            .states
            .remove(&node)
            .ok_or(GraphError::UnknownNode(node))?;
        self.order.retain(|&n| n != node);
        self.locked.remove(&node);
        Ok(state)
    }

    /// Whether the node has layout state.
    pub fn contains(&self, node: NodeId) -> bool {
        self.states.contains_key(&node)
    }

    /// Tracked nodes in insertion order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    /// Move a node and stop it dead.
    pub fn set_coords(&mut self, node: NodeId, x: f64, y: f64) -> Result<()> {
        let state = self.state_mut(node)?;
        state.position = Vec2::new(x, y);
        state.velocity = Vec2::ZERO;
        Ok(())
    }

    /// Exclude a node from (or return it to) force and position updates.
    pub fn set_locked(&mut self, node: NodeId, locked: bool) -> Result<()> {
        if !self.states.contains_key(&node) {
            return Err(GraphError::UnknownNode(node));
        }
        if locked {
            self.locked.insert(node);
        } else {
            self.locked.remove(&node);
        }
        Ok(())
    }

    pub fn is_locked(&self, node: NodeId) -> Result<bool> {
        if !self.states.contains_key(&node) {
            return Err(GraphError::UnknownNode(node));
        }
        Ok(self.locked.contains(&node))
    }

    /// The currently locked nodes.
    pub fn locked(&self) -> &HashSet<NodeId> {
        &self.locked
    }

    pub fn position_of(&self, node: NodeId) -> Result<Vec2> {
        self.state(node).map(|s| s.position)
    }

    pub fn velocity_of(&self, node: NodeId) -> Result<Vec2> {
        self.state(node).map(|s| s.velocity)
    }

    fn state(&self, node: NodeId) -> Result<&LayoutState> {
        self.states.get(&node).ok_or(GraphError::UnknownNode(node))
    }

    fn state_mut(&mut self, node: NodeId) -> Result<&mut LayoutState> {
        self.states
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode(node))
    }

    /// The node under (x, y), as reported by the renderer.
    pub fn node_at<R: RenderAdapter>(&self, surface: &RenderSurface<R>, x: f64, y: f64) -> Option<NodeId> {
        surface.hit_test(x, y)
    }

    /// Number of completed steps.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Drop all layout state; placement starts over.
    pub fn clear(&mut self) {
        self.states.clear();
        self.order.clear();
        self.locked.clear();
        self.placement.reset();
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation by one tick and redraw everything.
    ///
    /// Edges whose endpoints have no layout state are skipped.
    pub fn step<R: RenderAdapter>(&mut self, graph: &GraphModel, surface: &mut RenderSurface<R>) {
        self.apply_repulsion();
        self.apply_attraction(graph);
        self.integrate();
        self.ticks += 1;
        trace!(tick = self.ticks, nodes = self.order.len(), "step");
        self.draw(graph, surface);
    }

    fn apply_repulsion(&mut self) {
        let positions: Vec<(NodeId, Vec2)> = self
            .order
            .iter()
            .filter_map(|&id| self.states.get(&id).map(|s| (id, s.position)))
            .collect();

        for &(i, pi) in &positions {
            if self.locked.contains(&i) {
                continue;
            }
            let mut push = Vec2::ZERO;
            for &(j, pj) in &positions {
                if i == j {
                    continue;
                }
                let offset = pi - pj;
                let distance = offset.length().max(self.config.min_distance);
                let force = self.config.repulse_const / (distance * distance);
                // Coincident nodes have no direction to push along.
                push += offset.normalized() * force;
            }
            if let Some(state) = self.states.get_mut(&i) {
                state.velocity += push;
            }
        }
    }

    fn apply_attraction(&mut self, graph: &GraphModel) {
        for edge in graph.edges() {
            let (Some(from), Some(to)) = (self.states.get(&edge.from), self.states.get(&edge.to))
            else {
                continue;
            };
            let offset = to.position - from.position;
            let distance = offset.length().max(self.config.min_distance);
            let force = self.config.attract_const * (distance - self.config.rest_length).max(0.0);
            if force == 0.0 {
                continue;
            }
            let pull = offset.normalized() * force;

            if !self.locked.contains(&edge.to) {
                if let Some(state) = self.states.get_mut(&edge.to) {
                    state.velocity -= pull;
                }
            }
            if !self.locked.contains(&edge.from) {
                if let Some(state) = self.states.get_mut(&edge.from) {
                    state.velocity += pull;
                }
            }
        }
    }

    fn integrate(&mut self) {
        let damping = 1.0 - self.config.friction_const;
        for id in &self.order {
            if self.locked.contains(id) {
                continue;
            }
            if let Some(state) = self.states.get_mut(id) {
                state.velocity *= damping;
                state.position += state.velocity;
                trace!(node = %id, position = %state.position, velocity = %state.velocity, "moved");
            }
        }
    }

    fn draw<R: RenderAdapter>(&self, graph: &GraphModel, surface: &mut RenderSurface<R>) {
        for id in &self.order {
            if let Some(state) = self.states.get(id) {
                surface.draw_node(*id, state.position);
            }
        }
        for edge in graph.edges() {
            if let (Some(from), Some(to)) = (self.states.get(&edge.from), self.states.get(&edge.to)) {
                surface.draw_edge(edge, from.position, to.position);
            }
        }
    }
}

impl Default for ForceLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SpatialRenderer;

    fn fixture(count: usize) -> (GraphModel, ForceLayoutEngine, Vec<NodeId>) {
        let mut graph = GraphModel::new();
        let mut engine = ForceLayoutEngine::new();
        let nodes = (0..count)
            .map(|_| {
                let id = graph.create_node().unwrap();
                engine.add_node(id).unwrap();
                id
            })
            .collect();
        (graph, engine, nodes)
    }

    fn surface() -> RenderSurface<SpatialRenderer> {
        RenderSurface::new(SpatialRenderer::default())
    }

    #[test]
    fn test_add_node_assigns_distinct_positions() {
        let (_, engine, nodes) = fixture(5);
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                let pa = engine.position_of(*a).unwrap();
                let pb = engine.position_of(*b).unwrap();
                assert!(pa.distance(pb) > 1.0);
            }
            assert_eq!(engine.velocity_of(*a).unwrap(), Vec2::ZERO);
        }
    }

    #[test]
    fn test_add_node_twice_fails() {
        let (_, mut engine, nodes) = fixture(1);
        assert!(matches!(engine.add_node(nodes[0]), Err(GraphError::DuplicateNode(_))));
    }

    #[test]
    fn test_unknown_node_fails_fast() {
        let mut engine = ForceLayoutEngine::new();
        let ghost = NodeId(99);

        assert!(matches!(engine.position_of(ghost), Err(GraphError::UnknownNode(n)) if n == ghost));
        assert!(engine.velocity_of(ghost).is_err());
        assert!(engine.set_coords(ghost, 1.0, 1.0).is_err());
        assert!(engine.set_locked(ghost, true).is_err());
        assert!(engine.is_locked(ghost).is_err());
    }

    #[test]
    fn test_set_coords_zeroes_velocity() {
        let (graph, mut engine, nodes) = fixture(2);
        let mut surface = surface();
        engine.step(&graph, &mut surface);
        assert_ne!(engine.velocity_of(nodes[0]).unwrap(), Vec2::ZERO);

        engine.set_coords(nodes[0], 7.0, 8.0).unwrap();
        assert_eq!(engine.position_of(nodes[0]).unwrap(), Vec2::new(7.0, 8.0));
        assert_eq!(engine.velocity_of(nodes[0]).unwrap(), Vec2::ZERO);
    }

    #[test]
    fn test_short_range_repulsion_separates() {
        let (graph, mut engine, nodes) = fixture(2);
        let mut surface = surface();
        engine.set_coords(nodes[0], 100.0, 100.0).unwrap();
        engine.set_coords(nodes[1], 104.0, 103.0).unwrap();

        let before = engine
            .position_of(nodes[0])
            .unwrap()
            .distance(engine.position_of(nodes[1]).unwrap());
        assert!(before < 10.0);

        engine.step(&graph, &mut surface);

        let after = engine
            .position_of(nodes[0])
            .unwrap()
            .distance(engine.position_of(nodes[1]).unwrap());
        assert!(after > before, "separation went from {before} to {after}");
    }

    #[test]
    fn test_repulsion_uses_distance_floor() {
        let (graph, mut engine, nodes) = fixture(2);
        let mut surface = surface();
        engine.set_coords(nodes[0], 0.0, 0.0).unwrap();
        engine.set_coords(nodes[1], 1.0, 0.0).unwrap();

        engine.step(&graph, &mut surface);

        // 500 / 10² = 5, then 3% friction.
        let velocity = engine.velocity_of(nodes[1]).unwrap();
        assert!((velocity.x - 5.0 * 0.97).abs() < 1e-9);
        assert_eq!(velocity.y, 0.0);
        assert!(velocity.is_finite());
    }

    #[test]
    fn test_coincident_nodes_stay_finite() {
        let (graph, mut engine, nodes) = fixture(2);
        let mut surface = surface();
        engine.set_coords(nodes[0], 10.0, 10.0).unwrap();
        engine.set_coords(nodes[1], 10.0, 10.0).unwrap();

        engine.step(&graph, &mut surface);

        assert!(engine.position_of(nodes[0]).unwrap().is_finite());
        assert!(engine.velocity_of(nodes[1]).unwrap().is_finite());
    }

    #[test]
    fn test_no_attraction_at_rest_length() {
        let (mut graph, mut engine, nodes) = fixture(2);
        let (mut with_edge, mut without_edge) = (surface(), surface());
        engine.set_coords(nodes[0], 0.0, 0.0).unwrap();
        engine.set_coords(nodes[1], 50.0, 0.0).unwrap();

        let mut unconnected = engine.clone();
        let plain = graph.clone();
        graph.add_edge(nodes[0], nodes[1]).unwrap();

        engine.step(&graph, &mut with_edge);
        unconnected.step(&plain, &mut without_edge);

        for &n in &nodes {
            assert_eq!(engine.velocity_of(n).unwrap(), unconnected.velocity_of(n).unwrap());
        }
    }

    #[test]
    fn test_attraction_pulls_long_edges_together() {
        let (mut graph, mut engine, nodes) = fixture(2);
        let mut surface = surface();
        engine.set_config(ForceConfig {
            repulse_const: 0.0,
            ..ForceConfig::default()
        })
        .unwrap();
        engine.set_coords(nodes[0], 0.0, 0.0).unwrap();
        engine.set_coords(nodes[1], 250.0, 0.0).unwrap();
        graph.add_edge(nodes[0], nodes[1]).unwrap();

        engine.step(&graph, &mut surface);

        // 0.002 * (250 - 50) = 0.4 toward each other, then friction.
        let from = engine.velocity_of(nodes[0]).unwrap();
        let to = engine.velocity_of(nodes[1]).unwrap();
        assert!((from.x - 0.4 * 0.97).abs() < 1e-9);
        assert!((to.x + 0.4 * 0.97).abs() < 1e-9);
    }

    #[test]
    fn test_locked_node_never_moves() {
        let (mut graph, mut engine, nodes) = fixture(4);
        let mut surface = surface();
        graph.add_edge(nodes[0], nodes[1]).unwrap();
        graph.add_edge(nodes[0], nodes[2]).unwrap();
        graph.add_edge(nodes[3], nodes[0]).unwrap();
        engine.set_coords(nodes[1], 400.0, 20.0).unwrap();
        engine.set_locked(nodes[0], true).unwrap();

        let position = engine.position_of(nodes[0]).unwrap();
        let velocity = engine.velocity_of(nodes[0]).unwrap();
        for _ in 0..50 {
            engine.step(&graph, &mut surface);
            assert_eq!(engine.position_of(nodes[0]).unwrap(), position);
            assert_eq!(engine.velocity_of(nodes[0]).unwrap(), velocity);
        }
        assert_ne!(engine.position_of(nodes[1]).unwrap(), Vec2::new(400.0, 20.0));
    }

    #[test]
    fn test_locked_node_still_repels() {
        let (graph, mut engine, nodes) = fixture(2);
        let mut surface = surface();
        engine.set_coords(nodes[0], 0.0, 0.0).unwrap();
        engine.set_coords(nodes[1], 20.0, 0.0).unwrap();
        engine.set_locked(nodes[0], true).unwrap();

        engine.step(&graph, &mut surface);

        assert!(engine.position_of(nodes[1]).unwrap().x > 20.0);
        assert_eq!(engine.position_of(nodes[0]).unwrap(), Vec2::ZERO);
    }

    #[test]
    fn test_unlock_resumes_motion() {
        let (graph, mut engine, nodes) = fixture(2);
        let mut surface = surface();
        engine.set_locked(nodes[0], true).unwrap();
        assert!(engine.is_locked(nodes[0]).unwrap());
        assert!(engine.locked().contains(&nodes[0]));

        engine.set_locked(nodes[0], false).unwrap();
        let before = engine.position_of(nodes[0]).unwrap();
        engine.step(&graph, &mut surface);
        assert_ne!(engine.position_of(nodes[0]).unwrap(), before);
    }

    #[test]
    fn test_step_draws_everything_once() {
        let (mut graph, mut engine, nodes) = fixture(3);
        let mut surface = surface();
        graph.add_edge(nodes[0], nodes[1]).unwrap();
        graph.add_edge(nodes[1], nodes[2]).unwrap();
        engine.set_locked(nodes[2], true).unwrap();

        engine.step(&graph, &mut surface);
        assert_eq!(surface.adapter().node_draws(), 3);
        assert_eq!(surface.adapter().edge_draws(), 2);

        engine.step(&graph, &mut surface);
        assert_eq!(surface.adapter().node_draws(), 6);
        assert_eq!(surface.adapter().edge_draws(), 4);
        assert_eq!(engine.tick_count(), 2);
    }

    #[test]
    fn test_node_at_delegates_to_renderer() {
        let (graph, mut engine, nodes) = fixture(1);
        let mut surface = surface();
        engine.set_locked(nodes[0], true).unwrap();
        engine.set_coords(nodes[0], 30.0, 40.0).unwrap();
        engine.step(&graph, &mut surface);

        assert_eq!(engine.node_at(&surface, 31.0, 41.0), Some(nodes[0]));
        assert_eq!(engine.node_at(&surface, 80.0, 80.0), None);
    }

    #[test]
    fn test_remove_node_drops_lock() {
        let (_, mut engine, nodes) = fixture(2);
        engine.set_locked(nodes[0], true).unwrap();
        engine.remove_node(nodes[0]).unwrap();

        assert!(!engine.contains(nodes[0]));
        assert!(engine.locked().is_empty());
        assert_eq!(engine.nodes(), &[nodes[1]]);
        assert!(engine.remove_node(nodes[0]).is_err());
    }

    #[test]
    fn test_set_rest_length_validates() {
        let mut engine = ForceLayoutEngine::new();
        engine.set_rest_length(120.0).unwrap();
        assert_eq!(engine.rest_length(), 120.0);
        assert!(engine.set_rest_length(-1.0).is_err());
        assert_eq!(engine.rest_length(), 120.0);
    }

    #[test]
    fn test_clear_restarts_placement() {
        let (_, mut engine, nodes) = fixture(1);
        let first = engine.position_of(nodes[0]).unwrap();
        engine.clear();
        assert!(engine.nodes().is_empty());

        let again = engine.add_node(NodeId(50)).unwrap();
        assert_eq!(again, first);
    }
}
