//! GraphCanvas - the editable graph as a whole.
//!
//! Composes the graph model, the layout engine, the render surface and the
//! animation driver, and keeps them consistent: a node added here gets
//! layout state, a node removed here loses its layout state, lock, incident
//! edges and everything the renderer drew for them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::{AnimationDriver, FrameScheduler};
use crate::error::{GraphError, Result};
use crate::graph::{Edge, EdgeId, GraphModel, NodeId};
use crate::layout::{ForceConfig, ForceLayoutEngine, Vec2, Viewport};
use crate::render::{RenderAdapter, RenderSurface};

/// Construction-time options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasOptions {
    pub force: ForceConfig,
    /// Whether the layout animates once mounted (default: true).
    pub animation_enabled: bool,
    /// Hit radius handed to the built-in spatial renderer (default: 6.0).
    pub hit_radius: f64,
    pub viewport: Option<Viewport>,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            force: ForceConfig::default(),
            animation_enabled: true,
            hit_radius: 6.0,
            viewport: None,
        }
    }
}

impl CanvasOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.force.validate()?;
        if !(options.hit_radius.is_finite() && options.hit_radius > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "hit_radius must be positive, got {}",
                options.hit_radius
            )));
        }
        Ok(options)
    }
}

/// An editable, animated graph.
pub struct GraphCanvas<R: RenderAdapter, S: FrameScheduler> {
    graph: GraphModel,
    layout: ForceLayoutEngine,
    surface: RenderSurface<R>,
    animation: AnimationDriver<S>,
    /// Drags pinning each node; a node is unlocked when its count drops to zero.
    holds: HashMap<NodeId, u32>,
    /// Gestures currently holding the animation paused.
    suspensions: u32,
    /// Enabled state to restore once the last suspension ends.
    resume_enabled: bool,
}

impl<R: RenderAdapter, S: FrameScheduler> GraphCanvas<R, S> {
    /// Create an empty canvas with default options.
    pub fn new(renderer: R, scheduler: S) -> Self {
        let options = CanvasOptions::default();
        Self::build(renderer, scheduler, &options)
    }

    /// Create an empty canvas, validating the options first.
    pub fn with_options(renderer: R, scheduler: S, options: &CanvasOptions) -> Result<Self> {
        options.force.validate()?;
        Ok(Self::build(renderer, scheduler, options))
    }

    fn build(renderer: R, scheduler: S, options: &CanvasOptions) -> Self {
        let mut layout = ForceLayoutEngine::with_config(options.force.clone());
        layout.set_viewport(options.viewport);
        Self {
            graph: GraphModel::new(),
            layout,
            surface: RenderSurface::new(renderer),
            animation: AnimationDriver::new(scheduler, options.animation_enabled),
            holds: HashMap::new(),
            suspensions: 0,
            resume_enabled: options.animation_enabled,
        }
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn layout(&self) -> &ForceLayoutEngine {
        &self.layout
    }

    pub fn surface(&self) -> &RenderSurface<R> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut RenderSurface<R> {
        &mut self.surface
    }

    pub fn renderer(&self) -> &R {
        self.surface.adapter()
    }

    pub fn animation(&self) -> &AnimationDriver<S> {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut AnimationDriver<S> {
        &mut self.animation
    }

    // =========================================================================
    // Graph Mutation
    // =========================================================================

    /// Reserve an id for a node that may be added later.
    pub fn new_node_id(&mut self) -> Result<NodeId> {
        self.graph.new_node()
    }

    /// Create a node and place it.
    pub fn add_node(&mut self) -> Result<NodeId> {
        let id = self.graph.new_node()?;
        self.insert_node(id)?;
        Ok(id)
    }

    /// Add a previously reserved node, returning its initial position.
    pub fn insert_node(&mut self, id: NodeId) -> Result<Vec2> {
        if self.layout.contains(id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.graph.add_node(id)?;
        self.layout.add_node(id)
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<Edge> {
        self.graph.add_edge(from, to)
    }

    /// Remove a node together with its edges, layout state and drawings.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let edges = self.graph.remove_node(id)?;
        self.layout.remove_node(id)?;
        self.holds.remove(&id);
        for edge in &edges {
            self.surface.forget_edge(edge.id);
        }
        self.surface.forget_node(id);
        debug!(node = %id, edges = edges.len(), "node removed from canvas");
        Ok(())
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let edge = self.graph.remove_edge(id)?;
        self.surface.forget_edge(id);
        Ok(edge)
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.layout.clear();
        self.surface.clear();
        self.holds.clear();
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn node_at(&self, x: f64, y: f64) -> Option<NodeId> {
        self.layout.node_at(&self.surface, x, y)
    }

    pub fn position_of(&self, id: NodeId) -> Result<Vec2> {
        self.layout.position_of(id)
    }

    pub fn velocity_of(&self, id: NodeId) -> Result<Vec2> {
        self.layout.velocity_of(id)
    }

    /// Move a node and redraw it there, so hit testing finds it at once.
    pub fn set_coords(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
        self.layout.set_coords(id, x, y)?;
        self.surface.draw_node(id, Vec2::new(x, y));
        Ok(())
    }

    pub fn set_locked(&mut self, id: NodeId, locked: bool) -> Result<()> {
        self.layout.set_locked(id, locked)
    }

    /// Lock a node on behalf of one drag. Holds stack, so several pointers
    /// can grab the same node.
    pub fn hold_node(&mut self, id: NodeId) -> Result<()> {
        self.layout.set_locked(id, true)?;
        *self.holds.entry(id).or_insert(0) += 1;
        Ok(())
    }

    /// End one hold; the last one unlocks the node.
    pub fn release_node(&mut self, id: NodeId) -> Result<()> {
        match self.holds.get_mut(&id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                Ok(())
            }
            Some(_) => {
                self.holds.remove(&id);
                self.layout.set_locked(id, false)
            }
            None => Err(GraphError::NotHeld(id)),
        }
    }

    /// Number of drags currently holding the node.
    pub fn holds_on(&self, id: NodeId) -> u32 {
        self.holds.get(&id).copied().unwrap_or(0)
    }

    pub fn set_rest_length(&mut self, rest_length: f64) -> Result<()> {
        self.layout.set_rest_length(rest_length)
    }

    pub fn set_force_config(&mut self, config: ForceConfig) -> Result<()> {
        self.layout.set_config(config)
    }

    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.layout.set_viewport(viewport);
    }

    /// Run one simulation step by hand.
    pub fn step(&mut self) {
        self.layout.step(&self.graph, &mut self.surface);
    }

    // =========================================================================
    // Animation
    // =========================================================================

    pub fn is_animation_enabled(&self) -> bool {
        self.animation.is_enabled()
    }

    /// Turn animation on or off. While a gesture holds it suspended the new
    /// value takes effect when the suspension ends.
    pub fn set_animation_enabled(&mut self, enabled: bool) {
        if self.suspensions > 0 {
            self.resume_enabled = enabled;
        } else {
            self.animation.set_enabled(enabled);
        }
    }

    /// Pause animation for the duration of a gesture. Nested calls stack.
    pub fn suspend_animation(&mut self) {
        if self.suspensions == 0 {
            self.resume_enabled = self.animation.is_enabled();
            self.animation.disable();
            debug!(resume = self.resume_enabled, "animation suspended");
        }
        self.suspensions += 1;
    }

    /// End one suspension; the last one restores the remembered state.
    pub fn resume_animation(&mut self) {
        match self.suspensions {
            0 => {}
            1 => {
                self.suspensions = 0;
                self.animation.set_enabled(self.resume_enabled);
                debug!(enabled = self.resume_enabled, "animation resumed");
            }
            _ => self.suspensions -= 1,
        }
    }

    pub fn is_animation_suspended(&self) -> bool {
        self.suspensions > 0
    }

    pub fn mount(&mut self) {
        self.animation.mount();
    }

    pub fn unmount(&mut self) {
        self.animation.unmount();
    }

    /// Host callback for a delivered display frame. Returns whether a step
    /// ran.
    pub fn on_animation_frame(&mut self, frame: S::Handle) -> bool {
        let Self {
            graph,
            layout,
            surface,
            animation,
            ..
        } = self;
        animation.deliver_frame(frame, || layout.step(graph, surface))
    }

    // =========================================================================
    // Sample Data
    // =========================================================================

    /// Populate the canvas with a small demo graph: a triangle with a
    /// four-leaf hub hanging off it.
    pub fn load_sample(&mut self) -> Result<Vec<NodeId>> {
        const EDGES: [(usize, usize); 11] = [
            (0, 1),
            (0, 2),
            (1, 2),
            (2, 3),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
            (3, 8),
            (3, 9),
            (3, 10),
        ];

        let nodes = (0..11)
            .map(|_| self.add_node())
            .collect::<Result<Vec<_>>>()?;
        for (from, to) in EDGES {
            self.add_edge(nodes[from], nodes[to])?;
        }
        Ok(nodes)
    }
}
