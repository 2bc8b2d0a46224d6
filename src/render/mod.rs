//! Rendering boundary.
//!
//! The core never draws pixels. It hands positions to a [`RenderAdapter`]
//! and asks the same adapter which node, if any, sits under a pointer.
//! Whatever the adapter creates for a node or edge (sprites, DOM elements,
//! GPU instances) lives in its opaque `Handles` set, which the
//! [`RenderSurface`] stores per node/edge and hands back on every redraw and
//! on removal.

mod spatial_renderer;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::graph::{Edge, EdgeId, NodeId};
use crate::layout::Vec2;

pub use spatial_renderer::{SpatialRenderer, Sprite, SpriteSet};

/// Drawing and hit-testing capability supplied by the host.
pub trait RenderAdapter {
    /// Whatever the adapter needs to remember about one drawn object.
    type Handles: Default;

    /// Draw (or move) a node centered at `position`.
    fn draw_node(&mut self, node: NodeId, position: Vec2, handles: &mut Self::Handles);

    /// Draw (or move) an edge between two endpoint positions.
    fn draw_edge(&mut self, edge: &Edge, from: Vec2, to: Vec2, handles: &mut Self::Handles);

    /// Draw the transient connection shown while a connect/create drag runs.
    fn draw_preview(&mut self, preview: &Preview, handles: &mut Self::Handles);

    /// Dispose of everything in a handle set.
    fn release(&mut self, handles: Self::Handles);

    /// The node occupying pixel (x, y), if any.
    fn hit_test(&self, x: f64, y: f64) -> Option<NodeId>;
}

/// Transient edge shown while the user drags out a connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    /// Where the connection starts.
    pub anchor: Vec2,
    /// Where it currently ends: the pointer, or the snapped node's center.
    pub tip: Vec2,
    /// Node the tip is snapped to.
    pub snapped: Option<NodeId>,
    /// Whether a not-yet-created node is shown at the anchor.
    pub pending_node: bool,
}

impl Preview {
    pub fn new(anchor: Vec2, pending_node: bool) -> Self {
        Self {
            anchor,
            tip: anchor,
            snapped: None,
            pending_node,
        }
    }
}

/// Identifies an open preview on a [`RenderSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(u32);

/// A render adapter plus the handle sets it has produced.
pub struct RenderSurface<R: RenderAdapter> {
    adapter: R,
    nodes: HashMap<NodeId, R::Handles>,
    edges: HashMap<EdgeId, R::Handles>,
    previews: HashMap<PreviewId, R::Handles>,
    next_preview: u32,
}

impl<R: RenderAdapter> RenderSurface<R> {
    pub fn new(adapter: R) -> Self {
        Self {
            adapter,
            nodes: HashMap::new(),
            edges: HashMap::new(),
            previews: HashMap::new(),
            next_preview: 0,
        }
    }

    pub fn adapter(&self) -> &R {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut R {
        &mut self.adapter
    }

    pub fn draw_node(&mut self, node: NodeId, position: Vec2) {
        let handles = self.nodes.entry(node).or_default();
        self.adapter.draw_node(node, position, handles);
    }

    pub fn draw_edge(&mut self, edge: &Edge, from: Vec2, to: Vec2) {
        let handles = self.edges.entry(edge.id).or_default();
        self.adapter.draw_edge(edge, from, to, handles);
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.adapter.hit_test(x, y)
    }

    /// Release whatever was drawn for a removed node.
    pub fn forget_node(&mut self, node: NodeId) {
        if let Some(handles) = self.nodes.remove(&node) {
            trace!(%node, "releasing node handles");
            self.adapter.release(handles);
        }
    }

    /// Release whatever was drawn for a removed edge.
    pub fn forget_edge(&mut self, edge: EdgeId) {
        if let Some(handles) = self.edges.remove(&edge) {
            trace!(%edge, "releasing edge handles");
            self.adapter.release(handles);
        }
    }

    /// Start showing a preview.
    pub fn open_preview(&mut self, preview: &Preview) -> PreviewId {
        let id = PreviewId(self.next_preview);
        self.next_preview = self.next_preview.wrapping_add(1);
        let handles = self.previews.entry(id).or_default();
        self.adapter.draw_preview(preview, handles);
        id
    }

    /// Redraw an open preview.
    pub fn update_preview(&mut self, id: PreviewId, preview: &Preview) {
        if let Some(handles) = self.previews.get_mut(&id) {
            self.adapter.draw_preview(preview, handles);
        }
    }

    /// Stop showing a preview.
    pub fn close_preview(&mut self, id: PreviewId) {
        if let Some(handles) = self.previews.remove(&id) {
            self.adapter.release(handles);
        }
    }

    /// Number of previews currently shown.
    pub fn open_previews(&self) -> usize {
        self.previews.len()
    }

    /// Release every node and edge handle set. Open previews are left alone;
    /// their gestures still own them.
    pub fn clear(&mut self) {
        for (_, handles) in self.nodes.drain() {
            self.adapter.release(handles);
        }
        for (_, handles) in self.edges.drain() {
            self.adapter.release(handles);
        }
    }
}
