//! Headless render adapter backed by an R-tree.
//!
//! Nodes are drawn as circles of a fixed radius, edges and previews as line
//! segments. Nothing is rasterized; the adapter keeps node centers in a
//! [`SpatialIndex`] so hit testing stays O(log n), and counts draw calls so
//! hosts can observe redraw activity. Hosts that render elsewhere (a canvas,
//! the DOM) wrap it for hit testing.

use crate::graph::{Edge, NodeId};
use crate::layout::Vec2;
use crate::spatial::SpatialIndex;

use super::{Preview, RenderAdapter};

/// One drawn primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sprite {
    /// A node body. Registered in the hit-test index.
    Node { id: NodeId, center: Vec2, radius: f64 },
    /// A pending node shown during a create drag. Not hit-testable.
    Marker { center: Vec2, radius: f64 },
    /// An edge or preview segment.
    Line { from: Vec2, to: Vec2 },
}

/// Sprites owned by one node, edge or preview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteSet {
    pub sprites: Vec<Sprite>,
}

/// Circle/line adapter with R-tree hit testing.
pub struct SpatialRenderer {
    index: SpatialIndex,
    radius: f64,
    node_draws: u64,
    edge_draws: u64,
    preview_draws: u64,
    last_preview: Option<Preview>,
}

impl SpatialRenderer {
    /// Radius used when none is given; matches a 12px node dot.
    pub const DEFAULT_RADIUS: f64 = 6.0;

    pub fn new(radius: f64) -> Self {
        Self {
            index: SpatialIndex::new(),
            radius,
            node_draws: 0,
            edge_draws: 0,
            preview_draws: 0,
            last_preview: None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Total `draw_node` calls so far.
    pub fn node_draws(&self) -> u64 {
        self.node_draws
    }

    /// Total `draw_edge` calls so far.
    pub fn edge_draws(&self) -> u64 {
        self.edge_draws
    }

    /// Total `draw_preview` calls so far.
    pub fn preview_draws(&self) -> u64 {
        self.preview_draws
    }

    /// The most recently drawn preview.
    pub fn last_preview(&self) -> Option<&Preview> {
        self.last_preview.as_ref()
    }

    /// Number of node bodies currently hit-testable.
    pub fn indexed_nodes(&self) -> usize {
        self.index.len()
    }
}

impl Default for SpatialRenderer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

impl RenderAdapter for SpatialRenderer {
    type Handles = SpriteSet;

    fn draw_node(&mut self, node: NodeId, position: Vec2, handles: &mut SpriteSet) {
        self.node_draws += 1;
        match handles.sprites.first_mut() {
            Some(Sprite::Node { center, .. }) => {
                if *center != position {
                    self.index.relocate(node, (*center).into(), position.into());
                    *center = position;
                }
            }
            _ => {
                self.index.insert(node, position.x, position.y);
                handles.sprites.insert(
                    0,
                    Sprite::Node {
                        id: node,
                        center: position,
                        radius: self.radius,
                    },
                );
            }
        }
    }

    fn draw_edge(&mut self, _edge: &Edge, from: Vec2, to: Vec2, handles: &mut SpriteSet) {
        self.edge_draws += 1;
        handles.sprites.clear();
        handles.sprites.push(Sprite::Line { from, to });
    }

    fn draw_preview(&mut self, preview: &Preview, handles: &mut SpriteSet) {
        self.preview_draws += 1;
        self.last_preview = Some(*preview);
        handles.sprites.clear();
        if preview.pending_node {
            handles.sprites.push(Sprite::Marker {
                center: preview.anchor,
                radius: self.radius / 2.0,
            });
        }
        handles.sprites.push(Sprite::Line {
            from: preview.anchor,
            to: preview.tip,
        });
    }

    fn release(&mut self, handles: SpriteSet) {
        for sprite in handles.sprites {
            if let Sprite::Node { id, center, .. } = sprite {
                self.index.remove(id, center.x, center.y);
            }
        }
    }

    fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.index.nearest_within(x, y, self.radius)
    }
}
