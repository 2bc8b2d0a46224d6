use tracing::debug;

use crate::animation::FrameScheduler;
use crate::canvas::GraphCanvas;
use crate::graph::NodeId;
use crate::layout::Vec2;
use crate::render::RenderAdapter;

use super::Behavior;

/// Drag a node around. The node is locked while held so the simulation
/// cannot pull it out from under the pointer. Each pointer takes its own
/// hold, so the node stays locked until every pointer on it lets go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveNode;

impl Behavior for MoveNode {
    type Gesture = NodeId;

    fn on_start_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        start: Vec2,
    ) -> Option<NodeId> {
        let node = canvas.node_at(start.x, start.y)?;
        canvas.hold_node(node).ok()?;
        debug!(%node, "move started");
        Some(node)
    }

    fn on_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        node: &mut NodeId,
        at: Vec2,
    ) {
        // The node may have been removed mid-drag; nothing left to move.
        let _ = canvas.set_coords(*node, at.x, at.y);
    }

    fn on_drop<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        node: NodeId,
        _start: Vec2,
        _at: Vec2,
    ) {
        // Removing the node mid-drag already dropped its holds.
        let _ = canvas.release_node(node);
    }

    fn on_cancel<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        node: NodeId,
    ) {
        // Removing the node mid-drag already dropped its holds.
        let _ = canvas.release_node(node);
    }
}
