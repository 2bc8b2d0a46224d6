use tracing::debug;

use crate::animation::FrameScheduler;
use crate::canvas::GraphCanvas;
use crate::error::Result;
use crate::graph::NodeId;
use crate::layout::Vec2;
use crate::render::{Preview, PreviewId, RenderAdapter};

use super::{Behavior, snap_preview};

/// Drag from empty space onto a node to create a new node there, connected
/// to the node it was dropped on.
///
/// The new node only enters the graph if the drop lands on a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateAndConnect;

/// State of one create drag.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGesture {
    /// Reserved id of the node that will be created.
    pub node: NodeId,
    pub preview: Preview,
    preview_id: PreviewId,
}

impl CreateGesture {
    fn finish<R: RenderAdapter, S: FrameScheduler>(&self, canvas: &mut GraphCanvas<R, S>) {
        canvas.surface_mut().close_preview(self.preview_id);
        canvas.resume_animation();
    }
}

fn commit<R: RenderAdapter, S: FrameScheduler>(
    canvas: &mut GraphCanvas<R, S>,
    node: NodeId,
    target: NodeId,
    start: Vec2,
) -> Result<()> {
    canvas.insert_node(node)?;
    canvas.add_edge(node, target)?;
    canvas.set_coords(node, start.x, start.y)
}

impl Behavior for CreateAndConnect {
    type Gesture = CreateGesture;

    fn on_start_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        start: Vec2,
    ) -> Option<CreateGesture> {
        if canvas.node_at(start.x, start.y).is_some() {
            return None;
        }
        let node = canvas
            .new_node_id()
            .inspect_err(|err| debug!(%err, "create refused"))
            .ok()?;
        canvas.suspend_animation();

        let preview = Preview::new(start, true);
        let preview_id = canvas.surface_mut().open_preview(&preview);
        debug!(%node, %start, "create started");
        Some(CreateGesture {
            node,
            preview,
            preview_id,
        })
    }

    fn on_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: &mut CreateGesture,
        at: Vec2,
    ) {
        snap_preview(canvas, &mut gesture.preview, at);
        canvas
            .surface_mut()
            .update_preview(gesture.preview_id, &gesture.preview);
    }

    fn on_drop<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: CreateGesture,
        start: Vec2,
        at: Vec2,
    ) {
        match canvas.node_at(at.x, at.y) {
            Some(target) => match commit(canvas, gesture.node, target, start) {
                Ok(()) => debug!(node = %gesture.node, %target, "create committed"),
                Err(err) => debug!(%err, "create dropped"),
            },
            None => debug!(node = %gesture.node, "create discarded"),
        }
        gesture.finish(canvas);
    }

    fn on_cancel<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: CreateGesture,
    ) {
        gesture.finish(canvas);
    }
}
