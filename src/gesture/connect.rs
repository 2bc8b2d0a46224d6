use tracing::debug;

use crate::animation::FrameScheduler;
use crate::canvas::GraphCanvas;
use crate::graph::NodeId;
use crate::layout::Vec2;
use crate::render::{Preview, PreviewId, RenderAdapter};

use super::{Behavior, snap_preview};

/// Drag from one node to another to join them with an edge.
///
/// Animation is paused while the drag runs so the target stays put.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectExisting;

/// State of one connect drag.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectGesture {
    pub from: NodeId,
    pub preview: Preview,
    preview_id: PreviewId,
}

impl ConnectGesture {
    fn finish<R: RenderAdapter, S: FrameScheduler>(self, canvas: &mut GraphCanvas<R, S>) {
        canvas.surface_mut().close_preview(self.preview_id);
        canvas.resume_animation();
    }
}

impl Behavior for ConnectExisting {
    type Gesture = ConnectGesture;

    fn on_start_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        start: Vec2,
    ) -> Option<ConnectGesture> {
        let from = canvas.node_at(start.x, start.y)?;
        let anchor = canvas.position_of(from).ok()?;
        canvas.suspend_animation();

        let preview = Preview::new(anchor, false);
        let preview_id = canvas.surface_mut().open_preview(&preview);
        debug!(node = %from, "connect started");
        Some(ConnectGesture {
            from,
            preview,
            preview_id,
        })
    }

    fn on_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: &mut ConnectGesture,
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
        gesture: ConnectGesture,
        _start: Vec2,
        at: Vec2,
    ) {
        let from = gesture.from;
        gesture.finish(canvas);

        match canvas.node_at(at.x, at.y) {
            Some(to) if to != from => match canvas.add_edge(from, to) {
                Ok(edge) => debug!(edge = %edge.id, "connect committed"),
                Err(err) => debug!(%err, "connect dropped"),
            },
            _ => debug!(node = %from, "connect discarded"),
        }
    }

    fn on_cancel<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: ConnectGesture,
    ) {
        gesture.finish(canvas);
    }
}
