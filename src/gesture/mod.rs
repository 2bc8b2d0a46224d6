//! Pointer gestures that edit the graph.
//!
//! A [`GestureController`] turns raw down/move/up/cancel sequences into
//! drags, one per pointer key, and hands each drag to a [`Behavior`]. The
//! behaviors here move nodes, connect existing nodes, and create a node
//! connected to an existing one. [`Tool`] selects among them at runtime.

mod behavior;
mod connect;
mod controller;
mod create;
mod move_node;
mod pointer;
mod tool;

pub use behavior::Behavior;
pub use connect::{ConnectExisting, ConnectGesture};
pub use controller::{Drag, GestureController};
pub use create::{CreateAndConnect, CreateGesture};
pub use move_node::MoveNode;
pub use pointer::{MouseKey, PointerEvent, PointerKey, PointerKind, TouchId};
pub use tool::{Tool, ToolGesture};

use crate::animation::FrameScheduler;
use crate::canvas::GraphCanvas;
use crate::graph::NodeId;
use crate::layout::Vec2;
use crate::render::{Preview, RenderAdapter};

/// Point the preview tip at `at`, or at the center of the node under it.
fn snap_preview<R: RenderAdapter, S: FrameScheduler>(
    canvas: &GraphCanvas<R, S>,
    preview: &mut Preview,
    at: Vec2,
) {
    let target: Option<(NodeId, Vec2)> = canvas
        .node_at(at.x, at.y)
        .and_then(|node| canvas.position_of(node).ok().map(|p| (node, p)));
    match target {
        Some((node, center)) => {
            preview.tip = center;
            preview.snapped = Some(node);
        }
        None => {
            preview.tip = at;
            preview.snapped = None;
        }
    }
}
