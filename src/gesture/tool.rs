use serde::{Deserialize, Serialize};

use crate::animation::FrameScheduler;
use crate::canvas::GraphCanvas;
use crate::error::GraphError;
use crate::graph::NodeId;
use crate::layout::Vec2;
use crate::render::RenderAdapter;

use super::{Behavior, ConnectExisting, ConnectGesture, CreateAndConnect, CreateGesture, MoveNode};

/// The editing tool a pointer drag applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    MoveNode,
    ConnectExisting,
    CreateAndConnect,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::MoveNode, Tool::ConnectExisting, Tool::CreateAndConnect];

    pub fn name(self) -> &'static str {
        match self {
            Tool::MoveNode => "move_node",
            Tool::ConnectExisting => "connect_existing",
            Tool::CreateAndConnect => "create_and_connect",
        }
    }
}

impl std::str::FromStr for Tool {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| GraphError::InvalidConfig(format!("unknown tool: {s}")))
    }
}

/// A drag started by some [`Tool`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolGesture {
    Move(NodeId),
    Connect(ConnectGesture),
    Create(CreateGesture),
}

impl Behavior for Tool {
    type Gesture = ToolGesture;

    fn on_start_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        start: Vec2,
    ) -> Option<ToolGesture> {
        match self {
            Tool::MoveNode => MoveNode.on_start_drag(canvas, start).map(ToolGesture::Move),
            Tool::ConnectExisting => ConnectExisting
                .on_start_drag(canvas, start)
                .map(ToolGesture::Connect),
            Tool::CreateAndConnect => CreateAndConnect
                .on_start_drag(canvas, start)
                .map(ToolGesture::Create),
        }
    }

    // The rest dispatch on the gesture, which remembers the tool that began it.

    fn on_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: &mut ToolGesture,
        at: Vec2,
    ) {
        match gesture {
            ToolGesture::Move(node) => MoveNode.on_drag(canvas, node, at),
            ToolGesture::Connect(g) => ConnectExisting.on_drag(canvas, g, at),
            ToolGesture::Create(g) => CreateAndConnect.on_drag(canvas, g, at),
        }
    }

    fn on_drop<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: ToolGesture,
        start: Vec2,
        at: Vec2,
    ) {
        match gesture {
            ToolGesture::Move(node) => MoveNode.on_drop(canvas, node, start, at),
            ToolGesture::Connect(g) => ConnectExisting.on_drop(canvas, g, start, at),
            ToolGesture::Create(g) => CreateAndConnect.on_drop(canvas, g, start, at),
        }
    }

    fn on_cancel<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: ToolGesture,
    ) {
        match gesture {
            ToolGesture::Move(node) => MoveNode.on_cancel(canvas, node),
            ToolGesture::Connect(g) => ConnectExisting.on_cancel(canvas, g),
            ToolGesture::Create(g) => CreateAndConnect.on_cancel(canvas, g),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::test_support::canvas_with;
    use crate::gesture::{GestureController, MouseKey, PointerEvent};

    #[test]
    fn test_tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.name().parse::<Tool>().unwrap(), tool);
        }
        assert!("lasso".parse::<Tool>().is_err());
    }

    #[test]
    fn test_tool_selects_behavior() {
        let (mut canvas, ids) = canvas_with(&[(0.0, 0.0), (100.0, 0.0)]);

        let mut controller = GestureController::new(Tool::ConnectExisting);
        controller.handle(&mut canvas, PointerEvent::down(MouseKey, 0.0, 0.0));
        assert!(matches!(
            controller.drag(MouseKey).map(|d| &d.gesture),
            Some(ToolGesture::Connect(_))
        ));
        controller.handle(&mut canvas, PointerEvent::up(MouseKey, 100.0, 0.0));
        assert!(canvas.graph().are_connected(ids[0], ids[1]));

        let mut controller = GestureController::new(Tool::MoveNode);
        controller.handle(&mut canvas, PointerEvent::down(MouseKey, 100.0, 0.0));
        controller.handle(&mut canvas, PointerEvent::moved(MouseKey, 120.0, 20.0));
        assert_eq!(canvas.position_of(ids[1]).unwrap(), Vec2::new(120.0, 20.0));
    }

    #[test]
    fn test_switching_tools_cancels_drag() {
        let (mut canvas, ids) = canvas_with(&[(0.0, 0.0)]);
        let mut controller = GestureController::new(Tool::CreateAndConnect);
        controller.handle(&mut canvas, PointerEvent::down(MouseKey, 80.0, 80.0));
        assert!(!canvas.is_animation_enabled());

        controller.release(&mut canvas).unwrap();
        assert!(!controller.is_dragging(MouseKey));
        assert!(canvas.is_animation_enabled());
        assert_eq!(canvas.surface().open_previews(), 0);
        assert_eq!(canvas.graph().node_count(), 1);

        let mut controller = GestureController::new(Tool::MoveNode);
        assert!(controller.handle(&mut canvas, PointerEvent::down(MouseKey, 0.0, 0.0)));
        controller.handle(&mut canvas, PointerEvent::moved(MouseKey, 40.0, 10.0));
        assert_eq!(canvas.position_of(ids[0]).unwrap(), Vec2::new(40.0, 10.0));
        assert_eq!(canvas.surface().open_previews(), 0);
    }
}
