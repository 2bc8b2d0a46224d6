use crate::animation::FrameScheduler;
use crate::canvas::GraphCanvas;
use crate::layout::Vec2;
use crate::render::RenderAdapter;

/// What a drag does to the canvas.
///
/// A behavior is consulted once per pointer-down; if it accepts, the
/// returned gesture travels with that pointer until it is dropped or
/// cancelled. Per-drag state lives in the gesture, not in the behavior, so
/// one behavior serves any number of concurrent pointers.
pub trait Behavior {
    type Gesture;

    /// Decide whether a drag starting at `start` is meaningful.
    fn on_start_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        start: Vec2,
    ) -> Option<Self::Gesture>;

    fn on_drag<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: &mut Self::Gesture,
        at: Vec2,
    );

    /// The pointer was released at `at`.
    fn on_drop<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: Self::Gesture,
        start: Vec2,
        at: Vec2,
    );

    /// The drag was abandoned. Undo whatever the start did.
    fn on_cancel<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        gesture: Self::Gesture,
    );
}
