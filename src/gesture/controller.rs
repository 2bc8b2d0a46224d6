//! Per-pointer drag state machine.
//!
//! Each pointer key is either absent (idle) or mapped to a [`Drag`] record
//! holding the start point, the last seen point and the behavior's gesture.
//! Keys never interact, so any number of touches can drag at once.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::animation::FrameScheduler;
use crate::canvas::GraphCanvas;
use crate::error::{GraphError, Result};
use crate::layout::Vec2;
use crate::render::RenderAdapter;

use super::{Behavior, PointerEvent, PointerKey, PointerKind};

/// One in-flight drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag<G> {
    pub start: Vec2,
    pub last: Vec2,
    pub gesture: G,
}

/// Routes pointer events for keys of type `K` to a [`Behavior`].
pub struct GestureController<K: PointerKey, B: Behavior> {
    behavior: B,
    drags: HashMap<K, Drag<B::Gesture>>,
    attached: bool,
}

impl<K: PointerKey, B: Behavior> GestureController<K, B> {
    /// Create an attached controller.
    pub fn new(behavior: B) -> Self {
        Self {
            behavior,
            drags: HashMap::new(),
            attached: true,
        }
    }

    /// Create a controller that ignores events until [`attach`](Self::attach).
    pub fn detached(behavior: B) -> Self {
        Self {
            attached: false,
            ..Self::new(behavior)
        }
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_dragging(&self, key: K) -> bool {
        self.drags.contains_key(&key)
    }

    pub fn drag(&self, key: K) -> Option<&Drag<B::Gesture>> {
        self.drags.get(&key)
    }

    pub fn active_keys(&self) -> Vec<K> {
        self.drags.keys().copied().collect()
    }

    /// Start listening for events.
    pub fn attach(&mut self) -> Result<()> {
        if self.attached {
            return Err(GraphError::AlreadyAttached);
        }
        self.attached = true;
        debug!("gesture controller attached");
        Ok(())
    }

    /// Stop listening, cancelling every drag in progress.
    pub fn release<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
    ) -> Result<()> {
        if !self.attached {
            return Err(GraphError::AlreadyReleased);
        }
        for (key, drag) in self.drags.drain() {
            debug!(?key, "drag cancelled by release");
            self.behavior.on_cancel(canvas, drag.gesture);
        }
        self.attached = false;
        debug!("gesture controller released");
        Ok(())
    }

    /// Feed one pointer event. Returns whether the event was consumed by a
    /// drag.
    pub fn handle<R: RenderAdapter, S: FrameScheduler>(
        &mut self,
        canvas: &mut GraphCanvas<R, S>,
        event: PointerEvent<K>,
    ) -> bool {
        if !self.attached {
            return false;
        }
        let at = event.position();
        let key = event.key;

        match event.kind {
            PointerKind::Down => {
                if self.drags.contains_key(&key) {
                    warn!(?key, "pointer down on a key that is already dragging");
                    return false;
                }
                match self.behavior.on_start_drag(canvas, at) {
                    Some(gesture) => {
                        debug!(?key, %at, "drag started");
                        self.drags.insert(
                            key,
                            Drag {
                                start: at,
                                last: at,
                                gesture,
                            },
                        );
                        true
                    }
                    None => false,
                }
            }
            PointerKind::Move => match self.drags.get_mut(&key) {
                Some(drag) => {
                    drag.last = at;
                    self.behavior.on_drag(canvas, &mut drag.gesture, at);
                    true
                }
                None => false,
            },
            PointerKind::Up => match self.drags.remove(&key) {
                Some(drag) => {
                    debug!(?key, %at, "drag dropped");
                    self.behavior.on_drop(canvas, drag.gesture, drag.start, at);
                    true
                }
                None => false,
            },
            PointerKind::Cancel => match self.drags.remove(&key) {
                Some(drag) => {
                    debug!(?key, "drag cancelled");
                    self.behavior.on_cancel(canvas, drag.gesture);
                    true
                }
                None => false,
            },
        }
    }
}
