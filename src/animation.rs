//! Frame-driven animation loop.
//!
//! The driver owns no timer of its own. It asks a [`FrameScheduler`] for
//! the next display frame, and when the host delivers that frame it runs
//! exactly one simulation step and asks again. The loop continues until
//! animation is disabled or the component is unmounted, and never has more
//! than one frame pending.
//!
//! ```text
//!            enable (mounted) / mount (enabled)
//!   Idle  ─────────────────────────────────────▶  Scheduled
//!     ▲                                               │
//!     └──────── disable / unmount (cancels) ──────────┘
//! ```

use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Host primitive that calls back once per display frame.
pub trait FrameScheduler {
    /// Identifies one requested frame.
    type Handle: Copy + PartialEq + std::fmt::Debug;

    fn request_frame(&mut self) -> Self::Handle;

    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Whether a frame is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Scheduled,
}

/// Self-rescheduling step loop.
#[derive(Debug)]
pub struct AnimationDriver<S: FrameScheduler> {
    scheduler: S,
    enabled: bool,
    mounted: bool,
    pending: Option<S::Handle>,
}

impl<S: FrameScheduler> AnimationDriver<S> {
    /// Create an unmounted driver.
    pub fn new(scheduler: S, enabled: bool) -> Self {
        Self {
            scheduler,
            enabled,
            mounted: false,
            pending: None,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    pub fn state(&self) -> DriverState {
        if self.pending.is_some() {
            DriverState::Scheduled
        } else {
            DriverState::Idle
        }
    }

    /// Turn the loop on or off. Setting the current value again is a no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        debug!(enabled, "animation toggled");
        if enabled {
            self.schedule();
        } else {
            self.cancel();
        }
    }

    pub fn enable(&mut self) {
        self.set_enabled(true);
    }

    pub fn disable(&mut self) {
        self.set_enabled(false);
    }

    /// The component became visible.
    pub fn mount(&mut self) {
        self.mounted = true;
        if self.enabled {
            self.schedule();
        }
    }

    /// The component went away; no frame work may run after this.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.cancel();
    }

    /// Handle a frame callback from the host.
    ///
    /// Runs `step` once if `handle` is the frame currently pending, then
    /// requests the next frame if the loop is still on. Returns whether
    /// `step` ran. Frames that were cancelled but delivered anyway are
    /// ignored.
    pub fn deliver_frame(&mut self, handle: S::Handle, step: impl FnOnce()) -> bool {
        if self.pending != Some(handle) {
            trace!(?handle, "stale frame ignored");
            return false;
        }
        self.pending = None;
        step();
        self.schedule();
        true
    }

    fn schedule(&mut self) {
        if self.enabled && self.mounted && self.pending.is_none() {
            let handle = self.scheduler.request_frame();
            trace!(?handle, "frame requested");
            self.pending = Some(handle);
        }
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            trace!(?handle, "frame cancelled");
            self.scheduler.cancel_frame(handle);
        }
    }
}

/// Scheduler for hosts that pump frames themselves (native loops, tests).
///
/// Requested frames queue up until [`ManualScheduler::next_frame`] takes
/// them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_handle: u64,
    pending: BTreeSet<u64>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest outstanding frame, if any.
    pub fn next_frame(&mut self) -> Option<u64> {
        self.pending.pop_first()
    }

    /// Number of frames requested and not yet taken or cancelled.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = u64;

    fn request_frame(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.requested += 1;
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: u64) {
        if self.pending.remove(&handle) {
            self.cancelled += 1;
        }
    }
}
