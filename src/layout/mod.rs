//! Force-directed layout.
//!
//! The engine keeps one [`LayoutState`] per node, keyed by [`NodeId`]
//! rather than by slot index, so removing a node never disturbs the state
//! of the others.
//!
//! [`NodeId`]: crate::graph::NodeId

mod config;
mod force;
mod placement;
mod vector;

pub use config::{ForceConfig, Viewport};
pub use force::{ForceLayoutEngine, LayoutState};
pub use placement::Placement;
pub use vector::Vec2;
