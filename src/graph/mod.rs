//! Graph data structures and operations.
//!
//! The model owns topology only. Positions and velocities belong to the
//! layout engine, which keys them by [`NodeId`].

mod edge;
mod model;
mod node;

pub use edge::{Edge, EdgeId};
pub use model::GraphModel;
pub use node::{NodeId, NodeIdAllocator};
