//! Error taxonomy.
//!
//! Every variant except `InvalidConfig`, `Json` and the two id-exhaustion
//! variants is a precondition violation: the caller and the graph have drifted out of sync. They are
//! reported immediately instead of being coerced into some valid state.

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Errors produced by the graph model, layout engine and gesture controller.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The node is not part of the graph (or has no layout state).
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The edge is not part of the graph.
    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),

    /// The node was already added.
    #[error("{0} is already present")]
    DuplicateNode(NodeId),

    /// An edge endpoint is missing from the graph.
    #[error("edge {from} -> {to} references missing {missing}")]
    InvalidReference {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// `attach()` on a controller that is already attached.
    #[error("gesture controller is already attached")]
    AlreadyAttached,

    /// `release()` on a controller that is already released.
    #[error("gesture controller is already released")]
    AlreadyReleased,

    /// A drag tried to release a node it does not hold.
    #[error("{0} is not held by a drag")]
    NotHeld(NodeId),

    /// Every node id has been handed out.
    #[error("node ids exhausted")]
    NodeIdsExhausted,

    /// Every edge id has been handed out.
    #[error("edge ids exhausted")]
    EdgeIdsExhausted,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;
