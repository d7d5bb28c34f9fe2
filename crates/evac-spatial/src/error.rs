//! Spatial-subsystem error type.

use thiserror::Error;

use evac_core::{EdgeId, NodeId};

/// Errors produced by `evac-spatial`.
///
/// Note that "no path to safety" is not an error: it is
/// [`Routing::Unreachable`](crate::Routing::Unreachable).
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("invalid edge {edge}: {reason}")]
    InvalidEdge { edge: EdgeId, reason: String },

    #[error("safe location {0} listed more than once")]
    DuplicateSafeLocation(NodeId),

    #[error("safe location {0} cannot be reached from any other node")]
    DisconnectedSafeLocation(NodeId),

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
