//! Shared error type.
//!
//! Sub-crates define their own error enums (`HazardError`, `SpatialError`,
//! ...) and wrap `EvacError` where they need the common variants.

use thiserror::Error;

use crate::{AgentId, NodeId};

/// Errors shared by every `evac-*` crate.
#[derive(Debug, Error)]
pub enum EvacError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `evac-core`.
pub type EvacResult<T> = Result<T, EvacError>;
