use evac_core::AgentId;
use evac_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("agent {0} not found in mobility store")]
    AgentNotFound(AgentId),

    #[error("routing failed: {0}")]
    Routing(#[from] SpatialError),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
