use evac_behavior::BehaviorError;
use evac_core::EvacError;
use evac_hazard::HazardError;
use evac_mobility::MobilityError;
use evac_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    /// No hazard state for a requested tick (data gap) or invalid series.
    #[error("hazard error: {0}")]
    Hazard(#[from] HazardError),

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] EvacError),

    #[error("behavior error: {0}")]
    Behavior(#[from] BehaviorError),

    #[error("mobility error: {0}")]
    Mobility(#[from] MobilityError),
}

pub type SimResult<T> = Result<T, SimError>;
