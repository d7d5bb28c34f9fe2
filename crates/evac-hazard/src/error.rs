use evac_core::Tick;
use thiserror::Error;

use crate::HazardElement;

#[derive(Debug, Error)]
pub enum HazardError {
    #[error("no hazard data for {tick} (series ends at {horizon})")]
    NoSnapshot { tick: Tick, horizon: Tick },

    #[error("{element} is outside the network ({count} elements of that kind)")]
    OutOfRange { element: HazardElement, count: usize },

    #[error("{element} recedes at {tick} but the series is monotonic")]
    Recession { tick: Tick, element: HazardElement },

    #[error("invalid hazard state for {element}: {reason}")]
    InvalidState { element: HazardElement, reason: String },

    #[error("hazard configuration error: {0}")]
    Config(String),

    #[error("hazard parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HazardResult<T> = Result<T, HazardError>;
