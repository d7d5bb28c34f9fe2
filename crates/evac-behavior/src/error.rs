use thiserror::Error;

use evac_core::BehaviorId;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("unknown behavior {0}")]
    UnknownBehavior(BehaviorId),

    #[error("behavior configuration error: {0}")]
    Config(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
