//! Built-in behaviour profiles.

use crate::{BehaviorError, BehaviorResult, EvacuationBehavior};

/// Walks through any water that is not deep enough to block the road.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pedestrian;

impl EvacuationBehavior for Pedestrian {
    fn name(&self) -> &str {
        "pedestrian"
    }
}

/// Drives, and refuses roads whose hazard penalty exceeds `max_penalty`
/// (a car stalls in water a pedestrian can still wade through).
#[derive(Debug, Clone, Copy)]
pub struct Vehicle {
    max_penalty: f32,
}

impl Vehicle {
    /// Vehicle avoiding edges penalised above `max_penalty`.
    ///
    /// `max_penalty` must be at least 1.0 (1.0 means "dry roads only").
    pub fn new(max_penalty: f32) -> BehaviorResult<Self> {
        if max_penalty.is_nan() || max_penalty < 1.0 {
            return Err(BehaviorError::Config(format!(
                "vehicle max_penalty {max_penalty} must be >= 1.0"
            )));
        }
        Ok(Self { max_penalty })
    }

    /// Vehicle that only uses dry roads.
    pub fn dry_roads_only() -> Self {
        Self { max_penalty: 1.0 }
    }
}

impl EvacuationBehavior for Vehicle {
    fn name(&self) -> &str {
        "vehicle"
    }

    fn max_penalty(&self) -> f32 {
        self.max_penalty
    }
}
