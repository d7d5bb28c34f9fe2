//! The `HazardModel` trait: the engine's view of flood data.

use std::sync::Arc;

use evac_core::Tick;

use crate::{HazardResult, HazardSnapshot};

/// A deterministic function from tick to hazard state.
///
/// Implementations must return the same snapshot for the same tick no matter
/// how often or in which order they are asked, and must never depend on
/// agent state.  A tick the data does not cover is an error
/// ([`HazardError::NoSnapshot`](crate::HazardError::NoSnapshot)); the engine
/// never guesses.
///
/// Snapshots are handed out as `Arc`s so a cached keyframe can be shared by
/// every agent for the whole tick without copying.
pub trait HazardModel: Send + Sync {
    fn state_at(&self, tick: Tick) -> HazardResult<Arc<HazardSnapshot>>;
}

impl<H: HazardModel + ?Sized> HazardModel for Box<H> {
    fn state_at(&self, tick: Tick) -> HazardResult<Arc<HazardSnapshot>> {
        (**self).state_at(tick)
    }
}

impl<H: HazardModel + ?Sized> HazardModel for Arc<H> {
    fn state_at(&self, tick: Tick) -> HazardResult<Arc<HazardSnapshot>> {
        (**self).state_at(tick)
    }
}

/// No flooding: every element passable at every tick.
pub struct NoHazard {
    snapshot: Arc<HazardSnapshot>,
}

impl NoHazard {
    pub fn new() -> Self {
        Self { snapshot: Arc::new(HazardSnapshot::default()) }
    }
}

impl Default for NoHazard {
    fn default() -> Self {
        Self::new()
    }
}

impl HazardModel for NoHazard {
    fn state_at(&self, _tick: Tick) -> HazardResult<Arc<HazardSnapshot>> {
        Ok(Arc::clone(&self.snapshot))
    }
}
