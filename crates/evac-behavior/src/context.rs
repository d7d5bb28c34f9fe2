//! Read-only simulation state passed to every behaviour callback.

use evac_core::Tick;
use evac_hazard::HazardSnapshot;

/// What every agent can see during one tick.
///
/// Built once per tick by evac-sim and shared immutably across all agent
/// steps, so agents activated later in the tick observe exactly the same
/// hazard state as the first one.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    /// Tick being computed.
    pub tick: Tick,

    /// Wall-clock seconds one tick represents.
    pub tick_duration_secs: u32,

    /// Hazard state in force for this tick.
    pub hazard: &'a HazardSnapshot,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(tick: Tick, tick_duration_secs: u32, hazard: &'a HazardSnapshot) -> Self {
        Self { tick, tick_duration_secs, hazard }
    }
}
