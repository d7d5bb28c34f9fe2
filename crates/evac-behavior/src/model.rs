//! The `EvacuationBehavior` trait, the main extension point for user code.

use crate::TickContext;

/// Pluggable evacuee behaviour.
///
/// # Thread safety
///
/// The simulation loop may step many agents in parallel via Rayon, so
/// implementations must be `Send + Sync`.  Anything that varies per agent
/// (speed, origin) lives in `AgentStore`, not in the behaviour.
///
/// # Example
///
/// ```rust
/// use evac_behavior::{EvacuationBehavior, TickContext};
///
/// /// Walks at half speed once the flood has been going for an hour.
/// struct Tiring;
///
/// impl EvacuationBehavior for Tiring {
///     fn name(&self) -> &str { "tiring" }
///
///     fn movement_budget_m(&self, speed_mps: f32, ctx: &TickContext<'_>) -> f32 {
///         let full = speed_mps * ctx.tick_duration_secs as f32;
///         let elapsed = ctx.tick.0 * ctx.tick_duration_secs as u64;
///         if elapsed > 3_600 { full * 0.5 } else { full }
///     }
/// }
/// ```
pub trait EvacuationBehavior: Send + Sync + 'static {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Metres of hazard-weighted distance the agent may cover this tick.
    ///
    /// Default: nominal speed times tick length.
    fn movement_budget_m(&self, speed_mps: f32, ctx: &TickContext<'_>) -> f32 {
        speed_mps * ctx.tick_duration_secs as f32
    }

    /// Highest hazard penalty factor the agent will enter.  Edges above it
    /// are treated as blocked for this agent.
    ///
    /// Default: any passable edge.
    fn max_penalty(&self) -> f32 {
        f32::INFINITY
    }
}
