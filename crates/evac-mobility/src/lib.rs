//! `evac-mobility` — evacuee movement state and the per-tick movement step.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`state`]   | `MovementState` — node / edge / progress / route of one agent     |
//! | [`store`]   | `MobilityStore` — `Vec<MovementState>` indexed by `AgentId`       |
//! | [`engine`]  | `MobilityEngine<R>`, `advance`, `StepInput`, `StepOutcome`        |
//! | [`error`]   | `MobilityError`, `MobilityResult<T>`                              |
//!
//! # Movement model (budgeted partial traversal)
//!
//! Each tick an active agent has a movement budget in hazard-weighted
//! metres (speed × tick length, from its behaviour).  Crossing `d` metres of
//! an edge with penalty `m` costs `d × m`.
//!
//! 1. An agent that is part-way along an edge always finishes it, even if
//!    the edge has since flooded (a blocked edge is then crossed at
//!    multiplier 1).
//! 2. At a node the agent checks, immediately before entering the next edge
//!    of its route, that the edge is still admissible and the route's
//!    safe location is still open.  If not, it asks the [`Router`] for a new
//!    route; `Unreachable` strands it.
//! 3. Reaching the route's safe location evacuates the agent, even with no
//!    budget left.
//! 4. Leftover budget that does not cover the rest of an edge becomes
//!    progress along it, so long edges take several ticks.
//!
//! [`Router`]: evac_spatial::Router

pub mod engine;
pub mod error;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use engine::{MobilityEngine, StepInput, StepKind, StepOutcome, advance, visual_position};
pub use error::{MobilityError, MobilityResult};
pub use state::MovementState;
pub use store::MobilityStore;
