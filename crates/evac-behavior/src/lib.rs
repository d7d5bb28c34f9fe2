//! `evac-behavior` — per-agent evacuation strategy.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`context`]  | `TickContext<'a>` — read-only tick state shared by all agents  |
//! | [`model`]    | `EvacuationBehavior` trait                                     |
//! | [`profiles`] | `Pedestrian`, `Vehicle`                                        |
//! | [`set`]      | `BehaviorSet` — behaviours indexed by `BehaviorId`             |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                           |
//!
//! # Design notes
//!
//! A behaviour is chosen per agent when the population is placed (the
//! agent's `BehaviorId`) and never changes.  It answers two questions each
//! tick: how far may this agent travel, and how much water will it wade
//! through before treating a road as closed.  Route choice itself is the
//! same for everyone (nearest reachable safety), so behaviours stay small
//! and stateless and can be shared across Rayon workers.

pub mod context;
pub mod error;
pub mod model;
pub mod profiles;
pub mod set;

#[cfg(test)]
mod tests;

pub use context::TickContext;
pub use error::{BehaviorError, BehaviorResult};
pub use model::EvacuationBehavior;
pub use profiles::{Pedestrian, Vehicle};
pub use set::BehaviorSet;
