//! `evac-core` — foundational types for the flood evacuation engine.
//!
//! This crate is a dependency of every other `evac-*` crate.  It has no
//! `evac-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `EdgeId`, `BehaviorId`           |
//! | [`geo`]         | `GeoPoint`, haversine distance, interpolation         |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `SimRng` (seeded population placement)                |
//! | [`error`]       | `EvacError`, `EvacResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{EvacError, EvacResult};
pub use geo::GeoPoint;
pub use ids::{AgentId, BehaviorId, EdgeId, NodeId};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
