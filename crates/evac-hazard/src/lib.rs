//! `evac-hazard` — the time-indexed flood hazard model.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`state`]    | `HazardState` — passable / cost penalty / blocked            |
//! | [`snapshot`] | `HazardSnapshot` — dense per-edge and per-node state at a tick |
//! | [`model`]    | `HazardModel` trait, `NoHazard`                              |
//! | [`series`]   | `HazardSeries` + builder — keyframed, cached snapshots       |
//! | [`depth`]    | `DepthPolicy` — flood depth to hazard state conversion       |
//! | [`loader`]   | CSV depth-series loader                                      |
//! | [`error`]    | `HazardError`, `HazardResult<T>`                             |
//!
//! # Determinism
//!
//! `HazardModel::state_at` is a pure function of the tick.  Nothing in this
//! crate sees agent state, so a hazard series can be shared by any number of
//! runs (e.g. a parameter sweep over population sizes).

pub mod depth;
pub mod error;
pub mod loader;
pub mod model;
pub mod series;
pub mod snapshot;
pub mod state;


pub use depth::DepthPolicy;
pub use error::{HazardError, HazardResult};
pub use loader::{load_series_csv, load_series_reader};
pub use model::{HazardModel, NoHazard};
pub use series::{HazardSeries, HazardSeriesBuilder};
pub use snapshot::HazardSnapshot;
pub use state::{HazardElement, HazardState};
