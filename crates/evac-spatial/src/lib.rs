//! `evac-spatial` — road network, safe locations, and hazard-aware routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`, `SafeLocation` |
//! | [`router`]  | `Router` trait, `RouteQuery`, `Route`, `Routing`, `DijkstraRouter` |
//! | [`loader`]  | CSV network loading (`nodes`, `edges`, `safe` tables)       |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Static topology, per-tick state
//!
//! The network never changes after `build()`.  Flooding is applied by
//! passing an [`evac_hazard::HazardSnapshot`] to the cost and passability
//! queries, so one network can serve many runs and many ticks.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;


pub use error::{SpatialError, SpatialResult};
pub use loader::{LoadedNetwork, load_network_csv, load_network_reader};
pub use network::{RoadNetwork, RoadNetworkBuilder, SafeLocation};
pub use router::{DijkstraRouter, Route, RouteQuery, Router, Routing};
