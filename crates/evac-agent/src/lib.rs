//! `evac-agent` — Structure-of-Arrays evacuee storage.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`status`]  | `AgentStatus` lifecycle, `StatusCounts`                     |
//! | [`store`]   | `AgentStore` (SoA arrays: status, behaviour, speed, origin) |
//! | [`builder`] | `AgentStoreBuilder`, `Placement` (explicit or random)       |
//!
//! Movement state (position along the network, current route) lives in
//! `evac-mobility`; this crate only knows who the agents are, how fast they
//! move, and whether they are still evacuating.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                 |
//! |---------|--------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types. |

pub mod builder;
pub mod status;
pub mod store;


pub use builder::{AgentStoreBuilder, Placement};
pub use status::{AgentStatus, StatusCounts};
pub use store::AgentStore;
