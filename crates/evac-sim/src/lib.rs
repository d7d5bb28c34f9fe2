//! `evac-sim` — tick-synchronous scheduler for the flood evacuation engine.
//!
//! # Tick loop
//!
//! ```text
//! while !finished:
//!   ① Hazard    — snapshot for tick t+1 (a data gap aborts the run, the
//!                 clock stays at t).
//!   ② Clock     — advance to t+1.
//!   ③ Capacity  — close safe locations full at tick start.
//!   ④ Step      — every active agent moves / re-routes against the same
//!                 snapshot (parallel with the `parallel` feature).
//!   ⑤ Apply     — status changes and occupancy, ascending AgentId.
//!   ⑥ Report    — TickSummary to observers, snapshot on output ticks.
//! ```
//!
//! The run finishes when `config.max_ticks` is reached or no agent is
//! active.  Further `step` calls return `Ok(None)` and change nothing.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the step phase on Rayon's thread pool.            |
//! | `fx-hash`  | FxHash for the safe-location occupancy map.            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use evac_sim::{SimBuilder, TraceObserver};
//! use evac_spatial::DijkstraRouter;
//!
//! let mut sim = SimBuilder::new(config, agents, network, hazard, behaviors, DijkstraRouter)
//!     .build()?;
//! let mut trace = TraceObserver::new();
//! sim.run(&mut trace)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{
    AgentSnapshot, NoopObserver, SimObserver, SimView, SimulationSnapshot, TickSummary,
    TraceObserver,
};
pub use sim::Sim;
