//! Simulation observer trait for progress reporting and data collection.

use evac_agent::{AgentStatus, AgentStore};
use evac_core::{AgentId, EdgeId, GeoPoint, NodeId, SimClock, Tick};
use evac_mobility::{MobilityStore, visual_position};
use evac_spatial::RoadNetwork;

// ── TickSummary ───────────────────────────────────────────────────────────────

/// Model-level counts at the end of one tick.
///
/// `active`, `evacuated`, and `stranded` are totals over all agents, not
/// just the changes of this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub tick:          Tick,
    pub active:        u32,
    pub evacuated:     u32,
    pub stranded:      u32,
    /// Agents whose route was replaced during this tick.
    pub rerouted:      u32,
    /// Edges impassable (edge or endpoint flooded) during this tick.
    pub blocked_edges: u32,
}

// ── SimView ───────────────────────────────────────────────────────────────────

/// Read-only access to the full simulation state at a snapshot point.
///
/// Lets output writers record positions without the sim knowing about any
/// specific output format.
pub struct SimView<'a> {
    pub tick:     Tick,
    pub clock:    &'a SimClock,
    pub agents:   &'a AgentStore,
    pub mobility: &'a MobilityStore,
    pub network:  &'a RoadNetwork,
}

impl<'a> SimView<'a> {
    /// Unix timestamp of the snapshot tick.
    pub fn unix_secs(&self) -> i64 {
        self.clock.unix_secs_at(self.tick)
    }

    /// Interpolated position of `agent`.
    pub fn position(&self, agent: AgentId) -> GeoPoint {
        visual_position(&self.mobility.states[agent.index()], self.network)
    }

    /// One [`AgentSnapshot`] per agent, in ascending id order.
    pub fn agent_snapshots(&self) -> impl Iterator<Item = AgentSnapshot> + '_ {
        self.agents.agent_ids().map(move |agent| {
            let state = &self.mobility.states[agent.index()];
            AgentSnapshot {
                agent,
                node:          state.node,
                edge:          state.edge,
                progress_m:    state.progress_m,
                position:      visual_position(state, self.network),
                status:        self.agents.status(agent),
                target:        state.target(),
                reroute_count: state.reroute_count,
            }
        })
    }

    /// Owned copy of the whole view.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot { tick: self.tick, agents: self.agent_snapshots().collect() }
    }
}

// ── Owned snapshots ───────────────────────────────────────────────────────────

/// State of one agent at one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub agent:         AgentId,
    /// Last node reached (the source node while on an edge).
    pub node:          NodeId,
    /// Edge being traversed; `EdgeId::INVALID` at a node.
    pub edge:          EdgeId,
    pub progress_m:    f32,
    pub position:      GeoPoint,
    pub status:        AgentStatus,
    /// Safe location of the current route.
    pub target:        Option<NodeId>,
    pub reroute_count: u32,
}

/// Positions and statuses of every agent at one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSnapshot {
    pub tick:   Tick,
    pub agents: Vec<AgentSnapshot>,
}

// ── SimObserver ───────────────────────────────────────────────────────────────

/// Callbacks invoked by [`Sim::step`][crate::Sim::step] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust
/// use evac_sim::{SimObserver, TickSummary};
///
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, s: &TickSummary) {
///         if s.tick.0 % self.interval == 0 {
///             println!("{}: {} evacuated, {} stranded", s.tick, s.evacuated, s.stranded);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the start of each tick, after the hazard state for the tick
    /// has been obtained.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with the tick's counts.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called for the initial state (tick 0) and then every
    /// `config.output_interval_ticks` ticks.
    fn on_snapshot(&mut self, _view: &SimView<'_>) {}

    /// Called once by [`Sim::run`][crate::Sim::run] after the final tick.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Forward every callback to both observers, first `.0` then `.1`.
impl<A: SimObserver, B: SimObserver> SimObserver for (A, B) {
    fn on_tick_start(&mut self, tick: Tick) {
        self.0.on_tick_start(tick);
        self.1.on_tick_start(tick);
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.0.on_tick_end(summary);
        self.1.on_tick_end(summary);
    }

    fn on_snapshot(&mut self, view: &SimView<'_>) {
        self.0.on_snapshot(view);
        self.1.on_snapshot(view);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.0.on_sim_end(final_tick);
        self.1.on_sim_end(final_tick);
    }
}

impl<O: SimObserver + ?Sized> SimObserver for &mut O {
    fn on_tick_start(&mut self, tick: Tick) {
        (**self).on_tick_start(tick);
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        (**self).on_tick_end(summary);
    }

    fn on_snapshot(&mut self, view: &SimView<'_>) {
        (**self).on_snapshot(view);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        (**self).on_sim_end(final_tick);
    }
}

// ── TraceObserver ─────────────────────────────────────────────────────────────

/// Keeps the whole run in memory: one [`SimulationSnapshot`] per snapshot
/// tick (starting with tick 0) and every [`TickSummary`].
#[derive(Default, Debug, Clone)]
pub struct TraceObserver {
    pub snapshots: Vec<SimulationSnapshot>,
    pub summaries: Vec<TickSummary>,
}

impl TraceObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot taken at `tick`, if any.
    pub fn at(&self, tick: Tick) -> Option<&SimulationSnapshot> {
        self.snapshots.iter().find(|s| s.tick == tick)
    }

    /// The trajectory of one agent across all snapshots.
    pub fn agent_history(&self, agent: AgentId) -> Vec<&AgentSnapshot> {
        self.snapshots
            .iter()
            .filter_map(|s| s.agents.get(agent.index()))
            .collect()
    }
}

impl SimObserver for TraceObserver {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.summaries.push(*summary);
    }

    fn on_snapshot(&mut self, view: &SimView<'_>) {
        self.snapshots.push(view.snapshot());
    }
}
