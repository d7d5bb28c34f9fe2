//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use evac_agent::{AgentStatus, AgentStore};
use evac_behavior::{BehaviorSet, TickContext};
use evac_core::{AgentId, EdgeId, NodeId, SimClock, SimConfig, Tick};
use evac_hazard::{HazardModel, HazardSnapshot};
use evac_mobility::{MobilityEngine, MovementState, StepInput, StepKind, StepOutcome, advance};
use evac_spatial::{RoadNetwork, Router};

use crate::builder::check_hazard_size;
use crate::{SimObserver, SimResult, SimView, TickSummary};

#[cfg(feature = "fx-hash")]
pub(crate) type OccupancyMap = rustc_hash::FxHashMap<NodeId, u32>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type OccupancyMap = std::collections::HashMap<NodeId, u32>;

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The evacuation scheduler.
///
/// `Sim<R, H>` owns all state of one run and drives the tick loop:
///
/// 1. **Hazard**: obtain the snapshot for the new tick.  A data gap is
///    fatal and leaves the clock untouched.
/// 2. **Clock**: advance to the new tick.
/// 3. **Capacity**: safe locations whose occupancy at tick start has reached
///    capacity are closed for routing this tick.
/// 4. **Step** (optionally parallel with the `parallel` feature): every
///    active agent advances against the same snapshot.  A step reads only
///    the agent's own movement state plus shared read-only data.
/// 5. **Apply** (sequential, ascending `AgentId`): status changes and
///    occupancy.
/// 6. **Report**: `on_tick_end`, then `on_snapshot` on output ticks.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router, H: HazardModel> {
    /// Run configuration (tick length, max ticks, output interval, ...).
    pub config: SimConfig,

    /// Simulation clock. `current_tick` is the last completed tick.
    pub clock: SimClock,

    /// Agent identity, behaviour, speed, and status.
    pub agents: AgentStore,

    /// Routing algorithm plus per-agent movement state.
    pub mobility: MobilityEngine<R>,

    /// Behaviours indexed by `AgentStore::behavior`.
    pub behaviors: BehaviorSet,

    pub network: RoadNetwork,

    pub(crate) hazard: H,

    /// Evacuees per safe location.
    pub(crate) occupancy: OccupancyMap,

    /// Snapshot in force for `clock.current_tick`.
    pub(crate) current_hazard: Arc<HazardSnapshot>,

    /// Whether the tick-0 snapshot has been reported.
    pub(crate) initial_reported: bool,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<R: Router, H: HazardModel> Sim<R, H> {
    // ── Public API ────────────────────────────────────────────────────────

    /// `true` once the clock has reached `config.end_tick()` or no agent is
    /// active.  Further [`step`](Self::step) calls are no-ops.
    pub fn is_finished(&self) -> bool {
        self.clock.current_tick >= self.config.end_tick() || !self.agents.any_active()
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn hazard(&self) -> &HazardSnapshot {
        &self.current_hazard
    }

    /// Evacuees at a safe location so far.
    pub fn occupancy(&self, node: NodeId) -> u32 {
        self.occupancy.get(&node).copied().unwrap_or(0)
    }

    /// Read-only view of the current state.
    pub fn view(&self) -> SimView<'_> {
        SimView {
            tick:     self.clock.current_tick,
            clock:    &self.clock,
            agents:   &self.agents,
            mobility: &self.mobility.store,
            network:  &self.network,
        }
    }

    /// Run until [`is_finished`](Self::is_finished), then call `on_sim_end`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        log::info!(
            "evacuation run: {} agents, {} nodes, {} edges, {} safe locations, up to {} ticks of {} s",
            self.agents.count,
            self.network.node_count(),
            self.network.edge_count(),
            self.network.safe_locations().len(),
            self.config.max_ticks,
            self.config.tick_duration_secs,
        );

        while self.step(observer)?.is_some() {}
        // A run that was finished before its first step still reports tick 0.
        self.report_initial(observer);

        let counts = self.agents.count_by_status();
        log::info!(
            "run finished at {}: {} evacuated, {} stranded, {} still active",
            self.clock,
            counts.evacuated,
            counts.stranded,
            counts.active,
        );
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run at most `n` ticks; stops early if the run finishes.  Returns the
    /// number of ticks executed.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<u64> {
        let mut done = 0;
        while done < n {
            if self.step(observer)?.is_none() {
                break;
            }
            done += 1;
        }
        Ok(done)
    }

    /// Execute one tick.
    ///
    /// Returns `Ok(None)` without changing anything once the run is
    /// finished.  A hazard data gap returns `Err(SimError::Hazard)`, a
    /// snapshot that does not cover the network returns
    /// `Err(SimError::Config)`, and in both cases the clock stays where it was.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Option<TickSummary>> {
        self.report_initial(observer);
        if self.is_finished() {
            return Ok(None);
        }

        let tick = self.clock.current_tick.next();
        let hazard = self.hazard.state_at(tick)?;
        check_hazard_size(&hazard, &self.network)?;
        self.clock.advance();
        self.current_hazard = Arc::clone(&hazard);
        observer.on_tick_start(tick);

        let summary = self.process_tick(tick, &hazard)?;

        observer.on_tick_end(&summary);
        let interval = self.config.output_interval_ticks;
        if interval > 0 && tick.0 % interval == 0 {
            observer.on_snapshot(&self.view());
        }
        Ok(Some(summary))
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn report_initial<O: SimObserver>(&mut self, observer: &mut O) {
        if !self.initial_reported {
            self.initial_reported = true;
            if self.config.output_interval_ticks > 0 {
                observer.on_snapshot(&self.view());
            }
        }
    }

    fn process_tick(&mut self, tick: Tick, hazard: &HazardSnapshot) -> SimResult<TickSummary> {
        let ctx = TickContext::new(tick, self.config.tick_duration_secs, hazard);
        let closed = closed_targets(&self.network, &self.occupancy);

        // ── Step phase (produce) ──────────────────────────────────────────
        //
        // Explicit field borrows so the borrow checker sees disjoint access.
        let shared = Shared {
            agents:    &self.agents,
            behaviors: &self.behaviors,
            network:   &self.network,
            ctx:       &ctx,
            closed:    &closed,
        };
        let router = &self.mobility.router;
        let states = &mut self.mobility.store.states;

        #[cfg(not(feature = "parallel"))]
        let results = step_agents(router, states, &shared);
        #[cfg(feature = "parallel")]
        let results = step_agents(router, states, &shared, self.pool.as_ref());

        // ── Apply phase (consume) ─────────────────────────────────────────
        //
        // Results are in ascending AgentId order whatever the step phase
        // did, which keeps occupancy and logs deterministic.
        let mut rerouted = 0u32;
        for result in results {
            let (agent, outcome) = result?;
            if outcome.rerouted {
                rerouted += 1;
                log::debug!(
                    "{tick}: {agent} re-routed towards {:?}",
                    self.mobility.store.states[agent.index()].target()
                );
            }
            self.apply(agent, outcome, tick);
        }

        let counts = self.agents.count_by_status();
        Ok(TickSummary {
            tick,
            active:        counts.active,
            evacuated:     counts.evacuated,
            stranded:      counts.stranded,
            rerouted,
            blocked_edges: blocked_edge_count(&self.network, hazard),
        })
    }

    fn apply(&mut self, agent: AgentId, outcome: StepOutcome, tick: Tick) {
        match outcome.kind {
            StepKind::Evacuated { target } => {
                if self.agents.set_status(agent, AgentStatus::Evacuated, tick) {
                    *self.occupancy.entry(target).or_default() += 1;
                    log::debug!("{tick}: {agent} evacuated at {target}");
                }
            }
            StepKind::Stranded => {
                if self.agents.set_status(agent, AgentStatus::Stranded, tick) {
                    let node = self.mobility.store.states[agent.index()].node;
                    log::debug!("{tick}: {agent} stranded at {node}");
                }
            }
            StepKind::Moved | StepKind::Waiting => {}
        }
    }
}

// ── Step phase helpers ────────────────────────────────────────────────────────

/// Read-only inputs shared by every agent step of one tick.
struct Shared<'a> {
    agents:    &'a AgentStore,
    behaviors: &'a BehaviorSet,
    network:   &'a RoadNetwork,
    ctx:       &'a TickContext<'a>,
    closed:    &'a [bool],
}

fn step_one<R: Router>(
    router: &R,
    agent:  AgentId,
    state:  &mut MovementState,
    shared: &Shared<'_>,
) -> SimResult<(AgentId, StepOutcome)> {
    let i = agent.index();
    let behavior = shared.behaviors.try_get(shared.agents.behavior[i])?;
    let input = StepInput {
        network:        shared.network,
        ctx:            shared.ctx,
        budget_m:       behavior.movement_budget_m(shared.agents.speed_mps[i], shared.ctx),
        max_penalty:    behavior.max_penalty(),
        closed_targets: shared.closed,
    };
    let outcome = advance(router, state, &input)?;
    Ok((agent, outcome))
}

/// Step every active agent, returning results in ascending `AgentId` order.
#[cfg(not(feature = "parallel"))]
fn step_agents<R: Router>(
    router: &R,
    states: &mut [MovementState],
    shared: &Shared<'_>,
) -> Vec<SimResult<(AgentId, StepOutcome)>> {
    let statuses = shared.agents.statuses();
    states
        .iter_mut()
        .enumerate()
        .filter(|(i, _)| !statuses[*i].is_terminal())
        .map(|(i, state)| step_one(router, AgentId(i as u32), state, shared))
        .collect()
}

/// Step every active agent on Rayon's pool.  `collect` keeps the input
/// order, so results are still in ascending `AgentId` order.
#[cfg(feature = "parallel")]
fn step_agents<R: Router>(
    router: &R,
    states: &mut [MovementState],
    shared: &Shared<'_>,
    pool:   Option<&rayon::ThreadPool>,
) -> Vec<SimResult<(AgentId, StepOutcome)>> {
    use rayon::prelude::*;

    let statuses = shared.agents.statuses();
    let run = || -> Vec<SimResult<(AgentId, StepOutcome)>> {
        states
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| !statuses[*i].is_terminal())
            .map(|(i, state)| step_one(router, AgentId(i as u32), state, shared))
            .collect()
    };
    match pool {
        Some(pool) => pool.install(run),
        None => run(),
    }
}

/// `closed[n]` is true for safe node `n` whose occupancy has reached its
/// capacity.
fn closed_targets(network: &RoadNetwork, occupancy: &OccupancyMap) -> Vec<bool> {
    let mut closed = vec![false; network.node_count()];
    for safe in network.safe_locations() {
        if let Some(cap) = safe.capacity {
            let occ = occupancy.get(&safe.node).copied().unwrap_or(0);
            if occ >= cap {
                closed[safe.node.index()] = true;
            }
        }
    }
    closed
}

fn blocked_edge_count(network: &RoadNetwork, hazard: &HazardSnapshot) -> u32 {
    (0..network.edge_count() as u32)
        .filter(|&e| !network.is_passable(EdgeId(e), hazard))
        .count() as u32
}
