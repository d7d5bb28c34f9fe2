//! One-tick movement step for a single agent.

use evac_behavior::TickContext;
use evac_core::{AgentId, EdgeId, GeoPoint, NodeId};
use evac_spatial::{RoadNetwork, RouteQuery, Router, Routing};

use crate::{MobilityResult, MobilityStore, MovementState};

/// Budget below this many metres counts as exhausted.
const EPS_M: f32 = 1e-3;

// ── Step input / outcome ──────────────────────────────────────────────────────

/// Everything one agent's step reads besides its own state.
///
/// Shared by every agent in the tick, except `budget_m` and `max_penalty`
/// which come from the agent's speed and behaviour.
#[derive(Clone, Copy)]
pub struct StepInput<'a> {
    pub network: &'a RoadNetwork,
    pub ctx: &'a TickContext<'a>,
    /// Hazard-weighted metres the agent may cover this tick.
    pub budget_m: f32,
    pub max_penalty: f32,
    /// Safe locations full at the start of the tick, indexed by `NodeId`.
    pub closed_targets: &'a [bool],
}

/// What happened to the agent this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// Position changed; still active.
    Moved,
    /// Still active, did not move (no budget).
    Waiting,
    /// Reached the safe location `target`.
    Evacuated { target: NodeId },
    /// No safe location reachable from the agent's node.
    Stranded,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub kind: StepKind,
    /// An existing route was replaced this tick.
    pub rerouted: bool,
    /// Physical metres covered this tick.
    pub travelled_m: f32,
}

impl StepOutcome {
    fn new(kind: StepKind, rerouted: bool, travelled_m: f32) -> Self {
        Self { kind, rerouted, travelled_m }
    }
}

// ── advance ───────────────────────────────────────────────────────────────────

/// Advance one active agent by one tick.
///
/// A pure function of `state` and `input`: the result does not depend on
/// which other agents have already been stepped, so agents can be stepped
/// in parallel.
///
/// # Errors
///
/// Only router errors (an agent standing on a node the network does not
/// know), which indicate corrupted state rather than a flood outcome.
pub fn advance<R: Router + ?Sized>(
    router: &R,
    state: &mut MovementState,
    input: &StepInput<'_>,
) -> MobilityResult<StepOutcome> {
    let network = input.network;
    let hazard = input.ctx.hazard;
    let mut budget = input.budget_m.max(0.0);
    let mut travelled = 0.0_f32;
    let mut rerouted = false;

    loop {
        // ── On an edge: committed, finish it if the budget allows ─────────
        if state.is_on_edge() {
            let e = state.edge.index();
            let len = network.edge_length_m[e];
            // A flooded edge already entered is finished at base cost.
            let mult = network.edge_state(state.edge, hazard).multiplier().unwrap_or(1.0);
            let remaining = (len - state.progress_m).max(0.0);
            let cost = remaining * mult;

            if cost <= budget + EPS_M {
                budget = (budget - cost).max(0.0);
                travelled += remaining;
                state.node = network.edge_to[e];
                state.edge = EdgeId::INVALID;
                state.progress_m = 0.0;
                state.route_index += 1;
            } else {
                let step = budget / mult;
                state.progress_m += step;
                travelled += step;
                let kind = if travelled > 0.0 { StepKind::Moved } else { StepKind::Waiting };
                return Ok(StepOutcome::new(kind, rerouted, travelled));
            }
        }

        // ── At a node ─────────────────────────────────────────────────────
        if state.has_arrived() {
            return Ok(StepOutcome::new(
                StepKind::Evacuated { target: state.node },
                rerouted,
                travelled,
            ));
        }

        if state.route.is_some() && budget <= EPS_M {
            let kind = if travelled > 0.0 { StepKind::Moved } else { StepKind::Waiting };
            return Ok(StepOutcome::new(kind, rerouted, travelled));
        }

        let route_ok = state.route.as_ref().is_some_and(|r| {
            !input.closed_targets.get(r.target.index()).copied().unwrap_or(false)
                && r.admits_next(state.route_index, network, hazard, input.max_penalty)
        });

        if !route_ok {
            let query = RouteQuery::new(state.node, hazard)
                .with_max_penalty(input.max_penalty)
                .with_closed_targets(input.closed_targets);
            match router.find_route(network, &query)? {
                Routing::Unreachable => {
                    state.route = None;
                    state.route_index = 0;
                    return Ok(StepOutcome::new(StepKind::Stranded, rerouted, travelled));
                }
                Routing::Found(route) => {
                    if state.route.is_some() {
                        state.reroute_count += 1;
                        rerouted = true;
                    }
                    state.route = Some(route);
                    state.route_index = 0;
                }
            }
            // A trivial route means the agent already stands on safety.
            if state.has_arrived() {
                continue;
            }
        }

        if budget <= EPS_M {
            let kind = if travelled > 0.0 { StepKind::Moved } else { StepKind::Waiting };
            return Ok(StepOutcome::new(kind, rerouted, travelled));
        }

        // Enter the next edge; from here on it is committed.
        let next = state
            .route
            .as_ref()
            .and_then(|r| r.edges.get(state.route_index).copied())
            .unwrap_or(EdgeId::INVALID);
        if !next.is_valid() {
            // Route exhausted away from its target; cannot happen for routes
            // produced by a router, treat as stranded rather than loop.
            state.route = None;
            return Ok(StepOutcome::new(StepKind::Stranded, rerouted, travelled));
        }
        state.edge = next;
        state.progress_m = 0.0;
    }
}

/// Geographic position of an agent, interpolated along its edge.
pub fn visual_position(state: &MovementState, network: &RoadNetwork) -> GeoPoint {
    if state.is_on_edge() {
        network.point_on_edge(state.edge, state.progress_m)
    } else {
        network.node_pos[state.node.index()]
    }
}

// ── MobilityEngine ────────────────────────────────────────────────────────────

/// Wraps a [`Router`] and [`MobilityStore`] to provide the per-agent step
/// API used by evac-sim.
///
/// # Type parameter
///
/// `R` must implement [`Router`] (e.g. [`evac_spatial::DijkstraRouter`]).
/// Swap it at compile time for a different routing algorithm with no runtime
/// overhead.
pub struct MobilityEngine<R: Router> {
    /// The routing algorithm.
    pub router: R,

    /// All per-agent movement state.
    pub store: MobilityStore,
}

impl<R: Router> MobilityEngine<R> {
    /// Create an engine with one agent standing at each of `origins`.
    pub fn new(router: R, origins: &[NodeId]) -> Self {
        Self { router, store: MobilityStore::from_origins(origins) }
    }

    /// Advance `agent` by one tick (see [`advance`]).
    pub fn step(&mut self, agent: AgentId, input: &StepInput<'_>) -> MobilityResult<StepOutcome> {
        // Split borrow: router and store are separate fields.
        let router = &self.router;
        let state = self.store.get_mut(agent)?;
        let outcome = advance(router, state, input)?;
        if outcome.rerouted {
            log::debug!("{agent} re-routed towards {:?}", state.target());
        }
        Ok(outcome)
    }

    pub fn state(&self, agent: AgentId) -> MobilityResult<&MovementState> {
        self.store.get(agent)
    }

    /// Interpolated geographic position of `agent`.
    pub fn visual_position(&self, agent: AgentId, network: &RoadNetwork) -> MobilityResult<GeoPoint> {
        Ok(visual_position(self.store.get(agent)?, network))
    }
}
