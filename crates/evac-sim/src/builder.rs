//! Fluent builder for constructing a [`Sim`].

use evac_agent::AgentStore;
use evac_behavior::BehaviorSet;
use evac_core::{EvacError, SimConfig, Tick};
use evac_hazard::{HazardModel, HazardSnapshot};
use evac_mobility::MobilityEngine;
use evac_spatial::{RoadNetwork, Router};

use crate::{Sim, SimError, SimResult};
use crate::sim::OccupancyMap;

/// Builder for [`Sim<R, H>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick duration, max ticks, output interval, ...
/// - [`AgentStore`] from [`evac_agent::AgentStoreBuilder`]
/// - [`RoadNetwork`] with at least the nodes the agents stand on
/// - `H: HazardModel`: e.g. [`evac_hazard::HazardSeries`] or [`evac_hazard::NoHazard`]
/// - [`BehaviorSet`] covering every `BehaviorId` the agents use
/// - `R: Router`: the routing algorithm (e.g. [`evac_spatial::DijkstraRouter`])
///
/// # Example
///
/// ```rust,ignore
/// let agents = AgentStoreBuilder::new()
///     .random_placement(500, &network, &mut SimRng::new(config.seed), BehaviorId(0), 1.4)
///     .build(&network)?;
/// let mut sim = SimBuilder::new(config, agents, network, series, Pedestrian.into(), DijkstraRouter)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router, H: HazardModel> {
    config:    SimConfig,
    agents:    AgentStore,
    network:   RoadNetwork,
    hazard:    H,
    behaviors: BehaviorSet,
    router:    R,
}

impl<R: Router, H: HazardModel> SimBuilder<R, H> {
    pub fn new(
        config:    SimConfig,
        agents:    AgentStore,
        network:   RoadNetwork,
        hazard:    H,
        behaviors: BehaviorSet,
        router:    R,
    ) -> Self {
        Self { config, agents, network, hazard, behaviors, router }
    }

    /// Validate inputs and return a ready-to-run [`Sim`] at tick 0.
    ///
    /// # Errors
    ///
    /// - [`SimError::Config`] for an invalid [`SimConfig`] or a hazard
    ///   snapshot sized for a different network.
    /// - [`SimError::Behavior`] for an agent whose behaviour is not in the set.
    /// - [`SimError::Core`] for an agent standing on a node the network lacks.
    /// - [`SimError::Hazard`] if the hazard has no state for tick 0.
    pub fn build(self) -> SimResult<Sim<R, H>> {
        self.config.validate().map_err(|e| match e {
            EvacError::Config(msg) => SimError::Config(msg),
            other => SimError::Core(other),
        })?;

        // ── Agents against behaviours and network ─────────────────────────
        for agent in self.agents.agent_ids() {
            let i = agent.index();
            self.behaviors.try_get(self.agents.behavior[i])?;
            let origin = self.agents.origin[i];
            if !self.network.contains_node(origin) {
                return Err(EvacError::NodeNotFound(origin).into());
            }
        }

        // ── Hazard against network ────────────────────────────────────────
        let initial = self.hazard.state_at(Tick::ZERO)?;
        check_hazard_size(&initial, &self.network)?;

        let flooded = self
            .agents
            .origin
            .iter()
            .filter(|&&n| !initial.node(n).is_passable())
            .count();
        if flooded > 0 {
            log::warn!("{flooded} agents start on flooded nodes");
        }
        if self.network.safe_locations().is_empty() && !self.agents.is_empty() {
            log::warn!("network has no safe locations; every agent will be stranded");
        }

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        let mobility = MobilityEngine::new(self.router, &self.agents.origin);

        Ok(Sim {
            clock:            self.config.make_clock(),
            config:           self.config,
            agents:           self.agents,
            mobility,
            behaviors:        self.behaviors,
            network:          self.network,
            hazard:           self.hazard,
            occupancy:        OccupancyMap::default(),
            current_hazard:   initial,
            initial_reported: false,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

/// A snapshot that covers elements explicitly must cover all of them.
/// A snapshot must list every element of `network`, or none (all passable).
pub(crate) fn check_hazard_size(snapshot: &HazardSnapshot, network: &RoadNetwork) -> SimResult<()> {
    check_len("edge", snapshot.edges.len(), network.edge_count())?;
    check_len("node", snapshot.nodes.len(), network.node_count())
}

fn check_len(kind: &str, got: usize, expected: usize) -> SimResult<()> {
    if got != 0 && got != expected {
        return Err(SimError::Config(format!(
            "hazard covers {got} {kind}s but the network has {expected}"
        )));
    }
    Ok(())
}
