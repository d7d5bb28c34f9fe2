//! Fluent builder for constructing an `AgentStore` from a population.
//!
//! # Usage
//!
//! ```rust
//! use evac_agent::{AgentStoreBuilder, Placement};
//! use evac_core::{BehaviorId, GeoPoint, SimRng};
//! use evac_spatial::RoadNetworkBuilder;
//!
//! let mut b = RoadNetworkBuilder::new();
//! let a = b.add_node(GeoPoint::new(0.0, 0.0));
//! let c = b.add_node(GeoPoint::new(0.0, 0.01));
//! b.add_road(a, c, 1_100.0);
//! b.add_safe_location(c, None);
//! let network = b.build().unwrap();
//!
//! let mut rng = SimRng::new(42);
//! let store = AgentStoreBuilder::new()
//!     .place(Placement::new(a, BehaviorId(0), 1.4))
//!     .random_placement(99, &network, &mut rng, BehaviorId(0), 1.4)
//!     .build(&network)
//!     .unwrap();
//!
//! assert_eq!(store.count, 100);
//! ```

use evac_core::{BehaviorId, EvacError, EvacResult, GeoPoint, NodeId, SimRng};
use evac_spatial::RoadNetwork;

use crate::AgentStore;

/// Initial position and profile of one agent.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub node:      NodeId,
    pub behavior:  BehaviorId,
    pub speed_mps: f32,
}

impl Placement {
    pub fn new(node: NodeId, behavior: BehaviorId, speed_mps: f32) -> Self {
        Self { node, behavior, speed_mps }
    }
}

/// Fluent builder for [`AgentStore`].
///
/// Agents receive `AgentId`s in the order they are placed.
#[derive(Default)]
pub struct AgentStoreBuilder {
    placements: Vec<Placement>,
    /// Coordinates that did not snap to any node (empty network).
    unsnapped: usize,
}

impl AgentStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one agent at an explicit node.
    pub fn place(mut self, placement: Placement) -> Self {
        self.placements.push(placement);
        self
    }

    /// Add many agents at explicit nodes.
    pub fn placements(mut self, placements: impl IntoIterator<Item = Placement>) -> Self {
        self.placements.extend(placements);
        self
    }

    /// Add an agent at the road node nearest to `pos`.
    pub fn place_at(
        mut self,
        pos: GeoPoint,
        network: &RoadNetwork,
        behavior: BehaviorId,
        speed_mps: f32,
    ) -> Self {
        match network.snap_to_node(pos) {
            Some(node) => self.placements.push(Placement { node, behavior, speed_mps }),
            None => self.unsnapped += 1,
        }
        self
    }

    /// Add `count` agents, each on a node drawn uniformly (with replacement)
    /// from the whole network.
    pub fn random_placement(
        mut self,
        count: usize,
        network: &RoadNetwork,
        rng: &mut SimRng,
        behavior: BehaviorId,
        speed_mps: f32,
    ) -> Self {
        let node_count = network.node_count();
        if node_count == 0 {
            self.unsnapped += count;
            return self;
        }
        self.placements.reserve(count);
        for _ in 0..count {
            let node = NodeId(rng.gen_range(0..node_count as u32));
            self.placements.push(Placement { node, behavior, speed_mps });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Validate every placement against `network` and build the store.
    ///
    /// # Errors
    ///
    /// - [`EvacError::Config`] if a coordinate could not be snapped (empty
    ///   network) or a speed is not a positive finite number.
    /// - [`EvacError::NodeNotFound`] for a placement on a missing node.
    pub fn build(self, network: &RoadNetwork) -> EvacResult<AgentStore> {
        if self.unsnapped > 0 {
            return Err(EvacError::Config(format!(
                "{} agents could not be placed: network has no nodes",
                self.unsnapped
            )));
        }

        let n = self.placements.len();
        let mut behavior = Vec::with_capacity(n);
        let mut speed    = Vec::with_capacity(n);
        let mut origin   = Vec::with_capacity(n);

        for (i, p) in self.placements.into_iter().enumerate() {
            if !network.contains_node(p.node) {
                return Err(EvacError::NodeNotFound(p.node));
            }
            if !p.speed_mps.is_finite() || p.speed_mps <= 0.0 {
                return Err(EvacError::Config(format!(
                    "agent {i}: speed {} m/s must be positive and finite",
                    p.speed_mps
                )));
            }
            behavior.push(p.behavior);
            speed.push(p.speed_mps);
            origin.push(p.node);
        }

        log::debug!("placed {n} agents on {} nodes", network.node_count());
        Ok(AgentStore::new(behavior, speed, origin))
    }
}
