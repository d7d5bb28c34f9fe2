//! The `MobilityStore`: per-agent movement state.

use evac_core::{AgentId, NodeId};

use crate::{MobilityError, MobilityResult, MovementState};

/// Movement state for every agent, indexed by `AgentId`.
///
/// The simulation steps agents through `states.par_iter_mut()` (or the
/// sequential equivalent), so the vector is `pub`.
#[derive(Debug, Clone, Default)]
pub struct MobilityStore {
    pub states: Vec<MovementState>,
}

impl MobilityStore {
    /// One agent per entry of `origins`, each standing at its origin.
    pub fn from_origins(origins: &[NodeId]) -> Self {
        Self { states: origins.iter().map(|&n| MovementState::at_node(n)).collect() }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn get(&self, agent: AgentId) -> MobilityResult<&MovementState> {
        self.states.get(agent.index()).ok_or(MobilityError::AgentNotFound(agent))
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> MobilityResult<&mut MovementState> {
        self.states.get_mut(agent.index()).ok_or(MobilityError::AgentNotFound(agent))
    }

    /// Total re-routes across all agents.
    pub fn total_reroutes(&self) -> u64 {
        self.states.iter().map(|s| s.reroute_count as u64).sum()
    }
}
