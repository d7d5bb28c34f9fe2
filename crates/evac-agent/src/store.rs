//! Core agent storage: `AgentStore` (SoA data).
//!
//! The scheduler reads this store while agents compute their next move in
//! parallel, then writes status changes back in a single-threaded apply
//! pass.  Keeping the per-agent movement state in a separate store
//! (`evac-mobility`) lets the two borrows coexist.

use evac_core::{AgentId, BehaviorId, NodeId, Tick};

use crate::{AgentStatus, StatusCounts};

/// Structure-of-Arrays storage for evacuee identity and lifecycle.
///
/// Every `Vec` field has exactly `count` elements; the `AgentId` value is the
/// index into all of them:
///
/// ```ignore
/// let speed = store.speed_mps[agent.index()];  // O(1), cache-friendly
/// ```
#[derive(Clone, Debug)]
pub struct AgentStore {
    /// Number of agents.  Equals the length of every SoA `Vec`.
    pub count: usize,

    /// Current lifecycle status.  Write through [`set_status`](Self::set_status)
    /// to keep transitions monotonic.
    status: Vec<AgentStatus>,

    /// Tick at which `status` last changed (`Tick::ZERO` while active).
    status_tick: Vec<Tick>,

    /// Index into the run's behaviour set.
    pub behavior: Vec<BehaviorId>,

    /// Nominal travel speed in metres per second.
    pub speed_mps: Vec<f32>,

    /// Node the agent was placed on at tick 0.
    pub origin: Vec<NodeId>,
}

impl AgentStore {
    /// `true` if there are no agents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn contains(&self, agent: AgentId) -> bool {
        agent.index() < self.count
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// Active agents in ascending id order.
    pub fn active_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agent_ids().filter(|&a| self.status(a) == AgentStatus::Active)
    }

    #[inline]
    pub fn status(&self, agent: AgentId) -> AgentStatus {
        self.status[agent.index()]
    }

    pub fn statuses(&self) -> &[AgentStatus] {
        &self.status
    }

    /// Tick of the agent's last status change.
    #[inline]
    pub fn status_tick(&self, agent: AgentId) -> Tick {
        self.status_tick[agent.index()]
    }

    /// Move `agent` to `status` at `tick`.
    ///
    /// Returns `false` (and changes nothing) if the agent is already in a
    /// terminal state or `status` equals the current one.  Terminal states
    /// are never left.
    pub fn set_status(&mut self, agent: AgentId, status: AgentStatus, tick: Tick) -> bool {
        let current = &mut self.status[agent.index()];
        if current.is_terminal() || *current == status {
            return false;
        }
        *current = status;
        self.status_tick[agent.index()] = tick;
        true
    }

    pub fn count_by_status(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for &s in &self.status {
            counts.add(s);
        }
        counts
    }

    pub fn any_active(&self) -> bool {
        self.status.iter().any(|s| !s.is_terminal())
    }

    // ── Package-private constructor used by AgentStoreBuilder ─────────────

    pub(crate) fn new(behavior: Vec<BehaviorId>, speed_mps: Vec<f32>, origin: Vec<NodeId>) -> Self {
        let count = origin.len();
        Self {
            count,
            status:      vec![AgentStatus::Active; count],
            status_tick: vec![Tick::ZERO; count],
            behavior,
            speed_mps,
            origin,
        }
    }
}
