//! Plain data row types written by output backends.

use evac_agent::AgentStatus;
use evac_core::Tick;
use evac_sim::{AgentSnapshot, TickSummary};

/// One agent's position and status at a snapshot tick.
///
/// Id columns use `u32::MAX` for "none" so every backend stores plain
/// integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id:      u32,
    pub tick:          u64,
    /// Last node reached (the source node while on an edge).
    pub node:          u32,
    /// Edge being traversed; `u32::MAX` at a node.
    pub edge:          u32,
    pub progress_m:    f32,
    pub lat:           f32,
    pub lon:           f32,
    pub status:        AgentStatus,
    pub reroute_count: u32,
    /// Safe location of the current route; `u32::MAX` without a route.
    pub target:        u32,
}

impl AgentSnapshotRow {
    pub fn from_snapshot(tick: Tick, s: &AgentSnapshot) -> Self {
        Self {
            agent_id:      s.agent.0,
            tick:          tick.0,
            node:          s.node.0,
            edge:          s.edge.0,
            progress_m:    s.progress_m,
            lat:           s.position.lat,
            lon:           s.position.lon,
            status:        s.status,
            reroute_count: s.reroute_count,
            target:        s.target.map_or(u32::MAX, |n| n.0),
        }
    }
}

/// Model-level counts for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:           u64,
    pub unix_time_secs: i64,
    pub active:         u32,
    pub evacuated:      u32,
    pub stranded:       u32,
    pub rerouted:       u32,
    pub blocked_edges:  u32,
}

impl TickSummaryRow {
    pub fn from_summary(summary: &TickSummary, unix_time_secs: i64) -> Self {
        Self {
            tick:          summary.tick.0,
            unix_time_secs,
            active:        summary.active,
            evacuated:     summary.evacuated,
            stranded:      summary.stranded,
            rerouted:      summary.rerouted,
            blocked_edges: summary.blocked_edges,
        }
    }
}
