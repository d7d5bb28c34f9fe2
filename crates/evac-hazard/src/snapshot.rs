//! `HazardSnapshot` — the hazard state of every edge and node at one tick.

use evac_core::{EdgeId, NodeId, Tick};

use crate::{HazardElement, HazardState};

/// Dense per-element hazard state, shared read-only by every agent during a
/// tick.
///
/// The vectors are indexed by `EdgeId` / `NodeId`.  Ids beyond the end of a
/// vector are passable, which lets [`NoHazard`](crate::NoHazard) hand out an
/// empty snapshot for any network size.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HazardSnapshot {
    /// First tick from which this state holds.
    pub since: Tick,
    pub edges: Vec<HazardState>,
    pub nodes: Vec<HazardState>,
}

impl HazardSnapshot {
    /// Every element passable.
    pub fn passable(since: Tick, node_count: usize, edge_count: usize) -> Self {
        Self {
            since,
            edges: vec![HazardState::Passable; edge_count],
            nodes: vec![HazardState::Passable; node_count],
        }
    }

    #[inline]
    pub fn edge(&self, edge: EdgeId) -> HazardState {
        self.edges.get(edge.index()).copied().unwrap_or_default()
    }

    #[inline]
    pub fn node(&self, node: NodeId) -> HazardState {
        self.nodes.get(node.index()).copied().unwrap_or_default()
    }

    /// State of either kind of element.
    #[inline]
    pub fn get(&self, element: HazardElement) -> HazardState {
        match element {
            HazardElement::Edge(e) => self.edge(e),
            HazardElement::Node(n) => self.node(n),
        }
    }

    pub fn blocked_edge_count(&self) -> usize {
        self.edges.iter().filter(|s| !s.is_passable()).count()
    }

    pub fn blocked_node_count(&self) -> usize {
        self.nodes.iter().filter(|s| !s.is_passable()).count()
    }

    /// `true` if this snapshot covers no element explicitly.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.nodes.is_empty()
    }

    /// `true` if any element is less severe here than in `earlier`, i.e. the
    /// flood has receded between the two snapshots.
    pub fn is_recession_of(&self, earlier: &HazardSnapshot) -> bool {
        let edge_len = self.edges.len().max(earlier.edges.len());
        let node_len = self.nodes.len().max(earlier.nodes.len());
        (0..edge_len).any(|i| {
            let e = EdgeId(i as u32);
            self.edge(e).recedes_from(earlier.edge(e))
        }) || (0..node_len).any(|i| {
            let n = NodeId(i as u32);
            self.node(n).recedes_from(earlier.node(n))
        })
    }
}
