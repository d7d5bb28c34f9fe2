//! Per-agent movement state.

use evac_core::{EdgeId, NodeId};
use evac_spatial::Route;

/// Where one agent is and where it is going.
///
/// An agent is either **at a node** (`edge == EdgeId::INVALID`) or **on an
/// edge**, `progress_m` metres from its source node.  `node` is always the
/// last node the agent stood on, so while on an edge it equals the edge's
/// source.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementState {
    pub node: NodeId,

    /// Edge being traversed, or `EdgeId::INVALID` when at `node`.
    pub edge: EdgeId,

    /// Metres travelled along `edge`.  Zero when at a node.
    pub progress_m: f32,

    /// Current plan; `None` before the first routing query and after
    /// stranding.
    pub route: Option<Route>,

    /// Index into `route.edges`: the edge being traversed when on an edge,
    /// otherwise the next edge to enter.
    pub route_index: usize,

    /// Times an existing route was replaced.
    pub reroute_count: u32,
}

impl MovementState {
    /// An agent standing at `node` with no route yet.
    #[inline]
    pub fn at_node(node: NodeId) -> Self {
        Self {
            node,
            edge:          EdgeId::INVALID,
            progress_m:    0.0,
            route:         None,
            route_index:   0,
            reroute_count: 0,
        }
    }

    #[inline]
    pub fn is_at_node(&self) -> bool {
        !self.edge.is_valid()
    }

    #[inline]
    pub fn is_on_edge(&self) -> bool {
        self.edge.is_valid()
    }

    /// Safe location of the current route.
    pub fn target(&self) -> Option<NodeId> {
        self.route.as_ref().map(|r| r.target)
    }

    /// Edges of the current route not yet entered.
    pub fn remaining_edges(&self) -> &[EdgeId] {
        match &self.route {
            Some(r) => {
                let next = if self.is_on_edge() { self.route_index + 1 } else { self.route_index };
                r.edges.get(next..).unwrap_or(&[])
            }
            None => &[],
        }
    }

    /// `true` if the agent stands on the final node of its route.
    pub fn has_arrived(&self) -> bool {
        self.is_at_node()
            && self
                .route
                .as_ref()
                .is_some_and(|r| self.route_index >= r.edges.len() && r.target == self.node)
    }
}
