//! Routing trait and default multi-target Dijkstra implementation.
//!
//! # Pluggability
//!
//! `evac-mobility` calls routing via the [`Router`] trait, so applications
//! can swap in custom implementations (A*, precomputed reverse trees)
//! without touching the movement engine.
//!
//! # Cost units
//!
//! All costs are hazard-weighted lengths in **millimetres** (`u64`), see
//! [`RoadNetwork::edge_cost`].  Integer comparison keeps the tie-break rules
//! exact.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use evac_core::{EdgeId, NodeId};
use evac_hazard::HazardSnapshot;

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// A path from an origin to a safe location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Edges to traverse in order, from origin to `target`.
    pub edges: Vec<EdgeId>,
    /// The safe location this route ends at.
    pub target: NodeId,
    /// Hazard-weighted cost in millimetres at the time of the query.
    pub total_cost: u64,
}

impl Route {
    /// `true` if the origin already is the target.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// `true` if the edge at `index` exists and may be entered now.  Agents
    /// call this immediately before committing to the next edge.
    pub fn admits_next(
        &self,
        index: usize,
        network: &RoadNetwork,
        hazard: &HazardSnapshot,
        max_penalty: f32,
    ) -> bool {
        self.edges
            .get(index)
            .is_some_and(|&e| network.admits(e, hazard, max_penalty))
    }
}

/// Outcome of a routing query.
///
/// `Unreachable` is a normal result: the agent asking is stranded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    Found(Route),
    Unreachable,
}

impl Routing {
    pub fn route(self) -> Option<Route> {
        match self {
            Routing::Found(r) => Some(r),
            Routing::Unreachable => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Routing::Unreachable)
    }
}

// ── RouteQuery ────────────────────────────────────────────────────────────────

/// Everything a router needs to answer "where is the nearest safety from
/// here, right now?".
#[derive(Clone, Copy)]
pub struct RouteQuery<'a> {
    pub origin: NodeId,
    /// Hazard state at the start of the current tick.
    pub hazard: &'a HazardSnapshot,
    /// Edges penalised above this factor are treated as blocked.
    pub max_penalty: f32,
    /// `closed_targets[n]` marks safe node `n` as full this tick.  Shorter
    /// slices treat the missing nodes as open.
    pub closed_targets: &'a [bool],
}

impl<'a> RouteQuery<'a> {
    /// A query that tolerates any non-blocked edge and has every safe
    /// location open.
    pub fn new(origin: NodeId, hazard: &'a HazardSnapshot) -> Self {
        Self { origin, hazard, max_penalty: f32::INFINITY, closed_targets: &[] }
    }

    pub fn with_max_penalty(mut self, max_penalty: f32) -> Self {
        self.max_penalty = max_penalty;
        self
    }

    pub fn with_closed_targets(mut self, closed: &'a [bool]) -> Self {
        self.closed_targets = closed;
        self
    }

    /// `true` if `node` is a safe location that accepts arrivals this tick
    /// and is not itself flooded.
    #[inline]
    pub fn is_open(&self, network: &RoadNetwork, node: NodeId) -> bool {
        network.is_safe(node)
            && !self.closed_targets.get(node.index()).copied().unwrap_or(false)
            && self.hazard.node(node).is_passable()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so they can be shared across Rayon
/// worker threads during parallel agent activation.
pub trait Router: Send + Sync {
    /// Best route from `query.origin` to the nearest open safe location.
    ///
    /// Returns `Ok(Routing::Unreachable)` when no such path exists and
    /// `Err` only for an invalid query (unknown origin).
    fn find_route(&self, network: &RoadNetwork, query: &RouteQuery<'_>) -> SpatialResult<Routing>;
}

impl<R: Router + ?Sized> Router for Box<R> {
    fn find_route(&self, network: &RoadNetwork, query: &RouteQuery<'_>) -> SpatialResult<Routing> {
        (**self).find_route(network, query)
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Single-source Dijkstra that stops at the first open safe location.
///
/// Ties on total cost are resolved in favour of the lowest target `NodeId`:
/// after the first target is settled the search keeps settling nodes at the
/// same cost and picks the smallest id among the targets found.
#[derive(Debug, Default, Clone, Copy)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn find_route(&self, network: &RoadNetwork, query: &RouteQuery<'_>) -> SpatialResult<Routing> {
        dijkstra(network, query)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn dijkstra(network: &RoadNetwork, query: &RouteQuery<'_>) -> SpatialResult<Routing> {
    let origin = query.origin;
    if !network.contains_node(origin) {
        return Err(SpatialError::NodeNotFound(origin));
    }
    if query.is_open(network, origin) {
        return Ok(Routing::Found(Route { edges: vec![], target: origin, total_cost: 0 }));
    }
    if network.safe_locations().is_empty() {
        return Ok(Routing::Unreachable);
    }

    let n = network.node_count();
    // dist[v] = best known cost (mm) to reach v.
    let mut dist      = vec![u64::MAX; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[origin.index()] = 0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId gives deterministic settle order.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, origin)));

    let mut best: Option<(u64, NodeId)> = None;

    while let Some(Reverse((cost, node))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        if let Some((best_cost, _)) = best {
            if cost > best_cost {
                break;
            }
        }

        if query.is_open(network, node) {
            // Zero-length edges can surface an equal-cost target after a
            // higher id was settled, so compare instead of taking the first.
            match best {
                Some((_, t)) if t <= node => {}
                _ => best = Some((cost, node)),
            }
            continue;
        }

        for (edge, neighbor) in network.neighbors(node) {
            if !network.admits(edge, query.hazard, query.max_penalty) {
                continue;
            }
            let Some(edge_cost) = network.edge_cost(edge, query.hazard) else {
                continue;
            };
            let new_cost = cost.saturating_add(edge_cost);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Ok(match best {
        Some((total_cost, target)) => Routing::Found(reconstruct(network, &prev_edge, target, total_cost)),
        None => Routing::Unreachable,
    })
}

fn reconstruct(network: &RoadNetwork, prev_edge: &[EdgeId], target: NodeId, total_cost: u64) -> Route {
    let mut edges = Vec::new();
    let mut cur = target;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();
    Route { edges, target, total_cost }
}
