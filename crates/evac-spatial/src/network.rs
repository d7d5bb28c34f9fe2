//! Road network representation and builder.
//!
//! # Data layout
//!
//! Edges keep the id they were given at insertion (so external hazard data
//! can refer to them), and outgoing adjacency is stored in **Compressed
//! Sparse Row (CSR)** form on top of that: the outgoing edges of node `n` are
//!
//! ```text
//! out_edges[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! so a neighbour scan in Dijkstra's inner loop is one contiguous slice.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! to snap population coordinates to road nodes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use evac_core::{EdgeId, GeoPoint, NodeId};
use evac_hazard::{HazardSnapshot, HazardState};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Good enough for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── SafeLocation ──────────────────────────────────────────────────────────────

/// An evacuation destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SafeLocation {
    pub node: NodeId,
    /// Maximum number of evacuees; `None` is unlimited.
    pub capacity: Option<u32>,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format, safe-location table, and a spatial
/// index for node snapping.
///
/// Immutable after [`RoadNetworkBuilder::build`]; all hazard-dependent
/// queries take the tick's [`HazardSnapshot`] explicitly.
pub struct RoadNetwork {
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// CSR row pointer into `out_edges`.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Outgoing edge ids grouped by source node (ascending `EdgeId` within
    /// a group, so neighbour order is stable).
    pub out_edges: Vec<EdgeId>,

    /// Source node of each edge.  Indexed by `EdgeId`.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres: the base traversal cost.
    pub edge_length_m: Vec<f32>,

    /// Optional vehicle capacity per edge.  Carried for analysis; movement
    /// does not contend for it.
    pub edge_capacity: Vec<Option<u32>>,

    safe_locations: Vec<SafeLocation>,
    /// `safe_slot[n]` is the index into `safe_locations`, or `u32::MAX`.
    safe_slot: Vec<u32>,

    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// A network with no nodes, edges, or safe locations.
    pub fn empty() -> Self {
        RoadNetwork {
            node_pos:       Vec::new(),
            node_out_start: vec![0],
            out_edges:      Vec::new(),
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_length_m:  Vec::new(),
            edge_capacity:  Vec::new(),
            safe_locations: Vec::new(),
            safe_slot:      Vec::new(),
            spatial_idx:    RTree::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    #[inline]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        edge.index() < self.edge_count()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// The `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        &self.out_edges[start..end]
    }

    /// `(edge, neighbour)` pairs reachable in one hop from `node`.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.out_edges(node).iter().map(|&e| (e, self.edge_to[e.index()]))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).len()
    }

    /// First edge from `from` to `to`, if any.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.contains_node(from) {
            return None;
        }
        self.neighbors(from).find(|&(_, n)| n == to).map(|(e, _)| e)
    }

    /// Both directions of the road between `a` and `b` (one entry for a
    /// one-way street, none if they are not adjacent).
    pub fn road_edges(&self, a: NodeId, b: NodeId) -> Vec<EdgeId> {
        self.find_edge(a, b).into_iter().chain(self.find_edge(b, a)).collect()
    }

    // ── Hazard-aware queries ──────────────────────────────────────────────

    /// Effective hazard on `edge`: the worst of the edge itself and both of
    /// its endpoints (a flooded junction closes every road through it).
    #[inline]
    pub fn edge_state(&self, edge: EdgeId, hazard: &HazardSnapshot) -> HazardState {
        let i = edge.index();
        hazard
            .edge(edge)
            .worst(hazard.node(self.edge_from[i]))
            .worst(hazard.node(self.edge_to[i]))
    }

    #[inline]
    pub fn is_passable(&self, edge: EdgeId, hazard: &HazardSnapshot) -> bool {
        self.edge_state(edge, hazard).is_passable()
    }

    /// `true` if an agent tolerating penalties up to `max_penalty` may enter
    /// `edge` under `hazard`.
    #[inline]
    pub fn admits(&self, edge: EdgeId, hazard: &HazardSnapshot, max_penalty: f32) -> bool {
        self.edge_state(edge, hazard).admits(max_penalty)
    }

    /// Hazard-weighted traversal cost in millimetres, or `None` if blocked.
    ///
    /// Integer costs keep route comparison exact, so ties are broken only by
    /// the explicit tie-break rules and never by float rounding.
    #[inline]
    pub fn edge_cost(&self, edge: EdgeId, hazard: &HazardSnapshot) -> Option<u64> {
        let mult = self.edge_state(edge, hazard).multiplier()?;
        Some(cost_mm(self.edge_length_m[edge.index()], mult))
    }

    // ── Safe locations ────────────────────────────────────────────────────

    pub fn safe_locations(&self) -> &[SafeLocation] {
        &self.safe_locations
    }

    #[inline]
    pub fn is_safe(&self, node: NodeId) -> bool {
        self.safe_slot.get(node.index()).is_some_and(|&s| s != u32::MAX)
    }

    pub fn safe_location(&self, node: NodeId) -> Option<&SafeLocation> {
        let slot = *self.safe_slot.get(node.index())?;
        self.safe_locations.get(slot as usize)
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Position `progress_m` metres along `edge`.
    pub fn point_on_edge(&self, edge: EdgeId, progress_m: f32) -> GeoPoint {
        let i = edge.index();
        let from = self.node_pos[self.edge_from[i].index()];
        let to   = self.node_pos[self.edge_to[i].index()];
        let len  = self.edge_length_m[i];
        let t = if len > 0.0 { progress_m / len } else { 1.0 };
        from.lerp(to, t)
    }

    /// The `NodeId` of the nearest road node to `pos`; `None` if the network
    /// has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

/// Metres × multiplier → integer millimetres.
#[inline]
pub(crate) fn cost_mm(length_m: f32, mult: f32) -> u64 {
    (length_m as f64 * mult as f64 * 1_000.0).round() as u64
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use evac_core::GeoPoint;
/// use evac_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(0.33, 32.55));
/// let c = b.add_node(GeoPoint::new(0.34, 32.56));
/// b.add_road(a, c, 1_200.0);
/// b.add_safe_location(c, None);
/// let net = b.build().unwrap();
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// assert!(net.is_safe(c));
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    raw_edges: Vec<RawEdge>,
    safe:      Vec<SafeLocation>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f32,
    capacity: Option<u32>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new(), safe: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            safe:      Vec::new(),
        }
    }

    /// Add a junction and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge and return its `EdgeId` (sequential from 0).
    ///
    /// Endpoints and length are validated in [`build`](Self::build).
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f32) -> EdgeId {
        let id = EdgeId(self.raw_edges.len() as u32);
        self.raw_edges.push(RawEdge { from, to, length_m, capacity: None });
        id
    }

    /// Add both directions of a two-way road; returns `(a→b, b→a)`.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f32) -> (EdgeId, EdgeId) {
        (self.add_directed_edge(a, b, length_m), self.add_directed_edge(b, a, length_m))
    }

    /// Attach a capacity to an edge added earlier.  Unknown ids are ignored.
    pub fn set_edge_capacity(&mut self, edge: EdgeId, capacity: u32) {
        if let Some(raw) = self.raw_edges.get_mut(edge.index()) {
            raw.capacity = Some(capacity);
        }
    }

    /// Mark `node` as an evacuation destination.
    pub fn add_safe_location(&mut self, node: NodeId, capacity: Option<u32>) {
        self.safe.push(SafeLocation { node, capacity });
    }

    /// Position of a node added earlier (used by loaders to derive lengths).
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(id.index()).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Validate and produce a [`RoadNetwork`].
    ///
    /// # Errors
    ///
    /// - [`SpatialError::InvalidEdge`] if an endpoint does not exist or the
    ///   length is negative or not finite.
    /// - [`SpatialError::NodeNotFound`] for a safe location on a missing node.
    /// - [`SpatialError::DuplicateSafeLocation`] for a repeated safe node.
    /// - [`SpatialError::DisconnectedSafeLocation`] for a safe node with no
    ///   incoming edge in a network of more than one node.
    pub fn build(self) -> SpatialResult<RoadNetwork> {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        for (i, e) in self.raw_edges.iter().enumerate() {
            let edge = EdgeId(i as u32);
            for end in [e.from, e.to] {
                if end.index() >= node_count {
                    return Err(SpatialError::InvalidEdge {
                        edge,
                        reason: format!("endpoint {end} does not exist"),
                    });
                }
            }
            if !e.length_m.is_finite() || e.length_m < 0.0 {
                return Err(SpatialError::InvalidEdge {
                    edge,
                    reason: format!("length {} m must be finite and non-negative", e.length_m),
                });
            }
        }

        // CSR over insertion-ordered edge ids: counting sort by source keeps
        // ascending EdgeId order inside each node's slice.
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &self.raw_edges {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        let mut cursor: Vec<u32> = node_out_start[..node_count].to_vec();
        let mut out_edges = vec![EdgeId::INVALID; edge_count];
        for (i, e) in self.raw_edges.iter().enumerate() {
            let slot = &mut cursor[e.from.index()];
            out_edges[*slot as usize] = EdgeId(i as u32);
            *slot += 1;
        }

        let mut in_degree = vec![0u32; node_count];
        for e in &self.raw_edges {
            if e.from != e.to {
                in_degree[e.to.index()] += 1;
            }
        }

        let mut safe_slot = vec![u32::MAX; node_count];
        for (i, s) in self.safe.iter().enumerate() {
            let slot = safe_slot
                .get_mut(s.node.index())
                .ok_or(SpatialError::NodeNotFound(s.node))?;
            if *slot != u32::MAX {
                return Err(SpatialError::DuplicateSafeLocation(s.node));
            }
            if node_count > 1 && in_degree[s.node.index()] == 0 {
                return Err(SpatialError::DisconnectedSafeLocation(s.node));
            }
            *slot = i as u32;
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry { point: [pos.lat, pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        log::debug!(
            "built road network: {node_count} nodes, {edge_count} edges, {} safe locations",
            self.safe.len()
        );

        Ok(RoadNetwork {
            node_pos:       self.nodes,
            node_out_start,
            out_edges,
            edge_from:      self.raw_edges.iter().map(|e| e.from).collect(),
            edge_to:        self.raw_edges.iter().map(|e| e.to).collect(),
            edge_length_m:  self.raw_edges.iter().map(|e| e.length_m).collect(),
            edge_capacity:  self.raw_edges.iter().map(|e| e.capacity).collect(),
            safe_locations: self.safe,
            safe_slot,
            spatial_idx,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
