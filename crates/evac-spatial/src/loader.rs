//! CSV road-network loader.
//!
//! Three tables, all with header rows:
//!
//! ```csv
//! # nodes.csv
//! id,lat,lon
//! 1001,0.3476,32.5825
//!
//! # edges.csv: length_m may be empty (haversine is used), capacity optional
//! from,to,length_m,oneway,capacity
//! 1001,1002,120.5,false,
//!
//! # safe.csv: capacity optional
//! node,capacity
//! 1002,500
//! ```
//!
//! External node ids are arbitrary `u64`s; they are remapped to dense
//! `NodeId`s in file order.  Edge ids are assigned in file order too, a
//! two-way row producing its forward edge first.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use evac_core::{GeoPoint, NodeId};

use crate::{RoadNetwork, RoadNetworkBuilder, SpatialError, SpatialResult};

#[derive(Deserialize)]
struct NodeRecord {
    id:  u64,
    lat: f32,
    lon: f32,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:     u64,
    to:       u64,
    length_m: Option<f32>,
    #[serde(default)]
    oneway:   bool,
    #[serde(default)]
    capacity: Option<u32>,
}

#[derive(Deserialize)]
struct SafeRecord {
    node:     u64,
    #[serde(default)]
    capacity: Option<u32>,
}

/// A network loaded from CSV, with the external-id mapping.
pub struct LoadedNetwork {
    pub network: RoadNetwork,
    /// `external_ids[node.index()]` is the id used in the source files.
    pub external_ids: Vec<u64>,
    id_map: HashMap<u64, NodeId>,
}

impl LoadedNetwork {
    /// Dense `NodeId` for an external id.
    pub fn node_id(&self, external: u64) -> Option<NodeId> {
        self.id_map.get(&external).copied()
    }
}

/// Load `nodes`, `edges`, and `safe` CSV files.
pub fn load_network_csv(
    nodes_path: &Path,
    edges_path: &Path,
    safe_path:  &Path,
) -> SpatialResult<LoadedNetwork> {
    load_network_reader(
        std::fs::File::open(nodes_path)?,
        std::fs::File::open(edges_path)?,
        std::fs::File::open(safe_path)?,
    )
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
pub fn load_network_reader<N: Read, E: Read, S: Read>(
    nodes: N,
    edges: E,
    safe:  S,
) -> SpatialResult<LoadedNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let mut id_map: HashMap<u64, NodeId> = HashMap::new();
    let mut external_ids = Vec::new();

    for (line, result) in csv::Reader::from_reader(nodes).deserialize::<NodeRecord>().enumerate() {
        let row = result.map_err(|e| SpatialError::Parse(format!("nodes: {e}")))?;
        if id_map.contains_key(&row.id) {
            return Err(SpatialError::Parse(format!(
                "nodes row {}: duplicate node id {}",
                line + 1,
                row.id
            )));
        }
        let id = builder.add_node(GeoPoint::new(row.lat, row.lon));
        id_map.insert(row.id, id);
        external_ids.push(row.id);
    }

    let lookup = |ext: u64, line: usize| {
        id_map.get(&ext).copied().ok_or_else(|| {
            SpatialError::Parse(format!("edges row {}: unknown node id {ext}", line + 1))
        })
    };

    let mut edge_rows = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(edges);
    for (line, result) in edge_rows.deserialize::<EdgeRecord>().enumerate() {
        let row = result.map_err(|e| SpatialError::Parse(format!("edges: {e}")))?;
        let from = lookup(row.from, line)?;
        let to   = lookup(row.to, line)?;
        let length_m = match row.length_m {
            Some(l) => l,
            None => match (builder.node_pos(from), builder.node_pos(to)) {
                (Some(a), Some(b)) => a.distance_m(b),
                _ => 0.0,
            },
        };

        let forward = builder.add_directed_edge(from, to, length_m);
        if let Some(cap) = row.capacity {
            builder.set_edge_capacity(forward, cap);
        }
        if !row.oneway {
            let reverse = builder.add_directed_edge(to, from, length_m);
            if let Some(cap) = row.capacity {
                builder.set_edge_capacity(reverse, cap);
            }
        }
    }

    let mut safe_rows = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(safe);
    for (line, result) in safe_rows.deserialize::<SafeRecord>().enumerate() {
        let row = result.map_err(|e| SpatialError::Parse(format!("safe: {e}")))?;
        let node = id_map.get(&row.node).copied().ok_or_else(|| {
            SpatialError::Parse(format!("safe row {}: unknown node id {}", line + 1, row.node))
        })?;
        builder.add_safe_location(node, row.capacity);
    }

    let network = builder.build()?;
    log::info!(
        "loaded road network: {} nodes, {} edges, {} safe locations",
        network.node_count(),
        network.edge_count(),
        network.safe_locations().len()
    );

    Ok(LoadedNetwork { network, external_ids, id_map })
}
