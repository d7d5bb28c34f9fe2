//! CSV flood-depth loader.
//!
//! # CSV format
//!
//! One row per change.  Rows for different ticks may appear in any order;
//! for repeated rows of the same element and tick the last row wins.
//!
//! ```csv
//! tick,element,id,depth_m
//! 0,node,4,0.0
//! 12,edge,17,0.2
//! 18,edge,17,0.8
//! 18,node,9,1.1
//! ```
//!
//! `element` is `edge` or `node`; `id` is the dense `EdgeId` / `NodeId` of
//! the loaded network.  Depths go through a [`DepthPolicy`].

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use evac_core::{EdgeId, NodeId, Tick};

use crate::{DepthPolicy, HazardError, HazardResult, HazardSeries, HazardSeriesBuilder};

#[derive(Deserialize)]
struct DepthRecord {
    tick:    u64,
    element: String,
    id:      u32,
    depth_m: f32,
}

/// Load a depth CSV into `builder` and build the series.
///
/// The builder carries the element counts, horizon, and recession policy.
pub fn load_series_csv(
    path:    &Path,
    builder: HazardSeriesBuilder,
    policy:  &DepthPolicy,
) -> HazardResult<HazardSeries> {
    let file = std::fs::File::open(path)?;
    load_series_reader(file, builder, policy)
}

/// Like [`load_series_csv`] but accepts any `Read` source.
pub fn load_series_reader<R: Read>(
    reader:      R,
    mut builder: HazardSeriesBuilder,
    policy:      &DepthPolicy,
) -> HazardResult<HazardSeries> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    for (line, result) in csv_reader.deserialize::<DepthRecord>().enumerate() {
        let row = result.map_err(|e| HazardError::Parse(e.to_string()))?;
        let state = policy.state_for(row.depth_m);
        match row.element.trim() {
            "edge" => builder.set_edge(Tick(row.tick), EdgeId(row.id), state),
            "node" => builder.set_node(Tick(row.tick), NodeId(row.id), state),
            other => {
                return Err(HazardError::Parse(format!(
                    "row {}: invalid element {other:?}: expected \"edge\" or \"node\"",
                    line + 1
                )));
            }
        }
    }

    builder.build()
}
