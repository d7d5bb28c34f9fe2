//! Synthetic coastal town: a square street grid rising inland from the
//! shore, with shelters on the high ground.

use evac_core::{GeoPoint, NodeId};
use evac_spatial::{RoadNetwork, RoadNetworkBuilder, SpatialResult};

pub const GRID: usize = 12;

/// Degrees between neighbouring junctions (~110 m).
const SPACING_DEG: f32 = 0.001;

/// South-west corner, on the shore.
const ORIGIN: GeoPoint = GeoPoint { lat: 30.6600, lon: -88.0500 };

/// Row 0 is the shoreline; row `GRID - 1` is the ridge.
pub fn node_at(row: usize, col: usize) -> NodeId {
    NodeId((row * GRID + col) as u32)
}

/// Build the street grid.  Shelters sit on the ridge at the west end,
/// centre, and east end, the centre one with limited space.
pub fn build_network() -> SpatialResult<RoadNetwork> {
    let mut b = RoadNetworkBuilder::with_capacity(GRID * GRID, 4 * GRID * (GRID - 1));
    for row in 0..GRID {
        for col in 0..GRID {
            b.add_node(GeoPoint::new(
                ORIGIN.lat + row as f32 * SPACING_DEG,
                ORIGIN.lon + col as f32 * SPACING_DEG,
            ));
        }
    }

    for row in 0..GRID {
        for col in 0..GRID {
            let here = node_at(row, col);
            let mut link = |to: NodeId| {
                if let (Some(a), Some(z)) = (b.node_pos(here), b.node_pos(to)) {
                    b.add_road(here, to, a.distance_m(z));
                }
            };
            if col + 1 < GRID {
                link(node_at(row, col + 1));
            }
            if row + 1 < GRID {
                link(node_at(row + 1, col));
            }
        }
    }

    let ridge = GRID - 1;
    b.add_safe_location(node_at(ridge, 0), None);
    b.add_safe_location(node_at(ridge, GRID / 2), Some(40));
    b.add_safe_location(node_at(ridge, GRID - 1), None);
    b.build()
}
