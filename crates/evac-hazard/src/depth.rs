//! Flood depth to hazard state conversion.

use crate::HazardState;

/// Thresholds that turn a water depth into a [`HazardState`].
///
/// | Depth                         | State                                  |
/// |-------------------------------|----------------------------------------|
/// | `<= 0`                        | `Passable`                             |
/// | `0 < d < block_depth_m`       | `Penalty(1 + d * penalty_per_m)`       |
/// | `>= block_depth_m`            | `Blocked`                              |
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepthPolicy {
    pub block_depth_m: f32,
    pub penalty_per_m: f32,
}

impl Default for DepthPolicy {
    /// 0.5 m blocks a road; shallower water slows traffic by 4x per metre.
    fn default() -> Self {
        Self { block_depth_m: 0.5, penalty_per_m: 4.0 }
    }
}

impl DepthPolicy {
    /// Every wet element is blocked (flood-zone behaviour:
    /// anything intersecting the hazard polygon is removed).
    pub fn any_water_blocks() -> Self {
        Self { block_depth_m: f32::MIN_POSITIVE, penalty_per_m: 0.0 }
    }

    pub fn state_for(&self, depth_m: f32) -> HazardState {
        if depth_m.is_nan() || depth_m >= self.block_depth_m {
            HazardState::Blocked
        } else if depth_m <= 0.0 {
            HazardState::Passable
        } else {
            HazardState::penalty(1.0 + depth_m * self.penalty_per_m)
        }
    }
}
