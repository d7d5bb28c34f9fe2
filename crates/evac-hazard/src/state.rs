//! Per-element hazard state.

use std::fmt;

use evac_core::{EdgeId, NodeId};

/// Passability of one edge or node at one tick.
///
/// States are ordered by severity:
/// `Passable < Penalty(x) < Penalty(y > x) < Blocked`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HazardState {
    #[default]
    Passable,
    /// Passable, but traversal cost (and time) is multiplied by the factor.
    /// The factor is always finite and `>= 1.0` in a validated series.
    Penalty(f32),
    Blocked,
}

impl HazardState {
    /// Build a penalty state, normalising degenerate factors: `<= 1.0` is
    /// `Passable`, non-finite is `Blocked`.
    pub fn penalty(factor: f32) -> Self {
        if !factor.is_finite() {
            HazardState::Blocked
        } else if factor <= 1.0 {
            HazardState::Passable
        } else {
            HazardState::Penalty(factor)
        }
    }

    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, HazardState::Blocked)
    }

    /// Cost multiplier, or `None` when blocked.
    #[inline]
    pub fn multiplier(self) -> Option<f32> {
        match self {
            HazardState::Passable   => Some(1.0),
            HazardState::Penalty(f) => Some(f),
            HazardState::Blocked    => None,
        }
    }

    /// `true` if an agent tolerating penalties up to `max_penalty` may enter.
    #[inline]
    pub fn admits(self, max_penalty: f32) -> bool {
        match self {
            HazardState::Passable   => true,
            HazardState::Penalty(f) => f <= max_penalty,
            HazardState::Blocked    => false,
        }
    }

    /// Severity on a single axis: the multiplier, with blocked as infinity.
    #[inline]
    pub fn severity(self) -> f32 {
        self.multiplier().unwrap_or(f32::INFINITY)
    }

    /// The more severe of two states.
    #[inline]
    pub fn worst(self, other: HazardState) -> HazardState {
        if other.severity() > self.severity() { other } else { self }
    }

    /// `true` if `self` is strictly less severe than `before`.
    #[inline]
    pub fn recedes_from(self, before: HazardState) -> bool {
        self.severity() < before.severity()
    }
}

impl fmt::Display for HazardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HazardState::Passable   => f.write_str("passable"),
            HazardState::Penalty(x) => write!(f, "penalty x{x:.2}"),
            HazardState::Blocked    => f.write_str("blocked"),
        }
    }
}

/// A network element that carries hazard state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HazardElement {
    Edge(EdgeId),
    Node(NodeId),
}

impl fmt::Display for HazardElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HazardElement::Edge(e) => write!(f, "{e}"),
            HazardElement::Node(n) => write!(f, "{n}"),
        }
    }
}
