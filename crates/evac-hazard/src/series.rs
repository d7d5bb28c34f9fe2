//! `HazardSeries` — keyframed hazard states with cached snapshots.
//!
//! Flood data arrives as a sparse list of changes ("edge 17 becomes blocked
//! at tick 40").  The builder collects them in a `BTreeMap<Tick, Vec<_>>`
//! and `build()` folds them into one full snapshot per distinct change tick.
//! `state_at(t)` is then a binary search for the last keyframe `<= t`: O(log
//! K) with no allocation, where K is the number of distinct change ticks.

use std::collections::BTreeMap;
use std::sync::Arc;

use evac_core::{EdgeId, NodeId, Tick};

use crate::{HazardElement, HazardError, HazardModel, HazardResult, HazardSnapshot, HazardState};

/// A precomputed, immutable hazard time series.
///
/// Tick 0 always has a keyframe.  Ticks after the configured horizon are a
/// data gap and yield [`HazardError::NoSnapshot`].
#[derive(Debug, Clone)]
pub struct HazardSeries {
    keyframes: Vec<Arc<HazardSnapshot>>,
    horizon:   Option<Tick>,
}

impl HazardSeries {
    /// Ticks at which the hazard state changes (always starts with tick 0).
    pub fn keyframe_ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        self.keyframes.iter().map(|k| k.since)
    }

    /// Last tick covered by the data, if bounded.
    pub fn horizon(&self) -> Option<Tick> {
        self.horizon
    }

    /// Final state of the series (the flood at its peak for monotonic data).
    pub fn last(&self) -> &HazardSnapshot {
        // `build` always emits the tick-0 keyframe.
        &self.keyframes[self.keyframes.len() - 1]
    }
}

impl HazardModel for HazardSeries {
    fn state_at(&self, tick: Tick) -> HazardResult<Arc<HazardSnapshot>> {
        if let Some(horizon) = self.horizon {
            if tick > horizon {
                return Err(HazardError::NoSnapshot { tick, horizon });
            }
        }
        let idx = self.keyframes.partition_point(|k| k.since <= tick);
        // keyframes[0].since == Tick::ZERO, so idx >= 1 for every tick.
        Ok(Arc::clone(&self.keyframes[idx - 1]))
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Collect hazard changes, then [`build`](Self::build) a [`HazardSeries`].
///
/// # Example
///
/// ```
/// use evac_core::{EdgeId, Tick};
/// use evac_hazard::{HazardModel, HazardSeriesBuilder};
///
/// let mut b = HazardSeriesBuilder::new(3, 4);
/// b.block_edge_from(Tick(2), EdgeId(0));
/// let series = b.horizon(Tick(10)).build().unwrap();
///
/// assert!(series.state_at(Tick(1)).unwrap().edge(EdgeId(0)).is_passable());
/// assert!(!series.state_at(Tick(2)).unwrap().edge(EdgeId(0)).is_passable());
/// assert!(series.state_at(Tick(11)).is_err());
/// ```
pub struct HazardSeriesBuilder {
    node_count:      usize,
    edge_count:      usize,
    changes:         BTreeMap<Tick, Vec<(HazardElement, HazardState)>>,
    horizon:         Option<Tick>,
    allow_recession: bool,
}

impl HazardSeriesBuilder {
    /// Builder for a network with `node_count` nodes and `edge_count` edges.
    pub fn new(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            edge_count,
            changes: BTreeMap::new(),
            horizon: None,
            allow_recession: false,
        }
    }

    /// Last tick the data covers.  Requests beyond it fail.  Without a
    /// horizon the last keyframe holds forever.
    pub fn horizon(mut self, tick: Tick) -> Self {
        self.horizon = Some(tick);
        self
    }

    /// Permit elements to become less severe over time (flood recession).
    /// Off by default: a flooded element stays flooded for the run.
    pub fn allow_recession(mut self, allow: bool) -> Self {
        self.allow_recession = allow;
        self
    }

    /// Set the state of `edge` from `tick` onwards.  Later calls for the same
    /// element and tick win; only the final state of a tick is checked for
    /// recession.
    pub fn set_edge(&mut self, tick: Tick, edge: EdgeId, state: HazardState) {
        self.changes.entry(tick).or_default().push((HazardElement::Edge(edge), state));
    }

    /// Set the state of `node` from `tick` onwards.
    pub fn set_node(&mut self, tick: Tick, node: NodeId, state: HazardState) {
        self.changes.entry(tick).or_default().push((HazardElement::Node(node), state));
    }

    pub fn block_edge_from(&mut self, tick: Tick, edge: EdgeId) {
        self.set_edge(tick, edge, HazardState::Blocked);
    }

    pub fn block_node_from(&mut self, tick: Tick, node: NodeId) {
        self.set_node(tick, node, HazardState::Blocked);
    }

    /// Number of recorded changes.
    pub fn change_count(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }

    /// Validate every change and fold them into cached keyframes.
    ///
    /// # Errors
    ///
    /// - [`HazardError::OutOfRange`] for an id beyond the element counts.
    /// - [`HazardError::InvalidState`] for a penalty that is not finite and `>= 1`.
    /// - [`HazardError::Recession`] for a receding element in a monotonic series.
    /// - [`HazardError::Config`] for a change scheduled after the horizon.
    pub fn build(self) -> HazardResult<HazardSeries> {
        if let (Some(horizon), Some((&last, _))) = (self.horizon, self.changes.last_key_value()) {
            if last > horizon {
                return Err(HazardError::Config(format!(
                    "change at {last} lies beyond the series horizon {horizon}"
                )));
            }
        }

        let mut current = HazardSnapshot::passable(Tick::ZERO, self.node_count, self.edge_count);
        let mut keyframes = Vec::with_capacity(self.changes.len() + 1);
        if !self.changes.contains_key(&Tick::ZERO) {
            keyframes.push(Arc::new(current.clone()));
        }

        for (tick, changes) in self.changes {
            // Apply every change of the tick first, so the last write for an
            // element wins.  Recession is judged on the folded result against
            // the previous keyframe (all passable before the first one).
            let previous = keyframes.last().cloned();
            let mut touched = Vec::with_capacity(changes.len());
            for (element, state) in changes {
                validate_state(element, state)?;
                let slot = match element {
                    HazardElement::Edge(e) => current.edges.get_mut(e.index()).ok_or(
                        HazardError::OutOfRange { element, count: self.edge_count },
                    )?,
                    HazardElement::Node(n) => current.nodes.get_mut(n.index()).ok_or(
                        HazardError::OutOfRange { element, count: self.node_count },
                    )?,
                };
                *slot = state;
                touched.push(element);
            }
            if !self.allow_recession {
                for element in touched {
                    let before = previous.as_deref().map_or(HazardState::Passable, |p| p.get(element));
                    if current.get(element).recedes_from(before) {
                        return Err(HazardError::Recession { tick, element });
                    }
                }
            }
            current.since = tick;
            keyframes.push(Arc::new(current.clone()));
        }

        Ok(HazardSeries { keyframes, horizon: self.horizon })
    }
}

fn validate_state(element: HazardElement, state: HazardState) -> HazardResult<()> {
    if let HazardState::Penalty(f) = state {
        if !f.is_finite() || f < 1.0 {
            return Err(HazardError::InvalidState {
                element,
                reason: format!("penalty factor {f} must be finite and >= 1"),
            });
        }
    }
    Ok(())
}
