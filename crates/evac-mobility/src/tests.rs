//! Unit tests for evac-mobility.

use evac_behavior::TickContext;
use evac_core::{EdgeId, GeoPoint, NodeId, Tick};
use evac_hazard::{HazardSnapshot, HazardState};
use evac_spatial::{DijkstraRouter, RoadNetwork, RoadNetworkBuilder};

use crate::{MobilityEngine, MovementState, StepInput, StepKind, StepOutcome, advance};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Line A ↔ B ↔ C, 100 m per segment, C safe.
///
/// Edges: 0 = A→B, 1 = B→A, 2 = B→C, 3 = C→B.
fn line() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let a = b.add_node(GeoPoint::new(0.0, 0.0));
    let n = b.add_node(GeoPoint::new(0.0, 0.001));
    let c = b.add_node(GeoPoint::new(0.0, 0.002));
    b.add_road(a, n, 100.0);
    b.add_road(n, c, 100.0);
    b.add_safe_location(c, None);
    b.build().unwrap()
}

/// Square A-B-D and A-C-D with a safe D; the B side is shorter.
///
/// ```text
///   A ──100── B ──100── D (safe)
///   └──150─── C ──150──┘
/// ```
fn square() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let a = b.add_node(GeoPoint::new(0.0, 0.0));
    let nb = b.add_node(GeoPoint::new(0.0, 0.001));
    let c = b.add_node(GeoPoint::new(-0.001, 0.001));
    let d = b.add_node(GeoPoint::new(0.0, 0.002));
    b.add_road(a, nb, 100.0); // 0, 1
    b.add_road(nb, d, 100.0); // 2, 3
    b.add_road(a, c, 150.0);  // 4, 5
    b.add_road(c, d, 150.0);  // 6, 7
    b.add_safe_location(d, None);
    b.build().unwrap()
}

fn step(
    net: &RoadNetwork,
    state: &mut MovementState,
    hazard: &HazardSnapshot,
    budget_m: f32,
) -> StepOutcome {
    step_with(net, state, hazard, budget_m, f32::INFINITY, &[])
}

fn step_with(
    net: &RoadNetwork,
    state: &mut MovementState,
    hazard: &HazardSnapshot,
    budget_m: f32,
    max_penalty: f32,
    closed: &[bool],
) -> StepOutcome {
    let ctx = TickContext::new(Tick(1), 100, hazard);
    let input = StepInput { network: net, ctx: &ctx, budget_m, max_penalty, closed_targets: closed };
    advance(&DijkstraRouter, state, &input).unwrap()
}

fn blocked_edges(net: &RoadNetwork, edges: &[u32]) -> HazardSnapshot {
    let mut snap = HazardSnapshot::passable(Tick(0), net.node_count(), net.edge_count());
    for &e in edges {
        snap.edges[e as usize] = HazardState::Blocked;
    }
    snap
}

// ── MovementState ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod movement_state {
    use evac_spatial::Route;

    use super::*;

    #[test]
    fn fresh_state_is_at_node_without_route() {
        let s = MovementState::at_node(NodeId(3));
        assert!(s.is_at_node());
        assert!(!s.is_on_edge());
        assert_eq!(s.target(), None);
        assert!(s.remaining_edges().is_empty());
        assert!(!s.has_arrived());
    }

    #[test]
    fn remaining_edges_skips_current() {
        let mut s = MovementState::at_node(NodeId(0));
        s.route = Some(Route { edges: vec![EdgeId(0), EdgeId(2)], target: NodeId(2), total_cost: 0 });
        assert_eq!(s.remaining_edges(), &[EdgeId(0), EdgeId(2)]);
        s.edge = EdgeId(0);
        assert_eq!(s.remaining_edges(), &[EdgeId(2)]);
    }
}

// ── Basic movement ────────────────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use super::*;

    #[test]
    fn one_edge_per_tick_reaches_safety_in_two() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let mut s = MovementState::at_node(NodeId(0));

        let t1 = step(&net, &mut s, &hazard, 100.0);
        assert_eq!(t1.kind, StepKind::Moved);
        assert_eq!(s.node, NodeId(1));
        assert!(s.is_at_node());
        assert_eq!(t1.travelled_m, 100.0);

        let t2 = step(&net, &mut s, &hazard, 100.0);
        assert_eq!(t2.kind, StepKind::Evacuated { target: NodeId(2) });
        assert_eq!(s.node, NodeId(2));
        assert_eq!(s.reroute_count, 0);
    }

    #[test]
    fn partial_traversal_tracks_progress() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let mut s = MovementState::at_node(NodeId(0));

        let o = step(&net, &mut s, &hazard, 30.0);
        assert_eq!(o.kind, StepKind::Moved);
        assert_eq!(s.edge, EdgeId(0));
        assert!((s.progress_m - 30.0).abs() < 1e-4);

        step(&net, &mut s, &hazard, 30.0);
        step(&net, &mut s, &hazard, 30.0);
        assert!((s.progress_m - 90.0).abs() < 1e-3);

        // 10 m to B, then 40 m onto B→C.
        step(&net, &mut s, &hazard, 50.0);
        assert_eq!(s.node, NodeId(1));
        assert_eq!(s.edge, EdgeId(2));
        assert!((s.progress_m - 40.0).abs() < 1e-3);
    }

    #[test]
    fn large_budget_crosses_several_edges() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let mut s = MovementState::at_node(NodeId(0));
        let o = step(&net, &mut s, &hazard, 1_000.0);
        assert_eq!(o.kind, StepKind::Evacuated { target: NodeId(2) });
        assert!((o.travelled_m - 200.0).abs() < 1e-3);
    }

    #[test]
    fn arriving_with_zero_budget_still_evacuates() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let mut s = MovementState::at_node(NodeId(0));
        let o = step(&net, &mut s, &hazard, 200.0);
        assert_eq!(o.kind, StepKind::Evacuated { target: NodeId(2) });
    }

    #[test]
    fn penalty_slows_progress() {
        let net = line();
        let mut hazard = HazardSnapshot::passable(Tick(0), 3, 4);
        hazard.edges[0] = HazardState::Penalty(2.0);
        let mut s = MovementState::at_node(NodeId(0));
        step(&net, &mut s, &hazard, 100.0);
        assert_eq!(s.edge, EdgeId(0));
        assert!((s.progress_m - 50.0).abs() < 1e-4);
    }

    #[test]
    fn zero_budget_waits() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let mut s = MovementState::at_node(NodeId(0));
        let o = step(&net, &mut s, &hazard, 0.0);
        assert_eq!(o.kind, StepKind::Waiting);
        assert!(s.route.is_some(), "first step still plans");
        assert_eq!(s.node, NodeId(0));
    }

    #[test]
    fn starting_on_safe_location_evacuates_immediately() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let mut s = MovementState::at_node(NodeId(2));
        let o = step(&net, &mut s, &hazard, 100.0);
        assert_eq!(o.kind, StepKind::Evacuated { target: NodeId(2) });
        assert_eq!(o.travelled_m, 0.0);
    }
}

// ── Hazard response ───────────────────────────────────────────────────────────

#[cfg(test)]
mod hazard_response {
    use super::*;

    #[test]
    fn no_safe_location_strands_at_start() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 0.001));
        b.add_road(a, c, 100.0);
        let net = b.build().unwrap();
        let hazard = HazardSnapshot::default();

        let mut s = MovementState::at_node(a);
        let o = step(&net, &mut s, &hazard, 100.0);
        assert_eq!(o.kind, StepKind::Stranded);
        assert_eq!(s.node, a);
        assert!(s.route.is_none());
    }

    #[test]
    fn next_edge_blocked_strands_at_node() {
        let net = line();
        let mut s = MovementState::at_node(NodeId(0));
        step(&net, &mut s, &HazardSnapshot::default(), 100.0);
        assert_eq!(s.node, NodeId(1));

        // B→C floods.
        let hazard = blocked_edges(&net, &[2, 3]);
        let o = step(&net, &mut s, &hazard, 100.0);
        assert_eq!(o.kind, StepKind::Stranded);
        assert_eq!(s.node, NodeId(1));
    }

    #[test]
    fn edge_behind_agent_blocked_is_harmless() {
        let net = line();
        let mut s = MovementState::at_node(NodeId(0));
        step(&net, &mut s, &HazardSnapshot::default(), 100.0);

        let hazard = blocked_edges(&net, &[0, 1]);
        let o = step(&net, &mut s, &hazard, 100.0);
        assert_eq!(o.kind, StepKind::Evacuated { target: NodeId(2) });
    }

    #[test]
    fn reroutes_around_newly_blocked_edge() {
        let net = square();
        let mut s = MovementState::at_node(NodeId(0));
        // Tick 1 plans A→B→D; with no budget the agent stays at A.
        step(&net, &mut s, &HazardSnapshot::default(), 0.0);
        assert_eq!(s.route.as_ref().map(|r| r.edges.clone()), Some(vec![EdgeId(0), EdgeId(2)]));

        let hazard = blocked_edges(&net, &[0]);
        let o = step(&net, &mut s, &hazard, 150.0);
        assert!(o.rerouted);
        assert_eq!(o.kind, StepKind::Moved);
        assert_eq!(s.node, NodeId(2)); // C
        assert_eq!(s.reroute_count, 1);
    }

    #[test]
    fn first_plan_is_not_a_reroute() {
        let net = square();
        let mut s = MovementState::at_node(NodeId(0));
        let o = step(&net, &mut s, &blocked_edges(&net, &[0]), 10.0);
        assert!(!o.rerouted);
        assert_eq!(s.reroute_count, 0);
        assert_eq!(s.edge, EdgeId(4));
    }

    #[test]
    fn committed_edge_completes_after_flooding() {
        let net = line();
        let mut s = MovementState::at_node(NodeId(0));
        step(&net, &mut s, &HazardSnapshot::default(), 60.0);
        assert_eq!(s.edge, EdgeId(0));

        // A→B floods while the agent is on it: finish at base cost.
        let hazard = blocked_edges(&net, &[0]);
        let o = step(&net, &mut s, &hazard, 40.0);
        assert_eq!(o.kind, StepKind::Moved);
        assert_eq!(s.node, NodeId(1));
        assert!(s.is_at_node());
    }

    #[test]
    fn vehicle_threshold_strands_where_pedestrian_passes() {
        let net = line();
        let mut hazard = HazardSnapshot::passable(Tick(0), 3, 4);
        hazard.edges[0] = HazardState::Penalty(3.0);

        let mut walker = MovementState::at_node(NodeId(0));
        assert_eq!(step_with(&net, &mut walker, &hazard, 90.0, f32::INFINITY, &[]).kind, StepKind::Moved);

        let mut car = MovementState::at_node(NodeId(0));
        assert_eq!(step_with(&net, &mut car, &hazard, 90.0, 2.0, &[]).kind, StepKind::Stranded);
    }

    #[test]
    fn closed_target_triggers_reroute() {
        // A ─100─ S1 (cap 1), A ─300─ S2.
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let s1 = b.add_node(GeoPoint::new(0.0, 0.001));
        let s2 = b.add_node(GeoPoint::new(0.0, -0.003));
        b.add_road(a, s1, 100.0);
        b.add_road(a, s2, 300.0);
        b.add_safe_location(s1, Some(1));
        b.add_safe_location(s2, None);
        let net = b.build().unwrap();
        let hazard = HazardSnapshot::default();

        let mut s = MovementState::at_node(a);
        step(&net, &mut s, &hazard, 0.0);
        assert_eq!(s.target(), Some(s1));

        let mut closed = vec![false; 3];
        closed[s1.index()] = true;
        let o = step_with(&net, &mut s, &hazard, 10.0, f32::INFINITY, &closed);
        assert!(o.rerouted);
        assert_eq!(s.target(), Some(s2));
    }

    #[test]
    fn closed_target_still_admits_committed_arrival() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let mut s = MovementState::at_node(NodeId(0));
        step(&net, &mut s, &hazard, 150.0);
        assert_eq!(s.edge, EdgeId(2));

        let closed = vec![false, false, true];
        let o = step_with(&net, &mut s, &hazard, 100.0, f32::INFINITY, &closed);
        assert_eq!(o.kind, StepKind::Evacuated { target: NodeId(2) });
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use evac_core::AgentId;

    use super::*;
    use crate::MobilityError;

    #[test]
    fn engine_steps_and_positions() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let ctx = TickContext::new(Tick(1), 100, &hazard);
        let mut eng = MobilityEngine::new(DijkstraRouter, &[NodeId(0), NodeId(2)]);

        let input = StepInput { network: &net, ctx: &ctx, budget_m: 50.0, max_penalty: f32::INFINITY, closed_targets: &[] };
        let o = eng.step(AgentId(0), &input).unwrap();
        assert_eq!(o.kind, StepKind::Moved);

        // Halfway along A→B: lon 0.0005.
        let pos = eng.visual_position(AgentId(0), &net).unwrap();
        assert!((pos.lon - 0.0005).abs() < 1e-6);

        let o = eng.step(AgentId(1), &input).unwrap();
        assert_eq!(o.kind, StepKind::Evacuated { target: NodeId(2) });
        assert_eq!(eng.state(AgentId(1)).unwrap().node, NodeId(2));
    }

    #[test]
    fn unknown_agent_is_error() {
        let net = line();
        let hazard = HazardSnapshot::default();
        let ctx = TickContext::new(Tick(1), 100, &hazard);
        let mut eng = MobilityEngine::new(DijkstraRouter, &[NodeId(0)]);
        let input = StepInput { network: &net, ctx: &ctx, budget_m: 50.0, max_penalty: f32::INFINITY, closed_targets: &[] };
        assert!(matches!(eng.step(AgentId(5), &input), Err(MobilityError::AgentNotFound(_))));
        assert_eq!(eng.store.total_reroutes(), 0);
    }
}
