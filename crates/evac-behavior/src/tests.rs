//! Unit tests for evac-behavior.

use evac_core::Tick;
use evac_hazard::HazardSnapshot;

use crate::TickContext;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ctx(hazard: &HazardSnapshot) -> TickContext<'_> {
    TickContext::new(Tick(3), 600, hazard)
}

#[cfg(test)]
mod profiles {
    use evac_hazard::{HazardSnapshot, HazardState};

    use super::*;
    use crate::{BehaviorError, EvacuationBehavior, Pedestrian, Vehicle};

    #[test]
    fn default_budget_is_speed_times_tick() {
        let hazard = HazardSnapshot::default();
        assert_eq!(Pedestrian.movement_budget_m(1.5, &ctx(&hazard)), 900.0);
        let car = Vehicle::new(2.0).unwrap();
        assert_eq!(car.movement_budget_m(10.0, &ctx(&hazard)), 6_000.0);
    }

    #[test]
    fn pedestrian_wades_any_passable_water() {
        assert!(HazardState::Penalty(50.0).admits(Pedestrian.max_penalty()));
        assert!(!HazardState::Blocked.admits(Pedestrian.max_penalty()));
    }

    #[test]
    fn vehicle_threshold() {
        let car = Vehicle::new(2.0).unwrap();
        assert!(HazardState::Penalty(2.0).admits(car.max_penalty()));
        assert!(!HazardState::Penalty(2.5).admits(car.max_penalty()));
        assert!(!HazardState::Penalty(1.01).admits(Vehicle::dry_roads_only().max_penalty()));
        assert!(HazardState::Passable.admits(Vehicle::dry_roads_only().max_penalty()));
    }

    #[test]
    fn vehicle_rejects_sub_unit_threshold() {
        assert!(matches!(Vehicle::new(0.5), Err(BehaviorError::Config(_))));
        assert!(matches!(Vehicle::new(f32::NAN), Err(BehaviorError::Config(_))));
    }

    #[test]
    fn names() {
        assert_eq!(Pedestrian.name(), "pedestrian");
        assert_eq!(Vehicle::dry_roads_only().name(), "vehicle");
    }
}

#[cfg(test)]
mod set {
    use evac_core::BehaviorId;
    use evac_hazard::HazardSnapshot;

    use super::*;
    use crate::{BehaviorError, BehaviorSet, EvacuationBehavior, Pedestrian, Vehicle};

    /// Custom behaviour with a fixed budget.
    struct Crawl;

    impl EvacuationBehavior for Crawl {
        fn name(&self) -> &str {
            "crawl"
        }
        fn movement_budget_m(&self, _speed_mps: f32, _ctx: &TickContext<'_>) -> f32 {
            5.0
        }
    }

    #[test]
    fn ids_are_sequential() {
        let mut set = BehaviorSet::new();
        assert_eq!(set.push(Pedestrian), BehaviorId(0));
        assert_eq!(set.push(Vehicle::dry_roads_only()), BehaviorId(1));
        assert_eq!(set.push(Crawl), BehaviorId(2));
        assert_eq!(set.len(), 3);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["pedestrian", "vehicle", "crawl"]);
    }

    #[test]
    fn lookup() {
        let set = BehaviorSet::single(Crawl);
        let hazard = HazardSnapshot::default();
        let b = set.get(BehaviorId(0)).unwrap();
        assert_eq!(b.movement_budget_m(99.0, &ctx(&hazard)), 5.0);
        assert!(set.get(BehaviorId(1)).is_none());
        assert!(!set.contains(BehaviorId(1)));
        assert!(matches!(
            set.try_get(BehaviorId(1)),
            Err(BehaviorError::UnknownBehavior(BehaviorId(1)))
        ));
    }

    #[test]
    fn from_pedestrian() {
        let set: BehaviorSet = Pedestrian.into();
        assert_eq!(set.len(), 1);
        assert!(set.contains(BehaviorId(0)));
    }
}
