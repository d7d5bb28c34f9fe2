//! Behaviours indexed by `BehaviorId`.

use evac_core::BehaviorId;

use crate::{BehaviorError, BehaviorResult, EvacuationBehavior, Pedestrian};

/// The behaviours available to one run.  Agents refer to an entry by the
/// `BehaviorId` returned from [`push`](Self::push).
#[derive(Default)]
pub struct BehaviorSet {
    models: Vec<Box<dyn EvacuationBehavior>>,
}

impl BehaviorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set whose only entry (`BehaviorId(0)`) is `model`.
    pub fn single(model: impl EvacuationBehavior) -> Self {
        let mut set = Self::new();
        set.push(model);
        set
    }

    /// Register a behaviour and return its id (sequential from 0).
    pub fn push(&mut self, model: impl EvacuationBehavior) -> BehaviorId {
        let id = BehaviorId(self.models.len() as u16);
        self.models.push(Box::new(model));
        id
    }

    #[inline]
    pub fn get(&self, id: BehaviorId) -> Option<&dyn EvacuationBehavior> {
        self.models.get(id.index()).map(|b| b.as_ref())
    }

    pub fn try_get(&self, id: BehaviorId) -> BehaviorResult<&dyn EvacuationBehavior> {
        self.get(id).ok_or(BehaviorError::UnknownBehavior(id))
    }

    pub fn contains(&self, id: BehaviorId) -> bool {
        id.index() < self.models.len()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.models.iter().map(|m| m.name())
    }
}

impl From<Pedestrian> for BehaviorSet {
    fn from(p: Pedestrian) -> Self {
        BehaviorSet::single(p)
    }
}
