//! Typed identifier wrappers.
//!
//! Every id is a dense index into a `Vec` owned by the network or the agent
//! store, so the inner integer is `pub` and [`index`](NodeId::index) is the
//! usual way to turn one into a slice offset.  All ids are
//! `Copy + Ord + Hash`; ordering is what makes activation order and routing
//! tie-breaks reproducible.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no such element".
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Uninitialised ids are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of an evacuating agent.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a road-network junction.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed road segment.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Index into the run's behavior table (pedestrian, vehicle, ...).
    pub struct BehaviorId(u16);
}
