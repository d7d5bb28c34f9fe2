//! Agent lifecycle.

use std::fmt;

/// Where an agent is in its evacuation.
///
/// `Evacuated` and `Stranded` are terminal: once reached, the agent is
/// frozen for the rest of the run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentStatus {
    #[default]
    Active,
    /// Reached a safe location.
    Evacuated,
    /// No safe location reachable under the hazard state of some tick.
    Stranded,
}

impl AgentStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, AgentStatus::Active)
    }

    /// Lower-case label used in output tables.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Active    => "active",
            AgentStatus::Evacuated => "evacuated",
            AgentStatus::Stranded  => "stranded",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of agents in each status.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusCounts {
    pub active:    u32,
    pub evacuated: u32,
    pub stranded:  u32,
}

impl StatusCounts {
    pub fn total(&self) -> u32 {
        self.active + self.evacuated + self.stranded
    }

    pub(crate) fn add(&mut self, status: AgentStatus) {
        match status {
            AgentStatus::Active    => self.active += 1,
            AgentStatus::Evacuated => self.evacuated += 1,
            AgentStatus::Stranded  => self.stranded += 1,
        }
    }
}
