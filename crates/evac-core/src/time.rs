//! Simulation time model.
//!
//! Time is a strictly increasing integer `Tick`.  Tick 0 is the initial
//! placement; the first simulated step is tick 1.  The mapping to wall-clock
//! time lives in `SimClock`:
//!
//!   wall_time = start_unix_secs + tick * tick_duration_secs
//!
//! Keeping the canonical unit an integer keeps hazard lookups exact and
//! makes every run bit-for-bit reproducible.

use std::fmt;

use crate::{EvacError, EvacResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// The following tick.
    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Per-run clock.  Each `Sim` owns exactly one; there is no process-wide
/// time, so several runs can coexist in one process.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// How many real seconds one tick represents.
    pub tick_duration_secs: u32,
    /// The most recently completed tick (tick 0 before the first step).
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start_unix_secs: i64, tick_duration_secs: u32) -> Self {
        Self {
            start_unix_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick and return the new tick.
    #[inline]
    pub fn advance(&mut self) -> Tick {
        self.current_tick = self.current_tick.next();
        self.current_tick
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Unix timestamp of an arbitrary tick on this clock.
    #[inline]
    pub fn unix_secs_at(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Break elapsed time into (day, hour, minute) components from sim start.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs().max(0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }

    /// How many ticks span `secs` seconds (rounded up).
    #[inline]
    pub fn ticks_for_secs(&self, secs: u64) -> u64 {
        secs.div_ceil(self.tick_duration_secs as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run configuration.
///
/// Usually deserialized from a JSON/TOML scenario file by the orchestration
/// layer (enable the `serde` feature) and handed to `SimBuilder`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Unix timestamp for tick 0 (e.g. the flood warning time).
    pub start_unix_secs: i64,

    /// Seconds per tick.  Movement budgets are `speed * tick_duration_secs`.
    pub tick_duration_secs: u32,

    /// Last tick that may be simulated.  The run also stops early once no
    /// agent is active.
    pub max_ticks: u64,

    /// Master seed for population placement.
    pub seed: u64,

    /// Worker thread count for the `parallel` feature.  `None` uses Rayon's
    /// global pool.
    pub num_threads: Option<usize>,

    /// Emit an agent snapshot every N ticks.  1 = every tick; 0 = never.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_unix_secs:       0,
            tick_duration_secs:    600,
            max_ticks:             144,
            seed:                  1,
            num_threads:           None,
            output_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// The last tick a run may reach (inclusive).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.max_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.tick_duration_secs)
    }

    /// Reject configurations that cannot drive a run.
    pub fn validate(&self) -> EvacResult<()> {
        if self.tick_duration_secs == 0 {
            return Err(EvacError::Config("tick_duration_secs must be positive".into()));
        }
        if self.max_ticks == 0 {
            return Err(EvacError::Config("max_ticks must be positive".into()));
        }
        if self.num_threads == Some(0) {
            return Err(EvacError::Config("num_threads must be positive when set".into()));
        }
        Ok(())
    }
}
