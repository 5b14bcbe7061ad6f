//! Simulation time model.
//!
//! # Design
//!
//! Two clocks run side by side:
//!
//! - `Tick` counts scheduler steps.  Each step advances simulated time by the
//!   smallest remaining module cadence, so ticks are not evenly spaced in
//!   time when cadences differ.
//! - `SimClock::time` is the simulated time in configuration units (hours in
//!   the shipped configurations).
//!
//! Due-time comparisons use [`TIME_EPSILON`] so that accumulated
//! floating-point error never delays a module by a whole step.

use std::fmt;

/// Absolute tolerance for comparing simulated times.
pub const TIME_EPSILON: f64 = 1e-8;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Number of scheduler steps taken since initialization.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

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

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Current tick and simulated time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    pub tick: Tick,
    pub time: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one scheduler step of length `dt`.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.tick = self.tick.next();
        self.time += dt;
    }

    /// `true` once `time` has reached `target` (within tolerance).
    #[inline]
    pub fn reached(&self, target: f64) -> bool {
        self.time + TIME_EPSILON >= target
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (t={:.4})", self.tick, self.time)
    }
}
