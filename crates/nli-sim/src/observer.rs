//! Observer hooks for progress reporting and data collection.

use std::fmt;

use nli_schedule::Step;
use nli_species::SimState;

use crate::SimError;

/// Where a run is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// Modules initialized, no tick taken yet.
    Initialize,
    /// One tick completed.
    Step,
    /// Run finished; modules finalized.
    Finalize,
}

impl RunStatus {
    pub fn name(self) -> &'static str {
        match self {
            RunStatus::Initialize => "initialize",
            RunStatus::Step       => "step",
            RunStatus::Finalize   => "finalize",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Simulated time reached versus the run's target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Progress {
    pub current: f64,
    pub total:   f64,
}

impl Progress {
    /// Completed fraction in `[0, 1]`; a zero-length run is complete.
    pub fn fraction(&self) -> f64 {
        if self.total > 0.0 { (self.current / self.total).clamp(0.0, 1.0) } else { 1.0 }
    }
}

/// Callbacks invoked by [`Simulation`][crate::Simulation] at key points of
/// a run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Percent;
///
/// impl SimObserver for Percent {
///     fn on_status(&mut self, _: &SimState, status: RunStatus, progress: Progress) {
///         println!("{status}: {:.0}%", progress.fraction() * 100.0);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Lifecycle transitions: once at initialize, after every tick, once at
    /// finalize.
    fn on_status(&mut self, _state: &SimState, _status: RunStatus, _progress: Progress) {}

    /// Called after every module due at `step` has run.
    fn on_tick_end(&mut self, _step: &Step, _state: &SimState) {}

    /// A module failed with a recoverable error; the run continues.
    fn on_error(&mut self, _error: &SimError) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
