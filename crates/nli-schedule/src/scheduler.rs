//! `Scheduler`: per-module cadences over one shared clock.

use log::{debug, trace, warn};

use nli_core::{ModuleId, SimClock, Tick, TIME_EPSILON};

use crate::{ScheduleError, ScheduleResult};

/// Cadences at most this far above an integer are read as "run last".
pub const LATE_TOLERANCE: f64 = 1e-3;

/// Ordering class within a tick.  All `Normal` modules due at a time run
/// before any `Late` one; ties inside a class go to declared order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    #[default]
    Normal,
    Late,
}

/// One registered module.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleEntry {
    /// Declared index; also the tie-break key.
    pub id:       ModuleId,
    pub name:     String,
    /// Normalized cadence; `0` = initialization only.
    pub cadence:  f64,
    pub phase:    Phase,
    pub next_due: f64,
    pub last_run: Option<f64>,
}

impl ScheduleEntry {
    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.cadence > 0.0
    }
}

/// Outcome of one [`Scheduler::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub tick: Tick,
    pub time: f64,
    pub dt:   f64,
    /// Modules to run now, already in execution order.
    pub due:  Vec<ModuleId>,
}

/// Multi-cadence scheduler.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    clock:   SimClock,
    entries: Vec<ScheduleEntry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module.  Declaration order is the tie-break order.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        time_step: f64,
        run_last: bool,
    ) -> ScheduleResult<ModuleId> {
        let name = name.into();
        if !(time_step.is_finite() && time_step >= 0.0) {
            return Err(ScheduleError::InvalidCadence { name, value: time_step });
        }
        if self.entries.iter().any(|e| e.name == name) {
            return Err(ScheduleError::DuplicateModule(name));
        }
        let id = ModuleId::try_from(self.entries.len())
            .ok()
            .filter(|id| id.is_valid())
            .ok_or(ScheduleError::TooManyModules(ModuleId::INVALID.index()))?;

        let (cadence, mut phase) = normalize_cadence(time_step);
        if phase == Phase::Late {
            debug!("{name}: cadence {time_step} read as {cadence} in the late phase");
        }
        if run_last {
            phase = Phase::Late;
        }

        let next_due = if cadence > 0.0 { self.clock.time + cadence } else { f64::INFINITY };
        self.entries.push(ScheduleEntry { id, name, cadence, phase, next_due, last_run: None });
        Ok(id)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn time(&self) -> f64 {
        self.clock.time
    }

    pub fn tick(&self) -> Tick {
        self.clock.tick
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn entry(&self, id: ModuleId) -> Option<&ScheduleEntry> {
        self.entries.get(id.index())
    }

    pub fn id_of(&self, name: &str) -> Option<ModuleId> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time of the next step, or `None` if no module is periodic.
    pub fn next_time(&self) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.is_periodic())
            .map(|e| e.next_due)
            .min_by(f64::total_cmp)
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance to the next due time and return the modules to run there.
    ///
    /// Returns `None` without touching the clock if nothing is periodic.
    pub fn step(&mut self) -> Option<Step> {
        let Some(next) = self.next_time() else {
            warn!("no module has a positive cadence; nothing to step");
            return None;
        };
        let dt = (next - self.clock.time).max(0.0);
        self.clock.advance(dt);
        let now = self.clock.time;

        let mut due: Vec<&mut ScheduleEntry> = self
            .entries
            .iter_mut()
            .filter(|e| e.is_periodic() && e.next_due <= now + TIME_EPSILON)
            .collect();
        due.sort_by_key(|e| (e.phase, e.id));

        let order = due
            .into_iter()
            .map(|e| {
                trace!("{} due at t={now}", e.name);
                e.last_run = Some(now);
                e.next_due = now + e.cadence;
                e.id
            })
            .collect::<Vec<_>>();

        debug!("step {}: t={now:.4} dt={dt:.4}, {} module(s) due", self.clock.tick, order.len());
        Some(Step { tick: self.clock.tick, time: now, dt, due: order })
    }
}

/// Split a configured cadence into a clean cadence and a phase.
fn normalize_cadence(time_step: f64) -> (f64, Phase) {
    let whole = time_step.floor();
    let frac = time_step - whole;
    if whole >= 1.0 && frac > 0.0 && frac <= LATE_TOLERANCE {
        (whole, Phase::Late)
    } else {
        (time_step, Phase::Normal)
    }
}

