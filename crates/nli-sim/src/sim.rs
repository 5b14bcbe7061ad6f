//! The `Simulation` struct and its run loop.

use log::{debug, error, info};

use nli_config::SimulationConfig;
use nli_core::TIME_EPSILON;
use nli_schedule::{Scheduler, Step};
use nli_species::{SimState, StepContext};

use crate::{Progress, RunStatus, SimError, SimModule, SimObserver, SimResult};

/// Outcome of a completed run.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Ticks taken by this run.
    pub ticks:         u64,
    /// Simulated time at the end of the run.
    pub time:          f64,
    /// Recoverable module failures (output I/O) logged during the run.
    pub output_errors: usize,
}

/// The main simulation runner.
///
/// Holds the shared [`SimState`], the [`Scheduler`] and one module per
/// configured name, indexed by the module's scheduler id.  Each tick:
///
/// 1. **Schedule**: advance the clock to the earliest due time.
/// 2. **Run**: invoke every due module in (phase, declared order); each
///    module commits its own births and deaths before the next one runs.
/// 3. **Validate** (if `[simulation] validate`): check every state
///    invariant; a violation stops the run.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    config:        SimulationConfig,
    state:         SimState,
    scheduler:     Scheduler,
    modules:       Vec<Box<dyn SimModule>>,
    initialized:   bool,
    output_errors: usize,
}

impl Simulation {
    pub(crate) fn new(
        config:    SimulationConfig,
        state:     SimState,
        scheduler: Scheduler,
        modules:   Vec<Box<dyn SimModule>>,
    ) -> Self {
        Self { config, state, scheduler, modules, initialized: false, output_errors: 0 }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn time(&self) -> f64 {
        self.scheduler.time()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Initialize every module in declared order.  Idempotent.
    pub fn initialize<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        for i in 0..self.modules.len() {
            let result = self.modules[i].initialize(&mut self.state);
            self.absorb(result, observer)?;
        }
        self.initialized = true;
        if self.config.simulation.validate {
            self.check("initialize")?;
        }

        let now = self.scheduler.time();
        observer.on_status(&self.state, RunStatus::Initialize, Progress { current: now, total: now });
        Ok(())
    }

    /// Take one tick.  Returns `None` when no module is periodic.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Option<Step>> {
        self.initialize(observer)?;
        let Some(step) = self.scheduler.step() else {
            return Ok(None);
        };
        self.state.clock = self.scheduler.clock();

        for &id in &step.due {
            let cadence = self.scheduler.entry(id).map_or(step.dt, |e| e.cadence);
            let ctx = StepContext { dt: cadence, time: step.time };
            let result = self.modules[id.index()].advance(&mut self.state, &ctx);
            self.absorb(result, observer)?;
        }

        if self.config.simulation.validate {
            self.check(&format!("tick {}", step.tick))?;
        }
        observer.on_tick_end(&step, &self.state);
        Ok(Some(step))
    }

    /// Take up to `n` ticks.  Returns how many were taken.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<u64> {
        for taken in 0..n {
            if self.step(observer)?.is_none() {
                return Ok(taken);
            }
        }
        Ok(n)
    }

    /// Run until simulated time reaches `target`, then finalize.
    ///
    /// Observers see [`RunStatus::Initialize`] once (on the first run),
    /// [`RunStatus::Step`] after every tick and [`RunStatus::Finalize`] at
    /// the end.  A target at or before the current time takes no ticks.
    ///
    /// Every call finalizes.  A later call resumes from where this one
    /// stopped, and its finalize overwrites the `final` outputs with the
    /// state at the new end point.
    pub fn run_until<O: SimObserver>(&mut self, target: f64, observer: &mut O) -> SimResult<RunSummary> {
        self.initialize(observer)?;
        let start_tick = self.scheduler.tick();
        let errors_before = self.output_errors;
        info!("running from t={:.3} to t={target:.3}", self.scheduler.time());

        while let Some(next) = self.scheduler.next_time() {
            if next > target + TIME_EPSILON {
                break;
            }
            if self.step(observer)?.is_none() {
                break;
            }
            let progress = Progress { current: self.scheduler.time(), total: target };
            observer.on_status(&self.state, RunStatus::Step, progress);
        }

        self.finalize(observer)?;
        let summary = RunSummary {
            ticks:         self.scheduler.tick().0 - start_tick.0,
            time:          self.scheduler.time(),
            output_errors: self.output_errors - errors_before,
        };
        info!(
            "finished at t={:.3} after {} tick(s), {} output error(s)",
            summary.time, summary.ticks, summary.output_errors
        );
        Ok(summary)
    }

    /// Run `iterations` nominal time steps (`[simulation] time_step`) past
    /// the current time.
    pub fn run_iterations<O: SimObserver>(&mut self, iterations: u64, observer: &mut O) -> SimResult<RunSummary> {
        let target = self.scheduler.time() + iterations as f64 * self.config.simulation.time_step;
        self.run_until(target, observer)
    }

    /// Run to `[simulation] target_time`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        let target = self
            .config
            .simulation
            .target_time
            .ok_or_else(|| SimError::Configuration("no run length: set [simulation] target_time".into()))?;
        self.run_until(target, observer)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn finalize<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        for i in 0..self.modules.len() {
            let result = self.modules[i].finalize(&self.state);
            self.absorb(result, observer)?;
        }
        let now = self.scheduler.time();
        observer.on_status(&self.state, RunStatus::Finalize, Progress { current: now, total: now });
        Ok(())
    }

    /// Log and count recoverable errors; pass fatal ones through.
    fn absorb<O: SimObserver>(&mut self, result: SimResult<()>, observer: &mut O) -> SimResult<()> {
        match result {
            Err(e) if !e.is_fatal() => {
                error!("{e}");
                self.output_errors += 1;
                observer.on_error(&e);
                Ok(())
            }
            other => other,
        }
    }

    fn check(&self, when: &str) -> SimResult<()> {
        self.state.validate().map_err(|source| {
            debug!("state validation failed at {when}");
            SimError::InvariantViolation { module: when.to_owned(), source }
        })
    }
}
