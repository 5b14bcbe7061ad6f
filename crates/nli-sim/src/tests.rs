//! Unit and scenario tests for nli-sim.

use std::sync::{Arc, Mutex};

use nli_config::SimulationConfig;
use nli_species::{SimState, StepContext};

use crate::{Progress, RunStatus, SimBuilder, SimError, SimModule, SimObserver, SimResult, Simulation};

// ── Helpers ───────────────────────────────────────────────────────────────────

const FULL: &str = r#"
[simulation]
nx = 6
ny = 6
nz = 4
dx = 10.0
dy = 10.0
dz = 10.0
time_step = 1.0
validate = true
seed = 42
modules = ["geometry", "molecules", "fungus", "macrophage", "neutrophil", "epithelium"]

[geometry]
layout = "alveoli"
alveolus_count = 2
alveolus_radius = 1.5
capillary_spacing = 3

[molecules]
time_step = 1.0
iron_max = 50.0
cyto_evap_m = 0.2
cyto_evap_n = 0.2

[[molecules.molecules]]
name = "iron"
init_val = 5.0
init_loc = ["BLOOD", "AIR"]
diffusivity = 0.3

[[molecules.molecules]]
name = "m_cyto"
init_val = 0.0
diffusivity = 0.4

[[molecules.molecules]]
name = "n_cyto"
init_val = 0.0
diffusivity = 0.4

[fungus]
time_step = 1.0
init_num = 20
rest_time = 2.0
swell_time = 2.0
grow_time = 1.0
max_num = 200

[macrophage]
time_step = 1.0
init_num = 4
rec_r = 10.0
p_rec_r = 0.5
rec_rate_ph = 2
max_num = 30
p_internalization = 0.5
max_conidia_in_phag = 3

[neutrophil]
time_step = 1.0
rec_r = 10.0
rec_rate_ph = 2
max_num = 30
age_limit = 6

[epithelium]
time_step = 1.0
"#;

fn full_config() -> SimulationConfig {
    SimulationConfig::from_toml_str(FULL).unwrap()
}

fn full_sim() -> Simulation {
    SimBuilder::new(full_config()).build().unwrap()
}

/// Records lifecycle statuses and recoverable errors.
#[derive(Default)]
struct Recorder {
    statuses: Vec<RunStatus>,
    progress: Vec<Progress>,
    errors:   usize,
    ticks:    usize,
}

impl SimObserver for Recorder {
    fn on_status(&mut self, _state: &SimState, status: RunStatus, progress: Progress) {
        self.statuses.push(status);
        self.progress.push(progress);
    }

    fn on_tick_end(&mut self, _step: &nli_schedule::Step, _state: &SimState) {
        self.ticks += 1;
    }

    fn on_error(&mut self, _error: &SimError) {
        self.errors += 1;
    }
}

/// Appends its name to a shared log on every invocation; optionally fails.
struct Tracer {
    name: &'static str,
    log:  Arc<Mutex<Vec<&'static str>>>,
    fail: Option<Failure>,
}

impl SimModule for Tracer {
    fn name(&self) -> &str {
        self.name
    }

    fn initialize(&mut self, _state: &mut SimState) -> SimResult<()> {
        Ok(())
    }

    fn advance(&mut self, _state: &mut SimState, _ctx: &StepContext) -> SimResult<()> {
        self.log.lock().unwrap().push(self.name);
        match self.fail {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

fn traced_config(fungus_extra: &str, macrophage_step: &str, order: &str) -> SimulationConfig {
    SimulationConfig::from_toml_str(&format!(
        r#"
[simulation]
nx = 2
ny = 2
nz = 2
dx = 1.0
dy = 1.0
dz = 1.0
time_step = 1.0
modules = {order}

[fungus]
time_step = 1.0
init_num = 0
{fungus_extra}

[macrophage]
time_step = {macrophage_step}
rec_r = 1.0
p_rec_r = 0.0
rec_rate_ph = 0
p_internalization = 0.0
max_conidia_in_phag = 1
"#
    ))
    .unwrap()
}

type Failure = fn() -> SimError;

fn traced(config: SimulationConfig, fail: Option<Failure>) -> (Simulation, Arc<Mutex<Vec<&'static str>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (fl, ml) = (log.clone(), log.clone());
    let sim = SimBuilder::bare(config)
        .register("fungus", move |_| Ok(Box::new(Tracer { name: "fungus", log: fl.clone(), fail })))
        .register("macrophage", move |_| Ok(Box::new(Tracer { name: "macrophage", log: ml.clone(), fail: None })))
        .build()
        .unwrap();
    (sim, log)
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_all_builtin_modules_in_declared_order() {
        let sim = full_sim();
        let names: Vec<&str> = sim.module_names().collect();
        assert_eq!(names, ["geometry", "molecules", "fungus", "macrophage", "neutrophil", "epithelium"]);
        assert_eq!(sim.scheduler().len(), 6);
        assert!(!sim.is_initialized());
        assert_eq!(sim.state().grid.shape(), [6, 6, 4]);
    }

    #[test]
    fn missing_factory_is_a_configuration_error() {
        let err = SimBuilder::bare(full_config()).build().err().unwrap();
        assert!(err.is_configuration());
        assert!(err.is_fatal());
    }

    #[test]
    fn invalid_config_is_rejected_before_the_first_tick() {
        let mut config = full_config();
        config.simulation.nx = 0;
        let err = SimBuilder::new(config).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn negative_cadence_is_rejected() {
        let mut config = full_config();
        if let Some(f) = config.fungus.as_mut() {
            f.time_step = -1.0;
        }
        assert!(SimBuilder::new(config).build().err().unwrap().is_configuration());
    }
}

// ── Scheduling ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod schedule_tests {
    use super::*;
    use crate::NoopObserver;

    #[test]
    fn equal_cadence_runs_in_declared_order() {
        let (mut sim, log) = traced(traced_config("", "1.0", r#"["macrophage", "fungus"]"#), None);
        assert_eq!(sim.run_ticks(3, &mut NoopObserver).unwrap(), 3);
        assert_eq!(
            *log.lock().unwrap(),
            ["macrophage", "fungus", "macrophage", "fungus", "macrophage", "fungus"]
        );
    }

    #[test]
    fn run_last_moves_a_module_behind_its_peers() {
        let (mut sim, log) = traced(traced_config("run_last = true", "1.0", r#"["fungus", "macrophage"]"#), None);
        sim.run_ticks(2, &mut NoopObserver).unwrap();
        assert_eq!(*log.lock().unwrap(), ["macrophage", "fungus", "macrophage", "fungus"]);
    }

    #[test]
    fn epsilon_cadence_means_run_last() {
        let (mut sim, log) =
            traced(traced_config("", "1.000001", r#"["macrophage", "fungus"]"#), None);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(*log.lock().unwrap(), ["fungus", "macrophage"]);
    }

    #[test]
    fn slower_module_runs_on_its_own_cadence() {
        let (mut sim, log) = traced(traced_config("", "2.0", r#"["fungus", "macrophage"]"#), None);
        let summary = sim.run_until(4.0, &mut NoopObserver).unwrap();
        assert_eq!(summary.ticks, 4);
        let log = log.lock().unwrap();
        assert_eq!(log.iter().filter(|n| **n == "fungus").count(), 4);
        assert_eq!(log.iter().filter(|n| **n == "macrophage").count(), 2);
    }
}

// ── Run lifecycle ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;
    use crate::NoopObserver;

    #[test]
    fn status_sequence_and_progress() {
        let mut sim = full_sim();
        let mut rec = Recorder::default();
        let summary = sim.run_until(5.0, &mut rec).unwrap();

        assert_eq!(summary.ticks, 5);
        assert!((summary.time - 5.0).abs() < 1e-9);
        assert_eq!(rec.ticks, 5);
        assert_eq!(rec.statuses.first(), Some(&RunStatus::Initialize));
        assert_eq!(rec.statuses.last(), Some(&RunStatus::Finalize));
        assert_eq!(rec.statuses.iter().filter(|s| **s == RunStatus::Step).count(), 5);
        let last_step = rec.progress[rec.progress.len() - 2];
        assert!((last_step.fraction() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_ticks_leaves_initial_state_untouched() {
        let mut fresh = full_sim();
        fresh.initialize(&mut NoopObserver).unwrap();

        let mut ran = full_sim();
        let summary = ran.run_until(0.0, &mut NoopObserver).unwrap();
        assert_eq!(summary.ticks, 0);

        let (a, b) = (fresh.state(), ran.state());
        assert_eq!(a.tissue, b.tissue);
        for (ma, mb) in a.molecules.iter().zip(b.molecules.iter()) {
            assert_eq!(ma.values(), mb.values());
        }
        let fungi = |s: &SimState| s.fungi.iter().map(|f| (f.id(), f.position, f.state.clone())).collect::<Vec<_>>();
        assert_eq!(fungi(a), fungi(b));
        let macs = |s: &SimState| s.macrophages.iter().map(|m| (m.id(), m.position, m.state.clone())).collect::<Vec<_>>();
        assert_eq!(macs(a), macs(b));
        assert_eq!(a.epithelium.len(), b.epithelium.len());
        assert_eq!(a.fungi.len(), 20);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let mut a = full_sim();
        let mut b = full_sim();
        a.run_until(8.0, &mut NoopObserver).unwrap();
        b.run_until(8.0, &mut NoopObserver).unwrap();

        let snap = |s: &SimState| {
            s.fungi.iter().map(|f| (f.id(), f.position, f.state.status)).collect::<Vec<_>>()
        };
        assert_eq!(snap(a.state()), snap(b.state()));
        assert_eq!(a.state().macrophages.len(), b.state().macrophages.len());
        assert_eq!(a.state().neutrophils.len(), b.state().neutrophils.len());
    }

    #[test]
    fn long_validated_run_keeps_invariants() {
        let mut sim = full_sim();
        sim.run_until(30.0, &mut NoopObserver).unwrap();
        sim.state().validate().unwrap();
        for n in sim.state().neutrophils.iter() {
            assert!(n.state.age < 6);
        }
    }

    #[test]
    fn iteration_count_maps_to_time_steps() {
        let mut sim = full_sim();
        let summary = sim.run_iterations(3, &mut NoopObserver).unwrap();
        assert_eq!(summary.ticks, 3);
        assert!((sim.time() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn each_run_until_call_finalizes_once() {
        let mut sim = full_sim();
        let mut rec = Recorder::default();
        sim.run_until(2.0, &mut rec).unwrap();
        let second = sim.run_until(4.0, &mut rec).unwrap();

        assert_eq!(second.ticks, 2);
        assert_eq!(rec.ticks, 4);
        assert_eq!(rec.statuses.iter().filter(|s| **s == RunStatus::Initialize).count(), 1);
        assert_eq!(rec.statuses.iter().filter(|s| **s == RunStatus::Finalize).count(), 2);
        assert_eq!(rec.statuses.last(), Some(&RunStatus::Finalize));
    }

    #[test]
    fn run_without_target_time_is_a_configuration_error() {
        let mut sim = full_sim();
        assert!(sim.run(&mut NoopObserver).err().unwrap().is_configuration());
    }

    #[test]
    fn single_voxel_iron_is_conserved() {
        let config = SimulationConfig::from_toml_str(
            r#"
[simulation]
nx = 1
ny = 1
nz = 1
dx = 1.0
dy = 1.0
dz = 1.0
time_step = 1.0
modules = ["molecules"]

[molecules]
time_step = 1.0

[[molecules.molecules]]
name = "iron"
init_val = 20.0
diffusivity = 0.5
"#,
        )
        .unwrap();
        let mut sim = SimBuilder::new(config).build().unwrap();
        sim.run_until(1.0, &mut NoopObserver).unwrap();
        let iron = sim.state().molecules.get("iron").unwrap();
        assert_eq!(iron.values(), &[20.0]);
    }
}

// ── Error classification ──────────────────────────────────────────────────────

#[cfg(test)]
mod error_tests {
    use nli_molecule::MoleculeError;
    use nli_species::SpeciesError;

    use super::*;

    fn disk_full() -> SimError {
        SimError::output("fungus", "disk full")
    }

    fn boom() -> SimError {
        SimError::Configuration("boom".into())
    }

    #[test]
    fn output_errors_are_logged_and_the_run_continues() {
        let (mut sim, log) = traced(traced_config("", "1.0", r#"["fungus", "macrophage"]"#), Some(disk_full));
        let mut rec = Recorder::default();
        let summary = sim.run_until(3.0, &mut rec).unwrap();

        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.output_errors, 3);
        assert_eq!(rec.errors, 3);
        assert_eq!(log.lock().unwrap().len(), 6);
    }

    #[test]
    fn fatal_errors_stop_the_run() {
        let (mut sim, log) = traced(traced_config("", "1.0", r#"["fungus", "macrophage"]"#), Some(boom));
        let err = sim.run_until(3.0, &mut crate::NoopObserver).err().unwrap();
        assert!(err.is_fatal());
        assert_eq!(*log.lock().unwrap(), ["fungus"]);
    }

    #[test]
    fn molecule_errors_are_classified() {
        let numeric = MoleculeError::NonFinite { molecule: "iron".into(), voxel: 3, value: f64::NAN };
        assert!(matches!(SimError::molecule("molecules", numeric), SimError::NumericInstability { .. }));

        let input = MoleculeError::DuplicateName("iron".into());
        assert!(SimError::molecule("molecules", input).is_configuration());

        let wrapped = SpeciesError::Molecule(MoleculeError::OutOfRange {
            molecule: "iron".into(),
            voxel:    0,
            value:    -1.0,
            max:      10.0,
        });
        assert!(matches!(SimError::species("fungus", wrapped), SimError::NumericInstability { .. }));
    }

    #[test]
    fn only_output_errors_are_recoverable() {
        assert!(!SimError::output("visualization", "denied").is_fatal());
        assert!(SimError::Configuration("x".into()).is_fatal());
    }
}
