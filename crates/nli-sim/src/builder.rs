//! Fluent builder for constructing a [`Simulation`].

use std::collections::HashMap;

use log::{debug, info};

use nli_config::SimulationConfig;
use nli_grid::Grid;
use nli_schedule::Scheduler;
use nli_species::{EpitheliumRules, FungusRules, MacrophageRules, NeutrophilRules, SimState};

use crate::modules::{GeometryModule, MoleculesModule, SpeciesModule};
use crate::{SimError, SimModule, SimResult, Simulation};

/// Creates a module from the resolved configuration.
pub type ModuleFactory = Box<dyn Fn(&SimulationConfig) -> SimResult<Box<dyn SimModule>>>;

/// Fluent builder for [`Simulation`].
///
/// Every name in `[simulation] modules` must have a registered factory.
/// [`SimBuilder::new`] pre-registers the built-in modules:
///
/// | Name         | Module                                  |
/// |--------------|-----------------------------------------|
/// | `geometry`   | [`GeometryModule`]                      |
/// | `molecules`  | [`MoleculesModule`]                     |
/// | `fungus`     | [`SpeciesModule`] over [`FungusRules`]  |
/// | `macrophage` | [`SpeciesModule`] over [`MacrophageRules`] |
/// | `neutrophil` | [`SpeciesModule`] over [`NeutrophilRules`] |
/// | `epithelium` | [`SpeciesModule`] over [`EpitheliumRules`] |
///
/// Output modules live in a separate crate and are added with
/// [`register`](Self::register).
///
/// # Example
///
/// ```rust,ignore
/// let config = SimulationConfig::load("config/default.toml")?;
/// let mut sim = SimBuilder::new(config).build()?;
/// sim.run_until(48.0, &mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:    SimulationConfig,
    factories: HashMap<String, ModuleFactory>,
}

impl SimBuilder {
    /// Builder with the built-in modules registered.
    pub fn new(config: SimulationConfig) -> Self {
        Self::bare(config)
            .register("geometry", |c| {
                Ok(Box::new(GeometryModule::new(c.geometry.clone().unwrap_or_default())))
            })
            .register("molecules", |c| {
                Ok(Box::new(MoleculesModule::new(section(&c.molecules, "molecules")?)))
            })
            .register("fungus", |c| {
                let rules = FungusRules::new(section(&c.fungus, "fungus")?, c.simulation.seed);
                Ok(Box::new(SpeciesModule::new(rules)))
            })
            .register("macrophage", |c| {
                let rules = MacrophageRules::new(section(&c.macrophage, "macrophage")?, c.simulation.seed);
                Ok(Box::new(SpeciesModule::new(rules)))
            })
            .register("neutrophil", |c| {
                let rules = NeutrophilRules::new(section(&c.neutrophil, "neutrophil")?, c.simulation.seed);
                Ok(Box::new(SpeciesModule::new(rules)))
            })
            .register("epithelium", |c| {
                let rules = EpitheliumRules::new(section(&c.epithelium, "epithelium")?);
                Ok(Box::new(SpeciesModule::new(rules)))
            })
    }

    /// Builder with no factories at all.
    pub fn bare(config: SimulationConfig) -> Self {
        Self { config, factories: HashMap::new() }
    }

    /// Register (or replace) the factory for module `name`.
    pub fn register<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&SimulationConfig) -> SimResult<Box<dyn SimModule>> + 'static,
    {
        self.factories.insert(name.to_owned(), Box::new(factory));
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Validate the configuration, lay out the grid, register every listed
    /// module with the scheduler in declared order, and return a
    /// ready-to-run [`Simulation`].
    pub fn build(self) -> SimResult<Simulation> {
        self.config.validate()?;
        let s = &self.config.simulation;
        let grid = Grid::new([s.nx, s.ny, s.nz], [s.dx, s.dy, s.dz])?;
        configure_threads(s.num_threads);

        let mut scheduler = Scheduler::new();
        let mut modules: Vec<Box<dyn SimModule>> = Vec::with_capacity(s.modules.len());
        for name in &s.modules {
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| SimError::Configuration(format!("no module registered as `{name}`")))?;
            let (time_step, run_last) = self
                .config
                .section(name)
                .map(|sec| (sec.time_step(), sec.run_last()))
                .ok_or_else(|| SimError::Configuration(format!("missing [{name}] section")))?;

            scheduler.register(name, time_step, run_last)?;
            modules.push(factory(&self.config)?);
        }

        info!(
            "simulation: {}×{}×{} voxels, seed {}, modules [{}]",
            s.nx,
            s.ny,
            s.nz,
            s.seed,
            s.modules.join(", ")
        );
        let state = SimState::new(grid, s.seed);
        Ok(Simulation::new(self.config, state, scheduler, modules))
    }
}

fn section<T: Clone>(section: &Option<T>, name: &str) -> SimResult<T> {
    section.clone().ok_or_else(|| SimError::Configuration(format!("missing [{name}] section")))
}

#[cfg(feature = "parallel")]
fn configure_threads(num_threads: Option<usize>) {
    let Some(n) = num_threads else { return };
    match rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
        Ok(()) => debug!("rayon pool: {n} thread(s)"),
        Err(e) => log::warn!("rayon pool already configured, ignoring num_threads = {n}: {e}"),
    }
}

#[cfg(not(feature = "parallel"))]
fn configure_threads(num_threads: Option<usize>) {
    if let Some(n) = num_threads {
        debug!("num_threads = {n} ignored: built without the `parallel` feature");
    }
}
