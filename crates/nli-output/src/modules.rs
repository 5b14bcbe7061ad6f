//! Output as scheduled modules: `visualization`, `state_output` and
//! `tabular_output`.
//!
//! Output modules only read the state.  Their failures surface as
//! [`SimError::Output`], which the run loop logs without stopping.

use std::fs;
use std::path::Path;

use log::{debug, info};

use nli_config::{
    StateOutputSection, TabularOutputSection, VisualVariable, VisualizationSection, VtkType,
};
use nli_sim::{SimBuilder, SimError, SimModule, SimResult, SimState, StepContext};
use nli_species::Species;

use crate::atomic::{StagedCsv, Stamp, stamped_path, write_atomic};
use crate::row::{agent_rows, species_attributes};
use crate::snapshot::StateSnapshot;
use crate::vtk::{PointCloud, ScalarField, write_field, write_points};
use crate::{OutputError, OutputResult};

/// Register the three output modules with `builder`.
pub fn register_output_modules(builder: SimBuilder) -> SimBuilder {
    builder
        .register("visualization", |c| {
            let params = c.visualization.clone().ok_or_else(|| missing("visualization"))?;
            Ok(Box::new(VisualizationModule::new(params)))
        })
        .register("state_output", |c| {
            let params = c.state_output.clone().ok_or_else(|| missing("state_output"))?;
            Ok(Box::new(StateOutputModule::new(params)))
        })
        .register("tabular_output", |c| {
            let params = c.tabular_output.clone().ok_or_else(|| missing("tabular_output"))?;
            Ok(Box::new(TabularOutputModule::new(params)))
        })
}

fn missing(name: &str) -> SimError {
    SimError::Configuration(format!("missing [{name}] section"))
}

fn prepare_dir(module: &str, dir: &Path) -> SimResult<()> {
    fs::create_dir_all(dir).map_err(|e| SimError::output(module, e))?;
    info!("{module}: writing to {}", dir.display());
    Ok(())
}

// ── Visualization ─────────────────────────────────────────────────────────────

/// Legacy VTK files, one per visual variable per invocation.
///
/// | `module`      | `variable`       | Written as                        |
/// |---------------|------------------|-----------------------------------|
/// | `molecules`   | a molecule name  | voxel field                       |
/// | `geometry`    | `tissue`         | voxel field of tissue codes       |
/// | a species     | any label        | point cloud with `attributes`     |
///
/// Field files are named `<variable>-<time>.vtk`; population files
/// `<species>_<variable>-<time>.vtk`, so several species may share a
/// label such as `cells`.
pub struct VisualizationModule {
    params: VisualizationSection,
}

impl VisualizationModule {
    pub fn new(params: VisualizationSection) -> Self {
        Self { params }
    }

    fn write_all(&self, state: &SimState, stamp: Stamp) -> OutputResult<usize> {
        for var in &self.params.visual_variables {
            write_variable(&self.params.output_dir, state, var, stamp)?;
        }
        Ok(self.params.visual_variables.len())
    }
}

/// Write one visual variable.  Returns the file path written.
pub fn write_variable(
    dir:   &Path,
    state: &SimState,
    var:   &VisualVariable,
    stamp: Stamp,
) -> OutputResult<std::path::PathBuf> {
    let title = format!("{}/{} t={}", var.module, var.variable, state.clock.time);
    let unknown = || OutputError::UnknownVariable { module: var.module.clone(), variable: var.variable.clone() };

    match var.module.as_str() {
        "molecules" => {
            let m = state.molecules.get(&var.variable).ok_or_else(unknown)?;
            let path = stamped_path(dir, &var.variable, stamp, "vtk");
            let field = ScalarField { name: &var.variable, values: m.values() };
            write_atomic(&path, |w| write_field(w, &state.grid, field, var.vtk_type, &title))?;
            Ok(path)
        }
        "geometry" if var.variable == "tissue" => {
            let codes: Vec<f64> = state.tissue.as_slice().iter().map(|t| t.code() as f64).collect();
            let path = stamped_path(dir, "tissue", stamp, "vtk");
            let field = ScalarField { name: "tissue", values: &codes };
            write_atomic(&path, |w| write_field(w, &state.grid, field, var.vtk_type, &title))?;
            Ok(path)
        }
        name => {
            let species = Species::from_name(name).ok_or_else(unknown)?;
            let points = match species {
                Species::Fungus     => state.fungi.iter().map(|a| a.position).collect(),
                Species::Macrophage => state.macrophages.iter().map(|a| a.position).collect(),
                Species::Neutrophil => state.neutrophils.iter().map(|a| a.position).collect(),
                Species::Epithelium => state.epithelium.iter().map(|a| a.position).collect(),
            };
            let values = species_attributes(state, species, &var.attributes);
            let cloud = PointCloud { points, attributes: var.attributes.iter().cloned().zip(values).collect() };

            let kind = if var.vtk_type == VtkType::UnstructuredGrid {
                VtkType::UnstructuredGrid
            } else {
                VtkType::PolyData
            };
            let path = stamped_path(dir, &format!("{name}_{}", var.variable), stamp, "vtk");
            write_atomic(&path, |w| write_points(w, &cloud, kind, &title))?;
            Ok(path)
        }
    }
}

impl SimModule for VisualizationModule {
    fn name(&self) -> &str {
        "visualization"
    }

    fn initialize(&mut self, _state: &mut SimState) -> SimResult<()> {
        prepare_dir("visualization", &self.params.output_dir)
    }

    fn advance(&mut self, state: &mut SimState, ctx: &StepContext) -> SimResult<()> {
        let n = self.write_all(state, Stamp::Time(ctx.time)).map_err(|e| SimError::output("visualization", e))?;
        debug!("visualization: {n} file(s) at t={:.3}", ctx.time);
        Ok(())
    }

    fn finalize(&mut self, state: &SimState) -> SimResult<()> {
        self.write_all(state, Stamp::Final).map_err(|e| SimError::output("visualization", e))?;
        Ok(())
    }
}

// ── State snapshots ───────────────────────────────────────────────────────────

/// Full-state JSON, `simulation-<time>.json`.
pub struct StateOutputModule {
    params: StateOutputSection,
}

impl StateOutputModule {
    pub fn new(params: StateOutputSection) -> Self {
        Self { params }
    }

    fn write(&self, state: &SimState, stamp: Stamp) -> OutputResult<()> {
        let path = stamped_path(&self.params.output_dir, "simulation", stamp, "json");
        let snapshot = StateSnapshot::capture(state);
        write_atomic(&path, |w| Ok(serde_json::to_writer(w, &snapshot)?))?;
        debug!("state_output: {}", path.display());
        Ok(())
    }
}

impl SimModule for StateOutputModule {
    fn name(&self) -> &str {
        "state_output"
    }

    fn initialize(&mut self, _state: &mut SimState) -> SimResult<()> {
        prepare_dir("state_output", &self.params.output_dir)
    }

    fn advance(&mut self, state: &mut SimState, ctx: &StepContext) -> SimResult<()> {
        self.write(state, Stamp::Time(ctx.time)).map_err(|e| SimError::output("state_output", e))
    }

    fn finalize(&mut self, state: &SimState) -> SimResult<()> {
        self.write(state, Stamp::Final).map_err(|e| SimError::output("state_output", e))
    }
}

// ── Tabular export ────────────────────────────────────────────────────────────

/// One CSV row per agent per invocation.
///
/// Rows are staged in `<path>.part` and the file takes its final name at
/// finalize.
pub struct TabularOutputModule {
    params: TabularOutputSection,
    out:    StagedCsv,
}

impl TabularOutputModule {
    pub const HEADER: [&'static str; 9] = ["time", "species", "id", "x", "y", "z", "status", "health", "iron"];

    pub fn new(params: TabularOutputSection) -> Self {
        let out = StagedCsv::new(&params.path, &Self::HEADER);
        Self { params, out }
    }

    fn write_rows(&mut self, state: &SimState) -> OutputResult<usize> {
        let rows = agent_rows(state);
        for row in &rows {
            self.out.write_record([
                row.time.to_string(),
                row.species.to_owned(),
                row.id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.z.to_string(),
                row.status.to_owned(),
                row.health.map(|h| h.to_string()).unwrap_or_default(),
                row.iron.to_string(),
            ])?;
        }
        Ok(rows.len())
    }
}

impl SimModule for TabularOutputModule {
    fn name(&self) -> &str {
        "tabular_output"
    }

    fn initialize(&mut self, _state: &mut SimState) -> SimResult<()> {
        self.out.open().map_err(|e| SimError::output("tabular_output", e))?;
        info!("tabular_output: writing to {}", self.params.path.display());
        Ok(())
    }

    fn advance(&mut self, state: &mut SimState, _ctx: &StepContext) -> SimResult<()> {
        let n = self.write_rows(state).map_err(|e| SimError::output("tabular_output", e))?;
        debug!("tabular_output: {n} row(s)");
        Ok(())
    }

    fn finalize(&mut self, _state: &SimState) -> SimResult<()> {
        self.out.publish().map_err(|e| SimError::output("tabular_output", e))
    }
}
