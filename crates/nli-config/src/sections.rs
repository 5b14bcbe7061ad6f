//! One struct per configuration table.
//!
//! Keys without a `#[serde(default)]` are required; a missing required key
//! fails at parse time.  Unknown keys are rejected everywhere so typos do not
//! silently fall back to defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use nli_core::TissueType;

/// Cadence fields shared by every module table.
pub trait ModuleSection {
    /// Simulated time between invocations; `0` means initialization only.
    fn time_step(&self) -> f64;
    /// Force the module into the late phase of any tick it shares.
    fn run_last(&self) -> bool;
}

macro_rules! module_section {
    ($($ty:ty),* $(,)?) => {$(
        impl ModuleSection for $ty {
            #[inline]
            fn time_step(&self) -> f64 {
                self.time_step
            }

            #[inline]
            fn run_last(&self) -> bool {
                self.run_last
            }
        }
    )*};
}

module_section!(
    GeometrySection,
    MoleculesSection,
    FungusSection,
    MacrophageSection,
    NeutrophilSection,
    EpitheliumSection,
    VisualizationSection,
    StateOutputSection,
    TabularOutputSection,
);

// ── Defaults ──────────────────────────────────────────────────────────────────

fn default_one() -> f64 {
    1.0
}
fn default_health() -> f64 {
    100.0
}
fn default_steps() -> usize {
    1
}
fn default_radius() -> usize {
    1
}

// ── [simulation] ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSection {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    /// Nominal tick length; turns an iteration count into a run length.
    pub time_step: f64,
    /// Check state invariants after every tick.
    #[serde(default)]
    pub validate: bool,
    /// Module names, in execution order.
    pub modules: Vec<String>,
    #[serde(default)]
    pub seed: u64,
    /// Default run length when the caller does not give one.
    #[serde(default)]
    pub target_time: Option<f64>,
    /// Size of the Rayon pool (`parallel` builds only).
    #[serde(default)]
    pub num_threads: Option<usize>,
}

// ── [geometry] ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryLayout {
    #[default]
    Uniform,
    Alveoli,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeometrySection {
    #[serde(default)]
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    #[serde(default)]
    pub layout: GeometryLayout,
    /// Tissue of every voxel for the uniform layout.
    #[serde(default)]
    pub fill: TissueType,
    #[serde(default = "default_alveolus_count")]
    pub alveolus_count: usize,
    /// Sac radius, in voxels.
    #[serde(default = "default_alveolus_radius")]
    pub alveolus_radius: f64,
    /// Capillary lattice pitch, in voxels.
    #[serde(default = "default_capillary_spacing")]
    pub capillary_spacing: usize,
}

fn default_alveolus_count() -> usize {
    4
}
fn default_alveolus_radius() -> f64 {
    3.0
}
fn default_capillary_spacing() -> usize {
    4
}

impl Default for GeometrySection {
    fn default() -> Self {
        Self {
            time_step: 0.0,
            run_last: false,
            layout: GeometryLayout::Uniform,
            fill: TissueType::default(),
            alveolus_count: default_alveolus_count(),
            alveolus_radius: default_alveolus_radius(),
            capillary_spacing: default_capillary_spacing(),
        }
    }
}

// ── [molecules] ───────────────────────────────────────────────────────────────

/// One `[[molecules.molecules]]` record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoleculeRecord {
    pub name: String,
    pub init_val: f64,
    /// Empty means every voxel.
    #[serde(default)]
    pub init_loc: Vec<TissueType>,
    pub diffusivity: f64,
    #[serde(default)]
    pub source: Vec<TissueType>,
    #[serde(default)]
    pub incr: f64,
    /// Overrides the section-level cytokine decay for this molecule.
    #[serde(default)]
    pub evaporation: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoleculesSection {
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    /// Stencil applications per invocation.
    #[serde(default = "default_steps")]
    pub diffusion_steps: usize,
    /// Decay of the macrophage cytokine (`m_cyto`).
    #[serde(default)]
    pub cyto_evap_m: f64,
    /// Decay of the neutrophil cytokine (`n_cyto`).
    #[serde(default)]
    pub cyto_evap_n: f64,
    /// Cap applied to `iron` unless the record sets its own.
    #[serde(default)]
    pub iron_max: Option<f64>,
    pub molecules: Vec<MoleculeRecord>,
}

// ── Species ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FungusSection {
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    pub init_num: usize,
    #[serde(default = "default_health")]
    pub init_health: f64,
    #[serde(default)]
    pub init_iron: f64,
    /// Fraction of local free iron taken up per invocation.
    #[serde(default = "default_iron_absorb")]
    pub iron_absorb: f64,
    /// Internal iron ceiling.
    #[serde(default)]
    pub iron_max: Option<f64>,
    /// Iron needed to leave the swollen state.
    #[serde(default)]
    pub iron_min_grow: f64,
    #[serde(default = "default_rest_time")]
    pub rest_time: f64,
    #[serde(default = "default_swell_time")]
    pub swell_time: f64,
    #[serde(default = "default_grow_time")]
    pub grow_time: f64,
    #[serde(default = "default_p_branch")]
    pub p_branch: f64,
    /// Hyphal segment length, physical units; `0` uses the smallest voxel edge.
    #[serde(default)]
    pub spacing: f64,
    #[serde(default)]
    pub max_num: Option<usize>,
}

fn default_iron_absorb() -> f64 {
    0.5
}
fn default_rest_time() -> f64 {
    6.0
}
fn default_swell_time() -> f64 {
    6.0
}
fn default_grow_time() -> f64 {
    2.0
}
fn default_p_branch() -> f64 {
    0.25
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MacrophageSection {
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    #[serde(default)]
    pub init_num: usize,
    /// Interaction radius, physical units.
    pub rec_r: f64,
    pub p_rec_r: f64,
    /// Half-saturation of recruitment in `m_cyto`.
    #[serde(default = "default_one")]
    pub mn: f64,
    /// Maximum recruits per invocation.
    pub rec_rate_ph: usize,
    #[serde(default)]
    pub max_num: Option<usize>,
    pub p_internalization: f64,
    pub max_conidia_in_phag: usize,
    /// Health removed from each held or touched fungus per invocation.
    #[serde(default = "default_kill")]
    pub kill: f64,
    /// Fraction of local iron absorbed per invocation.
    #[serde(default = "default_abs")]
    pub m_abs: f64,
    #[serde(default = "default_one")]
    pub cyto_rate: f64,
    /// Time without contact before an active macrophage rests again.
    #[serde(default = "default_time_m")]
    pub time_m: f64,
    /// Lifespan, in invocations.
    #[serde(default = "default_m_age")]
    pub age_limit: u32,
    /// Chemotaxis neighbourhood, voxels.
    #[serde(default = "default_radius")]
    pub move_radius: usize,
}

fn default_kill() -> f64 {
    10.0
}
fn default_abs() -> f64 {
    0.05
}
fn default_time_m() -> f64 {
    3.0
}
fn default_m_age() -> u32 {
    240
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeutrophilSection {
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    /// Disables recruitment.
    #[serde(default)]
    pub neutropenic: bool,
    #[serde(default)]
    pub init_num: usize,
    pub rec_r: f64,
    #[serde(default = "default_one")]
    pub p_rec_r: f64,
    /// Half-saturation of recruitment in `n_cyto`.
    #[serde(default = "default_one")]
    pub nn: f64,
    pub rec_rate_ph: usize,
    #[serde(default)]
    pub max_num: Option<usize>,
    #[serde(default = "default_n_absorb")]
    pub n_absorb: f64,
    #[serde(default = "default_kill")]
    pub n_kill: f64,
    #[serde(default = "default_granules")]
    pub granule_count: u32,
    #[serde(default = "default_one")]
    pub cyto_rate: f64,
    /// Lifespan, in invocations.
    #[serde(default = "default_n_age")]
    pub age_limit: u32,
    #[serde(default = "default_radius")]
    pub move_radius: usize,
}

fn default_n_absorb() -> f64 {
    0.1
}
fn default_granules() -> u32 {
    10
}
fn default_n_age() -> u32 {
    36
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpitheliumSection {
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    /// Cap on the number of cells placed; all epithelial voxels when unset.
    #[serde(default)]
    pub init_num: Option<usize>,
    #[serde(default = "default_health")]
    pub init_health: f64,
    #[serde(default = "default_e_rec_r")]
    pub rec_r: f64,
    #[serde(default = "default_p_int")]
    pub p_internalization: f64,
    #[serde(default = "default_e_phag")]
    pub max_conidia_in_phag: usize,
    #[serde(default = "default_p_int")]
    pub p_remove_fungus: f64,
    #[serde(default = "default_one")]
    pub e_kill: f64,
    #[serde(default = "default_one")]
    pub cyto_rate: f64,
}

fn default_e_rec_r() -> f64 {
    10.0
}
fn default_p_int() -> f64 {
    0.1
}
fn default_e_phag() -> usize {
    10
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Legacy VTK dataset kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VtkType {
    StructuredPoints,
    StructuredGrid,
    RectilinearGrid,
    UnstructuredGrid,
    PolyData,
}

/// One `[[visualization.visual_variables]]` record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisualVariable {
    /// Owning module: `molecules`, `geometry` or a species name.
    pub module: String,
    /// Molecule name, `tissue`, or `cells`.
    pub variable: String,
    pub vtk_type: VtkType,
    /// Per-agent attributes to attach to population output.
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisualizationSection {
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    #[serde(default = "default_vtk_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub visual_variables: Vec<VisualVariable>,
}

fn default_vtk_dir() -> PathBuf {
    PathBuf::from("output/vtk")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateOutputSection {
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    #[serde(default = "default_state_dir")]
    pub output_dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("output/state")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabularOutputSection {
    pub time_step: f64,
    #[serde(default)]
    pub run_last: bool,
    #[serde(default = "default_table_path")]
    pub path: PathBuf,
}

fn default_table_path() -> PathBuf {
    PathBuf::from("output/agents.csv")
}
