//! `SimulationConfig`: the whole configuration document.

use std::path::Path;

use log::{debug, info};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use nli_molecule::MoleculeSpec;

use crate::sections::*;
use crate::{ConfigError, ConfigResult};

/// Module names the runner knows how to build, in their usual order.
pub const KNOWN_MODULES: [&str; 9] = [
    "geometry",
    "molecules",
    "fungus",
    "macrophage",
    "neutrophil",
    "epithelium",
    "visualization",
    "state_output",
    "tabular_output",
];

/// Modules that read the tissue map while initializing; `geometry` must be
/// listed before any of them.
const AFTER_GEOMETRY: [&str; 5] = ["molecules", "fungus", "macrophage", "neutrophil", "epithelium"];

/// Per-agent attributes each population can attach to a visual variable.
pub const SPECIES_ATTRIBUTES: [(&str, &[&str]); 4] = [
    ("fungus", &["status", "health", "iron", "internalized", "form", "time_in_state"]),
    ("macrophage", &["status", "iron", "phagosome", "age"]),
    ("neutrophil", &["status", "iron", "granules", "age"]),
    ("epithelium", &["status", "health", "iron", "phagosome"]),
];

/// The parsed configuration document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub simulation:     SimulationSection,
    #[serde(default)]
    pub geometry:       Option<GeometrySection>,
    #[serde(default)]
    pub molecules:      Option<MoleculesSection>,
    #[serde(default)]
    pub fungus:         Option<FungusSection>,
    #[serde(default)]
    pub macrophage:     Option<MacrophageSection>,
    #[serde(default)]
    pub neutrophil:     Option<NeutrophilSection>,
    #[serde(default)]
    pub epithelium:     Option<EpitheliumSection>,
    #[serde(default)]
    pub visualization:  Option<VisualizationSection>,
    #[serde(default)]
    pub state_output:   Option<StateOutputSection>,
    #[serde(default)]
    pub tabular_output: Option<TabularOutputSection>,
}

impl SimulationConfig {
    // ── Loading ───────────────────────────────────────────────────────────

    /// Read, parse and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = Self::from_toml_str(&text)?;
        info!(
            "loaded {} ({} modules, grid {}x{}x{})",
            path.display(),
            config.simulation.modules.len(),
            config.simulation.nx,
            config.simulation.ny,
            config.simulation.nz
        );
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML (e.g. to archive the resolved config with the
    /// run's output).
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Move every output destination under `root`.
    pub fn set_output_root(&mut self, root: &Path) {
        if let Some(v) = &mut self.visualization {
            v.output_dir = root.join("vtk");
        }
        if let Some(s) = &mut self.state_output {
            s.output_dir = root.join("state");
        }
        if let Some(t) = &mut self.tabular_output {
            t.path = root.join("agents.csv");
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Cadence fields of the section named `module`, if present.
    pub fn section(&self, module: &str) -> Option<&dyn ModuleSection> {
        match module {
            "geometry" => self.geometry.as_ref().map(|s| s as &dyn ModuleSection),
            "molecules" => self.molecules.as_ref().map(|s| s as &dyn ModuleSection),
            "fungus" => self.fungus.as_ref().map(|s| s as &dyn ModuleSection),
            "macrophage" => self.macrophage.as_ref().map(|s| s as &dyn ModuleSection),
            "neutrophil" => self.neutrophil.as_ref().map(|s| s as &dyn ModuleSection),
            "epithelium" => self.epithelium.as_ref().map(|s| s as &dyn ModuleSection),
            "visualization" => self.visualization.as_ref().map(|s| s as &dyn ModuleSection),
            "state_output" => self.state_output.as_ref().map(|s| s as &dyn ModuleSection),
            "tabular_output" => self.tabular_output.as_ref().map(|s| s as &dyn ModuleSection),
            _ => None,
        }
    }

    pub fn is_enabled(&self, module: &str) -> bool {
        self.simulation.modules.iter().any(|m| m == module)
    }

    // ── Validation ────────────────────────────────────────────────────────

    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        let s = &self.simulation;
        positive_int("simulation.nx", s.nx)?;
        positive_int("simulation.ny", s.ny)?;
        positive_int("simulation.nz", s.nz)?;
        positive("simulation.dx", s.dx)?;
        positive("simulation.dy", s.dy)?;
        positive("simulation.dz", s.dz)?;
        positive("simulation.time_step", s.time_step)?;
        if let Some(t) = s.target_time {
            non_negative("simulation.target_time", t)?;
        }
        if s.num_threads == Some(0) {
            return Err(ConfigError::Invalid {
                field:  "simulation.num_threads".into(),
                reason: "must be at least 1".into(),
            });
        }
        if s.modules.is_empty() {
            return Err(ConfigError::Invalid {
                field:  "simulation.modules".into(),
                reason: "no modules listed".into(),
            });
        }

        let mut seen = FxHashSet::default();
        for m in &s.modules {
            if !KNOWN_MODULES.contains(&m.as_str()) {
                return Err(ConfigError::UnknownModule(m.clone()));
            }
            if !seen.insert(m.as_str()) {
                return Err(ConfigError::DuplicateModule(m.clone()));
            }
            let section = self.section(m).ok_or_else(|| ConfigError::MissingSection(m.clone()))?;
            non_negative(&format!("{m}.time_step"), section.time_step())?;
        }
        for m in KNOWN_MODULES {
            if self.section(m).is_some() && !seen.contains(m) {
                debug!("section [{m}] present but module not listed; ignored");
            }
        }
        if let Some(g) = s.modules.iter().position(|m| m == "geometry") {
            if let Some(early) = s.modules[..g].iter().find(|m| AFTER_GEOMETRY.contains(&m.as_str())) {
                return Err(ConfigError::Invalid {
                    field:  "simulation.modules".into(),
                    reason: format!("{early:?} is listed before \"geometry\" and would not see the tissue map"),
                });
            }
        }

        if let Some(g) = &self.geometry {
            non_negative("geometry.alveolus_radius", g.alveolus_radius)?;
        }
        if let Some(m) = &self.molecules {
            validate_molecules(m)?;
        }
        if let Some(f) = &self.fungus {
            validate_fungus(f)?;
        }
        if let Some(m) = &self.macrophage {
            validate_macrophage(m)?;
        }
        if let Some(n) = &self.neutrophil {
            validate_neutrophil(n)?;
        }
        if let Some(e) = &self.epithelium {
            validate_epithelium(e)?;
        }
        if let Some(v) = &self.visualization {
            self.validate_visualization(v)?;
        }
        Ok(())
    }

    /// Every visual variable must name something the run will hold, in a
    /// dataset kind that can represent it.
    fn validate_visualization(&self, v: &VisualizationSection) -> ConfigResult<()> {
        for (i, var) in v.visual_variables.iter().enumerate() {
            let field = |key: &str| format!("visualization.visual_variables[{i}].{key}");
            let invalid = |key: &str, reason: String| ConfigError::Invalid { field: field(key), reason };

            match var.module.as_str() {
                "molecules" | "geometry" => {
                    if var.module == "geometry" && var.variable != "tissue" {
                        return Err(invalid("variable", format!("geometry exports only \"tissue\", not {:?}", var.variable)));
                    }
                    if var.module == "molecules" {
                        let configured = self.is_enabled("molecules")
                            && self.molecules.as_ref().is_some_and(|m| m.molecules.iter().any(|r| r.name == var.variable));
                        if !configured {
                            return Err(invalid("variable", format!("no molecule {:?} in this run", var.variable)));
                        }
                    }
                    if var.vtk_type == VtkType::PolyData {
                        return Err(invalid("vtk_type", "POLY_DATA cannot represent a voxel field".into()));
                    }
                    if !var.attributes.is_empty() {
                        return Err(invalid("attributes", "only population variables carry attributes".into()));
                    }
                }
                species => {
                    let Some((_, known)) = SPECIES_ATTRIBUTES.iter().find(|(name, _)| *name == species) else {
                        return Err(invalid("module", format!("{species:?} is neither a field module nor a species")));
                    };
                    if !matches!(var.vtk_type, VtkType::PolyData | VtkType::UnstructuredGrid) {
                        return Err(invalid(
                            "vtk_type",
                            format!("{:?} cannot represent a population; use POLY_DATA or UNSTRUCTURED_GRID", var.vtk_type),
                        ));
                    }
                    if let Some(bad) = var.attributes.iter().find(|a| !known.contains(&a.as_str())) {
                        return Err(invalid(
                            "attributes",
                            format!("{species} has no attribute {bad:?} (known: {})", known.join(", ")),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

// ── Molecule specs ────────────────────────────────────────────────────────────

impl MoleculesSection {
    /// Resolve records into specs, applying the section-level cytokine decay
    /// and iron cap where a record does not override them.
    pub fn specs(&self) -> Vec<MoleculeSpec> {
        self.molecules
            .iter()
            .map(|r| {
                let evaporation = r.evaporation.unwrap_or(match r.name.as_str() {
                    "m_cyto" => self.cyto_evap_m,
                    "n_cyto" => self.cyto_evap_n,
                    _ => 0.0,
                });
                let max = match (r.max, r.name.as_str()) {
                    (Some(max), _) => Some(max),
                    (None, "iron") => self.iron_max,
                    (None, _) => None,
                };
                MoleculeSpec {
                    name: r.name.clone(),
                    init_val: r.init_val,
                    init_loc: r.init_loc.clone(),
                    diffusivity: r.diffusivity,
                    source: r.source.clone(),
                    incr: r.incr,
                    evaporation,
                    max,
                }
            })
            .collect()
    }
}

fn validate_molecules(m: &MoleculesSection) -> ConfigResult<()> {
    probability("molecules.cyto_evap_m", m.cyto_evap_m)?;
    probability("molecules.cyto_evap_n", m.cyto_evap_n)?;
    if let Some(max) = m.iron_max {
        non_negative("molecules.iron_max", max)?;
    }
    let mut names = FxHashSet::default();
    for r in &m.molecules {
        if !names.insert(r.name.as_str()) {
            return Err(ConfigError::DuplicateMolecule(r.name.clone()));
        }
        let field = |key: &str| format!("molecules.{}.{key}", r.name);
        non_negative(&field("init_val"), r.init_val)?;
        // Out-of-range diffusivity is clamped with a warning at build time.
        if !r.diffusivity.is_finite() {
            return Err(ConfigError::Invalid {
                field:  field("diffusivity"),
                reason: format!("not a finite number ({})", r.diffusivity),
            });
        }
        if !r.incr.is_finite() {
            return Err(ConfigError::Invalid {
                field:  field("incr"),
                reason: format!("not a finite number ({})", r.incr),
            });
        }
        if let Some(e) = r.evaporation {
            probability(&field("evaporation"), e)?;
        }
        if let Some(max) = r.max {
            non_negative(&field("max"), max)?;
        }
    }
    Ok(())
}

fn validate_fungus(f: &FungusSection) -> ConfigResult<()> {
    non_negative("fungus.init_health", f.init_health)?;
    non_negative("fungus.init_iron", f.init_iron)?;
    probability("fungus.iron_absorb", f.iron_absorb)?;
    if let Some(max) = f.iron_max {
        non_negative("fungus.iron_max", max)?;
    }
    non_negative("fungus.iron_min_grow", f.iron_min_grow)?;
    non_negative("fungus.rest_time", f.rest_time)?;
    non_negative("fungus.swell_time", f.swell_time)?;
    non_negative("fungus.grow_time", f.grow_time)?;
    probability("fungus.p_branch", f.p_branch)?;
    non_negative("fungus.spacing", f.spacing)
}

fn validate_macrophage(m: &MacrophageSection) -> ConfigResult<()> {
    non_negative("macrophage.rec_r", m.rec_r)?;
    probability("macrophage.p_rec_r", m.p_rec_r)?;
    non_negative("macrophage.mn", m.mn)?;
    probability("macrophage.p_internalization", m.p_internalization)?;
    non_negative("macrophage.kill", m.kill)?;
    probability("macrophage.m_abs", m.m_abs)?;
    non_negative("macrophage.cyto_rate", m.cyto_rate)?;
    non_negative("macrophage.time_m", m.time_m)
}

fn validate_neutrophil(n: &NeutrophilSection) -> ConfigResult<()> {
    non_negative("neutrophil.rec_r", n.rec_r)?;
    probability("neutrophil.p_rec_r", n.p_rec_r)?;
    non_negative("neutrophil.nn", n.nn)?;
    probability("neutrophil.n_absorb", n.n_absorb)?;
    non_negative("neutrophil.n_kill", n.n_kill)?;
    non_negative("neutrophil.cyto_rate", n.cyto_rate)
}

fn validate_epithelium(e: &EpitheliumSection) -> ConfigResult<()> {
    non_negative("epithelium.init_health", e.init_health)?;
    non_negative("epithelium.rec_r", e.rec_r)?;
    probability("epithelium.p_internalization", e.p_internalization)?;
    probability("epithelium.p_remove_fungus", e.p_remove_fungus)?;
    non_negative("epithelium.e_kill", e.e_kill)?;
    non_negative("epithelium.cyto_rate", e.cyto_rate)
}

// ── Checks ────────────────────────────────────────────────────────────────────

fn positive(field: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field: field.to_owned(), value })
    }
}

fn positive_int(field: &str, value: usize) -> ConfigResult<()> {
    positive(field, value as f64)
}

fn non_negative(field: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field: field.to_owned(), value })
    }
}

fn probability(field: &str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { field: field.to_owned(), value })
    }
}
