//! `nli-config`: the simulation configuration document.
//!
//! A run is described by one TOML file: a `[simulation]` table with the grid
//! and the ordered module list, plus one table per module.  Every module
//! table carries its own cadence (`time_step`) and an optional `run_last`
//! flag; everything else is module-specific.
//!
//! ```toml
//! [simulation]
//! nx = 20
//! ny = 20
//! nz = 10
//! dx = 10.0
//! dy = 10.0
//! dz = 10.0
//! time_step = 1.0
//! modules = ["geometry", "molecules", "fungus"]
//!
//! [geometry]
//! layout = "uniform"
//! fill = "AIR"
//!
//! [molecules]
//! time_step = 1.0
//! [[molecules.molecules]]
//! name = "iron"
//! init_val = 20.0
//! diffusivity = 0.6
//!
//! [fungus]
//! time_step = 1.0
//! init_num = 70
//! init_health = 100.0
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`document`] | `SimulationConfig`: load, serialize, validate            |
//! | [`sections`] | one struct per module table, `ModuleSection` trait        |
//! | [`error`]    | `ConfigError`, `ConfigResult<T>`                          |

pub mod document;
pub mod error;
pub mod sections;

#[cfg(test)]
mod tests;

pub use document::{SimulationConfig, KNOWN_MODULES, SPECIES_ATTRIBUTES};
pub use error::{ConfigError, ConfigResult};
pub use sections::{
    EpitheliumSection, FungusSection, GeometryLayout, GeometrySection, MacrophageSection,
    ModuleSection, MoleculeRecord, MoleculesSection, NeutrophilSection, SimulationSection,
    StateOutputSection, TabularOutputSection, VisualVariable, VisualizationSection, VtkType,
};
