//! Species tags and the read-only view every agent state offers to output.

use std::fmt;

use nli_core::AgentId;

/// The four agent populations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    Fungus,
    Macrophage,
    Neutrophil,
    Epithelium,
}

impl Species {
    pub const ALL: [Species; 4] =
        [Species::Fungus, Species::Macrophage, Species::Neutrophil, Species::Epithelium];

    /// Module / section name.
    pub fn name(self) -> &'static str {
        match self {
            Species::Fungus     => "fungus",
            Species::Macrophage => "macrophage",
            Species::Neutrophil => "neutrophil",
            Species::Epithelium => "epithelium",
        }
    }

    pub fn from_name(name: &str) -> Option<Species> {
        Species::ALL.into_iter().find(|s| s.name() == name)
    }

    /// RNG stream tag for the population's agents.
    pub fn stream(self) -> u64 {
        self as u64 + 1
    }

    /// RNG stream tag for the module-level generator (placement, recruitment).
    pub fn module_stream(self) -> u64 {
        self as u64 + 101
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The agent holding an internalized conidium.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Holder {
    Macrophage(AgentId),
    Epithelium(AgentId),
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Macrophage(id) => write!(f, "macrophage {id}"),
            Holder::Epithelium(id) => write!(f, "epithelium {id}"),
        }
    }
}

/// Uniform read access to per-species agent state, for snapshots and
/// tabular export.
pub trait CellState {
    /// Upper-case lifecycle status, e.g. `"SWELLING"`.
    fn status_name(&self) -> &'static str;

    /// Numeric status code (enum discriminant).
    fn status_code(&self) -> u8;

    /// `None` for species that do not track health.
    fn health(&self) -> Option<f64>;

    fn iron(&self) -> f64;

    /// Named scalar for visualization attributes.  `status` and `iron` work
    /// for every species, `health` only where it is tracked.
    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "status" => Some(self.status_code() as f64),
            "health" => self.health(),
            "iron" => Some(self.iron()),
            _ => None,
        }
    }
}
