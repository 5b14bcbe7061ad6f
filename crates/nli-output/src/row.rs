//! Plain data rows gathered from a `SimState`.

use serde::Serialize;

use nli_agent::Population;
use nli_species::{CellState, SimState, Species};

/// One agent at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRow {
    pub time:    f64,
    pub species: &'static str,
    pub id:      u32,
    pub x:       f64,
    pub y:       f64,
    pub z:       f64,
    pub status:  &'static str,
    /// Empty for species that do not track health.
    pub health:  Option<f64>,
    pub iron:    f64,
}

/// Population counts after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickSummaryRow {
    pub tick:         u64,
    pub time:         f64,
    pub fungus:       usize,
    pub macrophage:   usize,
    pub neutrophil:   usize,
    pub epithelium:   usize,
    /// Conidia currently held by a macrophage or epithelial cell.
    pub internalized: usize,
}

impl TickSummaryRow {
    pub const HEADER: [&'static str; 7] =
        ["tick", "time", "fungus", "macrophage", "neutrophil", "epithelium", "internalized"];

    pub fn from_state(state: &SimState) -> Self {
        Self {
            tick:         state.clock.tick.0,
            time:         state.clock.time,
            fungus:       state.fungi.len(),
            macrophage:   state.macrophages.len(),
            neutrophil:   state.neutrophils.len(),
            epithelium:   state.epithelium.len(),
            internalized: state.fungi.iter().filter(|f| f.state.internalized()).count(),
        }
    }
}

/// Every agent of every population, in species then id order.
pub fn agent_rows(state: &SimState) -> Vec<AgentRow> {
    let time = state.clock.time;
    let mut rows = Vec::with_capacity(
        state.fungi.len() + state.macrophages.len() + state.neutrophils.len() + state.epithelium.len(),
    );
    push_rows(&mut rows, time, Species::Fungus, &state.fungi);
    push_rows(&mut rows, time, Species::Macrophage, &state.macrophages);
    push_rows(&mut rows, time, Species::Neutrophil, &state.neutrophils);
    push_rows(&mut rows, time, Species::Epithelium, &state.epithelium);
    rows
}

/// Rows of one population.
pub fn species_rows(state: &SimState, species: Species) -> Vec<AgentRow> {
    let time = state.clock.time;
    let mut rows = Vec::new();
    match species {
        Species::Fungus     => push_rows(&mut rows, time, species, &state.fungi),
        Species::Macrophage => push_rows(&mut rows, time, species, &state.macrophages),
        Species::Neutrophil => push_rows(&mut rows, time, species, &state.neutrophils),
        Species::Epithelium => push_rows(&mut rows, time, species, &state.epithelium),
    }
    rows
}

fn push_rows<S: CellState>(rows: &mut Vec<AgentRow>, time: f64, species: Species, pop: &Population<S>) {
    rows.extend(pop.iter().map(|a| AgentRow {
        time,
        species: species.name(),
        id:      a.id().0,
        x:       a.position.x,
        y:       a.position.y,
        z:       a.position.z,
        status:  a.state.status_name(),
        health:  a.state.health(),
        iron:    a.state.iron(),
    }));
}

/// Positions plus named per-agent scalars of one population, ready for a
/// point-cloud writer.  Unknown attribute names yield `NaN`.
pub fn species_attributes(state: &SimState, species: Species, names: &[String]) -> Vec<Vec<f64>> {
    fn collect<S: CellState>(pop: &Population<S>, names: &[String]) -> Vec<Vec<f64>> {
        names
            .iter()
            .map(|n| pop.iter().map(|a| a.state.attribute(n).unwrap_or(f64::NAN)).collect())
            .collect()
    }
    match species {
        Species::Fungus     => collect(&state.fungi, names),
        Species::Macrophage => collect(&state.macrophages, names),
        Species::Neutrophil => collect(&state.neutrophils, names),
        Species::Epithelium => collect(&state.epithelium, names),
    }
}
