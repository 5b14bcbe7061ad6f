//! JSON snapshot of the full simulation state.

use serde::Serialize;

use nli_species::{SimState, Species};

use crate::row::{AgentRow, species_rows};

#[derive(Debug, Serialize)]
pub struct GridInfo {
    pub shape:   [usize; 3],
    pub spacing: [f64; 3],
}

#[derive(Debug, Serialize)]
pub struct MoleculeSnapshot<'a> {
    pub name:   &'a str,
    pub values: &'a [f64],
}

#[derive(Debug, Serialize)]
pub struct PopulationSnapshot {
    pub species: &'static str,
    pub agents:  Vec<AgentRow>,
    /// `[agent id, held fungus id]` pairs, for species that internalize.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub holds:   Vec<[u32; 2]>,
}

/// Everything needed to inspect or plot a moment of a run.
#[derive(Debug, Serialize)]
pub struct StateSnapshot<'a> {
    pub tick:        u64,
    pub time:        f64,
    pub seed:        u64,
    pub grid:        GridInfo,
    /// Tissue code per voxel, in voxel index order.
    pub tissue:      Vec<u8>,
    pub molecules:   Vec<MoleculeSnapshot<'a>>,
    pub populations: Vec<PopulationSnapshot>,
}

impl<'a> StateSnapshot<'a> {
    pub fn capture(state: &'a SimState) -> Self {
        let populations = Species::ALL
            .iter()
            .map(|&species| PopulationSnapshot {
                species: species.name(),
                agents:  species_rows(state, species),
                holds:   holds(state, species),
            })
            .collect();

        Self {
            tick:      state.clock.tick.0,
            time:      state.clock.time,
            seed:      state.seed,
            grid:      GridInfo { shape: state.grid.shape(), spacing: state.grid.spacing() },
            tissue:    state.tissue.as_slice().iter().map(|t| t.code()).collect(),
            molecules: state
                .molecules
                .iter()
                .map(|m| MoleculeSnapshot { name: &m.spec.name, values: m.values() })
                .collect(),
            populations,
        }
    }
}

fn holds(state: &SimState, species: Species) -> Vec<[u32; 2]> {
    match species {
        Species::Macrophage => state
            .macrophages
            .iter()
            .flat_map(|m| m.state.phagosome.iter().map(move |f| [m.id().0, f.0]))
            .collect(),
        Species::Epithelium => state
            .epithelium
            .iter()
            .flat_map(|e| e.state.phagosome.iter().map(move |f| [e.id().0, f.0]))
            .collect(),
        Species::Fungus | Species::Neutrophil => Vec::new(),
    }
}
