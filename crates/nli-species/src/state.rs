//! `SimState`: everything a module may read or write.
//!
//! There are no globals: the simulation owns one `SimState` and passes it
//! to every module invocation.

use log::debug;
use rustc_hash::FxHashSet;

use nli_agent::{CommitReport, Population, PopulationBuilder};
use nli_core::{AgentId, SimClock, TissueType};
use nli_grid::{Grid, TissueMap};
use nli_molecule::MoleculeField;

use crate::{
    Epithelial, Fungus, Holder, Macrophage, Neutrophil, Species, SpeciesError, SpeciesResult,
};

/// Shared spatial state plus the four populations.
#[derive(Clone, Debug)]
pub struct SimState {
    pub clock:       SimClock,
    pub seed:        u64,
    pub grid:        Grid,
    pub tissue:      TissueMap,
    pub molecules:   MoleculeField,
    pub fungi:       Population<Fungus>,
    pub macrophages: Population<Macrophage>,
    pub neutrophils: Population<Neutrophil>,
    pub epithelium:  Population<Epithelial>,
}

impl SimState {
    /// Empty state over `grid`: uniform OTHER tissue, no molecules, no agents.
    pub fn new(grid: Grid, seed: u64) -> Self {
        let tissue = TissueMap::uniform(&grid, TissueType::Other);
        let pop = |s: Species| PopulationBuilder::new(s.name()).seed(seed).stream(s.stream());
        Self {
            clock: SimClock::new(),
            seed,
            tissue,
            molecules: MoleculeField::empty(),
            fungi: pop(Species::Fungus).build(),
            macrophages: pop(Species::Macrophage).build(),
            neutrophils: pop(Species::Neutrophil).build(),
            epithelium: pop(Species::Epithelium).build(),
            grid,
        }
    }

    pub fn population_len(&self, species: Species) -> usize {
        match species {
            Species::Fungus     => self.fungi.len(),
            Species::Macrophage => self.macrophages.len(),
            Species::Neutrophil => self.neutrophils.len(),
            Species::Epithelium => self.epithelium.len(),
        }
    }

    // ── Tick boundary ─────────────────────────────────────────────────────

    /// Commit one population's deferred births and removals, then repair
    /// relations that pointed at removed agents.
    pub fn commit(&mut self, species: Species) -> SpeciesResult<CommitReport> {
        let report = match species {
            Species::Fungus     => self.fungi.commit()?,
            Species::Macrophage => self.macrophages.commit()?,
            Species::Neutrophil => self.neutrophils.commit()?,
            Species::Epithelium => self.epithelium.commit()?,
        };
        if report.removed.is_empty() {
            return Ok(report);
        }

        let removed: FxHashSet<AgentId> = report.removed.iter().copied().collect();
        match species {
            Species::Fungus => {
                for m in self.macrophages.iter_mut() {
                    m.state.phagosome.retain(|f| !removed.contains(f));
                }
                for e in self.epithelium.iter_mut() {
                    e.state.phagosome.retain(|f| !removed.contains(f));
                }
            }
            Species::Macrophage | Species::Epithelium => {
                let mut released = 0;
                for f in self.fungi.iter_mut() {
                    let freed = match f.state.holder {
                        Some(Holder::Macrophage(id)) => {
                            species == Species::Macrophage && removed.contains(&id)
                        }
                        Some(Holder::Epithelium(id)) => {
                            species == Species::Epithelium && removed.contains(&id)
                        }
                        None => false,
                    };
                    if freed {
                        f.state.holder = None;
                        released += 1;
                    }
                }
                if released > 0 {
                    debug!("{species}: {released} conidia released by dead holders");
                }
            }
            Species::Neutrophil => {}
        }
        Ok(report)
    }

    // ── Validation ────────────────────────────────────────────────────────

    /// Check every state invariant: agents in bounds with unique ids,
    /// concentrations finite, non-negative and capped, relations symmetric.
    pub fn validate(&self) -> SpeciesResult<()> {
        let in_bounds = |p| self.grid.contains(p);
        self.fungi.validate(in_bounds)?;
        self.macrophages.validate(in_bounds)?;
        self.neutrophils.validate(in_bounds)?;
        self.epithelium.validate(in_bounds)?;
        self.molecules.validate()?;

        for m in self.macrophages.iter() {
            self.check_held(Holder::Macrophage(m.id()), &m.state.phagosome)?;
        }
        for e in self.epithelium.iter() {
            self.check_held(Holder::Epithelium(e.id()), &e.state.phagosome)?;
        }
        Ok(())
    }

    fn check_held(&self, holder: Holder, phagosome: &[AgentId]) -> SpeciesResult<()> {
        for &f in phagosome {
            let points_back = self.fungi.get(f).is_some_and(|a| a.state.holder == Some(holder));
            if !points_back {
                return Err(SpeciesError::BrokenRelation { holder: holder.to_string(), fungus: f });
            }
        }
        Ok(())
    }
}
