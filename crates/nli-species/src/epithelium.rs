//! Airway epithelium: one static cell per epithelial voxel.  Internalizes
//! and clears conidia, is damaged by hyphae, signals both cytokines while
//! infected.

use nli_config::EpitheliumSection;
use nli_core::{AgentId, TissueType, VoxelId};
use nli_grid::ProximityIndex;

use crate::molecules::{M_CYTO, N_CYTO};
use crate::{
    CellState, FungalForm, Holder, SimState, Species, SpeciesResult, SpeciesRules, StepContext,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EpithelialStatus {
    #[default]
    Healthy = 0,
    Infected = 1,
    Dead = 2,
}

impl EpithelialStatus {
    pub fn name(self) -> &'static str {
        match self {
            EpithelialStatus::Healthy  => "HEALTHY",
            EpithelialStatus::Infected => "INFECTED",
            EpithelialStatus::Dead     => "DEAD",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Epithelial {
    pub status:    EpithelialStatus,
    pub health:    f64,
    pub phagosome: Vec<AgentId>,
    /// The voxel this cell lines.
    pub voxel:     VoxelId,
}

impl Epithelial {
    pub fn new(voxel: VoxelId, health: f64) -> Self {
        Self { status: EpithelialStatus::Healthy, health, phagosome: Vec::new(), voxel }
    }
}

impl CellState for Epithelial {
    fn status_name(&self) -> &'static str {
        self.status.name()
    }

    fn status_code(&self) -> u8 {
        self.status as u8
    }

    fn health(&self) -> Option<f64> {
        Some(self.health)
    }

    fn iron(&self) -> f64 {
        0.0
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "phagosome" => Some(self.phagosome.len() as f64),
            "status" => Some(self.status_code() as f64),
            "health" => Some(self.health),
            "iron" => Some(0.0),
            _ => None,
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

pub struct EpitheliumRules {
    params: EpitheliumSection,
}

impl EpitheliumRules {
    pub fn new(params: EpitheliumSection) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EpitheliumSection {
        &self.params
    }
}

impl SpeciesRules for EpitheliumRules {
    fn species(&self) -> Species {
        Species::Epithelium
    }

    fn initialize(&mut self, state: &mut SimState) -> SpeciesResult<()> {
        let sites = state.tissue.voxels_matching(&[TissueType::Epithelium]);
        let limit = self.params.init_num.unwrap_or(sites.len());
        for v in sites.into_iter().take(limit) {
            let p = state.grid.position_of(v)?;
            state.epithelium.spawn(p, Epithelial::new(v, self.params.init_health))?;
        }
        Ok(())
    }

    fn interact(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        let p = &self.params;
        let SimState { epithelium, fungi, molecules, .. } = state;
        let index = ProximityIndex::build(
            fungi.iter().filter(|f| !f.is_removed() && !f.state.is_dead()).map(|f| (f.id(), f.position)),
        );

        for e in epithelium.iter_mut() {
            if e.is_removed() || e.state.status == EpithelialStatus::Dead {
                continue;
            }
            let holder = Holder::Epithelium(e.id());

            for fid in index.within(e.position, p.rec_r) {
                let Some(f) = fungi.get_mut(fid) else { continue };
                if f.state.is_dead() {
                    continue;
                }
                match f.state.form() {
                    FungalForm::Conidia if !f.state.internalized() => {
                        if e.state.phagosome.len() < p.max_conidia_in_phag
                            && e.rng.gen_bool(p.p_internalization)
                        {
                            f.state.holder = Some(holder);
                            e.state.phagosome.push(fid);
                        }
                    }
                    FungalForm::Conidia => {}
                    FungalForm::Hyphae => e.state.health -= p.e_kill,
                }
            }

            for &fid in &e.state.phagosome {
                if e.rng.gen_bool(p.p_remove_fungus) {
                    if let Some(f) = fungi.get_mut(fid) {
                        f.state.health = 0.0;
                    }
                }
            }

            if e.state.status == EpithelialStatus::Infected {
                molecules.add(M_CYTO, e.state.voxel, p.cyto_rate);
                molecules.add(N_CYTO, e.state.voxel, p.cyto_rate);
            }
        }
        Ok(())
    }

    fn transition(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        for e in state.epithelium.iter_mut() {
            let s = &mut e.state;
            if s.status == EpithelialStatus::Dead {
                continue;
            }
            s.status = if s.phagosome.is_empty() {
                EpithelialStatus::Healthy
            } else {
                EpithelialStatus::Infected
            };
        }
        Ok(())
    }

    fn cleanup(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        for e in state.epithelium.iter_mut() {
            if e.state.health <= 0.0 {
                e.state.status = EpithelialStatus::Dead;
                e.mark_removed();
            }
        }
        Ok(())
    }
}
