//! Alveolar macrophages: recruited from blood by `m_cyto`, internalize
//! conidia, damage hyphae, sequester iron.

use nli_config::MacrophageSection;
use nli_core::{AgentId, SimRng, TissueType, VoxelId};
use nli_grid::ProximityIndex;

use crate::molecules::{IRON, M_CYTO};
use crate::movement::{Recruitment, move_population, placement_sites, random_site, recruit};
use crate::{
    CellState, FungalForm, Holder, SimState, Species, SpeciesResult, SpeciesRules, StepContext,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MacrophageStatus {
    #[default]
    Resting = 0,
    Active = 1,
    Dead = 2,
}

impl MacrophageStatus {
    pub fn name(self) -> &'static str {
        match self {
            MacrophageStatus::Resting => "RESTING",
            MacrophageStatus::Active  => "ACTIVE",
            MacrophageStatus::Dead    => "DEAD",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Macrophage {
    pub status:        MacrophageStatus,
    pub iron:          f64,
    /// Ids of internalized fungi.
    pub phagosome:     Vec<AgentId>,
    /// Invocations survived.
    pub age:           u32,
    pub time_in_state: f64,
    /// Touched or held a fungus during the current invocation.
    pub contact:       bool,
}

impl CellState for Macrophage {
    fn status_name(&self) -> &'static str {
        self.status.name()
    }

    fn status_code(&self) -> u8 {
        self.status as u8
    }

    fn health(&self) -> Option<f64> {
        None
    }

    fn iron(&self) -> f64 {
        self.iron
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "phagosome" => Some(self.phagosome.len() as f64),
            "age" => Some(self.age as f64),
            "status" => Some(self.status_code() as f64),
            "iron" => Some(self.iron),
            _ => None,
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

pub struct MacrophageRules {
    params: MacrophageSection,
    rng:    SimRng,
    blood:  Vec<VoxelId>,
}

impl MacrophageRules {
    pub fn new(params: MacrophageSection, seed: u64) -> Self {
        Self {
            params,
            rng: SimRng::stream(seed, Species::Macrophage.module_stream()),
            blood: Vec::new(),
        }
    }

    pub fn params(&self) -> &MacrophageSection {
        &self.params
    }
}

impl SpeciesRules for MacrophageRules {
    fn species(&self) -> Species {
        Species::Macrophage
    }

    fn initialize(&mut self, state: &mut SimState) -> SpeciesResult<()> {
        self.blood = state.tissue.voxels_matching(&[TissueType::Blood]);
        let sites = placement_sites(&state.grid, &state.tissue, &[TissueType::Air, TissueType::Surfactant]);
        for _ in 0..self.params.init_num {
            if let Some(p) = random_site(&state.grid, &sites, &mut self.rng)? {
                state.macrophages.spawn(p, Macrophage::default())?;
            }
        }
        Ok(())
    }

    fn recruit(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<usize> {
        let p = &self.params;
        let params = Recruitment {
            molecule:        M_CYTO,
            attempts:        p.rec_rate_ph,
            p_rec:           p.p_rec_r,
            half_saturation: p.mn,
            max_num:         p.max_num,
        };
        recruit(
            &mut state.macrophages,
            &state.grid,
            &state.molecules,
            &self.blood,
            &params,
            &mut self.rng,
            Macrophage::default,
        )
    }

    /// Chemotaxis up `m_cyto`; internalized fungi travel along.
    fn move_agents(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        let SimState { macrophages, fungi, grid, molecules, .. } = state;
        move_population(macrophages, grid, molecules, M_CYTO, self.params.move_radius, |m| {
            m.status != MacrophageStatus::Dead
        })?;

        for m in macrophages.iter() {
            for &fid in &m.state.phagosome {
                if let Some(f) = fungi.get_mut(fid) {
                    f.position = m.position;
                }
            }
        }
        Ok(())
    }

    fn interact(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        let p = &self.params;
        let SimState { macrophages, fungi, grid, molecules, .. } = state;
        let index = ProximityIndex::build(
            fungi.iter().filter(|f| !f.is_removed() && !f.state.is_dead()).map(|f| (f.id(), f.position)),
        );

        for m in macrophages.iter_mut() {
            if m.is_removed() || m.state.status == MacrophageStatus::Dead {
                continue;
            }
            let holder = Holder::Macrophage(m.id());
            m.state.contact = !m.state.phagosome.is_empty();

            for fid in index.within(m.position, p.rec_r) {
                let Some(f) = fungi.get_mut(fid) else { continue };
                if f.state.is_dead() {
                    continue;
                }
                match f.state.form() {
                    FungalForm::Conidia => {
                        if f.state.internalized() {
                            continue;
                        }
                        m.state.contact = true;
                        if m.state.phagosome.len() < p.max_conidia_in_phag
                            && m.rng.gen_bool(p.p_internalization)
                        {
                            f.state.holder = Some(holder);
                            m.state.phagosome.push(fid);
                        }
                    }
                    FungalForm::Hyphae => {
                        m.state.contact = true;
                        f.state.health -= p.kill;
                    }
                }
            }

            for &fid in &m.state.phagosome {
                if let Some(f) = fungi.get_mut(fid) {
                    f.state.health -= p.kill;
                }
            }

            if m.state.contact && m.state.status == MacrophageStatus::Resting {
                m.state.status = MacrophageStatus::Active;
                m.state.time_in_state = 0.0;
            }

            let v = grid.voxel_of(m.position)?;
            m.state.iron += molecules.take_fraction(IRON, v, p.m_abs);
            if m.state.status == MacrophageStatus::Active {
                molecules.add(M_CYTO, v, p.cyto_rate);
            }
        }
        Ok(())
    }

    fn transition(&mut self, state: &mut SimState, ctx: &StepContext) -> SpeciesResult<()> {
        for m in state.macrophages.iter_mut() {
            let s = &mut m.state;
            if s.status == MacrophageStatus::Dead {
                continue;
            }
            s.age += 1;
            if s.contact {
                s.time_in_state = 0.0;
            } else {
                s.time_in_state += ctx.dt;
                if s.status == MacrophageStatus::Active && s.time_in_state >= self.params.time_m {
                    s.status = MacrophageStatus::Resting;
                    s.time_in_state = 0.0;
                }
            }
        }
        Ok(())
    }

    /// Age out.  Held conidia are released when the removal is committed.
    fn cleanup(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        for m in state.macrophages.iter_mut() {
            if m.state.age >= self.params.age_limit {
                m.state.status = MacrophageStatus::Dead;
            }
            if m.state.status == MacrophageStatus::Dead {
                m.mark_removed();
            }
        }
        Ok(())
    }
}
