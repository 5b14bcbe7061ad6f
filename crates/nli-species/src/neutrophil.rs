//! Neutrophils: recruited by `n_cyto`, degranulate on swollen conidia and
//! hyphae, live for a fixed number of invocations.

use nli_config::NeutrophilSection;
use nli_core::{SimRng, TissueType, VoxelId};
use nli_grid::ProximityIndex;

use crate::molecules::{IRON, N_CYTO};
use crate::movement::{Recruitment, move_population, placement_sites, random_site, recruit};
use crate::{CellState, FungalForm, FungusStatus, SimState, Species, SpeciesResult, SpeciesRules, StepContext};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NeutrophilStatus {
    #[default]
    Nonactive = 0,
    Active = 1,
    Apoptotic = 2,
    Dead = 3,
}

impl NeutrophilStatus {
    pub fn name(self) -> &'static str {
        match self {
            NeutrophilStatus::Nonactive => "NONACTIVE",
            NeutrophilStatus::Active    => "ACTIVE",
            NeutrophilStatus::Apoptotic => "APOPTOTIC",
            NeutrophilStatus::Dead      => "DEAD",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neutrophil {
    pub status:   NeutrophilStatus,
    pub granules: u32,
    pub iron:     f64,
    /// Invocations survived.
    pub age:      u32,
}

impl Neutrophil {
    pub fn new(granules: u32) -> Self {
        Self { granules, ..Self::default() }
    }

    fn can_act(&self) -> bool {
        matches!(self.status, NeutrophilStatus::Nonactive | NeutrophilStatus::Active)
    }
}

impl CellState for Neutrophil {
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
            "granules" => Some(self.granules as f64),
            "age" => Some(self.age as f64),
            "status" => Some(self.status_code() as f64),
            "iron" => Some(self.iron),
            _ => None,
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

pub struct NeutrophilRules {
    params: NeutrophilSection,
    rng:    SimRng,
    blood:  Vec<VoxelId>,
}

impl NeutrophilRules {
    pub fn new(params: NeutrophilSection, seed: u64) -> Self {
        Self {
            params,
            rng: SimRng::stream(seed, Species::Neutrophil.module_stream()),
            blood: Vec::new(),
        }
    }

    pub fn params(&self) -> &NeutrophilSection {
        &self.params
    }
}

impl SpeciesRules for NeutrophilRules {
    fn species(&self) -> Species {
        Species::Neutrophil
    }

    fn initialize(&mut self, state: &mut SimState) -> SpeciesResult<()> {
        self.blood = state.tissue.voxels_matching(&[TissueType::Blood]);
        let sites = placement_sites(&state.grid, &state.tissue, &[TissueType::Blood]);
        for _ in 0..self.params.init_num {
            if let Some(p) = random_site(&state.grid, &sites, &mut self.rng)? {
                state.neutrophils.spawn(p, Neutrophil::new(self.params.granule_count))?;
            }
        }
        Ok(())
    }

    fn recruit(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<usize> {
        let p = &self.params;
        if p.neutropenic {
            return Ok(0);
        }
        let params = Recruitment {
            molecule:        N_CYTO,
            attempts:        p.rec_rate_ph,
            p_rec:           p.p_rec_r,
            half_saturation: p.nn,
            max_num:         p.max_num,
        };
        let granules = p.granule_count;
        recruit(
            &mut state.neutrophils,
            &state.grid,
            &state.molecules,
            &self.blood,
            &params,
            &mut self.rng,
            || Neutrophil::new(granules),
        )
    }

    fn move_agents(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        move_population(
            &mut state.neutrophils,
            &state.grid,
            &state.molecules,
            N_CYTO,
            self.params.move_radius,
            Neutrophil::can_act,
        )
    }

    /// Degranulate on nearby swollen conidia and hyphae, one granule per hit.
    fn interact(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        let p = &self.params;
        let SimState { neutrophils, fungi, grid, molecules, .. } = state;
        let index = ProximityIndex::build(
            fungi
                .iter()
                .filter(|f| {
                    !f.is_removed()
                        && !f.state.is_dead()
                        && !f.state.internalized()
                        && (f.state.status == FungusStatus::Swelling
                            || f.state.form() == FungalForm::Hyphae)
                })
                .map(|f| (f.id(), f.position)),
        );

        for n in neutrophils.iter_mut() {
            if n.is_removed() || !n.state.can_act() {
                continue;
            }
            for fid in index.within(n.position, p.rec_r) {
                if n.state.granules == 0 {
                    break;
                }
                let Some(f) = fungi.get_mut(fid) else { continue };
                if f.state.is_dead() {
                    continue;
                }
                n.state.granules -= 1;
                n.state.status = NeutrophilStatus::Active;
                f.state.health -= p.n_kill;
            }

            let v = grid.voxel_of(n.position)?;
            n.state.iron += molecules.take_fraction(IRON, v, p.n_absorb);
            if n.state.status == NeutrophilStatus::Active {
                molecules.add(N_CYTO, v, p.cyto_rate);
            }
        }
        Ok(())
    }

    fn transition(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        for n in state.neutrophils.iter_mut() {
            let s = &mut n.state;
            if s.status == NeutrophilStatus::Dead {
                continue;
            }
            s.age += 1;
            if s.granules == 0 {
                s.status = NeutrophilStatus::Apoptotic;
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        for n in state.neutrophils.iter_mut() {
            if n.state.age >= self.params.age_limit {
                n.state.status = NeutrophilStatus::Dead;
            }
            if n.state.status == NeutrophilStatus::Dead {
                n.mark_removed();
            }
        }
        Ok(())
    }
}
