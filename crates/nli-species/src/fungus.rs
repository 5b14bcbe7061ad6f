//! Aspergillus: conidia that swell, germinate and grow branching hyphae.
//!
//! ```text
//! RESTING ──rest_time──▶ SWELLING ──swell_time, iron ≥ iron_min_grow──▶ GERMINATING
//!                                                                        │ grow_time
//!                                                      spawn tip(s) ◀────┘
//!                                                                        ▼
//!                                                                    BRANCHING
//! any state ──health ≤ 0──▶ DEAD (removed at the tick boundary)
//! ```
//!
//! RESTING and SWELLING are conidia; GERMINATING and BRANCHING are hyphae.
//! An internalized conidium keeps swelling but cannot germinate.

use nli_config::FungusSection;
use nli_core::{Point3, SimRng, TissueType};

use crate::molecules::IRON;
use crate::movement::{placement_sites, random_site};
use crate::{CellState, Holder, SimState, Species, SpeciesResult, SpeciesRules, StepContext};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FungusStatus {
    #[default]
    Resting = 0,
    Swelling = 1,
    Germinating = 2,
    Branching = 3,
    Dead = 4,
}

impl FungusStatus {
    pub fn name(self) -> &'static str {
        match self {
            FungusStatus::Resting     => "RESTING",
            FungusStatus::Swelling    => "SWELLING",
            FungusStatus::Germinating => "GERMINATING",
            FungusStatus::Branching   => "BRANCHING",
            FungusStatus::Dead        => "DEAD",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FungalForm {
    Conidia,
    Hyphae,
}

/// State of one fungal agent (a conidium or one hyphal segment).
#[derive(Clone, Debug, PartialEq)]
pub struct Fungus {
    pub status:        FungusStatus,
    pub health:        f64,
    pub iron:          f64,
    /// Set while a phagocyte or epithelial cell holds this conidium.
    pub holder:        Option<Holder>,
    pub time_in_state: f64,
    /// Unit growth direction; zero until germination.
    pub growth:        Point3,
}

impl Fungus {
    /// A fresh resting conidium.
    pub fn conidium(health: f64, iron: f64) -> Self {
        Self {
            status: FungusStatus::Resting,
            health,
            iron,
            holder: None,
            time_in_state: 0.0,
            growth: Point3::ORIGIN,
        }
    }

    /// A new hyphal tip growing along `growth`.
    pub fn hypha(health: f64, iron: f64, growth: Point3) -> Self {
        Self {
            status: FungusStatus::Germinating,
            health,
            iron,
            holder: None,
            time_in_state: 0.0,
            growth,
        }
    }

    pub fn form(&self) -> FungalForm {
        match self.status {
            FungusStatus::Resting | FungusStatus::Swelling => FungalForm::Conidia,
            _ => FungalForm::Hyphae,
        }
    }

    #[inline]
    pub fn internalized(&self) -> bool {
        self.holder.is_some()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.status == FungusStatus::Dead || self.health <= 0.0
    }

    fn enter(&mut self, status: FungusStatus) {
        self.status = status;
        self.time_in_state = 0.0;
    }
}

impl CellState for Fungus {
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
        self.iron
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "internalized" => Some(self.internalized() as u8 as f64),
            "form" => Some((self.form() == FungalForm::Hyphae) as u8 as f64),
            "time_in_state" => Some(self.time_in_state),
            "status" => Some(self.status_code() as f64),
            "health" => Some(self.health),
            "iron" => Some(self.iron),
            _ => None,
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

pub struct FungusRules {
    params: FungusSection,
    rng:    SimRng,
}

impl FungusRules {
    pub fn new(params: FungusSection, seed: u64) -> Self {
        Self { params, rng: SimRng::stream(seed, Species::Fungus.module_stream()) }
    }

    pub fn params(&self) -> &FungusSection {
        &self.params
    }

    fn segment_length(&self, state: &SimState) -> f64 {
        if self.params.spacing > 0.0 {
            self.params.spacing
        } else {
            let [dx, dy, dz] = state.grid.spacing();
            dx.min(dy).min(dz)
        }
    }
}

impl SpeciesRules for FungusRules {
    fn species(&self) -> Species {
        Species::Fungus
    }

    fn initialize(&mut self, state: &mut SimState) -> SpeciesResult<()> {
        let sites = placement_sites(
            &state.grid,
            &state.tissue,
            &[TissueType::Air, TissueType::Surfactant, TissueType::Epithelium],
        );
        for _ in 0..self.params.init_num {
            if let Some(p) = random_site(&state.grid, &sites, &mut self.rng)? {
                state.fungi.spawn(p, Fungus::conidium(self.params.init_health, self.params.init_iron))?;
            }
        }
        Ok(())
    }

    /// Take up free iron from the local voxel.
    fn interact(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        let SimState { fungi, grid, molecules, .. } = state;
        let absorb = self.params.iron_absorb;
        if absorb <= 0.0 {
            return Ok(());
        }

        for f in fungi.iter_mut() {
            if f.is_removed() || f.state.is_dead() || f.state.internalized() {
                continue;
            }
            let v = grid.voxel_of(f.position)?;
            let local = molecules.concentration(IRON, v);
            if local <= 0.0 {
                continue;
            }
            let room = self.params.iron_max.map_or(f64::INFINITY, |m| (m - f.state.iron).max(0.0));
            let want = (local * absorb).min(room);
            if want > 0.0 {
                f.state.iron += molecules.take_fraction(IRON, v, want / local);
            }
        }
        Ok(())
    }

    fn transition(&mut self, state: &mut SimState, ctx: &StepContext) -> SpeciesResult<()> {
        let length = self.segment_length(state);
        let p = &self.params;
        let SimState { fungi, grid, .. } = state;
        let (agents, spawner) = fungi.split_mut();
        let mut live = agents.len() + spawner.pending();

        for a in agents.iter_mut() {
            if a.is_removed() {
                continue;
            }
            let f = &mut a.state;
            if f.is_dead() {
                continue;
            }
            f.time_in_state += ctx.dt;

            match f.status {
                FungusStatus::Resting if f.time_in_state >= p.rest_time => {
                    f.enter(FungusStatus::Swelling);
                }
                FungusStatus::Swelling
                    if f.time_in_state >= p.swell_time
                        && f.iron >= p.iron_min_grow
                        && !f.internalized() =>
                {
                    f.growth = a.rng.unit_vector();
                    f.enter(FungusStatus::Germinating);
                }
                _ => {}
            }

            // Germinating is transient: with `grow_time` elapsed (or zero) the
            // fungus branches in the invocation it germinated in.
            if f.status == FungusStatus::Germinating && f.time_in_state >= p.grow_time && !f.internalized() {
                let mut dirs = vec![f.growth];
                if a.rng.gen_bool(p.p_branch) {
                    let turn = f.growth + a.rng.unit_vector();
                    dirs.push(turn.normalized().unwrap_or(f.growth));
                }

                let tips: Vec<(Point3, Point3)> = dirs
                    .into_iter()
                    .map(|d| (a.position + d * length, d))
                    .filter(|(tip, _)| grid.contains(*tip))
                    .take(p.max_num.map_or(usize::MAX, |max| max.saturating_sub(live)))
                    .collect();

                let share = f.iron / (tips.len() + 1) as f64;
                f.iron = share;
                for (tip, dir) in tips {
                    spawner.spawn(tip, Fungus::hypha(p.init_health, share, dir))?;
                    live += 1;
                }
                f.enter(FungusStatus::Branching);
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        for f in state.fungi.iter_mut() {
            if f.state.is_dead() {
                f.state.status = FungusStatus::Dead;
                f.mark_removed();
            }
        }
        Ok(())
    }
}
