//! Built-in modules: geometry, molecules and the four species.

use log::{debug, info, warn};

use nli_config::{GeometryLayout, GeometrySection, MoleculesSection};
use nli_grid::{AlveoliParams, TissueMap};
use nli_molecule::MoleculeField;
use nli_species::{SimState, SpeciesRules, StepContext, run_initialize, run_pipeline};

use crate::{SimError, SimModule, SimResult};

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Builds the tissue map.  Static afterwards.
pub struct GeometryModule {
    params: GeometrySection,
}

impl GeometryModule {
    pub fn new(params: GeometrySection) -> Self {
        Self { params }
    }
}

impl SimModule for GeometryModule {
    fn name(&self) -> &str {
        "geometry"
    }

    fn initialize(&mut self, state: &mut SimState) -> SimResult<()> {
        let p = &self.params;
        state.tissue = match p.layout {
            GeometryLayout::Uniform => TissueMap::uniform(&state.grid, p.fill),
            GeometryLayout::Alveoli => TissueMap::alveoli(
                &state.grid,
                &AlveoliParams {
                    alveolus_count:    p.alveolus_count,
                    alveolus_radius:   p.alveolus_radius,
                    capillary_spacing: p.capillary_spacing,
                },
                state.seed,
            ),
        };
        let [air, blood, epi, surf, other] = state.tissue.counts();
        info!(
            "geometry: {:?} layout, air={air} blood={blood} epithelium={epi} surfactant={surf} other={other}",
            p.layout
        );
        Ok(())
    }

    fn advance(&mut self, _state: &mut SimState, _ctx: &StepContext) -> SimResult<()> {
        Ok(())
    }
}

// ── Molecules ─────────────────────────────────────────────────────────────────

/// Owns the molecule field's lifecycle: creation from the configured
/// records, then diffusion, decay and sources once per invocation.
pub struct MoleculesModule {
    params: MoleculesSection,
}

impl MoleculesModule {
    pub fn new(params: MoleculesSection) -> Self {
        Self { params }
    }
}

impl SimModule for MoleculesModule {
    fn name(&self) -> &str {
        "molecules"
    }

    fn initialize(&mut self, state: &mut SimState) -> SimResult<()> {
        state.molecules = MoleculeField::new(&state.grid, &state.tissue, self.params.specs())
            .map_err(|e| SimError::molecule("molecules", e))?;
        info!("molecules: {} field(s)", state.molecules.len());
        Ok(())
    }

    fn advance(&mut self, state: &mut SimState, _ctx: &StepContext) -> SimResult<()> {
        let report = state
            .molecules
            .update(&state.grid, self.params.diffusion_steps)
            .map_err(|e| SimError::molecule("molecules", e))?;
        if report.clamped_max > 0 {
            debug!("molecules: {} voxel(s) capped", report.clamped_max);
        }
        if report.clamped_negative > 0 {
            warn!("molecules: {} negative concentration(s) clamped", report.clamped_negative);
        }
        Ok(())
    }
}

// ── Species ───────────────────────────────────────────────────────────────────

/// Adapts any [`SpeciesRules`] to the module interface.
pub struct SpeciesModule<R> {
    rules: R,
}

impl<R: SpeciesRules> SpeciesModule<R> {
    pub fn new(rules: R) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }
}

impl<R: SpeciesRules> SimModule for SpeciesModule<R> {
    fn name(&self) -> &str {
        self.rules.species().name()
    }

    fn initialize(&mut self, state: &mut SimState) -> SimResult<()> {
        let name = self.rules.species().name();
        let placed = run_initialize(&mut self.rules, state).map_err(|e| SimError::species(name, e))?;
        info!("{name}: {placed} initial agent(s)");
        Ok(())
    }

    fn advance(&mut self, state: &mut SimState, ctx: &StepContext) -> SimResult<()> {
        let name = self.rules.species().name();
        let report = run_pipeline(&mut self.rules, state, ctx).map_err(|e| SimError::species(name, e))?;
        if !report.commit.is_empty() || report.recruited > 0 {
            debug!(
                "{name}: recruited {}, born {}, removed {} (t={:.3})",
                report.recruited,
                report.commit.added,
                report.commit.removed.len(),
                ctx.time
            );
        }
        Ok(())
    }
}
