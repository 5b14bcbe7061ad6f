//! Placement, recruitment and chemotaxis shared by the species rules.

use nli_agent::Population;
use nli_core::{AgentRng, Point3, SimRng, TissueType, VoxelId};
use nli_grid::{Grid, TissueMap};
use nli_molecule::MoleculeField;

use crate::SpeciesResult;

// ── Placement ─────────────────────────────────────────────────────────────────

/// Voxels of the given tissue kinds; every voxel if none match.
pub fn placement_sites(grid: &Grid, tissue: &TissueMap, kinds: &[TissueType]) -> Vec<VoxelId> {
    let sites = tissue.voxels_matching(kinds);
    if sites.is_empty() { grid.voxels().collect() } else { sites }
}

/// Centre of a random site.
pub fn random_site(grid: &Grid, sites: &[VoxelId], rng: &mut SimRng) -> SpeciesResult<Option<Point3>> {
    match rng.choose(sites) {
        Some(&v) => Ok(Some(grid.position_of(v)?)),
        None => Ok(None),
    }
}

// ── Recruitment ───────────────────────────────────────────────────────────────

/// Saturating recruitment probability `p · c / (c + k)`.
#[inline]
pub fn recruitment_probability(p_rec: f64, concentration: f64, half_saturation: f64) -> f64 {
    let denom = concentration + half_saturation;
    if denom > 0.0 { (p_rec * concentration / denom).clamp(0.0, 1.0) } else { 0.0 }
}

/// Parameters of one recruitment pass.
#[derive(Clone, Debug)]
pub struct Recruitment<'a> {
    /// Chemokine driving recruitment.
    pub molecule:        &'a str,
    /// Maximum recruits (and attempts) per invocation.
    pub attempts:        usize,
    pub p_rec:           f64,
    pub half_saturation: f64,
    pub max_num:         Option<usize>,
}

/// Try `attempts` times to spawn an agent at a random blood site, each with
/// the saturating probability of the local chemokine.
pub fn recruit<S>(
    pop:       &mut Population<S>,
    grid:      &Grid,
    field:     &MoleculeField,
    blood:     &[VoxelId],
    params:    &Recruitment<'_>,
    rng:       &mut SimRng,
    mut fresh: impl FnMut() -> S,
) -> SpeciesResult<usize> {
    let mut recruited = 0;
    for _ in 0..params.attempts {
        if params.max_num.is_some_and(|max| pop.len() + pop.pending_births() >= max) {
            break;
        }
        let Some(&v) = rng.choose(blood) else { break };
        let c = field.concentration(params.molecule, v);
        if rng.gen_bool(recruitment_probability(params.p_rec, c, params.half_saturation)) {
            pop.spawn(grid.position_of(v)?, fresh())?;
            recruited += 1;
        }
    }
    Ok(recruited)
}

// ── Chemotaxis ────────────────────────────────────────────────────────────────

/// Next position of an agent at `position` drifting up the gradient of
/// `molecule`.
///
/// The agent picks its own voxel or one within `radius` (Chebyshev) with
/// probability proportional to concentration; with no signal anywhere in
/// range the choice is uniform, i.e. a random walk.
pub fn chemotaxis_step(
    grid:     &Grid,
    field:    &MoleculeField,
    molecule: &str,
    position: Point3,
    radius:   usize,
    rng:      &mut AgentRng,
) -> SpeciesResult<Point3> {
    let here = grid.voxel_of(position)?;
    let mut candidates = grid.neighbors(here, radius)?;
    candidates.push(here);

    let weights: Vec<f64> = candidates.iter().map(|&v| field.concentration(molecule, v)).collect();
    let pick = rng
        .choose_weighted(&weights)
        .unwrap_or_else(|| rng.gen_range(0..candidates.len()));
    Ok(grid.position_of(candidates[pick])?)
}

/// Move every agent for which `mobile` holds one chemotaxis step.
///
/// Reads only the molecule field and each agent's own position, so agents
/// are independent and may be processed in parallel.
pub fn move_population<S>(
    pop:      &mut Population<S>,
    grid:     &Grid,
    field:    &MoleculeField,
    molecule: &str,
    radius:   usize,
    mobile:   impl Fn(&S) -> bool + Sync,
) -> SpeciesResult<()>
where
    S: Send,
{
    #[cfg(not(feature = "parallel"))]
    {
        for a in pop.iter_mut() {
            if a.is_removed() || !mobile(&a.state) {
                continue;
            }
            a.position = chemotaxis_step(grid, field, molecule, a.position, radius, &mut a.rng)?;
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        pop.par_iter_mut()
            .filter(|a| !a.is_removed() && mobile(&a.state))
            .try_for_each(|a| {
                a.position = chemotaxis_step(grid, field, molecule, a.position, radius, &mut a.rng)?;
                Ok(())
            })
    }
}
