//! `MoleculeField`: one dense concentration array per named molecule.

use log::warn;
use rustc_hash::FxHashMap;

use nli_core::VoxelId;
use nli_grid::{Grid, TissueMap};

use crate::diffusion::diffuse;
use crate::{MoleculeError, MoleculeResult, MoleculeSpec};

// ── Molecule ──────────────────────────────────────────────────────────────────

/// One molecule's spec, its concentrations and its precomputed source set.
#[derive(Clone, Debug)]
pub struct Molecule {
    pub spec: MoleculeSpec,
    values:   Vec<f64>,
    scratch:  Vec<f64>,
    sources:  Vec<VoxelId>,
}

impl Molecule {
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn get(&self, v: VoxelId) -> f64 {
        self.values[v.index()]
    }

    pub fn sources(&self) -> &[VoxelId] {
        &self.sources
    }

    /// Sum over all voxels (concentration × 1 voxel).
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// What a single [`MoleculeField::update`] had to correct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Voxels that came out negative and were reset to zero.
    pub clamped_negative: usize,
    /// Voxels pushed back down to the configured cap.
    pub clamped_max:      usize,
}

// ── MoleculeField ─────────────────────────────────────────────────────────────

/// All diffusible substances over one grid.
///
/// Molecules keep their configuration order; lookups by name go through a
/// hash index.
#[derive(Clone, Debug, Default)]
pub struct MoleculeField {
    molecules: Vec<Molecule>,
    by_name:   FxHashMap<String, usize>,
}

impl MoleculeField {
    /// A field with no molecules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Initialize every molecule in `specs` over `grid`, placing `init_val`
    /// on voxels whose tissue is in `init_loc` and precomputing source sets.
    pub fn new(grid: &Grid, tissue: &TissueMap, specs: Vec<MoleculeSpec>) -> MoleculeResult<Self> {
        let mut field = Self::empty();
        for spec in specs {
            let spec = spec.sanitize()?;
            if field.by_name.contains_key(&spec.name) {
                return Err(MoleculeError::DuplicateName(spec.name));
            }

            let values: Vec<f64> = tissue
                .as_slice()
                .iter()
                .map(|t| {
                    if spec.init_loc.is_empty() || spec.init_loc.contains(t) {
                        spec.init_val.min(spec.upper())
                    } else {
                        0.0
                    }
                })
                .collect();
            let sources = if spec.source.is_empty() {
                vec![]
            } else {
                tissue.voxels_matching(&spec.source)
            };

            field.by_name.insert(spec.name.clone(), field.molecules.len());
            field.molecules.push(Molecule {
                spec,
                scratch: vec![0.0; grid.voxel_count()],
                values,
                sources,
            });
        }
        Ok(field)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Molecule> {
        self.molecules.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.molecules.iter().map(|m| m.spec.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Molecule> {
        self.by_name.get(name).map(|&i| &self.molecules[i])
    }

    pub fn require(&self, name: &str) -> MoleculeResult<&Molecule> {
        self.get(name).ok_or_else(|| MoleculeError::Unknown(name.to_owned()))
    }

    /// Concentration of `name` at `v`; zero for an unknown molecule so that
    /// agent rules can reference optional cytokines.
    #[inline]
    pub fn concentration(&self, name: &str, v: VoxelId) -> f64 {
        self.get(name).map_or(0.0, |m| m.get(v))
    }

    /// Direct mutable access to a molecule's concentrations.
    pub fn values_mut(&mut self, name: &str) -> Option<&mut [f64]> {
        let i = *self.by_name.get(name)?;
        Some(&mut self.molecules[i].values)
    }

    // ── Agent exchange ────────────────────────────────────────────────────

    /// Add `amount` of `name` to voxel `v`, respecting the cap.  Unknown
    /// molecules are ignored.  Returns the amount actually added.
    pub fn add(&mut self, name: &str, v: VoxelId, amount: f64) -> f64 {
        let Some(&i) = self.by_name.get(name) else { return 0.0 };
        let m = &mut self.molecules[i];
        let cell = &mut m.values[v.index()];
        let before = *cell;
        *cell = (before + amount).clamp(0.0, m.spec.upper());
        *cell - before
    }

    /// Remove `fraction` (clamped to [0, 1]) of `name` from voxel `v` and
    /// return the amount removed.
    pub fn take_fraction(&mut self, name: &str, v: VoxelId, fraction: f64) -> f64 {
        let Some(&i) = self.by_name.get(name) else { return 0.0 };
        let cell = &mut self.molecules[i].values[v.index()];
        let taken = *cell * fraction.clamp(0.0, 1.0);
        *cell -= taken;
        taken
    }

    // ── Update ────────────────────────────────────────────────────────────

    /// Advance every molecule by one module invocation.
    ///
    /// Negative results are clamped to zero and counted; a non-finite value
    /// cannot be repaired and is returned as an error.
    pub fn update(&mut self, grid: &Grid, diffusion_steps: usize) -> MoleculeResult<UpdateReport> {
        let mut report = UpdateReport::default();

        for m in &mut self.molecules {
            diffuse(grid, &mut m.values, &mut m.scratch, m.spec.diffusivity, diffusion_steps);

            if m.spec.evaporation > 0.0 {
                let keep = 1.0 - m.spec.evaporation;
                m.values.iter_mut().for_each(|c| *c *= keep);
            }
            for v in &m.sources {
                m.values[v.index()] += m.spec.incr;
            }

            let upper = m.spec.upper();
            for (i, c) in m.values.iter_mut().enumerate() {
                if !c.is_finite() {
                    return Err(MoleculeError::NonFinite {
                        molecule: m.spec.name.clone(),
                        voxel:    i,
                        value:    *c,
                    });
                }
                if *c < 0.0 {
                    *c = 0.0;
                    report.clamped_negative += 1;
                } else if *c > upper {
                    *c = upper;
                    report.clamped_max += 1;
                }
            }
        }

        if report.clamped_negative > 0 {
            warn!(
                "invariant violation: {} negative concentrations clamped to zero",
                report.clamped_negative
            );
        }
        Ok(report)
    }

    /// Check the field invariants without modifying anything.
    pub fn validate(&self) -> MoleculeResult<()> {
        for m in &self.molecules {
            let max = m.spec.upper();
            for (i, &c) in m.values.iter().enumerate() {
                if !c.is_finite() {
                    return Err(MoleculeError::NonFinite {
                        molecule: m.spec.name.clone(),
                        voxel:    i,
                        value:    c,
                    });
                }
                if c < 0.0 || c > max {
                    return Err(MoleculeError::OutOfRange {
                        molecule: m.spec.name.clone(),
                        voxel:    i,
                        value:    c,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}
