//! Per-voxel tissue layout.
//!
//! A [`TissueMap`] assigns one [`TissueType`] to every voxel.  It is built
//! once by the geometry module and read by molecule initialization, source
//! injection and agent placement.
//!
//! Two layouts are provided:
//!
//! - **uniform**: every voxel gets the same tissue.
//! - **alveoli**: a deterministic synthetic lung patch: spherical air sacs
//!   lined with surfactant and wrapped in a one-voxel epithelial shell, with
//!   capillaries (BLOOD) running along z on a regular x/y lattice between
//!   the sacs.

use log::debug;
use nli_core::{SimRng, TissueType, VoxelId};

use crate::{Grid, GridError, GridResult};

/// Parameters for the synthetic alveolar layout.
#[derive(Clone, Debug, PartialEq)]
pub struct AlveoliParams {
    pub alveolus_count:    usize,
    /// Sac radius in voxels.
    pub alveolus_radius:   f64,
    /// Capillary lattice pitch in voxels (0 disables capillaries).
    pub capillary_spacing: usize,
}

/// One tissue type per voxel, in voxel index order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TissueMap {
    tissue: Vec<TissueType>,
}

impl TissueMap {
    /// Every voxel set to `fill`.
    pub fn uniform(grid: &Grid, fill: TissueType) -> Self {
        Self { tissue: vec![fill; grid.voxel_count()] }
    }

    /// Wrap an explicit per-voxel layout.
    pub fn from_vec(grid: &Grid, tissue: Vec<TissueType>) -> GridResult<Self> {
        if tissue.len() != grid.voxel_count() {
            return Err(GridError::ShapeMismatch {
                expected: grid.voxel_count(),
                got:      tissue.len(),
            });
        }
        Ok(Self { tissue })
    }

    /// Synthetic alveolar patch; identical for identical `seed`.
    pub fn alveoli(grid: &Grid, params: &AlveoliParams, seed: u64) -> Self {
        let [nx, ny, nz] = grid.shape();
        let mut rng = SimRng::stream(seed, 0x6e6f_6d65);

        let centers: Vec<[f64; 3]> = (0..params.alveolus_count)
            .map(|_| {
                [
                    rng.gen_range(0.0..nx as f64),
                    rng.gen_range(0.0..ny as f64),
                    rng.gen_range(0.0..nz as f64),
                ]
            })
            .collect();

        let r = params.alveolus_radius;
        let pitch = params.capillary_spacing;
        let mut tissue = Vec::with_capacity(grid.voxel_count());

        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let p = [x as f64 + 0.5, y as f64 + 0.5, z as f64 + 0.5];
                    // Signed distance to the nearest sac surface, in voxels.
                    let depth = centers
                        .iter()
                        .map(|c| {
                            let d2 = (p[0] - c[0]).powi(2)
                                + (p[1] - c[1]).powi(2)
                                + (p[2] - c[2]).powi(2);
                            d2.sqrt() - r
                        })
                        .fold(f64::INFINITY, f64::min);

                    let t = if depth < -2.0 {
                        TissueType::Air
                    } else if depth < -1.0 {
                        TissueType::Surfactant
                    } else if depth <= 0.0 {
                        TissueType::Epithelium
                    } else if pitch > 0 && x % pitch == 0 && y % pitch == 0 {
                        TissueType::Blood
                    } else {
                        TissueType::Other
                    };
                    tissue.push(t);
                }
            }
        }

        let map = Self { tissue };
        debug!(
            "alveolar geometry: {} sacs, counts {:?}",
            params.alveolus_count,
            map.counts()
        );
        map
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn get(&self, v: VoxelId) -> TissueType {
        self.tissue[v.index()]
    }

    #[inline]
    pub fn as_slice(&self) -> &[TissueType] {
        &self.tissue
    }

    pub fn len(&self) -> usize {
        self.tissue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tissue.is_empty()
    }

    /// All voxels whose tissue is in `kinds`, ascending.
    pub fn voxels_matching(&self, kinds: &[TissueType]) -> Vec<VoxelId> {
        self.tissue
            .iter()
            .enumerate()
            .filter(|(_, t)| kinds.contains(t))
            .map(|(i, _)| VoxelId(i as u32))
            .collect()
    }

    /// Voxel count per tissue type, in `TissueType::ALL` order.
    pub fn counts(&self) -> [usize; 5] {
        let mut counts = [0; 5];
        for t in &self.tissue {
            counts[t.code() as usize] += 1;
        }
        counts
    }
}
