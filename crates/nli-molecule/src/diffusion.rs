//! Explicit diffusion stencil.
//!
//! Each voxel's new value is a weighted average of its own prior value and
//! the mean of its six face neighbors:
//!
//! ```text
//! c'[i] = (1 - D) · c[i] + D · mean(c[n] for n in faces(i))
//! ```
//!
//! A missing neighbor (grid face) contributes `c[i]` itself, which makes the
//! boundary reflective: no mass crosses it.  With `D ∈ [0, 1]` every output
//! is a convex combination of inputs, so the scheme is positivity-preserving
//! and the total is conserved up to rounding.
//!
//! `prior` is never written, so the result does not depend on visit order.

use nli_grid::Grid;

/// Value of voxel `i` after one stencil application.
#[inline]
fn stencil(grid: &Grid, prior: &[f64], i: usize, d: f64) -> f64 {
    let own = prior[i];
    let sum: f64 = grid
        .face_neighbors(i)
        .iter()
        .map(|n| n.map_or(own, |j| prior[j]))
        .sum();
    (1.0 - d) * own + d * (sum / 6.0)
}

/// Write one diffusion step of `prior` into `next`.
///
/// Both slices must have `grid.voxel_count()` elements.
pub fn diffuse_step(grid: &Grid, prior: &[f64], next: &mut [f64], diffusivity: f64) {
    debug_assert_eq!(prior.len(), grid.voxel_count());
    debug_assert_eq!(next.len(), prior.len());

    if diffusivity == 0.0 {
        next.copy_from_slice(prior);
        return;
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, out) in next.iter_mut().enumerate() {
            *out = stencil(grid, prior, i, diffusivity);
        }
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        next.par_iter_mut()
            .enumerate()
            .for_each(|(i, out)| *out = stencil(grid, prior, i, diffusivity));
    }
}

/// Apply `steps` diffusion steps in place, using `scratch` as the second
/// buffer.  `values` holds the result on return.
pub fn diffuse(
    grid:        &Grid,
    values:      &mut Vec<f64>,
    scratch:     &mut Vec<f64>,
    diffusivity: f64,
    steps:       usize,
) {
    scratch.resize(values.len(), 0.0);
    for _ in 0..steps {
        diffuse_step(grid, values, scratch, diffusivity);
        std::mem::swap(values, scratch);
    }
}
