//! The voxel lattice.
//!
//! # Indexing
//!
//! Voxels are numbered x-fastest:
//!
//! ```text
//! index = x + nx * (y + ny * z)
//! ```
//!
//! which is also the point order of VTK structured datasets, so field arrays
//! can be dumped without reordering.  Voxel `(x, y, z)` covers the physical
//! box `[x*dx, (x+1)*dx) × [y*dy, (y+1)*dy) × [z*dz, (z+1)*dz)`.

use nli_core::{Point3, VoxelId};

use crate::{GridError, GridResult};

/// Immutable 3D lattice with a physical cell size.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    nx: usize,
    ny: usize,
    nz: usize,
    dx: f64,
    dy: f64,
    dz: f64,
}

impl Grid {
    /// Build a grid of `shape = [nx, ny, nz]` voxels of size
    /// `spacing = [dx, dy, dz]`.
    pub fn new(shape: [usize; 3], spacing: [f64; 3]) -> GridResult<Self> {
        for (axis, value) in ['x', 'y', 'z'].into_iter().zip(shape) {
            if value == 0 {
                return Err(GridError::NonPositiveDimension { axis, value });
            }
        }
        for (axis, value) in ['x', 'y', 'z'].into_iter().zip(spacing) {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridError::NonPositiveSpacing { axis, value });
            }
        }
        let count = shape[0]
            .checked_mul(shape[1])
            .and_then(|n| n.checked_mul(shape[2]))
            .unwrap_or(usize::MAX);
        if count >= u32::MAX as usize {
            return Err(GridError::TooLarge(count));
        }

        let [nx, ny, nz] = shape;
        let [dx, dy, dz] = spacing;
        Ok(Self { nx, ny, nz, dx, dy, dz })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        [self.dx, self.dy, self.dz]
    }

    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Physical size of the whole lattice.
    pub fn extent(&self) -> Point3 {
        Point3::new(
            self.nx as f64 * self.dx,
            self.ny as f64 * self.dy,
            self.nz as f64 * self.dz,
        )
    }

    /// Iterator over every voxel in index order.
    pub fn voxels(&self) -> impl Iterator<Item = VoxelId> + use<> {
        (0..self.voxel_count() as u32).map(VoxelId)
    }

    // ── Coordinate mapping ────────────────────────────────────────────────

    /// `true` if `p` lies inside the half-open physical box of the grid.
    pub fn contains(&self, p: Point3) -> bool {
        let e = self.extent();
        p.is_finite()
            && p.x >= 0.0 && p.x < e.x
            && p.y >= 0.0 && p.y < e.y
            && p.z >= 0.0 && p.z < e.z
    }

    /// The voxel containing `p`.
    pub fn voxel_of(&self, p: Point3) -> GridResult<VoxelId> {
        if !self.contains(p) {
            return Err(GridError::OutOfBounds(p));
        }
        // `contains` guarantees the floors are in range except for rounding
        // right at the upper face; `min` folds that case into the last voxel.
        let ix = ((p.x / self.dx) as usize).min(self.nx - 1);
        let iy = ((p.y / self.dy) as usize).min(self.ny - 1);
        let iz = ((p.z / self.dz) as usize).min(self.nz - 1);
        Ok(self.voxel_at(ix, iy, iz))
    }

    /// Physical center of voxel `v`.
    pub fn position_of(&self, v: VoxelId) -> GridResult<Point3> {
        let [ix, iy, iz] = self.coords_of(v)?;
        Ok(Point3::new(
            (ix as f64 + 0.5) * self.dx,
            (iy as f64 + 0.5) * self.dy,
            (iz as f64 + 0.5) * self.dz,
        ))
    }

    /// Integer `(x, y, z)` coordinates of voxel `v`.
    pub fn coords_of(&self, v: VoxelId) -> GridResult<[usize; 3]> {
        let i = v.index();
        if i >= self.voxel_count() {
            return Err(GridError::InvalidVoxel(v));
        }
        Ok([i % self.nx, (i / self.nx) % self.ny, i / (self.nx * self.ny)])
    }

    /// Voxel at integer coordinates.  Caller guarantees they are in range.
    #[inline]
    pub fn voxel_at(&self, ix: usize, iy: usize, iz: usize) -> VoxelId {
        debug_assert!(ix < self.nx && iy < self.ny && iz < self.nz);
        VoxelId((ix + self.nx * (iy + self.ny * iz)) as u32)
    }

    // ── Neighborhoods ─────────────────────────────────────────────────────

    /// All voxels within Chebyshev distance `radius` of `v`, excluding `v`
    /// itself, in ascending index order.  Truncated at the grid faces.
    pub fn neighbors(&self, v: VoxelId, radius: usize) -> GridResult<Vec<VoxelId>> {
        let [ix, iy, iz] = self.coords_of(v)?;
        let span = |c: usize, n: usize| c.saturating_sub(radius)..=c.saturating_add(radius).min(n - 1);

        let mut out = Vec::new();
        for z in span(iz, self.nz) {
            for y in span(iy, self.ny) {
                for x in span(ix, self.nx) {
                    if (x, y, z) != (ix, iy, iz) {
                        out.push(self.voxel_at(x, y, z));
                    }
                }
            }
        }
        Ok(out)
    }

    /// The six face neighbors of voxel index `i` in the order
    /// `-x, +x, -y, +y, -z, +z`; `None` where the voxel touches a face.
    ///
    /// Takes a raw index because it sits in the diffusion inner loop.
    #[inline]
    pub fn face_neighbors(&self, i: usize) -> [Option<usize>; 6] {
        let (nx, ny, nz) = (self.nx, self.ny, self.nz);
        let x = i % nx;
        let y = (i / nx) % ny;
        let z = i / (nx * ny);
        let plane = nx * ny;
        [
            (x > 0).then(|| i - 1),
            (x + 1 < nx).then(|| i + 1),
            (y > 0).then(|| i - nx),
            (y + 1 < ny).then(|| i + nx),
            (z > 0).then(|| i - plane),
            (z + 1 < nz).then(|| i + plane),
        ]
    }
}
