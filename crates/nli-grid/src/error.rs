use nli_core::{Point3, VoxelId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid dimension {axis} must be positive, got {value}")]
    NonPositiveDimension { axis: char, value: usize },

    #[error("voxel size {axis} must be positive and finite, got {value}")]
    NonPositiveSpacing { axis: char, value: f64 },

    #[error("grid of {0} voxels exceeds the addressable range")]
    TooLarge(usize),

    #[error("position {0} lies outside the grid")]
    OutOfBounds(Point3),

    #[error("{0} is not a voxel of this grid")]
    InvalidVoxel(VoxelId),

    #[error("tissue map has {got} voxels, grid has {expected}")]
    ShapeMismatch { expected: usize, got: usize },
}

pub type GridResult<T> = Result<T, GridError>;
