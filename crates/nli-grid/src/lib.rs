//! `nli-grid`: the voxel lattice and everything spatial.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`grid`]     | `Grid`: immutable 3D lattice, coordinate ↔ voxel mapping   |
//! | [`geometry`] | `TissueMap`, `AlveoliParams`: per-voxel tissue layout      |
//! | [`index`]    | `ProximityIndex`: R-tree over agent positions              |
//! | [`error`]    | `GridError`, `GridResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod geometry;
pub mod grid;
pub mod index;


pub use error::{GridError, GridResult};
pub use geometry::{AlveoliParams, TissueMap};
pub use grid::Grid;
pub use index::ProximityIndex;
