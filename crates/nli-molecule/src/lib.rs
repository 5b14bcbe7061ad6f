//! `nli-molecule`: diffusible substances over the voxel grid.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`spec`]      | `MoleculeSpec`: static description of one molecule       |
//! | [`field`]     | `MoleculeField`, `Molecule`: concentration arrays        |
//! | [`diffusion`] | explicit 7-point stencil with reflective boundary         |
//! | [`error`]     | `MoleculeError`, `MoleculeResult<T>`                      |
//!
//! # Update order
//!
//! ```text
//! for each molecule:
//!   ① diffusion  × diffusion_steps   (reads prior copy, writes scratch, swap)
//!   ② evaporation  c *= 1 - rate
//!   ③ sources      c += incr on source voxels
//!   ④ clamp        c ∈ [0, max]
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Diffusion stencil runs on Rayon's thread pool.         |

pub mod diffusion;
pub mod error;
pub mod field;
pub mod spec;

#[cfg(test)]
mod tests;

pub use error::{MoleculeError, MoleculeResult};
pub use field::{Molecule, MoleculeField, UpdateReport};
pub use spec::MoleculeSpec;
