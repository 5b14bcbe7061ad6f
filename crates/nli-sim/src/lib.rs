//! `nli-sim`: drives a configured set of modules over one shared state.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`module`]   | `SimModule` trait                                         |
//! | [`modules`]  | geometry, molecules and species modules                   |
//! | [`builder`]  | `SimBuilder`: config → grid, scheduler, modules          |
//! | [`sim`]      | `Simulation`: initialize / step / finalize loop          |
//! | [`observer`] | `SimObserver`, `RunStatus`, `Progress`                    |
//! | [`error`]    | `SimError`, `SimResult<T>`                                |
//!
//! # Tick loop
//!
//! ```text
//! initialize:  every module, declared order           → RunStatus::Initialize
//! loop until target time:
//!   ① scheduler advances to the earliest due time
//!   ② due modules run, (phase, declared order)
//!   ③ optional full-state validation                  → RunStatus::Step
//! finalize:    every module                           → RunStatus::Finalize
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Diffusion and movement on Rayon; honours `num_threads` |

pub mod builder;
pub mod error;
pub mod module;
pub mod modules;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::{ModuleFactory, SimBuilder};
pub use error::{SimError, SimResult};
pub use module::SimModule;
pub use modules::{GeometryModule, MoleculesModule, SpeciesModule};
pub use observer::{NoopObserver, Progress, RunStatus, SimObserver};
pub use sim::{RunSummary, Simulation};

pub use nli_species::{SimState, StepContext};
