//! `nli-agent`: agent storage for the `nli` simulator.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`population`]  | `Agent<S>`, `Population<S>`, `Spawner<S>`, `CommitReport` |
//! | [`builder`]     | `PopulationBuilder` (fluent construction)                 |
//! | [`error`]       | `AgentError`, `AgentResult<T>`                            |
//!
//! # Deferred mutation
//!
//! A population never changes shape while a module is iterating it.  Births
//! go to a pending list through [`Spawner`]; deaths set a tombstone on the
//! agent.  [`Population::commit`] applies both at the tick boundary, so an
//! agent marked removed stays reachable by id until then.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Adds `Population::par_iter_mut` (Rayon).                   |

pub mod builder;
pub mod error;
pub mod population;


pub use builder::PopulationBuilder;
pub use error::{AgentError, AgentResult};
pub use population::{Agent, CommitReport, Population, Spawner};
