//! `nli-species`: the shared simulation state and per-species rules.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`state`]      | `SimState`: grid, tissue, molecules, all populations      |
//! | [`species`]    | `Species`, `CellState`, `Holder`                           |
//! | [`rules`]      | `SpeciesRules` trait, `StepContext`, `run_pipeline`        |
//! | [`movement`]   | chemotaxis, placement and recruitment helpers              |
//! | [`fungus`]     | `Fungus`, `FungusStatus`, `FungusRules`                    |
//! | [`macrophage`] | `Macrophage`, `MacrophageStatus`, `MacrophageRules`        |
//! | [`neutrophil`] | `Neutrophil`, `NeutrophilStatus`, `NeutrophilRules`        |
//! | [`epithelium`] | `Epithelial`, `EpithelialStatus`, `EpitheliumRules`        |
//! | [`error`]      | `SpeciesError`, `SpeciesResult<T>`                         |
//!
//! # Pipeline
//!
//! Each species module, when due, runs five stages and then commits its
//! population at the boundary:
//!
//! ```text
//! recruit → move → interact → transition → cleanup → commit (+ relation sweep)
//! ```
//!
//! Agents of one population refer to agents of another only by id.  An
//! internalized conidium records its [`Holder`]; the holder lists the
//! conidium in its phagosome.  Both sides are kept consistent when either
//! one dies (see [`SimState::commit`]).

pub mod epithelium;
pub mod error;
pub mod fungus;
pub mod macrophage;
pub mod movement;
pub mod neutrophil;
pub mod rules;
pub mod species;
pub mod state;


pub use epithelium::{Epithelial, EpithelialStatus, EpitheliumRules};
pub use error::{SpeciesError, SpeciesResult};
pub use fungus::{FungalForm, Fungus, FungusRules, FungusStatus};
pub use macrophage::{Macrophage, MacrophageRules, MacrophageStatus};
pub use neutrophil::{Neutrophil, NeutrophilRules, NeutrophilStatus};
pub use rules::{PipelineReport, SpeciesRules, StepContext, run_initialize, run_pipeline};
pub use species::{CellState, Holder, Species};
pub use state::SimState;

/// Molecule names the species rules read and write.
pub mod molecules {
    pub const IRON: &str = "iron";
    /// Macrophage-recruiting cytokine.
    pub const M_CYTO: &str = "m_cyto";
    /// Neutrophil-recruiting cytokine.
    pub const N_CYTO: &str = "n_cyto";
}
