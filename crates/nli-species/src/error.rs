use nli_core::AgentId;
use thiserror::Error;

use nli_agent::AgentError;
use nli_grid::GridError;
use nli_molecule::MoleculeError;

#[derive(Debug, Error)]
pub enum SpeciesError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Molecule(#[from] MoleculeError),

    #[error("{holder} holds fungus {fungus}, which does not point back at it")]
    BrokenRelation { holder: String, fungus: AgentId },
}

pub type SpeciesResult<T> = Result<T, SpeciesError>;
