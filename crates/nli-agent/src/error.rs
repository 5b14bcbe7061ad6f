use nli_core::{AgentId, Point3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{species}: duplicate live agent id {id}")]
    DuplicateId { species: String, id: AgentId },

    #[error("{species}: agent {id} at {position} is outside the grid")]
    OutOfBounds {
        species:  String,
        id:       AgentId,
        position: Point3,
    },

    #[error("{0}: agent id space exhausted")]
    IdsExhausted(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
