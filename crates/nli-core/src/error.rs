//! Base error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! into them via `From` or wrap it as one variant.

use thiserror::Error;

use crate::AgentId;

/// The error type for `nli-core` primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("unknown tissue type {0:?}")]
    UnknownTissue(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `nli-core`.
pub type CoreResult<T> = Result<T, CoreError>;
