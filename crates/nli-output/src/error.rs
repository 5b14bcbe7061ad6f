//! Error types for nli-output.

use nli_config::VtkType;
use thiserror::Error;

/// Errors that can occur when writing simulation output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no visual variable `{variable}` in module `{module}`")]
    UnknownVariable { module: String, variable: String },

    #[error("{kind:?} cannot represent {what}")]
    Unsupported { kind: VtkType, what: &'static str },
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
