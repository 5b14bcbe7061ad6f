use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown module {0:?}")]
    UnknownModule(String),

    #[error("module {0:?} listed more than once")]
    DuplicateModule(String),

    #[error("module {0:?} is listed but has no [{0}] section")]
    MissingSection(String),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: String, value: f64 },

    #[error("{field} must be a finite non-negative number, got {value}")]
    Negative { field: String, value: f64 },

    #[error("{field} must be a probability in [0, 1], got {value}")]
    Probability { field: String, value: f64 },

    #[error("molecule {0:?} is defined more than once")]
    DuplicateMolecule(String),

    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
