use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoleculeError {
    #[error("molecule {0:?} is defined more than once")]
    DuplicateName(String),

    #[error("unknown molecule {0:?}")]
    Unknown(String),

    #[error("molecule {molecule:?}: invalid {parameter} = {value}")]
    InvalidParameter {
        molecule:  String,
        parameter: &'static str,
        value:     f64,
    },

    #[error("molecule {molecule:?}: non-finite concentration {value} at voxel {voxel}")]
    NonFinite {
        molecule: String,
        voxel:    usize,
        value:    f64,
    },

    #[error("molecule {molecule:?}: concentration {value} at voxel {voxel} violates [0, {max}]")]
    OutOfRange {
        molecule: String,
        voxel:    usize,
        value:    f64,
        max:      f64,
    },
}

impl MoleculeError {
    /// `true` for errors that describe a numeric blow-up rather than bad input.
    pub fn is_numeric(&self) -> bool {
        matches!(self, MoleculeError::NonFinite { .. } | MoleculeError::OutOfRange { .. })
    }
}

pub type MoleculeResult<T> = Result<T, MoleculeError>;
