use nli_config::ConfigError;
use nli_grid::GridError;
use nli_molecule::MoleculeError;
use nli_schedule::ScheduleError;
use nli_species::SpeciesError;
use thiserror::Error;

/// Failure of a simulation run, classified at the module boundary.
///
/// Only [`SimError::Output`] is recoverable; the run loop logs it and
/// carries on.  Everything else stops the run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("numeric instability in `{module}`: {source}")]
    NumericInstability {
        module: String,
        #[source]
        source: MoleculeError,
    },

    #[error("output error in `{module}`: {message}")]
    Output { module: String, message: String },

    #[error("invariant violation in `{module}`: {source}")]
    InvariantViolation {
        module: String,
        #[source]
        source: SpeciesError,
    },
}

impl SimError {
    /// Whether the run must stop.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SimError::Output { .. })
    }

    /// Problems detectable before the first tick.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SimError::Configuration(_) | SimError::Config(_) | SimError::Schedule(_))
    }

    pub fn output(module: impl Into<String>, message: impl ToString) -> Self {
        SimError::Output { module: module.into(), message: message.to_string() }
    }

    /// Classify a molecule failure raised while running `module`.
    pub fn molecule(module: &str, e: MoleculeError) -> Self {
        if e.is_numeric() {
            SimError::NumericInstability { module: module.to_owned(), source: e }
        } else {
            SimError::Configuration(format!("{module}: {e}"))
        }
    }

    /// Classify a species-rule failure raised while running `module`.
    pub fn species(module: &str, e: SpeciesError) -> Self {
        match e {
            SpeciesError::Molecule(m) => SimError::molecule(module, m),
            other => SimError::InvariantViolation { module: module.to_owned(), source: other },
        }
    }
}

impl From<GridError> for SimError {
    fn from(e: GridError) -> Self {
        SimError::Configuration(e.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;
