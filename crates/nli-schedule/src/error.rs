use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("module {name:?}: cadence must be finite and non-negative, got {value}")]
    InvalidCadence { name: String, value: f64 },

    #[error("module {0:?} registered twice")]
    DuplicateModule(String),

    #[error("too many modules (limit {0})")]
    TooManyModules(usize),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
