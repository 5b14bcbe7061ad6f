//! `nli-schedule`: which modules run on which tick, and in what order.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`scheduler`] | `Scheduler`, `ScheduleEntry`, `Phase`, `Step`             |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Step model (summary)
//!
//! Every registered module has a cadence (`time_step`).  One step:
//!
//! ```text
//! dt        = min(next_due - time)   over modules with cadence > 0
//! time     += dt;  tick += 1
//! due       = { m : next_due(m) <= time + ε }
//! run order = sort due by (phase, declared index)
//! next_due  = time + cadence          for each module that ran
//! ```
//!
//! A cadence of `0` means "initialization only": the module never becomes
//! due.  A cadence a hair above an integer (`1.000001`) is the traditional
//! way of asking to run after same-cadence peers; it is normalized to the
//! integer cadence with [`Phase::Late`] so ordering never depends on
//! floating-point accidents.

pub mod error;
pub mod scheduler;


pub use error::{ScheduleError, ScheduleResult};
pub use scheduler::{LATE_TOLERANCE, Phase, ScheduleEntry, Scheduler, Step};
