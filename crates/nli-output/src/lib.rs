//! `nli-output`: files written while a simulation runs.
//!
//! | Module name      | Type                    | Files                                   |
//! |------------------|-------------------------|-----------------------------------------|
//! | `visualization`  | [`VisualizationModule`] | `<output_dir>/<variable>-<time>.vtk`    |
//! | `state_output`   | [`StateOutputModule`]   | `<output_dir>/simulation-<time>.json`   |
//! | `tabular_output` | [`TabularOutputModule`] | one CSV, one row per agent per call     |
//!
//! `<time>` is the simulated time zero-padded to `%08.3f`, or `final` for
//! the file written when the run finishes.  VTK and JSON files are written
//! to a temp file and renamed into place.  CSV files grow under
//! `<path>.part` and are renamed to `<path>` when the run finalizes.
//!
//! [`SummaryObserver`] is not a module: it hangs off the run loop and
//! records population counts after every tick.
//!
//! # Usage
//!
//! ```rust,ignore
//! use nli_output::{register_output_modules, SummaryObserver};
//!
//! let mut sim = register_output_modules(SimBuilder::new(config)).build()?;
//! let mut obs = SummaryObserver::create(Path::new("out/summary.csv"))?;
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() { log::error!("summary: {e}"); }
//! ```

pub mod atomic;
pub mod error;
pub mod modules;
pub mod observer;
pub mod row;
pub mod snapshot;
pub mod vtk;


pub use atomic::{StagedCsv, Stamp, stamped_path, write_atomic};
pub use error::{OutputError, OutputResult};
pub use modules::{
    StateOutputModule, TabularOutputModule, VisualizationModule, register_output_modules, write_variable,
};
pub use observer::SummaryObserver;
pub use row::{AgentRow, TickSummaryRow, agent_rows, species_attributes, species_rows};
pub use snapshot::StateSnapshot;
pub use vtk::{PointCloud, ScalarField, write_field, write_points};
