//! The `SimModule` trait.

use nli_species::{SimState, StepContext};

use crate::SimResult;

/// One named, scheduled unit of work.
///
/// Modules run strictly one after another; a module owns its own
/// parameters and RNG and sees the shared state only through the
/// `SimState` handed to each call.
pub trait SimModule: Send {
    /// Configuration section name, e.g. `"macrophage"`.
    fn name(&self) -> &str;

    /// Called once, in declared order, before the first tick.
    fn initialize(&mut self, state: &mut SimState) -> SimResult<()>;

    /// Called each time the scheduler finds the module due.
    fn advance(&mut self, state: &mut SimState, ctx: &StepContext) -> SimResult<()>;

    /// Called once after the last tick of a run.
    fn finalize(&mut self, _state: &SimState) -> SimResult<()> {
        Ok(())
    }
}
