//! The `SpeciesRules` trait: one implementation per species.

use log::trace;

use nli_agent::CommitReport;

use crate::{SimState, Species, SpeciesResult};

/// Per-invocation inputs shared by all stages.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepContext {
    /// Simulated time since this module last ran (its cadence).
    pub dt:   f64,
    /// Simulated time now.
    pub time: f64,
}

/// What one pipeline pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub recruited: usize,
    pub commit:    CommitReport,
}

/// Species-specific behaviour, split into the five pipeline stages.
///
/// Only [`initialize`](Self::initialize), [`transition`](Self::transition)
/// and [`cleanup`](Self::cleanup) are required; static or non-recruiting
/// species keep the no-op defaults for the rest.
///
/// Stages must not change the shape of a population directly: births go
/// through the population's spawner and deaths through
/// `Agent::mark_removed`, both applied by [`run_pipeline`] at the end.
pub trait SpeciesRules: Send {
    fn species(&self) -> Species;

    /// Place the initial agents.  Called once, before the first tick.
    fn initialize(&mut self, state: &mut SimState) -> SpeciesResult<()>;

    /// Spawn new agents (e.g. from blood vessels).  Returns how many.
    fn recruit(&mut self, _state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<usize> {
        Ok(0)
    }

    fn move_agents(&mut self, _state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        Ok(())
    }

    /// Act on agents of other populations and on the molecule field.
    fn interact(&mut self, _state: &mut SimState, _ctx: &StepContext) -> SpeciesResult<()> {
        Ok(())
    }

    /// Advance the lifecycle state machine.
    fn transition(&mut self, state: &mut SimState, ctx: &StepContext) -> SpeciesResult<()>;

    /// Mark dead agents for removal.
    fn cleanup(&mut self, state: &mut SimState, ctx: &StepContext) -> SpeciesResult<()>;
}

/// Run all five stages, then commit the population.
pub fn run_pipeline<R>(rules: &mut R, state: &mut SimState, ctx: &StepContext) -> SpeciesResult<PipelineReport>
where
    R: SpeciesRules + ?Sized,
{
    let recruited = rules.recruit(state, ctx)?;
    rules.move_agents(state, ctx)?;
    rules.interact(state, ctx)?;
    rules.transition(state, ctx)?;
    rules.cleanup(state, ctx)?;
    let commit = state.commit(rules.species())?;

    trace!(
        "{}: recruited {recruited}, +{} -{} → {}",
        rules.species(),
        commit.added,
        commit.removed.len(),
        state.population_len(rules.species())
    );
    Ok(PipelineReport { recruited, commit })
}

/// Place a species' initial agents and commit them.  Returns how many.
pub fn run_initialize<R>(rules: &mut R, state: &mut SimState) -> SpeciesResult<usize>
where
    R: SpeciesRules + ?Sized,
{
    rules.initialize(state)?;
    let commit = state.commit(rules.species())?;
    Ok(commit.added)
}
