//! `Population<S>`: one species' live agents, in insertion order.
//!
//! # Why a separate `Spawner`?
//!
//! Birth rules run while the module is walking its own agents (a fungal tip
//! spawns a segment, a macrophage is recruited next to a blood vessel).
//! Holding `&mut [Agent<S>]` and pushing to the population at the same time
//! is a double borrow, so new agents go through a [`Spawner`] obtained from
//! [`Population::split_mut`]:
//!
//! ```ignore
//! let (agents, spawner) = population.split_mut();
//! for a in agents.iter_mut() {
//!     if a.state.ready_to_grow() {
//!         spawner.spawn(a.position + dir, Fungus::segment())?;
//!     }
//! }
//! population.commit()?;
//! ```

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};

use nli_core::{AgentId, AgentRng, Point3};

use crate::{AgentError, AgentResult};

// ── Agent ─────────────────────────────────────────────────────────────────────

/// A single agent: identity, position, private RNG and species state.
#[derive(Clone, Debug)]
pub struct Agent<S> {
    id:           AgentId,
    pub position: Point3,
    pub rng:      AgentRng,
    pub state:    S,
    removed:      bool,
}

impl<S> Agent<S> {
    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Tombstone this agent; it disappears at the next [`Population::commit`].
    #[inline]
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

// ── Spawner ───────────────────────────────────────────────────────────────────

/// Id allocation plus the pending-birth list of a population.
#[derive(Clone, Debug)]
pub struct Spawner<S> {
    seed:    u64,
    stream:  u64,
    next_id: u32,
    pending: Vec<Agent<S>>,
}

impl<S> Spawner<S> {
    pub(crate) fn new(seed: u64, stream: u64) -> Self {
        Self { seed, stream, next_id: 0, pending: Vec::new() }
    }

    /// Queue a new agent; it becomes visible after the next commit.
    ///
    /// Ids are never reused within a run, so a stale relation can never point
    /// at a newer agent.
    pub fn spawn(&mut self, position: Point3, state: S) -> AgentResult<AgentId> {
        let id = AgentId(self.next_id);
        if !id.is_valid() {
            return Err(AgentError::IdsExhausted(format!("stream {}", self.stream)));
        }
        self.next_id += 1;
        self.pending.push(Agent {
            id,
            position,
            rng: AgentRng::new(self.seed, self.stream, id),
            state,
            removed: false,
        });
        Ok(id)
    }

    /// Number of births waiting for the next commit.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

// ── Population ────────────────────────────────────────────────────────────────

/// What a [`Population::commit`] changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub added:   usize,
    /// Ids removed at this commit, in their former iteration order.
    pub removed: Vec<AgentId>,
}

impl CommitReport {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed.is_empty()
    }
}

/// Insertion-ordered collection of one species' agents.
#[derive(Clone, Debug)]
pub struct Population<S> {
    species: String,
    agents:  Vec<Agent<S>>,
    index:   FxHashMap<AgentId, usize>,
    spawner: Spawner<S>,
}

impl<S> Population<S> {
    pub(crate) fn new(species: String, seed: u64, stream: u64, capacity: usize) -> Self {
        Self {
            species,
            agents: Vec::with_capacity(capacity),
            index: FxHashMap::default(),
            spawner: Spawner::new(seed, stream),
        }
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Live agents, tombstoned ones included until the next commit.
    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent<S>> {
        self.index.get(&id).map(|&i| &self.agents[i])
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent<S>> {
        self.index.get(&id).map(|&i| &mut self.agents[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Agent<S>> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Agent<S>> {
        self.agents.iter_mut()
    }

    pub fn as_slice(&self) -> &[Agent<S>] {
        &self.agents
    }

    /// Ids in iteration order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(|a| a.id)
    }

    /// `(id, position)` pairs for building a proximity index.
    pub fn positions(&self) -> impl Iterator<Item = (AgentId, Point3)> + '_ {
        self.agents.iter().map(|a| (a.id, a.position))
    }

    /// Agents tombstoned and not yet committed.
    pub fn removed_count(&self) -> usize {
        self.agents.iter().filter(|a| a.removed).count()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Queue a birth.  See [`Spawner::spawn`].
    pub fn spawn(&mut self, position: Point3, state: S) -> AgentResult<AgentId> {
        self.spawner.spawn(position, state)
    }

    /// Tombstone `id`.  Returns `false` if no such agent is live.
    pub fn mark_removed(&mut self, id: AgentId) -> bool {
        match self.get_mut(id) {
            Some(a) => {
                a.removed = true;
                true
            }
            None => false,
        }
    }

    /// Borrow the agents and the spawner at the same time.
    pub fn split_mut(&mut self) -> (&mut [Agent<S>], &mut Spawner<S>) {
        (&mut self.agents, &mut self.spawner)
    }

    pub fn pending_births(&self) -> usize {
        self.spawner.pending()
    }

    /// Apply deferred removals and births.
    ///
    /// Removals go first so survivors keep their relative order; pending
    /// births are appended in spawn order.
    pub fn commit(&mut self) -> AgentResult<CommitReport> {
        let mut report = CommitReport::default();

        if self.agents.iter().any(|a| a.removed) {
            report.removed = self.agents.iter().filter(|a| a.removed).map(|a| a.id).collect();
            self.agents.retain(|a| !a.removed);
        }

        report.added = self.spawner.pending.len();
        self.agents.append(&mut self.spawner.pending);

        if !report.is_empty() {
            self.reindex()?;
            trace!(
                "{}: commit +{} -{} → {} live",
                self.species,
                report.added,
                report.removed.len(),
                self.agents.len()
            );
        }
        Ok(report)
    }

    fn reindex(&mut self) -> AgentResult<()> {
        self.index.clear();
        self.index.reserve(self.agents.len());
        for (i, a) in self.agents.iter().enumerate() {
            if self.index.insert(a.id, i).is_some() {
                return Err(AgentError::DuplicateId { species: self.species.clone(), id: a.id });
            }
        }
        Ok(())
    }

    /// Check that ids are unique and every position satisfies `in_bounds`.
    pub fn validate(&self, in_bounds: impl Fn(Point3) -> bool) -> AgentResult<()> {
        let mut seen = FxHashSet::default();
        for a in &self.agents {
            if !seen.insert(a.id) {
                return Err(AgentError::DuplicateId { species: self.species.clone(), id: a.id });
            }
            if !in_bounds(a.position) {
                return Err(AgentError::OutOfBounds {
                    species:  self.species.clone(),
                    id:       a.id,
                    position: a.position,
                });
            }
        }
        Ok(())
    }
}

#[cfg(feature = "parallel")]
impl<S: Send> Population<S> {
    /// Parallel mutable iteration.  Each agent carries its own RNG, so the
    /// result does not depend on how Rayon splits the work.
    pub fn par_iter_mut(&mut self) -> rayon::slice::IterMut<'_, Agent<S>> {
        use rayon::prelude::*;
        self.agents.par_iter_mut()
    }
}
