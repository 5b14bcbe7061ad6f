//! Deterministic per-agent and per-module RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent owns an independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (stream * STREAM_CONSTANT) XOR (agent_id * MIXING_CONSTANT)
//!
//! `stream` separates species so fungus #0 and macrophage #0 do not share a
//! sequence.  The mixing constant is the 64-bit fractional part of the golden
//! ratio.  Because every agent carries its own generator, per-agent work can
//! run on any number of threads and still produce identical results.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentId, Point3};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;
/// Odd constant separating RNG streams (species, modules).
const STREAM_CONSTANT: u64 = 0xd1b5_4a32_d192_ed03;

/// Uniformly distributed unit vector, shared by both wrappers.
fn unit_vector<R: Rng>(rng: &mut R) -> Point3 {
    // Marsaglia (1972): rejection-sample the unit disk, lift to the sphere.
    loop {
        let a: f64 = rng.gen_range(-1.0..1.0);
        let b: f64 = rng.gen_range(-1.0..1.0);
        let s = a * a + b * b;
        if s < 1.0 && s > 0.0 {
            let r = 2.0 * (1.0 - s).sqrt();
            return Point3::new(a * r, b * r, 1.0 - 2.0 * s);
        }
    }
}

fn weighted<R: Rng>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    WeightedIndex::new(weights.iter().copied()).ok().map(|d| d.sample(rng))
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG, stored inside the agent it belongs to.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed, a stream tag and an
    /// agent ID.
    pub fn new(global_seed: u64, stream: u64, agent: AgentId) -> Self {
        let seed = global_seed
            ^ stream.wrapping_mul(STREAM_CONSTANT)
            ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniformly distributed direction.
    pub fn unit_vector(&mut self) -> Point3 {
        unit_vector(&mut self.0)
    }

    /// Index drawn proportionally to `weights`.  `None` if the weights are
    /// empty, all zero, or contain a negative/non-finite entry.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        weighted(&mut self.0, weights)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Module-level RNG for population-wide operations (recruitment, initial
/// placement).  Used only from the single-threaded parts of a module pass.
#[derive(Clone, Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Independent stream derived from a root seed and a tag, without
    /// consuming any state.
    pub fn stream(seed: u64, tag: u64) -> Self {
        SimRng::new(seed ^ tag.wrapping_mul(STREAM_CONSTANT))
    }

    /// Derive a child `SimRng`; advances `self`.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice; `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    pub fn unit_vector(&mut self) -> Point3 {
        unit_vector(&mut self.0)
    }

    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        weighted(&mut self.0, weights)
    }
}
