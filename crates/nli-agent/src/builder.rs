//! Fluent builder for an empty [`Population`].
//!
//! # Usage
//!
//! ```rust
//! use nli_agent::PopulationBuilder;
//! use nli_core::Point3;
//!
//! #[derive(Clone, Debug, Default)]
//! struct Neutrophil { granules: u32 }
//!
//! let mut pop = PopulationBuilder::new("neutrophil")
//!     .seed(42)
//!     .stream(3)
//!     .capacity(1_000)
//!     .build::<Neutrophil>();
//!
//! pop.spawn(Point3::new(1.0, 1.0, 1.0), Neutrophil { granules: 5 }).unwrap();
//! assert!(pop.is_empty());        // births are deferred
//! pop.commit().unwrap();
//! assert_eq!(pop.len(), 1);
//! ```

use crate::Population;

/// Fluent builder for [`Population`].
///
/// The `(seed, stream)` pair fixes every agent's RNG: agent `n` of a stream
/// always draws the same sequence for a given seed.
pub struct PopulationBuilder {
    species:  String,
    seed:     u64,
    stream:   u64,
    capacity: usize,
}

impl PopulationBuilder {
    pub fn new(species: impl Into<String>) -> Self {
        Self { species: species.into(), seed: 0, stream: 0, capacity: 0 }
    }

    /// Global run seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Stream tag separating this species' RNGs from other species'.
    pub fn stream(mut self, stream: u64) -> Self {
        self.stream = stream;
        self
    }

    /// Pre-allocate room for `capacity` agents.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn build<S>(self) -> Population<S> {
        Population::new(self.species, self.seed, self.stream, self.capacity)
    }
}
