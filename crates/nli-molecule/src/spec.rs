//! Static description of one diffusible molecule.

use log::warn;
use nli_core::TissueType;

use crate::{MoleculeError, MoleculeResult};

/// Everything needed to initialize and update one molecule's field.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoleculeSpec {
    pub name:        String,
    /// Concentration placed on `init_loc` voxels at initialization.
    pub init_val:    f64,
    /// Tissues that receive `init_val`; empty means every voxel.
    pub init_loc:    Vec<TissueType>,
    /// Stencil weight in `[0, 1]`.
    pub diffusivity: f64,
    /// Tissues that receive `incr` every update.
    pub source:      Vec<TissueType>,
    pub incr:        f64,
    /// Fraction lost per update, in `[0, 1]`.
    pub evaporation: f64,
    /// Upper cap; `None` leaves the field unbounded above.
    pub max:         Option<f64>,
}

impl MoleculeSpec {
    /// A molecule that only diffuses.
    pub fn new(name: impl Into<String>, init_val: f64, diffusivity: f64) -> Self {
        Self {
            name: name.into(),
            init_val,
            init_loc: vec![],
            diffusivity,
            source: vec![],
            incr: 0.0,
            evaporation: 0.0,
            max: None,
        }
    }

    /// Check parameters, repairing what can be repaired.
    ///
    /// A finite diffusivity outside `[0, 1]` would make the explicit scheme
    /// unstable; it is clamped into range with a warning.  Anything non-finite
    /// or negative where a magnitude is expected is an error.
    pub fn sanitize(mut self) -> MoleculeResult<Self> {
        let invalid = |parameter, value| MoleculeError::InvalidParameter {
            molecule: self.name.clone(),
            parameter,
            value,
        };

        if !self.diffusivity.is_finite() {
            return Err(invalid("diffusivity", self.diffusivity));
        }
        if !(0.0..=1.0).contains(&self.diffusivity) {
            let clamped = self.diffusivity.clamp(0.0, 1.0);
            warn!(
                "molecule {:?}: diffusivity {} outside stable range [0, 1], clamped to {}",
                self.name, self.diffusivity, clamped
            );
            self.diffusivity = clamped;
        }
        if !(self.init_val.is_finite() && self.init_val >= 0.0) {
            return Err(invalid("init_val", self.init_val));
        }
        if !self.incr.is_finite() {
            return Err(invalid("incr", self.incr));
        }
        if !(0.0..=1.0).contains(&self.evaporation) {
            return Err(invalid("evaporation", self.evaporation));
        }
        if let Some(max) = self.max {
            if !(max.is_finite() && max >= 0.0) {
                return Err(invalid("max", max));
            }
        }
        Ok(self)
    }

    /// The effective upper bound (`+∞` when uncapped).
    #[inline]
    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(f64::INFINITY)
    }
}
