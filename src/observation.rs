//! Raw two-channel XRS sample.
use crate::prelude::{Epoch, Satellite};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [Observation] is one raw two-channel sample, in instrument native
/// units, prior to any calibration. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Sampling datetime as [Epoch] (UTC)
    pub epoch: Epoch,
    /// Reporting [Satellite]
    pub satellite: Satellite,
    /// Short channel (0.5-4 A) irradiance, in W/m²
    pub short_flux: f64,
    /// Long channel (1-8 A) irradiance, in W/m²
    pub long_flux: f64,
}

impl Observation {
    /// Builds a new [Observation] from one two-channel sample.
    /// Fluxes are taken as reported by the instrument: validation
    /// happens when corrections are applied, not here.
    pub fn new(epoch: Epoch, satellite: Satellite, short_flux: f64, long_flux: f64) -> Self {
        Self {
            epoch,
            satellite,
            short_flux,
            long_flux,
        }
    }
}
