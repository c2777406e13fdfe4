//! Most commonly used types, grouped for convenient import.
pub use crate::{
    batch::{Batch, BatchSummary},
    calibration::{CalibrationEpoch, CalibrationSet, CorrectionFactor},
    errors::{EstimateError, FluxError, LoadError, ParsingError, ResolveError},
    inversion::{InversionResult, InversionStatus, TemEstimator},
    observation::Observation,
    response::{GridPoint, ResponseModelSet, ResponseModelTable},
    satellite::Satellite,
};

// pub re-export
pub use hifitime::{Duration, Epoch, TimeScale, Unit};
