//! Error taxonomy, one enum per concern.
use crate::prelude::{Epoch, Satellite};
use thiserror::Error;

/// Reference data file syntax errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParsingError {
    /// Satellite identifier not recognized
    #[error("invalid satellite identifier")]
    SatelliteFormat,
    /// Datetime field does not follow ISO-8601
    #[error("invalid datetime format")]
    EpochFormat,
    /// Invalid floating point field
    #[error("invalid number format")]
    NumberFormat,
    /// Row does not carry enough columns
    #[error("missing column in data row")]
    MissingColumn,
    /// Response model files must open with the VERSION marker
    #[error("missing response model version marker")]
    VersionFormat,
}

/// Reference data integrity errors. All of these are raised while
/// loading the reference sets, never during inversion: a set that
/// loaded correctly serves any request.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing error: {0}")]
    Parsing(#[from] ParsingError),
    /// Interpolation requires at least two grid points
    #[error("response table for {0} needs at least 2 grid points")]
    NotEnoughGridPoints(Satellite),
    /// Temperature grid must be strictly increasing
    #[error("temperature grid for {0} is not strictly increasing")]
    NonMonotonicTemperature(Satellite),
    /// The reference spectral model guarantees a monotonic
    /// ratio/temperature relationship: enforce it on load.
    #[error("ratio column for {0} is not strictly increasing")]
    NonMonotonicRatio(Satellite),
    /// Ratio and coefficient columns are interpolated in log space
    /// and must remain strictly positive.
    #[error("non-positive ratio or coefficient in table for {0}")]
    NonPositiveColumn(Satellite),
    /// Calibration epochs for one satellite overlap or are unordered
    #[error("calibration epochs for {0} overlap")]
    OverlappingEpochs(Satellite),
    /// Two tables declared for the same satellite
    #[error("response model for {0} declared twice")]
    DuplicateTable(Satellite),
}

/// Calibration epoch lookup failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// No calibration epoch covers this satellite at this datetime
    #[error("no calibration data for {satellite} at {epoch}")]
    NoCalibrationData { satellite: Satellite, epoch: Epoch },
}

/// Raw observation rejection. Raised before any correction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FluxError {
    /// Raw channel flux is negative
    #[error("negative raw flux")]
    NegativeFlux,
    /// Raw channel flux is NaN or infinite
    #[error("non-finite raw flux")]
    NonFiniteFlux,
}

/// Single observation processing failure, as returned by the
/// fine-grained [crate::TemEstimator::estimate] surface. The batch
/// surface downgrades these to a status code instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Flux(#[from] FluxError),
    /// Satellite has calibration data but no response model registered
    #[error("no response model for {0}")]
    NoResponseModel(Satellite),
}
