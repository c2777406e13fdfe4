//! Inversion outcome types and the [TemEstimator] engine.
use crate::{
    batch::{Batch, BatchSummary},
    calibration::CalibrationSet,
    corrector,
    errors::EstimateError,
    prelude::{Epoch, Observation, Satellite},
    response::ResponseModelSet,
};

use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome classification of one inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InversionStatus {
    /// Ratio fell within the table: interpolated temperature
    #[strum(to_string = "ok")]
    Ok,
    /// Ratio below the lowest tabulated value, temperature clamped
    /// to the coolest grid point
    #[strum(to_string = "below table range")]
    BelowTableRange,
    /// Ratio above the highest tabulated value, temperature clamped
    /// to the hottest grid point
    #[strum(to_string = "above table range")]
    AboveTableRange,
    /// Sample could not be inverted (dead channel, bad raw flux,
    /// missing calibration or model data)
    #[strum(to_string = "invalid input")]
    InvalidInput,
}

/// [InversionResult] is the physical state recovered from one
/// [Observation], aligned to its datetime.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InversionResult {
    /// Sampling datetime of the source [Observation]
    pub epoch: Epoch,
    /// Reporting [Satellite]
    pub satellite: Satellite,
    /// Isothermal plasma temperature (K).
    /// NaN when status is [InversionStatus::InvalidInput].
    pub temperature_k: f64,
    /// Emission measure (10⁴⁹ cm⁻³).
    /// NaN when status is [InversionStatus::InvalidInput].
    pub emission_measure: f64,
    /// Outcome classification
    pub status: InversionStatus,
}

impl InversionResult {
    /// Not-a-number sentinel result for samples that could not be
    /// inverted.
    pub(crate) fn invalid(epoch: Epoch, satellite: Satellite) -> Self {
        Self {
            epoch,
            satellite,
            temperature_k: f64::NAN,
            emission_measure: f64::NAN,
            status: InversionStatus::InvalidInput,
        }
    }
}

/// [TemEstimator] is the complete inversion engine: calibration
/// history, response model registry and the noise floor policy,
/// assembled once and immutable afterwards. All methods are pure;
/// a `&TemEstimator` may be shared across threads.
#[derive(Debug, Clone)]
pub struct TemEstimator {
    calibrations: CalibrationSet,
    tables: ResponseModelSet,
    noise_floor: f64,
}

impl TemEstimator {
    /// Builds a [TemEstimator] over loaded reference sets,
    /// with clipping disabled (0.0 noise floor).
    pub fn new(calibrations: CalibrationSet, tables: ResponseModelSet) -> Self {
        Self {
            calibrations,
            tables,
            noise_floor: 0.0,
        }
    }

    /// Returns a new [TemEstimator] with given instrument noise floor
    /// (W/m², negative values are treated as 0.0). Corrected fluxes
    /// below the floor clip to it; a long channel at the floor is
    /// reported as [InversionStatus::InvalidInput].
    pub fn with_noise_floor(&self, floor: f64) -> Self {
        let mut s = self.clone();
        s.noise_floor = floor.max(0.0);
        s
    }

    /// Active noise floor (W/m²).
    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    /// Read only access to the calibration history.
    pub fn calibrations(&self) -> &CalibrationSet {
        &self.calibrations
    }

    /// Read only access to the response model registry.
    pub fn tables(&self) -> &ResponseModelSet {
        &self.tables
    }

    /// Resolves the calibration epoch and returns the calibrated
    /// `(short, long)` flux pair for one [Observation], without
    /// inverting it.
    pub fn correct(&self, observation: &Observation) -> Result<(f64, f64), EstimateError> {
        let epoch = self
            .calibrations
            .resolve(observation.satellite, observation.epoch)?;
        let pair = corrector::correct(observation, epoch, self.noise_floor)?;
        Ok(pair)
    }

    /// Full pipeline over one [Observation]: resolve, correct,
    /// invert. This fine-grained surface propagates errors; batch
    /// processing ([Self::process]) downgrades them to
    /// [InversionStatus::InvalidInput] instead.
    pub fn estimate(&self, observation: &Observation) -> Result<InversionResult, EstimateError> {
        let (short, long) = self.correct(observation)?;

        let table = self
            .tables
            .get(observation.satellite)
            .ok_or(EstimateError::NoResponseModel(observation.satellite))?;

        let (temperature_k, emission_measure, status) =
            table.invert(short, long, self.noise_floor);

        Ok(InversionResult {
            epoch: observation.epoch,
            satellite: observation.satellite,
            temperature_k,
            emission_measure,
            status,
        })
    }

    /// Lazily processes an observation sequence, one
    /// [InversionResult] per input, in input order. Failures are
    /// isolated per sample: one bad observation yields one
    /// [InversionStatus::InvalidInput] result, never aborting the
    /// rest. Stop iterating to terminate early; [Batch::summary]
    /// holds the per-status counts accumulated so far.
    pub fn process<I>(&self, observations: I) -> Batch<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Observation>,
    {
        Batch::new(self, observations.into_iter())
    }

    /// Eagerly processes an observation slice and returns all results
    /// along with the complete per-status [BatchSummary].
    pub fn process_all(&self, observations: &[Observation]) -> (Vec<InversionResult>, BatchSummary) {
        let mut batch = self.process(observations.iter().copied());
        let mut results = Vec::with_capacity(observations.len());
        for result in &mut batch {
            results.push(result);
        }
        let summary = *batch.summary();
        (results, summary)
    }
}

#[cfg(test)]
mod test {
    use super::{InversionStatus, TemEstimator};
    use crate::prelude::{EstimateError, Epoch, Observation, Satellite};
    use crate::tests::toolkit::{synthetic_calibrations, synthetic_tables};

    fn estimator() -> TemEstimator {
        TemEstimator::new(synthetic_calibrations(), synthetic_tables())
    }

    #[test]
    fn single_shot_estimate() {
        let estimator = estimator();

        let obs = Observation::new(
            Epoch::from_gregorian_utc(2014, 6, 1, 12, 0, 0, 0),
            Satellite::Goes15,
            1.5e-7,
            1.0e-6,
        );

        let result = estimator.estimate(&obs).unwrap();
        assert_eq!(result.epoch, obs.epoch);
        assert_eq!(result.satellite, Satellite::Goes15);
        assert_eq!(result.status, InversionStatus::Ok);
        assert!(result.temperature_k.is_finite());
        assert!(result.emission_measure > 0.0);
    }

    #[test]
    fn dead_long_channel() {
        let estimator = estimator();

        let obs = Observation::new(
            Epoch::from_gregorian_utc(2014, 6, 1, 12, 0, 0, 0),
            Satellite::Goes15,
            1.5e-7,
            0.0,
        );

        let result = estimator.estimate(&obs).unwrap();
        assert_eq!(result.status, InversionStatus::InvalidInput);
        assert!(result.temperature_k.is_nan());
        assert!(result.emission_measure.is_nan());
    }

    #[test]
    fn fine_grained_errors_propagate() {
        let estimator = estimator();

        // no calibration data that far back
        let obs = Observation::new(
            Epoch::from_gregorian_utc_at_midnight(1980, 1, 1),
            Satellite::Goes15,
            1.5e-7,
            1.0e-6,
        );
        assert!(matches!(
            estimator.estimate(&obs),
            Err(EstimateError::Resolve(_))
        ));

        // negative raw flux
        let obs = Observation::new(
            Epoch::from_gregorian_utc(2014, 6, 1, 12, 0, 0, 0),
            Satellite::Goes15,
            -1.0e-7,
            1.0e-6,
        );
        assert!(matches!(
            estimator.estimate(&obs),
            Err(EstimateError::Flux(_))
        ));
    }

    #[test]
    fn noise_floor_builder() {
        let estimator = estimator().with_noise_floor(1.0e-9);
        assert_eq!(estimator.noise_floor(), 1.0e-9);

        // negative floors collapse to zero
        let estimator = estimator.with_noise_floor(-1.0);
        assert_eq!(estimator.noise_floor(), 0.0);
    }
}
