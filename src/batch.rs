//! Batch processing with per-sample failure isolation.
use crate::{
    corrector,
    errors::EstimateError,
    inversion::{InversionResult, InversionStatus, TemEstimator},
    prelude::{Observation, Satellite},
};

use log::debug;

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-status diagnostic counters, accumulated while a [Batch] is
/// consumed. Makes silently downgraded samples visible without ever
/// failing the run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatchSummary {
    /// Samples inverted within the table
    pub ok: usize,
    /// Samples clamped at the cool end of the table
    pub below_table_range: usize,
    /// Samples clamped at the hot end of the table
    pub above_table_range: usize,
    /// Samples that could not be inverted
    pub invalid_input: usize,
}

impl BatchSummary {
    /// Total number of samples accounted for.
    pub fn total(&self) -> usize {
        self.ok + self.below_table_range + self.above_table_range + self.invalid_input
    }

    fn count(&mut self, status: InversionStatus) {
        match status {
            InversionStatus::Ok => self.ok += 1,
            InversionStatus::BelowTableRange => self.below_table_range += 1,
            InversionStatus::AboveTableRange => self.above_table_range += 1,
            InversionStatus::InvalidInput => self.invalid_input += 1,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let total = self.total();
        let plural = if total == 1 { "" } else { "s" };
        write!(
            f,
            "{} sample{}: {} ok, {} below range, {} above range, {} invalid",
            total,
            plural,
            self.ok,
            self.below_table_range,
            self.above_table_range,
            self.invalid_input
        )
    }
}

/// [Batch] lazily turns an [Observation] sequence into
/// [InversionResult]s, one per input, preserving input order.
/// Per-observation failures downgrade to
/// [InversionStatus::InvalidInput] results; dropping the iterator
/// terminates early without processing the remainder.
pub struct Batch<'a, I> {
    estimator: &'a TemEstimator,
    observations: I,
    summary: BatchSummary,
    // most recently resolved epoch index, per satellite: consecutive
    // samples of one satellite almost always share an epoch
    epoch_cache: HashMap<Satellite, usize>,
}

impl<'a, I> Batch<'a, I> {
    pub(crate) fn new(estimator: &'a TemEstimator, observations: I) -> Self {
        Self {
            estimator,
            observations,
            summary: BatchSummary::default(),
            epoch_cache: HashMap::with_capacity(4),
        }
    }

    /// Per-status counts accumulated so far; complete once the
    /// iterator is exhausted.
    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    fn estimate(&mut self, observation: &Observation) -> Result<InversionResult, EstimateError> {
        let satellite = observation.satellite;
        let calibrations = self.estimator.calibrations();

        // cached fast path
        let cached = self
            .epoch_cache
            .get(&satellite)
            .and_then(|&i| calibrations.epochs_for(satellite).map(|list| (i, list)))
            .and_then(|(i, list)| list.get(i))
            .filter(|epoch| epoch.contains(observation.epoch));

        let epoch = match cached {
            Some(epoch) => epoch,
            None => {
                let (index, epoch) =
                    calibrations.resolve_indexed(satellite, observation.epoch)?;
                self.epoch_cache.insert(satellite, index);
                epoch
            },
        };

        let (short, long) = corrector::correct(observation, epoch, self.estimator.noise_floor())?;

        let table = self
            .estimator
            .tables()
            .get(satellite)
            .ok_or(EstimateError::NoResponseModel(satellite))?;

        let (temperature_k, emission_measure, status) =
            table.invert(short, long, self.estimator.noise_floor());

        Ok(InversionResult {
            epoch: observation.epoch,
            satellite,
            temperature_k,
            emission_measure,
            status,
        })
    }
}

impl<'a, I> Iterator for Batch<'a, I>
where
    I: Iterator<Item = Observation>,
{
    type Item = InversionResult;

    fn next(&mut self) -> Option<Self::Item> {
        let observation = self.observations.next()?;

        let result = match self.estimate(&observation) {
            Ok(result) => result,
            Err(e) => {
                debug!(
                    "{}({}) sample downgraded: {}",
                    observation.epoch, observation.satellite, e
                );
                InversionResult::invalid(observation.epoch, observation.satellite)
            },
        };

        self.summary.count(result.status);
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.observations.size_hint()
    }
}
