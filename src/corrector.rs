//! Raw flux validation and correction.
use crate::{
    calibration::CalibrationEpoch,
    errors::FluxError,
    prelude::Observation,
};

fn validate_raw(raw: f64) -> Result<f64, FluxError> {
    if !raw.is_finite() {
        return Err(FluxError::NonFiniteFlux);
    }
    if raw < 0.0 {
        return Err(FluxError::NegativeFlux);
    }
    Ok(raw)
}

/// Applies a resolved [CalibrationEpoch] to one raw [Observation],
/// returning the calibrated `(short, long)` flux pair (W/m²).
/// Rejects negative or non-finite raw fluxes. Corrected values that
/// land below `floor` (instrument noise floor, non-negative) clip to
/// it; 0.0 disables clipping for all physical fluxes.
pub fn correct(
    observation: &Observation,
    epoch: &CalibrationEpoch,
    floor: f64,
) -> Result<(f64, f64), FluxError> {
    let raw_short = validate_raw(observation.short_flux)?;
    let raw_long = validate_raw(observation.long_flux)?;

    let floor = floor.max(0.0);
    let short = epoch.short.apply(raw_short).max(floor);
    let long = epoch.long.apply(raw_long).max(floor);

    Ok((short, long))
}

#[cfg(test)]
mod test {
    use super::correct;
    use crate::calibration::{CalibrationEpoch, CorrectionFactor};
    use crate::prelude::{Epoch, FluxError, Observation, Satellite};

    fn test_epoch() -> CalibrationEpoch {
        CalibrationEpoch {
            satellite: Satellite::Goes15,
            valid_from: Epoch::from_gregorian_utc_at_midnight(2010, 9, 1),
            valid_to: None,
            short: CorrectionFactor::new(1.0 / 0.85),
            long: CorrectionFactor::new(1.0 / 0.7),
        }
    }

    fn observation(short: f64, long: f64) -> Observation {
        Observation::new(
            Epoch::from_gregorian_utc_at_midnight(2014, 1, 1),
            Satellite::Goes15,
            short,
            long,
        )
    }

    #[test]
    fn swpc_scaling_undone() {
        let (short, long) = correct(&observation(8.5e-8, 7.0e-7), &test_epoch(), 0.0).unwrap();
        assert!((short - 1.0e-7).abs() < 1e-15);
        assert!((long - 1.0e-6).abs() < 1e-14);
    }

    #[test]
    fn idempotent() {
        let obs = observation(3.2e-7, 1.7e-6);
        let epoch = test_epoch();
        let first = correct(&obs, &epoch, 0.0).unwrap();
        for _ in 0..10 {
            // bit identical on every call
            assert_eq!(correct(&obs, &epoch, 0.0).unwrap(), first);
        }
    }

    #[test]
    fn rejects_bad_raw_flux() {
        let epoch = test_epoch();
        assert_eq!(
            correct(&observation(-1.0e-8, 1.0e-6), &epoch, 0.0),
            Err(FluxError::NegativeFlux)
        );
        assert_eq!(
            correct(&observation(1.0e-8, f64::NAN), &epoch, 0.0),
            Err(FluxError::NonFiniteFlux)
        );
        assert_eq!(
            correct(&observation(f64::INFINITY, 1.0e-6), &epoch, 0.0),
            Err(FluxError::NonFiniteFlux)
        );
    }

    #[test]
    fn noise_floor_clipping() {
        // negative additive term can push a quiet sample below zero
        let mut epoch = test_epoch();
        epoch.short = CorrectionFactor::new(1.0).with_offset(-5.0e-9);

        let (short, _) = correct(&observation(1.0e-9, 1.0e-6), &epoch, 0.0).unwrap();
        assert_eq!(short, 0.0);

        let (short, long) = correct(&observation(1.0e-9, 1.0e-6), &epoch, 1.0e-9).unwrap();
        assert_eq!(short, 1.0e-9);
        assert!(long > 1.0e-9);
    }
}
