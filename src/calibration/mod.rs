//! Calibration epochs and per-satellite correction factors.
mod parsing;

use crate::{
    errors::{LoadError, ResolveError},
    prelude::{Epoch, Satellite},
};

use itertools::Itertools;

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [CorrectionFactor] turns one reported channel flux into a
/// calibrated flux: `corrected = (raw + offset) * scale`.
/// The additive term is applied first, then the scaling, in that
/// fixed order (the physical derivation of the correction defines it).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectionFactor {
    /// Multiplicative term
    pub scale: f64,
    /// Additive term, in instrument native units
    pub offset: f64,
}

impl Default for CorrectionFactor {
    /// Identity correction: leaves the reported flux untouched.
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
        }
    }
}

impl CorrectionFactor {
    /// Purely multiplicative [CorrectionFactor].
    pub const fn new(scale: f64) -> Self {
        Self { scale, offset: 0.0 }
    }

    /// Returns a new [CorrectionFactor] with given additive term.
    pub fn with_offset(&self, offset: f64) -> Self {
        let mut s = *self;
        s.offset = offset;
        s
    }

    /// Applies this correction to one reported flux value.
    pub fn apply(&self, raw: f64) -> f64 {
        (raw + self.offset) * self.scale
    }
}

/// [CalibrationEpoch] is the time interval over which one fixed pair
/// of channel corrections applies, for one satellite. Intervals are
/// half open `[valid_from, valid_to)`; the last epoch of a satellite
/// may be open ended.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationEpoch {
    /// [Satellite] this epoch applies to
    pub satellite: Satellite,
    /// Inclusive start of validity
    pub valid_from: Epoch,
    /// Exclusive end of validity, None for open ended
    pub valid_to: Option<Epoch>,
    /// Short channel (0.5-4 A) correction
    pub short: CorrectionFactor,
    /// Long channel (1-8 A) correction
    pub long: CorrectionFactor,
}

impl CalibrationEpoch {
    /// True if datetime `t` falls within `[valid_from, valid_to)`.
    pub fn contains(&self, t: Epoch) -> bool {
        if t < self.valid_from {
            return false;
        }
        match self.valid_to {
            Some(end) => t < end,
            None => true,
        }
    }
}

/// [CalibrationSet] holds the complete calibration history, one
/// ordered epoch list per satellite. Built once at load time,
/// validated, then read only: it may be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct CalibrationSet {
    epochs: HashMap<Satellite, Vec<CalibrationEpoch>>,
}

impl CalibrationSet {
    /// Builds a [CalibrationSet] from an explicit epoch list,
    /// typically synthetic data in test context.
    /// Epochs are grouped per satellite, sorted by `valid_from`,
    /// and checked for overlaps.
    pub fn new(epochs: Vec<CalibrationEpoch>) -> Result<Self, LoadError> {
        let mut map: HashMap<Satellite, Vec<CalibrationEpoch>> = HashMap::with_capacity(8);

        for epoch in epochs {
            map.entry(epoch.satellite).or_default().push(epoch);
        }

        for list in map.values_mut() {
            list.sort_by(|a, b| {
                a.valid_from
                    .partial_cmp(&b.valid_from)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let s = Self { epochs: map };
        s.validate()?;
        Ok(s)
    }

    /// Parse a [CalibrationSet] from any [Read]able flat-file input.
    /// One epoch per row, `#` comments and blank lines skipped.
    pub fn parse<R: Read>(reader: &mut BufReader<R>) -> Result<Self, LoadError> {
        let mut epochs = Vec::with_capacity(16);

        for line in reader.lines() {
            let line = line?;
            let content = line.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            epochs.push(parsing::parse_epoch_row(content)?);
        }

        Self::new(epochs)
    }

    /// Loads a [CalibrationSet] from a local file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let fd = File::open(path)?;
        let mut reader = BufReader::new(fd);
        Self::parse(&mut reader)
    }

    /// Selects the [CalibrationEpoch] covering satellite at datetime
    /// `t`, or [ResolveError::NoCalibrationData]. Pure lookup over the
    /// ordered epoch list.
    pub fn resolve(&self, satellite: Satellite, t: Epoch) -> Result<&CalibrationEpoch, ResolveError> {
        self.resolve_indexed(satellite, t).map(|(_, epoch)| epoch)
    }

    /// [Self::resolve], also exposing the position within the
    /// satellite's epoch list (batch layer caches it).
    pub(crate) fn resolve_indexed(
        &self,
        satellite: Satellite,
        t: Epoch,
    ) -> Result<(usize, &CalibrationEpoch), ResolveError> {
        let no_data = ResolveError::NoCalibrationData {
            satellite,
            epoch: t,
        };

        let list = self.epochs.get(&satellite).ok_or(no_data.clone())?;

        // candidate: last epoch starting at or before t
        let idx = list.partition_point(|e| e.valid_from <= t);
        if idx == 0 {
            return Err(no_data);
        }

        let epoch = &list[idx - 1];
        if epoch.contains(t) {
            Ok((idx - 1, epoch))
        } else {
            Err(no_data)
        }
    }

    /// Ordered epoch list for one satellite, if any.
    pub(crate) fn epochs_for(&self, satellite: Satellite) -> Option<&[CalibrationEpoch]> {
        self.epochs.get(&satellite).map(|v| v.as_slice())
    }

    /// Iterates all satellites this set carries epochs for.
    pub fn satellites(&self) -> impl Iterator<Item = Satellite> + '_ {
        self.epochs.keys().copied()
    }

    /// Total number of epochs, all satellites combined.
    pub fn len(&self) -> usize {
        self.epochs.values().map(|v| v.len()).sum()
    }

    /// True if this set carries no epoch at all.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    // Integrity check: per satellite, epochs must be ordered and must
    // not overlap. Open ended epochs are only allowed in last position.
    fn validate(&self) -> Result<(), LoadError> {
        for (satellite, list) in self.epochs.iter() {
            for (prev, next) in list.iter().tuple_windows() {
                match prev.valid_to {
                    Some(end) => {
                        if end > next.valid_from {
                            return Err(LoadError::OverlappingEpochs(*satellite));
                        }
                    },
                    // open ended epoch shadows everything after it
                    None => return Err(LoadError::OverlappingEpochs(*satellite)),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{CalibrationEpoch, CalibrationSet, CorrectionFactor};
    use crate::prelude::{Epoch, ResolveError, Satellite};

    fn epoch(
        satellite: Satellite,
        from: (i32, u8, u8),
        to: Option<(i32, u8, u8)>,
    ) -> CalibrationEpoch {
        CalibrationEpoch {
            satellite,
            valid_from: Epoch::from_gregorian_utc_at_midnight(from.0, from.1, from.2),
            valid_to: to.map(|(y, m, d)| Epoch::from_gregorian_utc_at_midnight(y, m, d)),
            short: CorrectionFactor::new(1.0 / 0.85),
            long: CorrectionFactor::new(1.0 / 0.7),
        }
    }

    #[test]
    fn resolve_containment() {
        let set = CalibrationSet::new(vec![
            epoch(Satellite::Goes15, (2010, 9, 1), Some((2016, 6, 1))),
            epoch(Satellite::Goes15, (2016, 6, 1), None),
        ])
        .unwrap();

        let t = Epoch::from_gregorian_utc(2014, 3, 10, 12, 0, 0, 0);
        let resolved = set.resolve(Satellite::Goes15, t).unwrap();
        assert!(resolved.contains(t));
        assert!(resolved.valid_to.is_some());

        // open ended tail
        let t = Epoch::from_gregorian_utc(2019, 1, 1, 0, 0, 0, 0);
        let resolved = set.resolve(Satellite::Goes15, t).unwrap();
        assert!(resolved.contains(t));
        assert!(resolved.valid_to.is_none());
    }

    #[test]
    fn half_open_boundary() {
        let set = CalibrationSet::new(vec![
            epoch(Satellite::Goes15, (2010, 9, 1), Some((2016, 6, 1))),
            epoch(Satellite::Goes15, (2016, 6, 1), None),
        ])
        .unwrap();

        // exactly at the boundary: second epoch wins
        let t = Epoch::from_gregorian_utc_at_midnight(2016, 6, 1);
        let resolved = set.resolve(Satellite::Goes15, t).unwrap();
        assert_eq!(resolved.valid_from, t);
    }

    #[test]
    fn no_calibration_data() {
        let set = CalibrationSet::new(vec![epoch(
            Satellite::Goes13,
            (2010, 5, 1),
            Some((2017, 12, 14)),
        )])
        .unwrap();

        // before first epoch
        let t = Epoch::from_gregorian_utc_at_midnight(2009, 1, 1);
        assert!(matches!(
            set.resolve(Satellite::Goes13, t),
            Err(ResolveError::NoCalibrationData { .. })
        ));

        // past exclusive end
        let t = Epoch::from_gregorian_utc_at_midnight(2017, 12, 14);
        assert!(set.resolve(Satellite::Goes13, t).is_err());

        // unknown satellite
        let t = Epoch::from_gregorian_utc_at_midnight(2012, 1, 1);
        assert!(set.resolve(Satellite::Goes08, t).is_err());
    }

    #[test]
    fn overlapping_epochs_rejected() {
        let result = CalibrationSet::new(vec![
            epoch(Satellite::Goes15, (2010, 9, 1), Some((2016, 6, 2))),
            epoch(Satellite::Goes15, (2016, 6, 1), None),
        ]);
        assert!(result.is_err());

        // open ended epoch followed by another one
        let result = CalibrationSet::new(vec![
            epoch(Satellite::Goes15, (2010, 9, 1), None),
            epoch(Satellite::Goes15, (2016, 6, 1), None),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn correction_factor_order() {
        let cf = CorrectionFactor::new(2.0).with_offset(-1.0);
        // offset first, then scale
        assert_eq!(cf.apply(3.0), 4.0);
    }
}
