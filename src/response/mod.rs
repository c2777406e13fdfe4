//! Response model tables and the ratio inversion itself.
mod parsing;

use crate::{
    errors::LoadError,
    inversion::InversionStatus,
    prelude::Satellite,
};

use itertools::Itertools;

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::Path,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One tabulated point of the response model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridPoint {
    /// Plasma temperature (K)
    pub temperature_k: f64,
    /// Model predicted short/long flux ratio at this temperature
    pub ratio: f64,
    /// Long channel flux per unit emission measure (W/m² per 10⁴⁹ cm⁻³)
    pub em_coefficient: f64,
}

/// [ResponseModelTable] maps plasma temperature to the expected
/// channel flux ratio and the emission measure coefficient, for one
/// satellite. Derived offline from a spectral model; the ratio column
/// is monotonic in temperature by construction, which the loader
/// enforces so the inversion never has to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UnvalidatedTable"))]
pub struct ResponseModelTable {
    /// [Satellite] this table models
    pub satellite: Satellite,
    /// Version tag of the spectral model this table was derived from
    pub version: String,
    /// Grid points, strictly increasing in temperature and ratio
    grid: Vec<GridPoint>,
}

impl ResponseModelTable {
    /// Builds a [ResponseModelTable] from an explicit grid,
    /// validating it. Grid must hold at least two points, strictly
    /// increasing in both temperature and ratio, all columns strictly
    /// positive.
    pub fn new(
        satellite: Satellite,
        version: impl Into<String>,
        grid: Vec<GridPoint>,
    ) -> Result<Self, LoadError> {
        Self::validate(satellite, &grid)?;
        Ok(Self {
            satellite,
            version: version.into(),
            grid,
        })
    }

    fn validate(satellite: Satellite, grid: &[GridPoint]) -> Result<(), LoadError> {
        if grid.len() < 2 {
            return Err(LoadError::NotEnoughGridPoints(satellite));
        }

        for point in grid.iter() {
            let positive = point.temperature_k > 0.0
                && point.ratio > 0.0
                && point.em_coefficient > 0.0;
            let finite = point.temperature_k.is_finite()
                && point.ratio.is_finite()
                && point.em_coefficient.is_finite();
            if !positive || !finite {
                return Err(LoadError::NonPositiveColumn(satellite));
            }
        }

        for (prev, next) in grid.iter().tuple_windows() {
            if next.temperature_k <= prev.temperature_k {
                return Err(LoadError::NonMonotonicTemperature(satellite));
            }
            if next.ratio <= prev.ratio {
                return Err(LoadError::NonMonotonicRatio(satellite));
            }
        }

        Ok(())
    }

    /// Read only access to the validated grid.
    pub fn grid(&self) -> &[GridPoint] {
        &self.grid
    }

    /// Lowest tabulated ratio.
    pub fn min_ratio(&self) -> f64 {
        self.grid[0].ratio
    }

    /// Highest tabulated ratio.
    pub fn max_ratio(&self) -> f64 {
        self.grid[self.grid.len() - 1].ratio
    }

    /// Lowest tabulated temperature (K).
    pub fn min_temperature_k(&self) -> f64 {
        self.grid[0].temperature_k
    }

    /// Highest tabulated temperature (K).
    pub fn max_temperature_k(&self) -> f64 {
        self.grid[self.grid.len() - 1].temperature_k
    }

    /// Recovers plasma temperature (K) from a corrected flux ratio.
    /// In-range ratios interpolate linearly in ln(ratio) between the
    /// bracketing grid points ([InversionStatus::Ok]); out-of-range
    /// ratios clamp to the boundary grid temperature and report it
    /// through the status.
    pub fn temperature(&self, ratio: f64) -> (f64, InversionStatus) {
        if !ratio.is_finite() {
            return (f64::NAN, InversionStatus::InvalidInput);
        }

        let first = &self.grid[0];
        let last = &self.grid[self.grid.len() - 1];

        if ratio < first.ratio {
            return (first.temperature_k, InversionStatus::BelowTableRange);
        }
        if ratio > last.ratio {
            return (last.temperature_k, InversionStatus::AboveTableRange);
        }

        // upper bracket index, in [1, len-1]
        let j = self
            .grid
            .partition_point(|p| p.ratio < ratio)
            .clamp(1, self.grid.len() - 1);
        let lo = &self.grid[j - 1];
        let hi = &self.grid[j];

        let alpha = (ratio.ln() - lo.ratio.ln()) / (hi.ratio.ln() - lo.ratio.ln());
        let temperature = lo.temperature_k + alpha * (hi.temperature_k - lo.temperature_k);

        (temperature, InversionStatus::Ok)
    }

    /// Emission measure coefficient at given temperature (K),
    /// interpolated in log space over the temperature grid.
    /// Out-of-grid temperatures clamp to the boundary coefficient,
    /// consistent with the clamped temperatures [Self::temperature]
    /// reports.
    pub fn em_coefficient(&self, temperature_k: f64) -> f64 {
        if !temperature_k.is_finite() {
            return f64::NAN;
        }

        let first = &self.grid[0];
        let last = &self.grid[self.grid.len() - 1];

        if temperature_k <= first.temperature_k {
            return first.em_coefficient;
        }
        if temperature_k >= last.temperature_k {
            return last.em_coefficient;
        }

        let j = self
            .grid
            .partition_point(|p| p.temperature_k < temperature_k)
            .clamp(1, self.grid.len() - 1);
        let lo = &self.grid[j - 1];
        let hi = &self.grid[j];

        let alpha = (temperature_k - lo.temperature_k) / (hi.temperature_k - lo.temperature_k);
        let ln_coeff =
            lo.em_coefficient.ln() + alpha * (hi.em_coefficient.ln() - lo.em_coefficient.ln());

        ln_coeff.exp()
    }

    /// Inverts one corrected flux pair against this table.
    /// Returns (temperature K, emission measure 10⁴⁹ cm⁻³, status).
    /// A long channel flux at or below `floor` cannot form a
    /// meaningful ratio: [InversionStatus::InvalidInput], NaN outputs.
    pub fn invert(&self, short_flux: f64, long_flux: f64, floor: f64) -> (f64, f64, InversionStatus) {
        if !short_flux.is_finite() || !long_flux.is_finite() || long_flux <= floor.max(0.0) {
            return (f64::NAN, f64::NAN, InversionStatus::InvalidInput);
        }

        let ratio = short_flux / long_flux;
        let (temperature_k, status) = self.temperature(ratio);

        if status == InversionStatus::InvalidInput {
            return (f64::NAN, f64::NAN, status);
        }

        let emission_measure = long_flux / self.em_coefficient(temperature_k);

        (temperature_k, emission_measure, status)
    }
}

// Deserialization mirror: grids coming off the wire go through the
// same validation as grids coming off a file.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct UnvalidatedTable {
    satellite: Satellite,
    version: String,
    grid: Vec<GridPoint>,
}

#[cfg(feature = "serde")]
impl std::convert::TryFrom<UnvalidatedTable> for ResponseModelTable {
    type Error = LoadError;

    fn try_from(raw: UnvalidatedTable) -> Result<Self, Self::Error> {
        Self::new(raw.satellite, raw.version, raw.grid)
    }
}

/// [ResponseModelSet] is the registry of response tables, one per
/// satellite, populated once at load time. Adding a satellite means
/// adding rows to the reference file, never touching the inversion.
#[derive(Debug, Clone, Default)]
pub struct ResponseModelSet {
    tables: HashMap<Satellite, ResponseModelTable>,
}

impl ResponseModelSet {
    /// Builds an empty [ResponseModelSet], to be populated with
    /// [Self::insert]. Typically used with synthetic tables in test
    /// context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one [ResponseModelTable].
    /// Each satellite may only carry one table.
    pub fn insert(&mut self, table: ResponseModelTable) -> Result<(), LoadError> {
        if self.tables.contains_key(&table.satellite) {
            return Err(LoadError::DuplicateTable(table.satellite));
        }
        self.tables.insert(table.satellite, table);
        Ok(())
    }

    /// Table registered for this satellite, if any.
    pub fn get(&self, satellite: Satellite) -> Option<&ResponseModelTable> {
        self.tables.get(&satellite)
    }

    /// Iterates all satellites with a registered table.
    pub fn satellites(&self) -> impl Iterator<Item = Satellite> + '_ {
        self.tables.keys().copied()
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True if no table is registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Loads a [ResponseModelSet] from a local file. The file opens
    /// with a version marker, then carries one grid point per row,
    /// sorted ascending in temperature within each satellite.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let fd = File::open(path)?;
        let mut reader = BufReader::new(fd);
        parsing::parse_model_set(&mut reader)
    }
}
