//! Calibration epoch flat-file row parsing.
use crate::{
    calibration::{CalibrationEpoch, CorrectionFactor},
    errors::ParsingError,
    prelude::{Epoch, Satellite},
};

use std::str::FromStr;

// Accepted datetime spellings: full ISO-8601 seconds, or date only
// (midnight that day). All datetimes are UTC.
fn parse_datetime(s: &str) -> Result<Epoch, ParsingError> {
    Epoch::from_format_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| Epoch::from_format_str(s, "%Y-%m-%d"))
        .or(Err(ParsingError::EpochFormat))
}

// `valid_to` column: ISO-8601, or "-" for open ended validity.
fn parse_valid_to(s: &str) -> Result<Option<Epoch>, ParsingError> {
    if s == "-" {
        Ok(None)
    } else {
        parse_datetime(s).map(Some)
    }
}

fn parse_float(s: &str) -> Result<f64, ParsingError> {
    f64::from_str(s.trim()).or(Err(ParsingError::NumberFormat))
}

/// Parses one epoch row:
/// `satellite valid_from valid_to scale_short scale_long [offset_short offset_long]`
pub(crate) fn parse_epoch_row(row: &str) -> Result<CalibrationEpoch, ParsingError> {
    let items: Vec<&str> = row.split_ascii_whitespace().collect();

    if items.len() < 5 {
        return Err(ParsingError::MissingColumn);
    }

    let satellite = Satellite::from_str(items[0]).or(Err(ParsingError::SatelliteFormat))?;

    let valid_from = parse_datetime(items[1])?;
    let valid_to = parse_valid_to(items[2])?;

    let mut short = CorrectionFactor::new(parse_float(items[3])?);
    let mut long = CorrectionFactor::new(parse_float(items[4])?);

    // optional additive terms
    if items.len() > 5 {
        short = short.with_offset(parse_float(items[5])?);
    }
    if items.len() > 6 {
        long = long.with_offset(parse_float(items[6])?);
    }

    Ok(CalibrationEpoch {
        satellite,
        valid_from,
        valid_to,
        short,
        long,
    })
}
