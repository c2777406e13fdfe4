//! Response model flat-file parsing.
use crate::{
    errors::{LoadError, ParsingError},
    prelude::Satellite,
    response::{GridPoint, ResponseModelSet, ResponseModelTable},
};

use scan_fmt::scan_fmt;

use std::{
    io::{BufRead, BufReader, Read},
    str::FromStr,
};

const VERSION_MARKER: &str = "XRS RESPONSE MODEL VERSION = ";

fn parse_version(s: &str) -> Result<String, ParsingError> {
    if !s.starts_with(VERSION_MARKER) {
        return Err(ParsingError::VersionFormat);
    }
    match scan_fmt!(s, "XRS RESPONSE MODEL VERSION = {}", String) {
        Some(tag) => Ok(tag),
        _ => Err(ParsingError::VersionFormat),
    }
}

fn parse_float(s: &str) -> Result<f64, ParsingError> {
    f64::from_str(s.trim()).or(Err(ParsingError::NumberFormat))
}

// One grid point row: `satellite temperature_K ratio em_coefficient`.
fn parse_grid_row(row: &str) -> Result<(Satellite, GridPoint), ParsingError> {
    let items: Vec<&str> = row.split_ascii_whitespace().collect();

    if items.len() < 4 {
        return Err(ParsingError::MissingColumn);
    }

    let satellite = Satellite::from_str(items[0]).or(Err(ParsingError::SatelliteFormat))?;

    Ok((
        satellite,
        GridPoint {
            temperature_k: parse_float(items[1])?,
            ratio: parse_float(items[2])?,
            em_coefficient: parse_float(items[3])?,
        },
    ))
}

/// Parses a complete [ResponseModelSet] from any [Read]able input.
/// The version marker must come first (comments aside); grid rows may
/// interleave satellites but must stay temperature sorted within each.
pub(crate) fn parse_model_set<R: Read>(
    reader: &mut BufReader<R>,
) -> Result<ResponseModelSet, LoadError> {
    let mut version: Option<String> = None;

    // grids per satellite, in order of appearance
    let mut order: Vec<Satellite> = Vec::with_capacity(8);
    let mut grids: std::collections::HashMap<Satellite, Vec<GridPoint>> =
        std::collections::HashMap::with_capacity(8);

    for line in reader.lines() {
        let line = line?;
        let content = line.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        if version.is_none() {
            version = Some(parse_version(content)?);
            continue;
        }

        let (satellite, point) = parse_grid_row(content)?;
        if !grids.contains_key(&satellite) {
            order.push(satellite);
        }
        grids.entry(satellite).or_default().push(point);
    }

    let version = version.ok_or(ParsingError::VersionFormat)?;

    let mut set = ResponseModelSet::new();
    for satellite in order {
        let grid = grids.remove(&satellite).unwrap_or_default();
        set.insert(ResponseModelTable::new(satellite, version.clone(), grid)?)?;
    }

    Ok(set)
}

#[cfg(test)]
mod test {
    use super::{parse_grid_row, parse_model_set, parse_version};
    use crate::prelude::Satellite;
    use std::io::BufReader;

    #[test]
    fn version_parsing() {
        let tag = parse_version("XRS RESPONSE MODEL VERSION = chianti-9.0").unwrap();
        assert_eq!(tag, "chianti-9.0");
        assert!(parse_version("VERSION chianti-9.0").is_err());
    }

    #[test]
    fn grid_row() {
        let (satellite, point) = parse_grid_row("GOES-16  1.0e6  0.021  5.3e-6").unwrap();
        assert_eq!(satellite, Satellite::Goes16);
        assert_eq!(point.temperature_k, 1.0e6);
        assert_eq!(point.ratio, 0.021);
        assert_eq!(point.em_coefficient, 5.3e-6);

        assert!(parse_grid_row("GOES-16 1.0e6 0.021").is_err());
        assert!(parse_grid_row("NOT-A-SAT 1.0e6 0.021 5.3e-6").is_err());
    }

    #[test]
    fn model_set_parsing() {
        let content = "\
# synthetic two satellite model
XRS RESPONSE MODEL VERSION = test-1

GOES-15  1.0e6  0.10  1.0e-5
GOES-15  2.0e6  0.50  2.0e-5
GOES-16  1.0e6  0.08  0.9e-5
GOES-16  2.0e6  0.45  1.8e-5
";
        let mut reader = BufReader::new(content.as_bytes());
        let set = parse_model_set(&mut reader).unwrap();

        assert_eq!(set.len(), 2);

        let table = set.get(Satellite::Goes15).unwrap();
        assert_eq!(table.version, "test-1");
        assert_eq!(table.grid().len(), 2);
        assert_eq!(table.min_ratio(), 0.10);
        assert_eq!(table.max_temperature_k(), 2.0e6);

        assert!(set.get(Satellite::Goes08).is_none());
    }

    #[test]
    fn missing_version_marker() {
        let content = "GOES-15 1.0e6 0.10 1.0e-5\n";
        let mut reader = BufReader::new(content.as_bytes());
        assert!(parse_model_set(&mut reader).is_err());
    }

    #[test]
    fn unsorted_grid_rejected() {
        let content = "\
XRS RESPONSE MODEL VERSION = test-1
GOES-15  2.0e6  0.50  2.0e-5
GOES-15  1.0e6  0.10  1.0e-5
";
        let mut reader = BufReader::new(content.as_bytes());
        assert!(parse_model_set(&mut reader).is_err());
    }
}
