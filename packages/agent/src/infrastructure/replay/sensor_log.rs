//! Sensor log parsing.
//!
//! Logs are comma-separated text with a header row. Columns are looked up by name, so their
//! order does not matter and extra columns are ignored. Blank lines are skipped.

use std::path::Path;

use michi_shared::{Accelerometer, Gps, MalformedInputError};

use crate::domain::ReplayError;

/// A typed row of a sensor log
pub trait LogRecord: Sized {
    /// Header names this record is built from, in the order `from_fields` expects
    const COLUMNS: &'static [&'static str];

    /// Build a record from the raw fields of `COLUMNS`
    fn from_fields(fields: &[&str]) -> Result<Self, MalformedInputError>;
}

fn parse_field<T>(column: &str, raw: &str) -> Result<T, MalformedInputError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| MalformedInputError::sensor_field(column, raw, e.to_string()))
}

impl LogRecord for Accelerometer {
    const COLUMNS: &'static [&'static str] = &["x", "y", "z"];

    fn from_fields(fields: &[&str]) -> Result<Self, MalformedInputError> {
        Ok(Self {
            x: parse_field("x", fields[0])?,
            y: parse_field("y", fields[1])?,
            z: parse_field("z", fields[2])?,
        })
    }
}

/// Coordinates must survive the JSON round trip, which has no NaN or infinity
fn parse_coordinate(column: &str, raw: &str) -> Result<f64, MalformedInputError> {
    let value: f64 = parse_field(column, raw)?;
    if !value.is_finite() {
        return Err(MalformedInputError::sensor_field(
            column,
            raw,
            "not a finite number",
        ));
    }
    Ok(value)
}

impl LogRecord for Gps {
    const COLUMNS: &'static [&'static str] = &["latitude", "longitude"];

    fn from_fields(fields: &[&str]) -> Result<Self, MalformedInputError> {
        Ok(Self {
            latitude: parse_coordinate("latitude", fields[0])?,
            longitude: parse_coordinate("longitude", fields[1])?,
        })
    }
}

/// Parse the full text of a log into rows.
///
/// `path` is only used to label errors.
pub fn parse_log<R: LogRecord>(text: &str, path: &Path) -> Result<Vec<R>, ReplayError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let header: Vec<&str> = match lines.next() {
        Some((_, line)) => line
            .trim_start_matches('\u{feff}')
            .split(',')
            .map(str::trim)
            .collect(),
        None => {
            return Err(ReplayError::EmptyLog {
                path: path.to_path_buf(),
            });
        }
    };

    let mut indices = Vec::with_capacity(R::COLUMNS.len());
    for &column in R::COLUMNS {
        let index = header.iter().position(|name| *name == column).ok_or_else(|| {
            ReplayError::MissingColumn {
                path: path.to_path_buf(),
                column,
            }
        })?;
        indices.push(index);
    }

    let mut rows = Vec::new();
    for (line_number, line) in lines {
        let raw: Vec<&str> = line.split(',').map(str::trim).collect();
        let mut fields = Vec::with_capacity(indices.len());
        for (column, index) in R::COLUMNS.iter().zip(&indices) {
            let field = raw.get(*index).copied().ok_or_else(|| ReplayError::Malformed {
                path: path.to_path_buf(),
                source: MalformedInputError::sensor_field(
                    *column,
                    line,
                    format!("missing value on line {}", line_number),
                ),
            })?;
            fields.push(field);
        }

        let record = R::from_fields(&fields).map_err(|mut source| {
            source.reason = format!("line {}: {}", line_number, source.reason);
            ReplayError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        rows.push(record);
    }

    if rows.is_empty() {
        return Err(ReplayError::EmptyLog {
            path: path.to_path_buf(),
        });
    }

    Ok(rows)
}
