/// CSV parsing for sensor, weather, and merged reading tables.
///
/// All three parsers are header-addressed: columns are located by name, so
/// column order and extra columns in the export don't matter. Expected
/// headers:
///
/// - sensor CSV:  `Time`, `Value`, and optionally `State`
/// - weather CSV: `Date` plus the eight `FEATURE_COLUMNS`
/// - merged CSV:  `Time`, `Value`, optionally `State`, plus the eight
///                `FEATURE_COLUMNS` (the shape written by `merged_to_csv`
///                and by the offline merge tool)
///
/// Numeric cells that fail to parse become `None` (the store imputes them
/// later); rows whose timestamp fails to parse are skipped entirely. Only
/// a missing required column or an empty body is an error.
///
/// Fields are split on commas without quote handling — none of the source
/// exports quote fields.

use chrono::NaiveDateTime;

use crate::model::{
    IngestError, MergedReading, SensorReading, WeatherReading, FEATURE_COLUMNS, NUM_FEATURES,
};

/// Timestamp formats seen across the sensor and weather exports.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
}

/// Header split into trimmed column names, plus the data lines.
fn split_csv(text: &str) -> Result<(Vec<&str>, Vec<&str>), IngestError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| IngestError::ParseError("input is empty".to_string()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let rows: Vec<&str> = lines.collect();
    if rows.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok((columns, rows))
}

fn column_index(columns: &[&str], name: &str) -> Result<usize, IngestError> {
    columns
        .iter()
        .position(|c| *c == name)
        .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
}

/// Indices of the eight feature columns, in `FEATURE_COLUMNS` order.
fn feature_indices(columns: &[&str]) -> Result<[usize; NUM_FEATURES], IngestError> {
    let mut indices = [0usize; NUM_FEATURES];
    for (slot, name) in indices.iter_mut().zip(FEATURE_COLUMNS.iter()) {
        *slot = column_index(columns, name)?;
    }
    Ok(indices)
}

fn weather_from_fields(
    timestamp: NaiveDateTime,
    fields: &[&str],
    indices: &[usize; NUM_FEATURES],
) -> WeatherReading {
    let get = |i: usize| parse_number(fields.get(indices[i]).copied());
    WeatherReading {
        timestamp,
        temperature_c: get(0),
        humidity_pct: get(1),
        precipitation_mm: get(2),
        wind_speed_kmh: get(3),
        wind_gust_kmh: get(4),
        pressure_hpa: get(5),
        cloud_cover_pct: get(6),
        weather_code: get(7),
    }
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Parses the water-level sensor export. Rows with an unparsable timestamp
/// or value are skipped.
pub fn parse_sensor_csv(text: &str) -> Result<Vec<SensorReading>, IngestError> {
    let (columns, rows) = split_csv(text)?;
    let time_idx = column_index(&columns, "Time")?;
    let value_idx = column_index(&columns, "Value")?;
    let state_idx = columns.iter().position(|c| *c == "State");

    let mut readings = Vec::with_capacity(rows.len());
    for row in rows {
        let fields: Vec<&str> = row.split(',').collect();
        let Some(timestamp) = fields.get(time_idx).and_then(|c| parse_timestamp(c)) else {
            continue;
        };
        let Some(value) = parse_number(fields.get(value_idx).copied()) else {
            continue;
        };
        let state = state_idx
            .and_then(|i| fields.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        readings.push(SensorReading { timestamp, value, state });
    }
    Ok(readings)
}

/// Parses the hourly weather export. Rows with an unparsable `Date` cell
/// are skipped; unparsable feature cells become `None`.
pub fn parse_weather_csv(text: &str) -> Result<Vec<WeatherReading>, IngestError> {
    let (columns, rows) = split_csv(text)?;
    let date_idx = column_index(&columns, "Date")?;
    let indices = feature_indices(&columns)?;

    let mut readings = Vec::with_capacity(rows.len());
    for row in rows {
        let fields: Vec<&str> = row.split(',').collect();
        let Some(timestamp) = fields.get(date_idx).and_then(|c| parse_timestamp(c)) else {
            continue;
        };
        readings.push(weather_from_fields(timestamp, &fields, &indices));
    }
    Ok(readings)
}

/// Parses the pre-merged table the store is normally built from.
///
/// A row whose eight feature cells are all missing is treated as having no
/// weather match (the left-join miss case), exactly as `merged_to_csv`
/// wrote it.
pub fn parse_merged_csv(text: &str) -> Result<Vec<MergedReading>, IngestError> {
    let (columns, rows) = split_csv(text)?;
    let time_idx = column_index(&columns, "Time")?;
    let value_idx = column_index(&columns, "Value")?;
    let state_idx = columns.iter().position(|c| *c == "State");
    let indices = feature_indices(&columns)?;

    let mut readings = Vec::with_capacity(rows.len());
    for row in rows {
        let fields: Vec<&str> = row.split(',').collect();
        let Some(timestamp) = fields.get(time_idx).and_then(|c| parse_timestamp(c)) else {
            continue;
        };
        let Some(value) = parse_number(fields.get(value_idx).copied()) else {
            continue;
        };
        let state = state_idx
            .and_then(|i| fields.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let weather = weather_from_fields(timestamp, &fields, &indices);
        let weather = if weather.feature_values().iter().all(Option::is_none) {
            None
        } else {
            Some(weather)
        };

        readings.push(MergedReading {
            sensor: SensorReading { timestamp, value, state },
            weather,
        });
    }
    Ok(readings)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Serializes merged readings back to the merged CSV shape, for the
/// offline merge tool. Missing cells are written empty.
pub fn merged_to_csv(merged: &[MergedReading]) -> String {
    let mut out = String::from("Time,Value,State");
    for name in FEATURE_COLUMNS {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');

    for row in merged {
        out.push_str(&row.sensor.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
        out.push(',');
        out.push_str(&row.sensor.value.to_string());
        out.push(',');
        if let Some(state) = &row.sensor.state {
            out.push_str(state);
        }
        for value in row.feature_values() {
            out.push(',');
            if let Some(v) = value {
                out.push_str(&v.to_string());
            }
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
