/// Hourly time-series alignment.
///
/// `merge_hourly` joins the water-level sensor series (primary) with the
/// weather observation series (secondary) on a truncated-to-hour timestamp
/// key, producing the merged table the feature store is built from.
///
/// Join semantics, chosen to match the offline merge that produced the
/// training CSV:
/// - Left join: every primary reading is preserved, in its original order.
/// - A primary reading is enriched with the secondary reading whose
///   truncated-to-hour timestamp matches exactly; no match means the
///   weather side of the row is `None`, never an error.
/// - If the secondary series has duplicate keys after truncation, the
///   first reading in original order wins. Later duplicates are ignored,
///   not dropped silently from the primary side — the row count of the
///   output always equals the primary row count.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::model::{truncate_to_hour, MergedReading, SensorReading, WeatherReading};

/// Merges the sensor series with the weather series on the hourly key.
///
/// Output length always equals `sensors.len()` and output order preserves
/// the sensor series order.
pub fn merge_hourly(sensors: &[SensorReading], weather: &[WeatherReading]) -> Vec<MergedReading> {
    // Index the secondary series by hourly key. entry().or_insert keeps the
    // first observation for a duplicated hour.
    let mut by_hour: HashMap<NaiveDateTime, &WeatherReading> = HashMap::new();
    for obs in weather {
        by_hour.entry(truncate_to_hour(obs.timestamp)).or_insert(obs);
    }

    sensors
        .iter()
        .map(|reading| MergedReading {
            sensor: reading.clone(),
            weather: by_hour
                .get(&truncate_to_hour(reading.timestamp))
                .map(|obs| (*obs).clone()),
        })
        .collect()
}

/// Counts how many merged rows carry weather data, for ingest reporting.
pub fn matched_count(merged: &[MergedReading]) -> usize {
    merged.iter().filter(|row| row.weather.is_some()).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
