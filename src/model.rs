/// Core data types for the flood risk scoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no external services — only types, the feature
/// column order, and the error taxonomy.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Feature columns
// ---------------------------------------------------------------------------

/// Weather feature columns, in the fixed order shared between training and
/// inference. Column names match the merged CSV headers exactly.
pub const FEATURE_COLUMNS: [&str; 8] = [
    "Temperature (C)",
    "Humidity (%)",
    "Precipitation (mm)",
    "Wind Speed (km/h)",
    "Wind Gust (km/h)",
    "Pressure (hPa)",
    "Cloud Cover (%)",
    "Weather Code",
];

/// Number of weather features per reading.
pub const NUM_FEATURES: usize = FEATURE_COLUMNS.len();

/// Water-level state value that marks the positive (elevated) class.
pub const ELEVATED_STATE: &str = "High High";

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single water-level measurement from the sensor series.
///
/// `state` is the categorical gauge state reported alongside the numeric
/// value ("Normal", "High", "High High", …). It is only consulted at
/// training time, where it is compared against the elevated-state label.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub state: Option<String>,
}

/// A single hourly weather observation from the weather series.
///
/// Every field except the timestamp is optional: the upstream export
/// routinely leaves gaps, and missing values are imputed downstream by
/// the feature store rather than rejected here.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub timestamp: NaiveDateTime,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_gust_kmh: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
    pub weather_code: Option<f64>,
}

impl WeatherReading {
    /// Returns the weather fields in `FEATURE_COLUMNS` order.
    pub fn feature_values(&self) -> [Option<f64>; NUM_FEATURES] {
        [
            self.temperature_c,
            self.humidity_pct,
            self.precipitation_mm,
            self.wind_speed_kmh,
            self.wind_gust_kmh,
            self.pressure_hpa,
            self.cloud_cover_pct,
            self.weather_code,
        ]
    }
}

/// One row of the merged table: a sensor reading enriched with the weather
/// observation whose truncated-to-hour timestamp matched, if any.
///
/// Produced by `align::merge_hourly`. A missing weather match is represented
/// as `None`, never as an error — the merge is a left join on the sensor
/// series.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedReading {
    pub sensor: SensorReading,
    pub weather: Option<WeatherReading>,
}

impl MergedReading {
    /// Calendar date of the sensor reading.
    pub fn date(&self) -> NaiveDate {
        self.sensor.timestamp.date()
    }

    /// Hour of day (0–23) of the sensor reading.
    pub fn hour(&self) -> u32 {
        self.sensor.timestamp.hour()
    }

    /// Weather fields in `FEATURE_COLUMNS` order; all `None` when the merge
    /// found no weather match for this hour.
    pub fn feature_values(&self) -> [Option<f64>; NUM_FEATURES] {
        match &self.weather {
            Some(w) => w.feature_values(),
            None => [None; NUM_FEATURES],
        }
    }

    /// Whether this reading's state equals the given elevated-state label.
    pub fn is_elevated(&self, elevated_label: &str) -> bool {
        self.sensor
            .state
            .as_deref()
            .map(|s| s == elevated_label)
            .unwrap_or(false)
    }
}

/// Truncates a timestamp to the top of its hour. This is the merge key used
/// by the aligner: two readings belong to the same hourly slot iff their
/// truncated timestamps are equal.
pub fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_hms_opt(ts.hour(), 0, 0)
        .expect("hour taken from a valid timestamp is always in range")
}

// ---------------------------------------------------------------------------
// Risk bands
// ---------------------------------------------------------------------------

/// Qualitative classification of a 0–100 risk score.
///
/// Thresholds: below 40 is low, 40 through 70 is moderate, above 70 is
/// high. The lower boundary is inclusive on the moderate band, so a score
/// of exactly 40 classifies as moderate and exactly 70 as moderate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            RiskBand::High
        } else if score >= 40.0 {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        }
    }

    /// Dashboard status string for this band.
    pub fn status_label(&self) -> &'static str {
        match self {
            RiskBand::High => "🔴 HIGH RISK",
            RiskBand::Moderate => "🟡 MODERATE",
            RiskBand::Low => "🟢 LOW RISK",
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the feature store, classifier, and risk service.
///
/// Query-shape problems (bad or missing date/hour) are deliberately *not*
/// represented here: those degrade through the store's fallback ladder and
/// never surface as errors. Only startup-time data/model problems and
/// classifier contract violations are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskError {
    /// The merged table was empty at store construction.
    NoDataAvailable,
    /// Training inputs were empty or of mismatched length.
    TrainingDataInvalid { features: usize, labels: usize },
    /// The classifier returned a probability outside [0, 1].
    ScoreOutOfRange(f64),
}

impl std::fmt::Display for RiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskError::NoDataAvailable => {
                write!(f, "No merged readings available: cannot build feature store")
            }
            RiskError::TrainingDataInvalid { features, labels } => {
                write!(
                    f,
                    "Invalid training data: {} feature vectors vs {} labels",
                    features, labels
                )
            }
            RiskError::ScoreOutOfRange(p) => {
                write!(f, "Classifier returned probability {} outside [0, 1]", p)
            }
        }
    }
}

impl std::error::Error for RiskError {}

/// Errors raised while parsing CSV inputs into readings.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// The CSV header was missing a required column.
    MissingColumn(String),
    /// The CSV body could not be interpreted at all.
    ParseError(String),
    /// The input contained a header but no data rows.
    Empty,
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::MissingColumn(col) => write!(f, "Missing CSV column: '{}'", col),
            IngestError::ParseError(msg) => write!(f, "CSV parse error: {}", msg),
            IngestError::Empty => write!(f, "CSV contained no data rows"),
        }
    }
}

impl std::error::Error for IngestError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
