/// Risk query orchestration.
///
/// `RiskService` ties the feature store and the trained classifier
/// together to answer the two dashboard questions: "what is the risk right
/// now (or at this past date/hour)" and "how did risk move across the
/// surrounding hours". It owns the only mutable state in the whole
/// pipeline — the jitter RNG — behind a mutex so endpoint threads can
/// share one service instance.
///
/// Per-sensor scores are the base probability plus an independent
/// Normal(0, σ) draw, clamped to [0, 100]. The service has no true
/// per-location features, so the jitter stands in for local variation;
/// callers must treat per-sensor scores as within-bounds samples, not
/// repeatable values. History scores skip the jitter entirely and are
/// deterministic given the table and the trained model.

use std::sync::Mutex;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::classifier::RiskModel;
use crate::model::RiskBand;
use crate::model::RiskError;
use crate::sensors::SensorLocation;
use crate::store::FeatureStore;

/// Hours of history served on each side of the base hour (13 points total).
pub const HISTORY_WINDOW_HOURS: u32 = 6;

/// Default standard deviation of the per-sensor jitter, in score points.
pub const DEFAULT_JITTER_STD_DEV: f64 = 5.0;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// The weather values that drove a risk score, echoed for display.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSnapshot {
    #[serde(rename = "Temperature (C)")]
    pub temperature_c: f64,
    #[serde(rename = "Humidity (%)")]
    pub humidity_pct: f64,
    #[serde(rename = "Precipitation (mm)")]
    pub precipitation_mm: f64,
    #[serde(rename = "Wind Speed (km/h)")]
    pub wind_speed_kmh: f64,
    #[serde(rename = "Wind Gust (km/h)")]
    pub wind_gust_kmh: f64,
    #[serde(rename = "Pressure (hPa)")]
    pub pressure_hpa: f64,
    #[serde(rename = "Cloud Cover (%)")]
    pub cloud_cover_pct: f64,
    #[serde(rename = "Weather Code")]
    pub weather_code: f64,
}

impl WeatherSnapshot {
    /// Builds the snapshot from a resolved feature vector in
    /// `FEATURE_COLUMNS` order.
    fn from_values(values: &[f64]) -> Self {
        Self {
            temperature_c: values[0],
            humidity_pct: values[1],
            precipitation_mm: values[2],
            wind_speed_kmh: values[3],
            wind_gust_kmh: values[4],
            pressure_hpa: values[5],
            cloud_cover_pct: values[6],
            weather_code: values[7],
        }
    }
}

/// Risk entry for one sensor location.
#[derive(Debug, Clone, Serialize)]
pub struct SensorRisk {
    pub name: &'static str,
    pub risk: f64,
    pub band: RiskBand,
    pub status: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub area: &'static str,
}

/// Full current-risk response.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentRisk {
    pub overall_risk: f64,
    pub overall_band: RiskBand,
    pub sensors: Vec<SensorRisk>,
    pub weather: WeatherSnapshot,
    /// Echo of the date actually used: the caller's string, or the latest
    /// table date when none was given.
    pub selected_date: String,
    /// Echo of the caller's hour string; empty when none was given.
    pub selected_hour: String,
}

/// One point of the risk history window.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub time: String,
    pub risk: f64,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct RiskService {
    store: FeatureStore,
    model: RiskModel,
    sensors: &'static [SensorLocation],
    jitter: Normal<f64>,
    rng: Mutex<ChaCha8Rng>,
}

impl RiskService {
    /// Builds the service around an already-constructed store and trained
    /// model. `seed` fixes the jitter stream, which keeps per-sensor draws
    /// reproducible in tests; production callers seed from the clock.
    ///
    /// # Panics
    /// Panics if `jitter_std_dev` is negative or non-finite. Like a
    /// malformed config file, that is a deployment mistake the service
    /// should refuse to start with.
    pub fn new(
        store: FeatureStore,
        model: RiskModel,
        sensors: &'static [SensorLocation],
        seed: u64,
        jitter_std_dev: f64,
    ) -> Self {
        let jitter = Normal::new(0.0, jitter_std_dev)
            .unwrap_or_else(|e| panic!("Invalid jitter std-dev {}: {}", jitter_std_dev, e));
        Self {
            store,
            model,
            sensors,
            jitter,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Current risk for an optional (date, hour) query.
    ///
    /// Query-shape problems never fail: the store's fallback ladder picks
    /// the closest available reading. The only error paths are classifier
    /// contract violations.
    pub fn current_risk(
        &self,
        date: Option<&str>,
        hour: Option<&str>,
    ) -> Result<CurrentRisk, RiskError> {
        let resolved = self.store.point_query(date, hour);
        let base = self.model.score(&resolved.values)? * 100.0;

        let mut rng = self.rng.lock().expect("jitter rng lock poisoned");
        let sensors = self
            .sensors
            .iter()
            .map(|sensor| {
                let jittered = (base + self.jitter.sample(&mut *rng)).clamp(0.0, 100.0);
                let risk = round1(jittered);
                let band = RiskBand::from_score(risk);
                SensorRisk {
                    name: sensor.name,
                    risk,
                    band,
                    status: band.status_label(),
                    lat: sensor.latitude,
                    lon: sensor.longitude,
                    area: sensor.area,
                }
            })
            .collect();
        drop(rng);

        Ok(CurrentRisk {
            overall_risk: round1(base),
            overall_band: RiskBand::from_score(base),
            sensors,
            weather: WeatherSnapshot::from_values(&resolved.values),
            selected_date: date
                .map(str::to_string)
                .unwrap_or_else(|| self.store.latest_date().format("%Y-%m-%d").to_string()),
            selected_hour: hour.unwrap_or("").to_string(),
        })
    }

    /// Risk across the 13-hour window around the resolved base (date, hour),
    /// earliest slot first, without per-sensor jitter.
    ///
    /// Defaults: an absent or unparsable date resolves to the latest table
    /// date; an absent or unparsable hour resolves to the latest hour
    /// recorded on the base date, or 12 when the date has no rows at all.
    pub fn risk_history(
        &self,
        date: Option<&str>,
        hour: Option<&str>,
    ) -> Result<Vec<HistoryPoint>, RiskError> {
        let base_date = date
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or_else(|| self.store.latest_date());
        let base_hour = hour
            .and_then(|h| h.trim().parse::<u32>().ok())
            .or_else(|| self.store.latest_hour_on(base_date))
            .unwrap_or(12);

        let mut history = Vec::with_capacity((2 * HISTORY_WINDOW_HOURS + 1) as usize);
        for (label, values) in
            self.store
                .range_query(base_date, base_hour, HISTORY_WINDOW_HOURS, HISTORY_WINDOW_HOURS)
        {
            let risk = self.model.score(&values)? * 100.0;
            history.push(HistoryPoint { time: label, risk: round1(risk) });
        }
        Ok(history)
    }

    /// Read access for the daemon's startup report.
    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn model(&self) -> &RiskModel {
        &self.model
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ForestParams;
    use crate::model::{MergedReading, SensorReading, WeatherReading, ELEVATED_STATE};
    use crate::sensors::SENSOR_REGISTRY;
    use chrono::NaiveDateTime;

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn reading(d: u32, h: u32, precip: f64, elevated: bool) -> MergedReading {
        MergedReading {
            sensor: SensorReading {
                timestamp: ts(d, h),
                value: if elevated { 30.0 } else { 10.0 },
                state: Some(if elevated { ELEVATED_STATE.to_string() } else { "Normal".to_string() }),
            },
            weather: Some(WeatherReading {
                timestamp: ts(d, h),
                temperature_c: Some(22.0),
                humidity_pct: Some(70.0),
                precipitation_mm: Some(precip),
                wind_speed_kmh: Some(12.0),
                wind_gust_kmh: Some(18.0),
                pressure_hpa: Some(1009.0),
                cloud_cover_pct: Some(60.0),
                weather_code: Some(3.0),
            }),
        }
    }

    /// Service over a table where every label is `elevated`, so every
    /// score is exactly 1.0 — useful for pinning the base at 100.
    fn service_with_uniform_label(elevated: bool, seed: u64) -> RiskService {
        let rows: Vec<MergedReading> = (0..30)
            .map(|i| reading(1 + i / 24, i % 24, (i % 7) as f64, elevated))
            .collect();
        let store = FeatureStore::from_merged(&rows, ELEVATED_STATE).unwrap();
        let (x, y) = store.training_data();
        let model =
            RiskModel::train(&x, &y, ForestParams { n_trees: 10, max_depth: 4, ..Default::default() })
                .unwrap();
        RiskService::new(store, model, SENSOR_REGISTRY, seed, DEFAULT_JITTER_STD_DEV)
    }

    #[test]
    fn test_current_risk_emits_one_entry_per_sensor() {
        let service = service_with_uniform_label(false, 1);
        let current = service.current_risk(Some("2024-04-01"), Some("5")).unwrap();
        assert_eq!(current.sensors.len(), SENSOR_REGISTRY.len());
    }

    #[test]
    fn test_jitter_stays_in_bounds_at_base_100() {
        let service = service_with_uniform_label(true, 99);
        for _ in 0..20 {
            let current = service.current_risk(None, None).unwrap();
            assert_eq!(current.overall_risk, 100.0);
            for sensor in &current.sensors {
                assert!(
                    (0.0..=100.0).contains(&sensor.risk),
                    "sensor '{}' risk {} out of bounds",
                    sensor.name,
                    sensor.risk
                );
            }
        }
    }

    #[test]
    fn test_jitter_stays_in_bounds_at_base_0() {
        let service = service_with_uniform_label(false, 99);
        for _ in 0..20 {
            let current = service.current_risk(None, None).unwrap();
            assert_eq!(current.overall_risk, 0.0);
            for sensor in &current.sensors {
                assert!((0.0..=100.0).contains(&sensor.risk));
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_sensor_scores() {
        let a = service_with_uniform_label(true, 4242);
        let b = service_with_uniform_label(true, 4242);

        let risks_a: Vec<f64> =
            a.current_risk(None, None).unwrap().sensors.iter().map(|s| s.risk).collect();
        let risks_b: Vec<f64> =
            b.current_risk(None, None).unwrap().sensors.iter().map(|s| s.risk).collect();
        assert_eq!(risks_a, risks_b, "fixed seed should reproduce jitter draws");
    }

    #[test]
    fn test_sensor_band_matches_sensor_score() {
        let service = service_with_uniform_label(true, 7);
        let current = service.current_risk(None, None).unwrap();
        for sensor in &current.sensors {
            assert_eq!(sensor.band, RiskBand::from_score(sensor.risk));
            assert_eq!(sensor.status, sensor.band.status_label());
        }
    }

    #[test]
    fn test_history_has_thirteen_points_by_default() {
        let service = service_with_uniform_label(false, 1);
        let history = service.risk_history(None, None).unwrap();
        assert_eq!(history.len(), 13);
        // Without jitter, history at base 0 is flat zero.
        assert!(history.iter().all(|p| p.risk == 0.0));
    }

    #[test]
    fn test_history_labels_are_zero_padded() {
        let service = service_with_uniform_label(false, 1);
        let history = service.risk_history(Some("2024-04-01"), Some("3")).unwrap();
        assert_eq!(history[0].time, "21:00", "window starts the previous evening");
        assert_eq!(history[6].time, "03:00");
        assert_eq!(history[12].time, "09:00");
    }

    #[test]
    fn test_history_is_deterministic_across_calls() {
        let service = service_with_uniform_label(true, 1);
        let first = service.risk_history(Some("2024-04-01"), Some("12")).unwrap();
        let second = service.risk_history(Some("2024-04-01"), Some("12")).unwrap();
        let risks =
            |h: &[HistoryPoint]| h.iter().map(|p| p.risk).collect::<Vec<_>>();
        assert_eq!(risks(&first), risks(&second));
    }

    #[test]
    fn test_selected_date_echo_defaults_to_latest() {
        let service = service_with_uniform_label(false, 1);
        let current = service.current_risk(None, None).unwrap();
        assert_eq!(current.selected_date, "2024-04-02");
        assert_eq!(current.selected_hour, "");

        let queried = service.current_risk(Some("2024-04-01"), Some("5")).unwrap();
        assert_eq!(queried.selected_date, "2024-04-01");
        assert_eq!(queried.selected_hour, "5");
    }

    #[test]
    fn test_weather_snapshot_echoes_resolved_features() {
        let service = service_with_uniform_label(false, 1);
        let current = service.current_risk(Some("2024-04-01"), Some("5")).unwrap();
        // Row (day 1, hour 5) carries precip 5 % 7 = 5.0.
        assert_eq!(current.weather.precipitation_mm, 5.0);
        assert_eq!(current.weather.temperature_c, 22.0);
    }
}
