/// Feature-serving index over the merged hourly table.
///
/// The store owns the merged readings and a per-column mean vector computed
/// once at construction. Point queries resolve a feature vector for an
/// arbitrary (date, hour) request through an ordered fallback ladder, and
/// range queries produce a window of consecutive hourly slots with day
/// wraparound.
///
/// ## Fallback ladder
///
/// Point queries are best-effort by design, not missing-data errors: a
/// request for data the table doesn't have degrades to the most recent
/// known reading instead of failing. Callers that need strict validation
/// must pre-validate their inputs. Each result is tagged with the tier
/// that produced it so callers (and tests) can tell which rung was used:
///
/// 1. `Exact`  — rows matching the full (date, hour) request; last match
///               in table order wins.
/// 2. `DateOnly` — hour parsed but unmatched; last row for the date.
/// 3. `Global` — date unmatched, or either field unparsable; last row of
///               the table.
///
/// "Last in table order" deliberately means source row order, not
/// chronological order. The training table is ordered by the primary
/// sensor export, and the scoring pipeline has always taken the final row
/// of a filtered slice; changing that would change observable scores.

use chrono::{Duration, NaiveDate};

use crate::model::{MergedReading, RiskError, NUM_FEATURES};

// ---------------------------------------------------------------------------
// Query result types
// ---------------------------------------------------------------------------

/// Which rung of the fallback ladder satisfied a point query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTier {
    /// The full (date, hour) request matched a row.
    Exact,
    /// The date matched but the requested hour was absent.
    DateOnly,
    /// Nothing matched, or the date/hour input was unparsable; last row of
    /// the table.
    Global,
}

/// A resolved, fully-imputed feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFeatures {
    /// Feature values in `FEATURE_COLUMNS` order, with missing fields
    /// already imputed from the column means.
    pub values: Vec<f64>,
    /// The ladder rung that produced this vector.
    pub tier: FallbackTier,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// One indexed row: date/hour key, raw (possibly missing) feature values,
/// and the training label.
#[derive(Debug, Clone)]
struct FeatureRow {
    date: NaiveDate,
    hour: u32,
    raw: [Option<f64>; NUM_FEATURES],
    elevated: bool,
}

/// Immutable feature index over the merged table.
///
/// Constructed once at startup; queries never mutate it, so it can be
/// shared freely across request threads without locking.
#[derive(Debug)]
pub struct FeatureStore {
    rows: Vec<FeatureRow>,
    column_means: [f64; NUM_FEATURES],
}

impl FeatureStore {
    /// Builds the store from merged readings, deriving training labels by
    /// comparing each row's state against `elevated_label`.
    ///
    /// The imputation vector is the per-column mean over the full table,
    /// ignoring missing values. It is computed here exactly once and reused
    /// for every query — recomputing it per query would let the inference
    /// feature distribution drift from the one the model was trained on.
    ///
    /// Fails with `RiskError::NoDataAvailable` when `merged` is empty: the
    /// fallback ladder needs at least one row to bottom out on.
    pub fn from_merged(merged: &[MergedReading], elevated_label: &str) -> Result<Self, RiskError> {
        if merged.is_empty() {
            return Err(RiskError::NoDataAvailable);
        }

        let rows: Vec<FeatureRow> = merged
            .iter()
            .map(|reading| FeatureRow {
                date: reading.date(),
                hour: reading.hour(),
                raw: reading.feature_values(),
                elevated: reading.is_elevated(elevated_label),
            })
            .collect();

        let mut sums = [0.0f64; NUM_FEATURES];
        let mut counts = [0usize; NUM_FEATURES];
        for row in &rows {
            for (i, value) in row.raw.iter().enumerate() {
                if let Some(v) = value {
                    sums[i] += v;
                    counts[i] += 1;
                }
            }
        }

        // A column with no observed values at all imputes to 0.0. That only
        // happens when the weather series never matched, in which case the
        // model is training on constants anyway.
        let mut column_means = [0.0f64; NUM_FEATURES];
        for i in 0..NUM_FEATURES {
            if counts[i] > 0 {
                column_means[i] = sums[i] / counts[i] as f64;
            }
        }

        Ok(Self { rows, column_means })
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The imputation vector, in `FEATURE_COLUMNS` order.
    pub fn column_means(&self) -> &[f64; NUM_FEATURES] {
        &self.column_means
    }

    /// Latest calendar date present in the table.
    pub fn latest_date(&self) -> NaiveDate {
        // Constructor guarantees at least one row.
        self.rows
            .iter()
            .map(|r| r.date)
            .max()
            .expect("store is never constructed empty")
    }

    /// Latest hour recorded on the given date, if the date has any rows.
    pub fn latest_hour_on(&self, date: NaiveDate) -> Option<u32> {
        self.rows
            .iter()
            .filter(|r| r.date == date)
            .map(|r| r.hour)
            .max()
    }

    /// Full training matrix: imputed feature vectors and elevated labels,
    /// in table order.
    pub fn training_data(&self) -> (Vec<Vec<f64>>, Vec<bool>) {
        let features = self.rows.iter().map(|r| self.impute(&r.raw)).collect();
        let labels = self.rows.iter().map(|r| r.elevated).collect();
        (features, labels)
    }

    fn impute(&self, raw: &[Option<f64>; NUM_FEATURES]) -> Vec<f64> {
        raw.iter()
            .enumerate()
            .map(|(i, v)| v.unwrap_or(self.column_means[i]))
            .collect()
    }

    /// Last row in table order matching the predicate.
    fn last_matching(&self, pred: impl Fn(&FeatureRow) -> bool) -> Option<&FeatureRow> {
        self.rows.iter().rev().find(|r| pred(r))
    }

    fn global_fallback(&self) -> ResolvedFeatures {
        let last = &self.rows[self.rows.len() - 1];
        ResolvedFeatures { values: self.impute(&last.raw), tier: FallbackTier::Global }
    }

    // -----------------------------------------------------------------------
    // Point queries
    // -----------------------------------------------------------------------

    /// Resolves a feature vector for a raw (date, hour) query.
    ///
    /// `date` is expected as `YYYY-MM-DD` and `hour` as an integer 0–23;
    /// both are optional. A parse failure on either field collapses
    /// straight to the global tier; an hour that parses but matches no row
    /// falls to the date tier.
    pub fn point_query(&self, date: Option<&str>, hour: Option<&str>) -> ResolvedFeatures {
        let parsed_date = date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        let Some(d) = parsed_date else {
            return self.global_fallback();
        };

        match hour {
            Some(h) => {
                let Ok(h) = h.trim().parse::<u32>() else {
                    return self.global_fallback();
                };
                if let Some(row) = self.last_matching(|r| r.date == d && r.hour == h) {
                    return ResolvedFeatures {
                        values: self.impute(&row.raw),
                        tier: FallbackTier::Exact,
                    };
                }
                // Hour given but absent from the table: fall to the date tier.
                match self.last_matching(|r| r.date == d) {
                    Some(row) => ResolvedFeatures {
                        values: self.impute(&row.raw),
                        tier: FallbackTier::DateOnly,
                    },
                    None => self.global_fallback(),
                }
            }
            // No hour constraint: a date match satisfies the request exactly.
            None => match self.last_matching(|r| r.date == d) {
                Some(row) => ResolvedFeatures {
                    values: self.impute(&row.raw),
                    tier: FallbackTier::Exact,
                },
                None => self.global_fallback(),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Range queries
    // -----------------------------------------------------------------------

    /// Resolves `before + after + 1` consecutive hourly slots centred on
    /// (date, hour), earliest offset first.
    ///
    /// Hour arithmetic wraps at the day boundary: slots before 00:00 land
    /// on the previous date, slots at or past 24:00 on the next. Each slot
    /// is resolved by exact (slot date, slot hour) match — last in table
    /// order — else the whole-table fallback. The date-only tier is skipped
    /// here: the window itself already pins the date, so a date-level
    /// fallback would just repeat the same row across adjacent slots.
    ///
    /// Returns (zero-padded "HH:00" label, imputed feature vector) pairs.
    pub fn range_query(
        &self,
        date: NaiveDate,
        hour: u32,
        before: u32,
        after: u32,
    ) -> Vec<(String, Vec<f64>)> {
        let base = date
            .and_time(chrono::NaiveTime::MIN)
            .checked_add_signed(Duration::hours(hour.min(23) as i64))
            .expect("base timestamp within chrono range");

        let mut window = Vec::with_capacity((before + after + 1) as usize);
        for offset in -(before as i64)..=(after as i64) {
            let slot = base + Duration::hours(offset);
            let slot_date = slot.date();
            let slot_hour = chrono::Timelike::hour(&slot);

            let values = match self.last_matching(|r| r.date == slot_date && r.hour == slot_hour) {
                Some(row) => self.impute(&row.raw),
                None => self.global_fallback().values,
            };
            window.push((format!("{:02}:00", slot_hour), values));
        }
        window
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SensorReading, WeatherReading, ELEVATED_STATE};
    use chrono::NaiveDateTime;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    /// Row with a distinctive temperature so tests can tell rows apart.
    fn row(y: i32, m: u32, d: u32, h: u32, temp: Option<f64>) -> MergedReading {
        MergedReading {
            sensor: SensorReading { timestamp: ts(y, m, d, h), value: 1.0, state: None },
            weather: Some(WeatherReading {
                timestamp: ts(y, m, d, h),
                temperature_c: temp,
                humidity_pct: Some(50.0),
                precipitation_mm: Some(0.0),
                wind_speed_kmh: Some(10.0),
                wind_gust_kmh: Some(15.0),
                pressure_hpa: Some(1010.0),
                cloud_cover_pct: Some(20.0),
                weather_code: Some(1.0),
            }),
        }
    }

    fn store(rows: Vec<MergedReading>) -> FeatureStore {
        FeatureStore::from_merged(&rows, ELEVATED_STATE).expect("non-empty table")
    }

    #[test]
    fn test_construction_fails_on_empty_table() {
        let err = FeatureStore::from_merged(&[], ELEVATED_STATE).unwrap_err();
        assert_eq!(err, RiskError::NoDataAvailable);
    }

    #[test]
    fn test_exact_match_returns_that_row() {
        let s = store(vec![
            row(2024, 1, 1, 8, Some(10.0)),
            row(2024, 1, 1, 9, Some(20.0)),
            row(2024, 1, 2, 8, Some(30.0)),
        ]);

        let resolved = s.point_query(Some("2024-01-01"), Some("9"));
        assert_eq!(resolved.tier, FallbackTier::Exact);
        assert_eq!(resolved.values[0], 20.0);
    }

    #[test]
    fn test_duplicate_date_hour_takes_last_in_table_order() {
        // Two rows share (2024-01-01, 9): the later table row wins even
        // though neither is "more recent" chronologically.
        let s = store(vec![
            row(2024, 1, 1, 9, Some(20.0)),
            row(2024, 1, 1, 9, Some(25.0)),
        ]);

        let resolved = s.point_query(Some("2024-01-01"), Some("9"));
        assert_eq!(resolved.tier, FallbackTier::Exact);
        assert_eq!(resolved.values[0], 25.0);
    }

    #[test]
    fn test_missing_hour_falls_back_to_date_tier() {
        let s = store(vec![
            row(2024, 1, 1, 8, Some(10.0)),
            row(2024, 1, 1, 9, Some(20.0)),
        ]);

        let resolved = s.point_query(Some("2024-01-01"), Some("23"));
        assert_eq!(resolved.tier, FallbackTier::DateOnly);
        assert_eq!(resolved.values[0], 20.0, "should take last row for the date");
    }

    #[test]
    fn test_unparsable_hour_collapses_to_global_tier() {
        let s = store(vec![
            row(2024, 1, 1, 8, Some(10.0)),
            row(2024, 1, 2, 8, Some(30.0)),
        ]);

        // A parse failure on either field skips the date tier entirely.
        let resolved = s.point_query(Some("2024-01-01"), Some("not-an-hour"));
        assert_eq!(resolved.tier, FallbackTier::Global);
        assert_eq!(resolved.values[0], 30.0);
    }

    #[test]
    fn test_missing_date_falls_back_to_global_tier() {
        let s = store(vec![
            row(2024, 1, 1, 8, Some(10.0)),
            row(2024, 1, 2, 8, Some(30.0)),
        ]);

        let resolved = s.point_query(Some("2030-06-01"), Some("8"));
        assert_eq!(resolved.tier, FallbackTier::Global);
        assert_eq!(resolved.values[0], 30.0, "should take last row of the table");
    }

    #[test]
    fn test_unparsable_date_falls_back_to_global_tier() {
        let s = store(vec![row(2024, 1, 1, 8, Some(10.0))]);

        let resolved = s.point_query(Some("yesterday-ish"), None);
        assert_eq!(resolved.tier, FallbackTier::Global);
    }

    #[test]
    fn test_no_query_at_all_is_global_tier() {
        let s = store(vec![row(2024, 1, 1, 8, Some(10.0))]);
        assert_eq!(s.point_query(None, None).tier, FallbackTier::Global);
    }

    #[test]
    fn test_date_only_request_that_matches_is_exact() {
        let s = store(vec![row(2024, 1, 1, 8, Some(10.0))]);
        let resolved = s.point_query(Some("2024-01-01"), None);
        assert_eq!(resolved.tier, FallbackTier::Exact);
    }

    #[test]
    fn test_missing_cell_is_imputed_with_column_mean() {
        let s = store(vec![
            row(2024, 1, 1, 8, Some(10.0)),
            row(2024, 1, 1, 9, Some(30.0)),
            row(2024, 1, 1, 10, None), // temperature missing
        ]);

        // Mean over observed temperatures is (10 + 30) / 2 = 20.
        let resolved = s.point_query(Some("2024-01-01"), Some("10"));
        assert_eq!(resolved.tier, FallbackTier::Exact);
        assert_eq!(resolved.values[0], 20.0);
    }

    #[test]
    fn test_imputation_vector_is_stable_across_queries() {
        let s = store(vec![
            row(2024, 1, 1, 8, Some(10.0)),
            row(2024, 1, 1, 9, None),
        ]);

        let before = *s.column_means();
        s.point_query(Some("2024-01-01"), Some("8"));
        s.point_query(None, None);
        s.range_query(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 9, 6, 6);
        assert_eq!(*s.column_means(), before, "queries must not recompute means");
    }

    #[test]
    fn test_range_query_window_size_and_labels() {
        let s = store(vec![row(2024, 1, 1, 12, Some(10.0))]);
        let window = s.range_query(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 12, 6, 6);

        assert_eq!(window.len(), 13);
        assert_eq!(window[0].0, "06:00");
        assert_eq!(window[6].0, "12:00");
        assert_eq!(window[12].0, "18:00");
    }

    #[test]
    fn test_range_query_wraps_across_day_boundary() {
        // Base (2024-01-01, hour 2) with a ±6 window spans
        // (2023-12-31, 20:00) through (2024-01-01, 08:00).
        let s = store(vec![
            row(2023, 12, 31, 20, Some(5.0)),
            row(2024, 1, 1, 2, Some(10.0)),
            row(2024, 1, 1, 8, Some(15.0)),
        ]);

        let window = s.range_query(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2, 6, 6);
        assert_eq!(window.len(), 13);

        assert_eq!(window[0].0, "20:00");
        assert_eq!(window[0].1[0], 5.0, "first slot should hit the previous-day row");
        assert_eq!(window[6].0, "02:00");
        assert_eq!(window[6].1[0], 10.0);
        assert_eq!(window[12].0, "08:00");
        assert_eq!(window[12].1[0], 15.0);
    }

    #[test]
    fn test_range_query_empty_slots_use_global_fallback() {
        let s = store(vec![
            row(2024, 1, 1, 12, Some(10.0)),
            row(2024, 1, 1, 13, Some(99.0)), // table-last row
        ]);

        let window = s.range_query(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 12, 2, 0);
        // Slots 10:00 and 11:00 have no data and resolve to the last table row.
        assert_eq!(window[0].1[0], 99.0);
        assert_eq!(window[1].1[0], 99.0);
        assert_eq!(window[2].1[0], 10.0);
    }

    #[test]
    fn test_latest_date_and_hour_helpers() {
        let s = store(vec![
            row(2024, 1, 1, 8, Some(10.0)),
            row(2024, 1, 2, 14, Some(20.0)),
            row(2024, 1, 2, 9, Some(30.0)),
        ]);

        assert_eq!(s.latest_date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(s.latest_hour_on(s.latest_date()), Some(14));
        assert_eq!(
            s.latest_hour_on(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
            None
        );
    }

    #[test]
    fn test_training_data_labels_follow_elevated_state() {
        let mut elevated = row(2024, 1, 1, 8, Some(10.0));
        elevated.sensor.state = Some("High High".to_string());
        let mut normal = row(2024, 1, 1, 9, Some(20.0));
        normal.sensor.state = Some("Normal".to_string());

        let s = store(vec![elevated, normal]);
        let (features, labels) = s.training_data();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].len(), NUM_FEATURES);
        assert_eq!(labels, vec![true, false]);
    }
}
