//! Series preparation ahead of any hypothesis test.
//!
//! Dropping missing values, enforcing a minimum sample, and rejecting
//! numerically constant series happens here, once, so every test
//! downstream can assume a dense, non-degenerate sample. Insufficiency
//! is a result value, never an error: a batch run over hundreds of
//! columns must not abort on one bad series.

use chrono::NaiveDate;
use regime_lab_core::frame::TimeSeries;
use regime_lab_core::stats;

/// Standard deviations at or below this are treated as zero; constant
/// series make both unit-root tests degenerate.
const DEGENERATE_STD_TOL: f64 = 1e-8;

/// A dense series that passed the preparation invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl PreparedSeries {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Validates and cleans one series before testing.
///
/// Removes missing entries, then returns `None` (the explicit
/// "insufficient" marker) when fewer than `min_observations` valid points
/// remain or the remaining values are numerically constant.
#[must_use]
pub fn prepare(series: &TimeSeries, min_observations: usize) -> Option<PreparedSeries> {
    let mut dates = Vec::with_capacity(series.len());
    let mut values = Vec::with_capacity(series.len());
    for (date, value) in series.dates().iter().zip(series.values()) {
        if let Some(v) = value {
            if v.is_finite() {
                dates.push(*date);
                values.push(*v);
            }
        }
    }

    if values.len() < min_observations {
        tracing::debug!(
            column = series.name(),
            valid = values.len(),
            required = min_observations,
            "series too short to test"
        );
        return None;
    }

    let std = stats::sample_std(&values);
    if !(std > DEGENERATE_STD_TOL) {
        tracing::debug!(column = series.name(), "series numerically constant");
        return None;
    }

    Some(PreparedSeries {
        name: series.name().to_string(),
        dates,
        values,
    })
}

/// Removes extreme observations before the seasonality probes run.
///
/// Scores each value against the sample mean and standard deviation and
/// drops those with |z| above `z_threshold`, preserving the order of the
/// survivors. The seasonality path passes a differenced series here, so
/// the scores are z-scores of first differences. Returns the trimmed
/// series and the number of observations removed, for the audit trail.
#[must_use]
pub fn trim_outliers(series: &PreparedSeries, z_threshold: f64) -> (PreparedSeries, usize) {
    let m = stats::mean(series.values());
    let std = stats::sample_std(series.values());

    let mut dates = Vec::with_capacity(series.len());
    let mut values = Vec::with_capacity(series.len());
    for (date, value) in series.dates.iter().zip(&series.values) {
        let z = (value - m) / std;
        if z.abs() <= z_threshold {
            dates.push(*date);
            values.push(*value);
        }
    }

    let removed = series.len() - values.len();
    (
        PreparedSeries {
            name: series.name.clone(),
            dates,
            values,
        },
        removed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn daily_series(name: &str, values: Vec<Option<f64>>) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        TimeSeries::new(name, dates, values).unwrap()
    }

    // ============================================
    // prepare
    // ============================================

    #[test]
    fn short_series_is_insufficient() {
        let series = daily_series("x", vec![Some(1.0); 100]);
        assert!(prepare(&series, 252).is_none());
    }

    #[test]
    fn constant_series_is_insufficient() {
        let series = daily_series("x", vec![Some(3.25); 300]);
        assert!(prepare(&series, 252).is_none());
    }

    #[test]
    fn missing_values_are_dropped_not_fatal() {
        let mut values: Vec<Option<f64>> = (0..300).map(|i| Some(f64::from(i))).collect();
        values[10] = None;
        values[200] = None;
        let series = daily_series("x", values);

        let prepared = prepare(&series, 252).unwrap();

        assert_eq!(prepared.len(), 298);
        // The gap closes but order is preserved.
        assert!((prepared.values()[10] - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_values_count_as_missing() {
        let mut values: Vec<Option<f64>> = (0..260).map(|i| Some(f64::from(i))).collect();
        values[5] = Some(f64::NAN);
        values[6] = Some(f64::INFINITY);
        let series = daily_series("x", values);

        let prepared = prepare(&series, 252).unwrap();
        assert_eq!(prepared.len(), 258);
    }

    #[test]
    fn minimum_is_inclusive() {
        let series = daily_series("x", (0..252).map(|i| Some(f64::from(i))).collect());
        assert!(prepare(&series, 252).is_some());
    }

    // ============================================
    // trim_outliers
    // ============================================

    fn alternating_with_spike(spike: f64) -> PreparedSeries {
        let mut values: Vec<Option<f64>> = (0..300)
            .map(|i| Some(if i % 2 == 0 { 1.0 } else { -1.0 }))
            .collect();
        values[150] = Some(spike);
        prepare(&daily_series("x", values), 252).unwrap()
    }

    #[test]
    fn trims_only_extreme_observations() {
        let prepared = alternating_with_spike(50.0);

        let (trimmed, removed) = trim_outliers(&prepared, 6.0);

        assert_eq!(removed, 1);
        assert_eq!(trimmed.len(), prepared.len() - 1);
        assert!(trimmed.values().iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn within_bound_observations_survive() {
        let prepared = alternating_with_spike(3.0);

        let (trimmed, removed) = trim_outliers(&prepared, 6.0);

        assert_eq!(removed, 0);
        assert_eq!(trimmed.len(), prepared.len());
    }

    #[test]
    fn trimming_preserves_order() {
        let prepared = alternating_with_spike(50.0);

        let (trimmed, _) = trim_outliers(&prepared, 6.0);

        let expected: Vec<f64> = prepared
            .values()
            .iter()
            .copied()
            .filter(|v| v.abs() <= 1.0)
            .collect();
        assert_eq!(trimmed.values(), expected.as_slice());
        for pair in trimmed.dates().windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
