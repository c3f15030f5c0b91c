//! Calendar-seasonality diagnostics for differenced series.
//!
//! Year-end funding stress, balance-sheet constraints, and repo effects
//! can distort volatility estimates and invalidate mean-reversion
//! assumptions if left untested. Three probes target different
//! signatures of the same phenomenon:
//!
//! 1. turn-window (mid-December through mid-January) versus
//!    rest-of-year variance,
//! 2. variance homogeneity across the twelve calendar months,
//! 3. month-dummy regression on the volatility proxy |x|.
//!
//! The graded severity verdict requires economic amplitude (the
//! year-end volatility ratio) on top of statistical significance, so a
//! highly significant but tiny effect is downgraded.

use crate::prepare::{self, PreparedSeries};
use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use regime_lab_core::config::SeasonalityConfig;
use regime_lab_core::frame::Frame;
use regime_lab_core::stats;
use regime_lab_data::models::{SeasonalityDecision, SeasonalityRecord, SeasonalityVerdict};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Year-end variance probe output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct YearEndProbe {
    /// Turn-window to rest-of-year volatility ratio.
    pub ratio: f64,
    /// Equal-variance test p-value.
    pub p_value: f64,
}

/// Full per-series seasonality analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityResult {
    pub name: String,
    pub ye_ratio: f64,
    pub ye_p: f64,
    pub month_var_p: f64,
    pub month_dummy_p: f64,
    pub decision: SeasonalityDecision,
    pub verdict: SeasonalityVerdict,
    pub handling_rule: String,
}

/// True inside the year-end turn window: December from the 15th through
/// January up to the 15th.
#[must_use]
pub fn in_turn_window(date: NaiveDate) -> bool {
    (date.month() == 12 && date.day() >= 15) || (date.month() == 1 && date.day() <= 15)
}

/// Compares turn-window variance against the rest of the year.
///
/// Neutral output (NaN ratio, p = 1.0) when either side has fewer than
/// two observations or the variance test degenerates.
#[must_use]
pub fn year_end_test(series: &PreparedSeries) -> YearEndProbe {
    let mut turn = Vec::new();
    let mut rest = Vec::new();
    for (date, value) in series.dates().iter().zip(series.values()) {
        if in_turn_window(*date) {
            turn.push(*value);
        } else {
            rest.push(*value);
        }
    }

    if turn.len() < 2 || rest.len() < 2 {
        return YearEndProbe {
            ratio: f64::NAN,
            p_value: 1.0,
        };
    }

    let rest_std = stats::sample_std(&rest);
    let ratio = if rest_std > 0.0 {
        stats::sample_std(&turn) / rest_std
    } else {
        f64::NAN
    };
    let p_value = stats::brown_forsythe(&[turn, rest]).map_or(1.0, |t| t.p_value);

    YearEndProbe { ratio, p_value }
}

/// Tests variance homogeneity across the twelve calendar months.
///
/// Months with fewer than two observations are dropped; with fewer than
/// three populated months the probe is neutral (p = 1.0).
#[must_use]
pub fn month_variance_test(series: &PreparedSeries) -> f64 {
    let mut by_month: Vec<Vec<f64>> = vec![Vec::new(); 12];
    for (date, value) in series.dates().iter().zip(series.values()) {
        by_month[date.month0() as usize].push(*value);
    }

    let groups: Vec<Vec<f64>> = by_month.into_iter().filter(|g| g.len() >= 2).collect();
    if groups.len() < 3 {
        return 1.0;
    }

    stats::brown_forsythe(&groups).map_or(1.0, |t| t.p_value)
}

/// Regresses |x| on month indicators and tests their joint significance.
///
/// One month (the first present) is the reference level. Neutral
/// (p = 1.0) when the sample is too small for the regression or the
/// design is singular.
#[must_use]
pub fn month_dummies_test(series: &PreparedSeries) -> f64 {
    let months: BTreeSet<u32> = series.dates().iter().map(Datelike::month).collect();
    if months.len() < 2 {
        return 1.0;
    }

    let y: Vec<f64> = series.values().iter().map(|v| v.abs()).collect();
    let n = y.len();

    let mut columns: Vec<Vec<f64>> = vec![vec![1.0; n]];
    for month in months.iter().skip(1) {
        columns.push(
            series
                .dates()
                .iter()
                .map(|d| if d.month() == *month { 1.0 } else { 0.0 })
                .collect(),
        );
    }

    if n < columns.len() + 5 {
        tracing::debug!(
            column = series.name(),
            nobs = n,
            params = columns.len(),
            "month-dummy regression underdetermined"
        );
        return 1.0;
    }

    stats::ols(&y, &columns)
        .and_then(|fit| fit.overall_f_pvalue())
        .map_or(1.0, |p| p)
}

/// Grades severity from economic amplitude and statistical significance.
#[must_use]
pub fn classify_severity(
    ye_ratio: f64,
    month_dummy_p: f64,
    config: &SeasonalityConfig,
) -> SeasonalityVerdict {
    if month_dummy_p < config.alpha && ye_ratio > config.strong_ratio {
        SeasonalityVerdict::Strong
    } else if ye_ratio > config.weak_ratio {
        SeasonalityVerdict::Weak
    } else {
        SeasonalityVerdict::None
    }
}

/// Runs all three probes on a prepared differenced series and fuses them
/// into the binary decision and the graded verdict.
#[must_use]
pub fn analyze(series: &PreparedSeries, config: &SeasonalityConfig) -> SeasonalityResult {
    let ye = year_end_test(series);
    let month_var_p = month_variance_test(series);
    let month_dummy_p = month_dummies_test(series);

    let any_significant = ye.p_value < config.alpha
        || month_var_p < config.alpha
        || month_dummy_p < config.alpha;
    let decision = if any_significant {
        SeasonalityDecision::ModelExplicitly
    } else {
        SeasonalityDecision::Ignore
    };

    let verdict = classify_severity(ye.ratio, month_dummy_p, config);

    SeasonalityResult {
        name: series.name().to_string(),
        ye_ratio: ye.ratio,
        ye_p: ye.p_value,
        month_var_p,
        month_dummy_p,
        decision,
        verdict,
        handling_rule: verdict.handling_rule().to_string(),
    }
}

/// Named column filter for the batch run.
pub struct GroupFilter {
    group: String,
    predicate: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl GroupFilter {
    pub fn new(
        group: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            group: group.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Filter matching any column whose lowercased name contains one of
    /// `patterns`.
    pub fn name_contains(group: impl Into<String>, patterns: &[&str]) -> Self {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_lowercase()).collect();
        Self::new(group, move |column: &str| {
            let lower = column.to_lowercase();
            patterns.iter().any(|p| lower.contains(p))
        })
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn matches(&self, column: &str) -> bool {
        (self.predicate)(column)
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Runs seasonality diagnostics over every column selected by `filters`.
///
/// The frame is differenced once; each matching column is prepared,
/// outlier-trimmed, and analyzed, with the filter's group name carried
/// on the result row. Columns failing preparation are skipped with a
/// warning rather than aborting the batch. Output is sorted most
/// actionable first: verdict severity, then the regression p-value, then
/// the year-end p-value, then the variable name.
#[must_use]
pub fn run_over(
    frame: &Frame,
    filters: &[GroupFilter],
    config: &SeasonalityConfig,
) -> Vec<SeasonalityRecord> {
    let diffed = frame.diff();

    let jobs: Vec<(String, regime_lab_core::frame::TimeSeries)> = filters
        .iter()
        .flat_map(|filter| {
            diffed
                .iter_series()
                .filter(|series| filter.matches(series.name()))
                .map(|series| (filter.group().to_string(), series))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut records: Vec<SeasonalityRecord> = jobs
        .par_iter()
        .filter_map(|(group, series)| {
            let Some(prepared) = prepare::prepare(series, config.min_observations) else {
                tracing::warn!(
                    column = series.name(),
                    group = group.as_str(),
                    "skipping seasonality analysis: insufficient data"
                );
                return None;
            };
            let (trimmed, removed) = prepare::trim_outliers(&prepared, config.outlier_z);
            if removed > 0 {
                tracing::debug!(column = series.name(), removed, "trimmed outliers");
            }

            let result = analyze(&trimmed, config);
            Some(SeasonalityRecord {
                group: group.clone(),
                variable: result.name,
                ye_ratio: result.ye_ratio,
                ye_p: result.ye_p,
                month_var_p: result.month_var_p,
                month_dummy_p: result.month_dummy_p,
                decision: result.decision,
                verdict: result.verdict,
            })
        })
        .collect();

    records.sort_by(|a, b| {
        b.verdict
            .cmp(&a.verdict)
            .then_with(|| cmp_f64(a.month_dummy_p, b.month_dummy_p))
            .then_with(|| cmp_f64(a.ye_p, b.ye_p))
            .then_with(|| a.variable.cmp(&b.variable))
    });

    tracing::info!(rows = records.len(), "seasonality suite complete");
    records
}
