//! Stationarity classification for financial time series.
//!
//! Two unit-root tests with opposite null hypotheses are run on every
//! prepared series:
//!
//! - ADF, null: the series has a unit root. Rejecting (p < alpha)
//!   supports stationarity.
//! - KPSS, null: the series is stationary. Rejecting (p < alpha)
//!   supports non-stationarity.
//!
//! Agreement between the two yields a confident I(0)/I(1) label;
//! disagreement yields an explicit ambiguous label instead of a forced
//! binary call.

use crate::prepare::{self, PreparedSeries};
use rayon::prelude::*;
use regime_lab_core::config::{RegressionSpec, StationarityConfig};
use regime_lab_core::frame::{Frame, TimeSeries};
use regime_lab_core::stats::{self, norm_cdf};
use regime_lab_data::models::{StationarityLabel, StationarityRecord, Transform};
use serde::{Deserialize, Serialize};

/// Result of one augmented Dickey-Fuller test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdfOutcome {
    /// t-statistic of the lagged-level coefficient.
    pub statistic: f64,
    /// MacKinnon approximate p-value.
    pub p_value: f64,
    /// Difference lags selected by AIC.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
}

/// Result of one KPSS test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KpssOutcome {
    pub statistic: f64,
    /// Interpolated from the critical-value table, clamped to
    /// [0.01, 0.10].
    pub p_value: f64,
    /// Bartlett bandwidth from the automatic selection rule.
    pub lags: usize,
}

// MacKinnon (1994) regression-surface coefficients for the approximate
// asymptotic p-value of the ADF tau statistic, single-series case.
const TAU_STAR_C: f64 = -1.61;
const TAU_MIN_C: f64 = -18.83;
const TAU_MAX_C: f64 = 2.74;
const TAU_C_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038_269];
const TAU_C_LARGEP: [f64; 4] = [1.7339, 0.932_02, -0.127_45, -0.010_368];

const TAU_STAR_CT: f64 = -2.89;
const TAU_MIN_CT: f64 = -16.18;
const TAU_MAX_CT: f64 = 0.7;
const TAU_CT_SMALLP: [f64; 3] = [3.2657, 1.6688, 0.054_064];
const TAU_CT_LARGEP: [f64; 4] = [2.5261, 0.616_54, -0.037_956, -0.006_953_1];

// KPSS critical values; p-values are interpolated between these points.
const KPSS_PCTS: [f64; 4] = [0.10, 0.05, 0.025, 0.01];
const KPSS_CRIT_C: [f64; 4] = [0.347, 0.463, 0.574, 0.739];
const KPSS_CRIT_CT: [f64; 4] = [0.119, 0.146, 0.176, 0.216];

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// MacKinnon approximate asymptotic p-value for an ADF tau statistic.
#[must_use]
pub fn mackinnon_pvalue(statistic: f64, regression: RegressionSpec) -> f64 {
    let (tau_star, tau_min, tau_max, smallp, largep): (f64, f64, f64, &[f64], &[f64]) =
        match regression {
            RegressionSpec::Constant => {
                (TAU_STAR_C, TAU_MIN_C, TAU_MAX_C, &TAU_C_SMALLP, &TAU_C_LARGEP)
            }
            RegressionSpec::ConstantTrend => (
                TAU_STAR_CT,
                TAU_MIN_CT,
                TAU_MAX_CT,
                &TAU_CT_SMALLP,
                &TAU_CT_LARGEP,
            ),
        };

    if !statistic.is_finite() {
        return f64::NAN;
    }
    if statistic > tau_max {
        return 1.0;
    }
    if statistic < tau_min {
        return 0.0;
    }
    let coefs = if statistic <= tau_star { smallp } else { largep };
    norm_cdf(polyval(coefs, statistic))
}

/// Augmented Dickey-Fuller test with AIC lag selection.
///
/// Regresses the first difference on the lagged level, `used_lag`
/// difference lags, and the deterministic terms of `regression`. All
/// candidate lag orders are compared on the common maxlag-trimmed sample;
/// the chosen order is then refit on the longest available sample.
///
/// Returns `None` when the regression cannot be fit (far too short or
/// numerically singular) - the caller records the column as untestable.
#[must_use]
pub fn adf_test(series: &PreparedSeries, regression: RegressionSpec) -> Option<AdfOutcome> {
    let levels = series.values();
    let n = levels.len();
    let ntrend = regression.n_deterministic();
    if n < 2 * (ntrend + 2) {
        return None;
    }

    let diffs: Vec<f64> = levels.windows(2).map(|w| w[1] - w[0]).collect();

    let ceil_rule = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let maxlag = ceil_rule.min(n / 2 - ntrend - 1);

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=maxlag {
        let Some(fit) = adf_fit(levels, &diffs, maxlag, lag, regression) else {
            continue;
        };
        let aic = fit.aic();
        if best.map_or(true, |(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }
    let (_, used_lag) = best?;

    let fit = adf_fit(levels, &diffs, used_lag, used_lag, regression)?;
    let statistic = fit.t_stat(0);
    if !statistic.is_finite() {
        return None;
    }

    Some(AdfOutcome {
        statistic,
        p_value: mackinnon_pvalue(statistic, regression),
        used_lag,
        nobs: fit.nobs,
    })
}

/// Fits the ADF regression with `lag` difference lags on the sample that
/// discards the first `trim` differences.
fn adf_fit(
    levels: &[f64],
    diffs: &[f64],
    trim: usize,
    lag: usize,
    regression: RegressionSpec,
) -> Option<stats::OlsFit> {
    debug_assert!(lag <= trim);
    let rows = diffs.len().checked_sub(trim)?;
    if rows == 0 {
        return None;
    }

    let y: Vec<f64> = diffs[trim..].to_vec();

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(lag + regression.n_deterministic() + 1);
    // Lagged level first so the test statistic is always t_stat(0).
    columns.push((trim..diffs.len()).map(|t| levels[t]).collect());
    for i in 1..=lag {
        columns.push((trim..diffs.len()).map(|t| diffs[t - i]).collect());
    }
    columns.push(vec![1.0; rows]);
    if regression == RegressionSpec::ConstantTrend {
        columns.push((trim..diffs.len()).map(|t| (t + 1) as f64).collect());
    }

    stats::ols(&y, &columns)
}

/// KPSS test with Bartlett-kernel long-run variance and the automatic
/// bandwidth selection rule.
///
/// Returns `None` when the long-run variance estimate degenerates.
#[must_use]
pub fn kpss_test(series: &PreparedSeries, regression: RegressionSpec) -> Option<KpssOutcome> {
    let values = series.values();
    let n = values.len();
    if n < 4 {
        return None;
    }

    let resids: Vec<f64> = match regression {
        RegressionSpec::Constant => {
            let m = stats::mean(values);
            values.iter().map(|v| v - m).collect()
        }
        RegressionSpec::ConstantTrend => {
            let trend: Vec<f64> = (0..n).map(|t| t as f64).collect();
            let fit = stats::ols(values, &[vec![1.0; n], trend.clone()])?;
            values
                .iter()
                .zip(&trend)
                .map(|(v, t)| v - fit.coef[0] - fit.coef[1] * t)
                .collect()
        }
    };

    let lags = kpss_auto_lags(&resids).min(n - 1);

    let mut running = 0.0;
    let mut eta = 0.0;
    for r in &resids {
        running += r;
        eta += running * running;
    }
    eta /= (n * n) as f64;

    let mut long_run: f64 = resids.iter().map(|r| r * r).sum();
    for i in 1..=lags {
        let gamma: f64 = resids[i..].iter().zip(&resids[..n - i]).map(|(a, b)| a * b).sum();
        long_run += 2.0 * gamma * (1.0 - i as f64 / (lags as f64 + 1.0));
    }
    long_run /= n as f64;
    if long_run <= 0.0 {
        return None;
    }

    let statistic = eta / long_run;
    Some(KpssOutcome {
        statistic,
        p_value: kpss_pvalue(statistic, regression),
        lags,
    })
}

/// Data-dependent Bartlett bandwidth (Hobijn et al. rule).
fn kpss_auto_lags(resids: &[f64]) -> usize {
    let n = resids.len();
    let covlags = (n as f64).powf(2.0 / 9.0) as usize;

    let mut s0: f64 = resids.iter().map(|r| r * r).sum::<f64>() / n as f64;
    let mut s1 = 0.0;
    for i in 1..=covlags.min(n - 1) {
        let mut prod: f64 = resids[i..].iter().zip(&resids[..n - i]).map(|(a, b)| a * b).sum();
        prod /= n as f64 / 2.0;
        s0 += prod;
        s1 += i as f64 * prod;
    }
    if s0 <= 0.0 {
        return 0;
    }

    let s_hat = s1 / s0;
    let power = 1.0 / 3.0;
    let gamma_hat = 1.1447 * (s_hat * s_hat).powf(power);
    (gamma_hat * (n as f64).powf(power)) as usize
}

/// Interpolated KPSS p-value, clamped to the table range [0.01, 0.10].
#[must_use]
pub fn kpss_pvalue(statistic: f64, regression: RegressionSpec) -> f64 {
    let crit = match regression {
        RegressionSpec::Constant => &KPSS_CRIT_C,
        RegressionSpec::ConstantTrend => &KPSS_CRIT_CT,
    };

    if statistic <= crit[0] {
        return KPSS_PCTS[0];
    }
    if statistic >= crit[3] {
        return KPSS_PCTS[3];
    }
    for i in 0..3 {
        if statistic <= crit[i + 1] {
            let weight = (statistic - crit[i]) / (crit[i + 1] - crit[i]);
            return KPSS_PCTS[i] + weight * (KPSS_PCTS[i + 1] - KPSS_PCTS[i]);
        }
    }
    KPSS_PCTS[3]
}

/// Fuses the two test p-values into one label.
///
/// Only the alpha-threshold comparison matters; magnitudes beyond the
/// threshold never change the label.
#[must_use]
pub fn classify_stationarity(adf_p: f64, kpss_p: f64, alpha: f64) -> StationarityLabel {
    let adf_rejects = adf_p < alpha; // evidence for stationarity
    let kpss_rejects = kpss_p < alpha; // evidence against stationarity
    match (adf_rejects, kpss_rejects) {
        (true, false) => StationarityLabel::Stationary,
        (false, true) => StationarityLabel::NonStationary,
        (true, true) => StationarityLabel::TrendStationaryAmbiguous,
        (false, false) => StationarityLabel::NearUnitRootAmbiguous,
    }
}

/// Classifies a prepared series under the given transform tag.
#[must_use]
pub fn classify_prepared(
    prepared: &PreparedSeries,
    transform: Transform,
    config: &StationarityConfig,
) -> StationarityRecord {
    let adf = adf_test(prepared, config.adf_regression);
    let kpss = kpss_test(prepared, config.kpss_regression);

    match (adf, kpss) {
        (Some(adf), Some(kpss)) => StationarityRecord {
            column: prepared.name().to_string(),
            nobs: prepared.len(),
            adf_p: adf.p_value,
            kpss_p: kpss.p_value,
            label: classify_stationarity(adf.p_value, kpss.p_value, config.alpha),
            transform,
        },
        _ => {
            tracing::debug!(column = prepared.name(), "unit-root tests degenerate");
            insufficient_record(prepared.name(), prepared.len(), transform)
        }
    }
}

/// Classifies one column, degrading to the insufficient label instead of
/// failing.
#[must_use]
pub fn classify_series(
    series: &TimeSeries,
    transform: Transform,
    config: &StationarityConfig,
) -> StationarityRecord {
    match prepare::prepare(series, config.min_observations) {
        Some(prepared) => classify_prepared(&prepared, transform, config),
        None => insufficient_record(series.name(), series.valid_count(), transform),
    }
}

fn insufficient_record(column: &str, nobs: usize, transform: Transform) -> StationarityRecord {
    StationarityRecord {
        column: column.to_string(),
        nobs,
        adf_p: f64::NAN,
        kpss_p: f64::NAN,
        label: StationarityLabel::InsufficientData,
        transform,
    }
}

/// Classifies every column of `frame` under one transform tag.
///
/// Columns are evaluated in parallel; the output is sorted by label then
/// column name so repeated runs diff cleanly.
#[must_use]
pub fn classify_frame(
    frame: &Frame,
    transform: Transform,
    config: &StationarityConfig,
) -> Vec<StationarityRecord> {
    let series: Vec<TimeSeries> = frame.iter_series().collect();
    let mut records: Vec<StationarityRecord> = series
        .par_iter()
        .map(|s| classify_series(s, transform, config))
        .collect();
    records.sort_by(|a, b| {
        (a.label.as_str(), a.column.as_str()).cmp(&(b.label.as_str(), b.column.as_str()))
    });
    records
}

/// Runs the full classification suite: every column in levels, then
/// every column in first differences.
#[must_use]
pub fn run_suite(frame: &Frame, config: &StationarityConfig) -> Vec<StationarityRecord> {
    let mut records = classify_frame(frame, Transform::Level, config);
    records.extend(classify_frame(&frame.diff(), Transform::Diff, config));

    let insufficient = records
        .iter()
        .filter(|r| r.label == StationarityLabel::InsufficientData)
        .count();
    tracing::info!(
        rows = records.len(),
        insufficient,
        "stationarity suite complete"
    );
    records
}
