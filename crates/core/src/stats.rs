//! Shared statistical primitives for the diagnostics suites.
//!
//! Provides descriptive statistics, ordinary least squares with the
//! derived quantities the hypothesis tests need (coefficient t-statistics,
//! AIC, joint F-test), the Brown-Forsythe robust equal-variance test, and
//! distribution helpers backed by statrs.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use statrs::function::erf::erf;

/// Arithmetic mean; NaN for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (ddof = 1); NaN for fewer than two observations.
#[must_use]
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation (ddof = 1); NaN for fewer than two observations.
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Median; NaN for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Standard normal CDF.
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Survival function of the F distribution, `P(F(d1, d2) > stat)`.
///
/// Returns `None` when the degrees of freedom are not positive.
#[must_use]
pub fn f_survival(stat: f64, d1: f64, d2: f64) -> Option<f64> {
    if stat.is_nan() {
        return None;
    }
    let dist = FisherSnedecor::new(d1, d2).ok()?;
    Some((1.0 - dist.cdf(stat.max(0.0))).clamp(0.0, 1.0))
}

/// Outcome of an equal-variance test across groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceTest {
    pub statistic: f64,
    pub p_value: f64,
}

/// Brown-Forsythe test for equal variances across `groups`.
///
/// Median-centered variant of the Levene test: absolute deviations from
/// each group's median are compared with a one-way ANOVA F statistic,
/// which keeps the test usable on heavy-tailed financial changes.
///
/// Returns `None` when fewer than two groups are supplied or the test is
/// degenerate (no within-group deviation spread).
#[must_use]
pub fn brown_forsythe(groups: &[Vec<f64>]) -> Option<VarianceTest> {
    let k = groups.len();
    if k < 2 || groups.iter().any(Vec::is_empty) {
        return None;
    }
    let total: usize = groups.iter().map(Vec::len).sum();
    if total <= k {
        return None;
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|group| {
            let center = median(group);
            group.iter().map(|v| (v - center).abs()).collect()
        })
        .collect();

    let group_means: Vec<f64> = deviations.iter().map(|z| mean(z)).collect();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total as f64;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zbar)| z.len() as f64 * (zbar - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zbar)| z.iter().map(|zij| (zij - zbar).powi(2)).sum::<f64>())
        .sum();

    if within <= 0.0 {
        return None;
    }

    let statistic = (total - k) as f64 / (k - 1) as f64 * between / within;
    let p_value = f_survival(statistic, (k - 1) as f64, (total - k) as f64)?;
    Some(VarianceTest { statistic, p_value })
}

/// Fitted ordinary least squares regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficient estimates, one per regressor column.
    pub coef: Vec<f64>,
    /// Coefficient standard errors.
    pub stderr: Vec<f64>,
    /// Residual sum of squares.
    pub ssr: f64,
    /// Centered total sum of squares of the response.
    pub tss_centered: f64,
    /// Observations used.
    pub nobs: usize,
    /// Regressor columns fitted.
    pub nparams: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `index`; NaN when its standard error
    /// is not positive.
    #[must_use]
    pub fn t_stat(&self, index: usize) -> f64 {
        let se = self.stderr[index];
        if se > 0.0 {
            self.coef[index] / se
        } else {
            f64::NAN
        }
    }

    /// Akaike information criterion up to an additive constant shared by
    /// fits on the same sample, suitable for lag-order comparison.
    #[must_use]
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        n * (self.ssr / n).ln() + 2.0 * self.nparams as f64
    }

    /// Joint F-test p-value that all coefficients other than the first
    /// (assumed intercept) are simultaneously zero.
    #[must_use]
    pub fn overall_f_pvalue(&self) -> Option<f64> {
        if self.nparams < 2 || self.nobs <= self.nparams {
            return None;
        }
        let q = (self.nparams - 1) as f64;
        let df_resid = (self.nobs - self.nparams) as f64;
        let explained = (self.tss_centered - self.ssr).max(0.0);
        if self.ssr <= 0.0 {
            // Perfect fit: any explained variation is unambiguous.
            return Some(if explained > 0.0 { 0.0 } else { 1.0 });
        }
        let f = (explained / q) / (self.ssr / df_resid);
        f_survival(f, q, df_resid)
    }
}

/// Fits `y` on the given regressor columns by ordinary least squares.
///
/// Returns `None` when the design is underdetermined or singular.
#[must_use]
pub fn ols(y: &[f64], regressors: &[Vec<f64>]) -> Option<OlsFit> {
    let n = y.len();
    let k = regressors.len();
    if k == 0 || n <= k || regressors.iter().any(|col| col.len() != n) {
        return None;
    }

    let x = DMatrix::from_fn(n, k, |row, col| regressors[col][row]);
    let yv = DVector::from_column_slice(y);

    let xtx = x.transpose() * &x;
    let xtx_inv = xtx.try_inverse()?;
    let beta = &xtx_inv * x.transpose() * &yv;

    let resid = &yv - &x * &beta;
    let ssr = resid.dot(&resid);
    let sigma2 = ssr / (n - k) as f64;

    let stderr = (0..k)
        .map(|j| (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt())
        .collect();

    let ybar = mean(y);
    let tss_centered = y.iter().map(|v| (v - ybar).powi(2)).sum();

    Some(OlsFit {
        coef: beta.iter().copied().collect(),
        stderr,
        ssr,
        tss_centered,
        nobs: n,
        nparams: k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================
    // Descriptive statistics
    // ============================================

    #[test]
    fn mean_and_std_of_known_values() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((sample_std(&values) - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn median_even_and_odd_lengths() {
        assert!((median(&[3.0, 1.0, 2.0]) - 2.0).abs() < 1e-12);
        assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_yield_nan() {
        assert!(mean(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
        assert!(median(&[]).is_nan());
    }

    // ============================================
    // Distribution helpers
    // ============================================

    #[test]
    fn norm_cdf_reference_points() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-9);
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 1e-3);
    }

    #[test]
    fn f_survival_matches_chi_square_limit() {
        // F(1, n) at 3.84 approaches the chi-square 5% point as n grows.
        let p = f_survival(3.84, 1.0, 10_000.0).unwrap();
        assert!((p - 0.05).abs() < 0.005, "p was {p}");
    }

    #[test]
    fn f_survival_rejects_bad_dof() {
        assert!(f_survival(1.0, 0.0, 5.0).is_none());
    }

    // ============================================
    // Ordinary least squares
    // ============================================

    #[test]
    fn ols_recovers_exact_linear_relation() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();
        let intercept = vec![1.0; 20];

        let fit = ols(&y, &[intercept, x]).unwrap();

        assert!((fit.coef[0] - 2.0).abs() < 1e-8);
        assert!((fit.coef[1] - 3.0).abs() < 1e-8);
        assert!(fit.ssr < 1e-12);
    }

    #[test]
    fn ols_significant_slope_has_large_t() {
        let x: Vec<f64> = (0..50).map(f64::from).collect();
        // Slope 1 with a small deterministic wobble.
        let y: Vec<f64> = x.iter().map(|v| v + (v * 0.9).sin() * 0.1).collect();
        let intercept = vec![1.0; 50];

        let fit = ols(&y, &[intercept, x]).unwrap();

        assert!(fit.t_stat(1).abs() > 50.0, "t was {}", fit.t_stat(1));
    }

    #[test]
    fn ols_rejects_singular_design() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y = x.clone();
        let fit = ols(&y, &[vec![1.0; 10], x.clone(), x]);
        assert!(fit.is_none());
    }

    #[test]
    fn ols_rejects_underdetermined_sample() {
        assert!(ols(&[1.0, 2.0], &[vec![1.0, 1.0], vec![0.0, 1.0]]).is_none());
    }

    #[test]
    fn overall_f_detects_explanatory_regressor() {
        let x: Vec<f64> = (0..40).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 5.0 + 0.8 * v + (v * 1.3).sin()).collect();
        let fit = ols(&y, &[vec![1.0; 40], x]).unwrap();

        let p = fit.overall_f_pvalue().unwrap();
        assert!(p < 1e-6, "p was {p}");
    }

    #[test]
    fn overall_f_neutral_for_pure_noise_pattern() {
        // Regressor orthogonal to the response by construction.
        let y: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let x: Vec<f64> = (0..40).map(|i| if i % 4 < 2 { 1.0 } else { -1.0 }).collect();
        let fit = ols(&y, &[vec![1.0; 40], x]).unwrap();

        let p = fit.overall_f_pvalue().unwrap();
        assert!(p > 0.5, "p was {p}");
    }

    // ============================================
    // Brown-Forsythe
    // ============================================

    #[test]
    fn brown_forsythe_identical_groups_not_significant() {
        let a: Vec<f64> = (0..20).map(f64::from).collect();
        let b = a.clone();
        let test = brown_forsythe(&[a, b]).unwrap();
        assert!(test.statistic.abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn brown_forsythe_detects_variance_shift() {
        let a: Vec<f64> = (0..30).map(f64::from).collect();
        let b: Vec<f64> = (0..30).map(|i| f64::from(i) * 8.0).collect();
        let test = brown_forsythe(&[a, b]).unwrap();
        assert!(test.p_value < 0.01, "p was {}", test.p_value);
    }

    #[test]
    fn brown_forsythe_degenerate_spread_is_none() {
        // Every deviation from the median is identical within each group.
        let a = vec![-1.0, 1.0, -1.0, 1.0];
        let b = vec![-5.0, 5.0, -5.0, 5.0];
        assert!(brown_forsythe(&[a, b]).is_none());
    }

    #[test]
    fn brown_forsythe_requires_two_groups() {
        assert!(brown_forsythe(&[vec![1.0, 2.0, 3.0]]).is_none());
    }
}
