//! Configuration for the diagnostics suites.
//!
//! Every tunable that used to live as an ad hoc keyword default (alpha,
//! minimum observations, regression specification) is collected into an
//! explicit structure and passed by value into each component, so no two
//! callers can drift apart on hidden defaults.

use serde::{Deserialize, Serialize};

/// Deterministic terms included in a unit-root test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegressionSpec {
    /// Constant only ("c").
    #[serde(rename = "c")]
    Constant,
    /// Constant and linear trend ("ct").
    #[serde(rename = "ct")]
    ConstantTrend,
}

impl RegressionSpec {
    /// Number of deterministic regressors implied by the specification.
    #[must_use]
    pub const fn n_deterministic(&self) -> usize {
        match self {
            Self::Constant => 1,
            Self::ConstantTrend => 2,
        }
    }
}

/// Settings for the stationarity classification suite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StationarityConfig {
    /// Significance level applied to both underlying tests.
    pub alpha: f64,
    /// Minimum valid observations per series; one trading year by default.
    pub min_observations: usize,
    /// Deterministic terms for the unit-root (ADF) regression.
    pub adf_regression: RegressionSpec,
    /// Deterministic terms for the stationarity (KPSS) regression.
    pub kpss_regression: RegressionSpec,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            min_observations: 252,
            adf_regression: RegressionSpec::Constant,
            kpss_regression: RegressionSpec::Constant,
        }
    }
}

/// Settings for the seasonality analysis suite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeasonalityConfig {
    /// Significance level applied to all three probes.
    pub alpha: f64,
    /// Minimum valid observations per differenced series.
    pub min_observations: usize,
    /// Year-end volatility ratio above which a significant regression
    /// upgrades the verdict to STRONG.
    pub strong_ratio: f64,
    /// Year-end volatility ratio above which the verdict is at least WEAK.
    pub weak_ratio: f64,
    /// Absolute z-score beyond which a differenced observation is trimmed
    /// before any probe runs.
    pub outlier_z: f64,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            min_observations: 252,
            strong_ratio: 1.3,
            weak_ratio: 1.2,
            outlier_z: 6.0,
        }
    }
}
