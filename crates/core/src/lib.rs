//! Core types, configuration, and statistical primitives for the
//! regime diagnostics workspace.

pub mod config;
pub mod frame;
pub mod stats;

pub use config::{RegressionSpec, SeasonalityConfig, StationarityConfig};
pub use frame::{Frame, TimeSeries};
pub use stats::{brown_forsythe, f_survival, norm_cdf, ols, OlsFit, VarianceTest};
