//! Statistical regime diagnostics for financial time series.
//!
//! This crate decides, per series, whether levels or first differences
//! are safe inputs for I(0)-assuming procedures, whether calendar
//! seasonality needs explicit handling, and enforces the persisted
//! classification as a precondition through the usage guard.

pub mod guard;
pub mod prepare;
pub mod report;
pub mod seasonality;
pub mod stationarity;

pub use guard::{GuardError, UsageGuard};
pub use prepare::{prepare, trim_outliers, PreparedSeries};
pub use report::seasonality_note;
pub use seasonality::{
    analyze, classify_severity, in_turn_window, month_dummies_test, month_variance_test,
    run_over, year_end_test, GroupFilter, SeasonalityResult, YearEndProbe,
};
pub use stationarity::{
    adf_test, classify_frame, classify_prepared, classify_series, classify_stationarity,
    kpss_pvalue, kpss_test, mackinnon_pvalue, run_suite, AdfOutcome, KpssOutcome,
};
