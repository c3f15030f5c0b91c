//! Persisted result-row models for the diagnostics suites.
//!
//! These rows are the audit trail: one `StationarityRecord` per
//! (column, transform) pair and one `SeasonalityRecord` per analyzed
//! column. They are derived facts, written once per batch run and never
//! updated in place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transform under which a series was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    #[serde(rename = "level")]
    Level,
    #[serde(rename = "diff")]
    Diff,
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level => write!(f, "level"),
            Self::Diff => write!(f, "diff"),
        }
    }
}

/// Fused label from the two unit-root tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationarityLabel {
    /// Both tests agree the series is I(0).
    #[serde(rename = "I(0) (stationary)")]
    Stationary,
    /// Both tests agree the series carries a unit root.
    #[serde(rename = "I(1)-like (non-stationary)")]
    NonStationary,
    /// Both tests rejected their nulls.
    #[serde(rename = "Trend-stationary / ambiguous")]
    TrendStationaryAmbiguous,
    /// Neither test rejected its null.
    #[serde(rename = "Near-unit-root / ambiguous")]
    NearUnitRootAmbiguous,
    /// Too few observations or a numerically constant series.
    #[serde(rename = "Insufficient data / constant")]
    InsufficientData,
}

impl StationarityLabel {
    /// True only for the confident I(0) label.
    #[must_use]
    pub const fn is_stationary(&self) -> bool {
        matches!(self, Self::Stationary)
    }

    /// True when the two tests disagreed.
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            Self::TrendStationaryAmbiguous | Self::NearUnitRootAmbiguous
        )
    }

    /// The string persisted in the result table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stationary => "I(0) (stationary)",
            Self::NonStationary => "I(1)-like (non-stationary)",
            Self::TrendStationaryAmbiguous => "Trend-stationary / ambiguous",
            Self::NearUnitRootAmbiguous => "Near-unit-root / ambiguous",
            Self::InsufficientData => "Insufficient data / constant",
        }
    }
}

impl fmt::Display for StationarityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the persisted stationarity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityRecord {
    pub column: String,
    pub nobs: usize,
    pub adf_p: f64,
    pub kpss_p: f64,
    pub label: StationarityLabel,
    pub transform: Transform,
}

/// Graded severity of detected seasonality.
///
/// Ordered so that a plain comparison ranks severity: NONE < WEAK < STRONG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeasonalityVerdict {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "WEAK")]
    Weak,
    #[serde(rename = "STRONG")]
    Strong,
}

impl SeasonalityVerdict {
    /// Fixed handling recommendation attached to each verdict.
    #[must_use]
    pub const fn handling_rule(&self) -> &'static str {
        match self {
            Self::Strong => "Add month dummies or treat turn window as a separate regime",
            Self::Weak => "Ignore in the model but treat turn window as a risk overlay",
            Self::None => "Ignore seasonality",
        }
    }
}

impl fmt::Display for SeasonalityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Weak => write!(f, "WEAK"),
            Self::Strong => write!(f, "STRONG"),
        }
    }
}

/// Coarse binary modeling decision from the three probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonalityDecision {
    /// At least one probe is significant: condition on it or model it.
    #[serde(rename = "model_explicitly")]
    ModelExplicitly,
    /// No material seasonality detected.
    #[serde(rename = "ignore")]
    Ignore,
}

impl fmt::Display for SeasonalityDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelExplicitly => write!(f, "model_explicitly"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

/// One row of the persisted seasonality table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityRecord {
    /// Name of the column filter that selected this variable.
    pub group: String,
    pub variable: String,
    /// Turn-window to rest-of-year volatility ratio.
    pub ye_ratio: f64,
    /// Year-end equal-variance test p-value.
    pub ye_p: f64,
    /// Cross-month equal-variance test p-value.
    pub month_var_p: f64,
    /// Month-dummy joint F-test p-value.
    pub month_dummy_p: f64,
    pub decision: SeasonalityDecision,
    pub verdict: SeasonalityVerdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_predicates() {
        assert!(StationarityLabel::Stationary.is_stationary());
        assert!(!StationarityLabel::TrendStationaryAmbiguous.is_stationary());
        assert!(StationarityLabel::TrendStationaryAmbiguous.is_ambiguous());
        assert!(StationarityLabel::NearUnitRootAmbiguous.is_ambiguous());
        assert!(!StationarityLabel::InsufficientData.is_ambiguous());
    }

    #[test]
    fn label_serializes_to_table_string() {
        let json = serde_json::to_string(&StationarityLabel::Stationary).unwrap();
        assert_eq!(json, "\"I(0) (stationary)\"");
        let back: StationarityLabel =
            serde_json::from_str("\"Insufficient data / constant\"").unwrap();
        assert_eq!(back, StationarityLabel::InsufficientData);
    }

    #[test]
    fn verdict_order_ranks_severity() {
        assert!(SeasonalityVerdict::Strong > SeasonalityVerdict::Weak);
        assert!(SeasonalityVerdict::Weak > SeasonalityVerdict::None);
    }

    #[test]
    fn verdict_handling_rules_are_fixed() {
        assert!(SeasonalityVerdict::Strong
            .handling_rule()
            .contains("month dummies"));
        assert!(SeasonalityVerdict::Weak
            .handling_rule()
            .contains("risk overlay"));
        assert_eq!(
            SeasonalityVerdict::None.handling_rule(),
            "Ignore seasonality"
        );
    }

    #[test]
    fn transform_display_matches_serde() {
        assert_eq!(Transform::Level.to_string(), "level");
        assert_eq!(
            serde_json::to_string(&Transform::Diff).unwrap(),
            "\"diff\""
        );
    }
}
