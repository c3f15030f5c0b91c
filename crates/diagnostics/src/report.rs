//! Human-readable seasonality note.
//!
//! Renders the per-series verdict table as markdown for the audit
//! notebook; the CSV tables remain the machine-readable artifacts.

use regime_lab_data::models::SeasonalityRecord;

/// Renders one markdown section per analyzed series, in table order.
#[must_use]
pub fn seasonality_note(records: &[SeasonalityRecord]) -> String {
    let mut output = String::new();
    output.push_str("# Seasonality Detection Note\n\n");
    output.push_str(
        "Year-end seasonality was tested with month-dummy regressions \
         and turn-window variance comparisons.\n\n",
    );

    for record in records {
        output.push_str(&format!("## {}\n", record.variable));
        output.push_str(&format!("- YE variance ratio: {:.3}\n", record.ye_ratio));
        output.push_str(&format!("- F-test p-value: {:.4}\n", record.month_dummy_p));
        output.push_str(&format!("- Verdict: {}\n", record.verdict));
        output.push_str(&format!(
            "- Decision: {}\n\n",
            record.verdict.handling_rule()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use regime_lab_data::models::{SeasonalityDecision, SeasonalityVerdict};

    fn record(variable: &str, verdict: SeasonalityVerdict) -> SeasonalityRecord {
        SeasonalityRecord {
            group: "funding".to_string(),
            variable: variable.to_string(),
            ye_ratio: 1.437,
            ye_p: 0.004,
            month_var_p: 0.02,
            month_dummy_p: 0.0031,
            decision: SeasonalityDecision::ModelExplicitly,
            verdict,
        }
    }

    #[test]
    fn note_renders_a_section_per_series() {
        let note = seasonality_note(&[
            record("sofr_spread", SeasonalityVerdict::Strong),
            record("repo_rate", SeasonalityVerdict::Weak),
        ]);

        assert!(note.starts_with("# Seasonality Detection Note"));
        assert!(note.contains("## sofr_spread"));
        assert!(note.contains("## repo_rate"));
        assert!(note.contains("- YE variance ratio: 1.437"));
        assert!(note.contains("- F-test p-value: 0.0031"));
        assert!(note.contains("- Verdict: STRONG"));
        assert!(note.contains("risk overlay"));
    }

    #[test]
    fn empty_table_still_produces_the_header() {
        let note = seasonality_note(&[]);
        assert!(note.contains("# Seasonality Detection Note"));
    }
}
