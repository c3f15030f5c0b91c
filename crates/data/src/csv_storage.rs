//! CSV persistence of the diagnostics result tables.
//!
//! The stationarity table written here is the policy source of truth the
//! usage guard reads back at check time; both tables are the auditable
//! artifacts of a batch run.

use crate::models::{SeasonalityRecord, StationarityRecord};
use anyhow::{Context, Result};
use csv::{Reader, Writer};
use std::fs::File;
use std::path::Path;

pub struct CsvStorage;

impl CsvStorage {
    /// Writes the stationarity classification table.
    ///
    /// Columns: column,nobs,adf_p,kpss_p,label,transform. Rows are written
    /// in the order given; the suite already sorts them for stable diffs.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or writing fails
    pub fn write_stationarity(path: &Path, records: &[StationarityRecord]) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        tracing::info!(rows = records.len(), path = %path.display(), "wrote stationarity table");
        Ok(())
    }

    /// Reads a stationarity classification table back from disk.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or a row fails to parse
    pub fn read_stationarity(path: &Path) -> Result<Vec<StationarityRecord>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        let mut reader = Reader::from_reader(file);
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: StationarityRecord =
                row.with_context(|| format!("Malformed row in {}", path.display()))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Writes the seasonality summary table.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or writing fails
    pub fn write_seasonality(path: &Path, records: &[SeasonalityRecord]) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        tracing::info!(rows = records.len(), path = %path.display(), "wrote seasonality table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        SeasonalityDecision, SeasonalityVerdict, StationarityLabel, Transform,
    };

    fn sample_records() -> Vec<StationarityRecord> {
        vec![
            StationarityRecord {
                column: "us10y".to_string(),
                nobs: 1250,
                adf_p: 0.4012,
                kpss_p: 0.01,
                label: StationarityLabel::NonStationary,
                transform: Transform::Level,
            },
            StationarityRecord {
                column: "us10y".to_string(),
                nobs: 1249,
                adf_p: 0.0001,
                kpss_p: 0.1,
                label: StationarityLabel::Stationary,
                transform: Transform::Diff,
            },
            StationarityRecord {
                column: "broken".to_string(),
                nobs: 12,
                adf_p: f64::NAN,
                kpss_p: f64::NAN,
                label: StationarityLabel::InsufficientData,
                transform: Transform::Level,
            },
        ]
    }

    #[test]
    fn stationarity_table_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stationarity_tests.csv");

        let records = sample_records();
        CsvStorage::write_stationarity(&path, &records).unwrap();
        let loaded = CsvStorage::read_stationarity(&path).unwrap();

        assert_eq!(loaded.len(), records.len());
        assert_eq!(loaded[0], records[0]);
        assert_eq!(loaded[1].label, StationarityLabel::Stationary);
        // NaN p-values survive the round trip as NaN.
        assert!(loaded[2].adf_p.is_nan());
        assert_eq!(loaded[2].label, StationarityLabel::InsufficientData);
    }

    #[test]
    fn stationarity_header_matches_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stationarity_tests.csv");
        CsvStorage::write_stationarity(&path, &sample_records()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "column,nobs,adf_p,kpss_p,label,transform");
    }

    #[test]
    fn seasonality_table_writes_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seasonality_tests.csv");

        let record = SeasonalityRecord {
            group: "funding".to_string(),
            variable: "sofr_repo_spread".to_string(),
            ye_ratio: 1.42,
            ye_p: 0.003,
            month_var_p: 0.021,
            month_dummy_p: 0.004,
            decision: SeasonalityDecision::ModelExplicitly,
            verdict: SeasonalityVerdict::Strong,
        };
        CsvStorage::write_seasonality(&path, &[record]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "group,variable,ye_ratio,ye_p,month_var_p,month_dummy_p,decision,verdict"
        );
        assert!(lines.next().unwrap().contains("model_explicitly"));
    }

    #[test]
    fn read_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(CsvStorage::read_stationarity(&path).is_err());
    }
}
