//! Read-only classification table consumed by the usage guard.
//!
//! The guard depends on the persisted stationarity table through the
//! [`ClassificationSource`] capability rather than a file path, so tests
//! and callers can supply an in-memory table.

use crate::csv_storage::CsvStorage;
use crate::models::{StationarityRecord, Transform};
use anyhow::Result;
use std::path::Path;

/// Read-only lookup into a stationarity classification table.
pub trait ClassificationSource {
    /// The record for `column` under `transform`, if one was persisted.
    fn classification(&self, column: &str, transform: Transform) -> Option<&StationarityRecord>;
}

/// In-memory snapshot of one persisted stationarity table.
#[derive(Debug, Clone, Default)]
pub struct ClassificationTable {
    records: Vec<StationarityRecord>,
}

impl ClassificationTable {
    #[must_use]
    pub fn new(records: Vec<StationarityRecord>) -> Self {
        Self { records }
    }

    /// Loads the table persisted by a previous batch run.
    ///
    /// # Errors
    /// Returns error if the file is missing or malformed
    pub fn from_csv(path: &Path) -> Result<Self> {
        Ok(Self::new(CsvStorage::read_stationarity(path)?))
    }

    #[must_use]
    pub fn records(&self) -> &[StationarityRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ClassificationSource for ClassificationTable {
    fn classification(&self, column: &str, transform: Transform) -> Option<&StationarityRecord> {
        self.records
            .iter()
            .find(|r| r.column == column && r.transform == transform)
    }
}
