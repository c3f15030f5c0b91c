//! Time-indexed numeric table and single-series views.
//!
//! A [`Frame`] is the input contract for every batch diagnostic: a date
//! index that is strictly increasing with no duplicates, and one named
//! column of optional values per series. All transforms produce new
//! owned data; the caller's copy is never mutated.

use anyhow::{bail, Result};
use chrono::NaiveDate;

/// One named series extracted from a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl TimeSeries {
    /// Creates a series, validating the date index.
    ///
    /// # Errors
    /// Returns an error if lengths differ or dates are not strictly
    /// increasing.
    pub fn new(
        name: impl Into<String>,
        dates: Vec<NaiveDate>,
        values: Vec<Option<f64>>,
    ) -> Result<Self> {
        if dates.len() != values.len() {
            bail!(
                "series length mismatch: {} dates vs {} values",
                dates.len(),
                values.len()
            );
        }
        validate_index(&dates)?;
        Ok(Self {
            name: name.into(),
            dates,
            values,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of present (non-missing) observations.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// First differences as a new series starting at the second date.
    ///
    /// A difference is present only when both neighbouring observations
    /// are present.
    #[must_use]
    pub fn diff(&self) -> Self {
        let dates = self.dates.iter().skip(1).copied().collect();
        let values = self
            .values
            .windows(2)
            .map(|w| match (w[0], w[1]) {
                (Some(prev), Some(next)) => Some(next - prev),
                _ => None,
            })
            .collect();
        Self {
            name: self.name.clone(),
            dates,
            values,
        }
    }
}

/// Time-indexed numeric table, one column per named series.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl Frame {
    /// Creates an empty frame over the given date index.
    ///
    /// # Errors
    /// Returns an error if the index is not strictly increasing.
    pub fn new(index: Vec<NaiveDate>) -> Result<Self> {
        validate_index(&index)?;
        Ok(Self {
            index,
            columns: Vec::new(),
        })
    }

    /// Appends a column.
    ///
    /// # Errors
    /// Returns an error on a length mismatch or duplicate column name.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.index.len() {
            bail!(
                "column '{}' has {} values but the index has {} dates",
                name,
                values.len(),
                self.index.len()
            );
        }
        if self.columns.iter().any(|(existing, _)| *existing == name) {
            bail!("duplicate column name '{name}'");
        }
        self.columns.push((name, values));
        Ok(())
    }

    #[must_use]
    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Extracts one column as an owned series.
    #[must_use]
    pub fn series(&self, name: &str) -> Option<TimeSeries> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(col, values)| TimeSeries {
                name: col.clone(),
                dates: self.index.clone(),
                values: values.clone(),
            })
    }

    /// All columns as owned series, in insertion order.
    pub fn iter_series(&self) -> impl Iterator<Item = TimeSeries> + '_ {
        self.columns.iter().map(|(name, values)| TimeSeries {
            name: name.clone(),
            dates: self.index.clone(),
            values: values.clone(),
        })
    }

    /// First differences of every column, indexed from the second date.
    #[must_use]
    pub fn diff(&self) -> Self {
        let index: Vec<NaiveDate> = self.index.iter().skip(1).copied().collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let diffed = values
                    .windows(2)
                    .map(|w| match (w[0], w[1]) {
                        (Some(prev), Some(next)) => Some(next - prev),
                        _ => None,
                    })
                    .collect();
                (name.clone(), diffed)
            })
            .collect();
        Self { index, columns }
    }
}

fn validate_index(dates: &[NaiveDate]) -> Result<()> {
    for pair in dates.windows(2) {
        if pair[1] <= pair[0] {
            bail!(
                "date index must be strictly increasing: {} followed by {}",
                pair[0],
                pair[1]
            );
        }
    }
    Ok(())
}
