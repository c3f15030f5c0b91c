//! Result-table models and persistence for regime diagnostics.

pub mod classification;
pub mod csv_storage;
pub mod models;

pub use classification::{ClassificationSource, ClassificationTable};
pub use csv_storage::CsvStorage;
pub use models::{
    SeasonalityDecision, SeasonalityRecord, SeasonalityVerdict, StationarityLabel,
    StationarityRecord, Transform,
};
