//! Error types for the candle pipeline.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Result type used throughout `data_engine`.
pub type DataEngineResult<T> = Result<T, DataEngineError>;

/// Everything that can stop a pipeline run.
///
/// Unparseable timestamps are not errors: those rows are dropped during
/// normalization and only show up in `IndexedSheet::dropped`.
#[derive(Debug, Error)]
pub enum DataEngineError {
    /// The workbook is missing, unreadable or not a spreadsheet.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// The workbook has no sheet with the requested name.
    #[error("Sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    /// A required header is absent from the sheet.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A timeframe label that cannot be bucketed on calendar boundaries.
    #[error("Invalid timeframe '{label}': {reason}")]
    InvalidTimeframe { label: String, reason: String },

    /// A bucket label fell outside the representable timestamp range.
    #[error("Bucket for {0} is outside the representable range")]
    BucketOutOfRange(NaiveDateTime),

    /// Creating the output directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a CSV file failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
