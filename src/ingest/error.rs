//! Error types for incident ingestion

use crate::error::AppError;

/// Result type for ingestion operations
pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Errors produced while validating an uploaded incident batch.
///
/// Row numbers are 1-based and include the header row, so the first
/// data row is row 2 — matching what an analyst sees in a spreadsheet.
/// Any error aborts the entire batch; there is no partial ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The file has no data rows
    #[error("CSV file is empty or contains no data rows")]
    Empty,

    /// A required column is missing from the header
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A required field is missing or empty on a row
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    /// A timestamp could not be parsed
    #[error("row {row}: invalid date_time '{value}'")]
    InvalidDateTime { row: usize, value: String },

    /// A timestamp is in the future
    #[error("row {row}: date_time '{value}' is in the future")]
    FutureDateTime { row: usize, value: String },

    /// A zip code is not exactly 5 digits
    #[error("row {row}: invalid zip_code '{value}', must be exactly 5 digits")]
    InvalidAreaCode { row: usize, value: String },

    /// naloxone_administered is not a recognizable boolean
    #[error("row {row}: invalid naloxone_administered '{value}', expected 'true' or 'false'")]
    InvalidFlag { row: usize, value: String },

    /// naloxone_doses is not a non-negative integer
    #[error("row {row}: invalid naloxone_doses '{value}', must be a non-negative integer")]
    InvalidDoses { row: usize, value: String },

    /// The CSV itself could not be read
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::Validation(err.to_string())
    }
}
