//! CSV incident ingestion
//!
//! Parses and validates uploaded incident tables before anything
//! reaches the analytics engine. The engine assumes every timestamp is
//! a valid, non-future instant and every area code is exactly 5 digits,
//! so this layer rejects whole batches loudly rather than letting a
//! bad row through.

use crate::ingest::error::{IngestError, IngestResult};
use crate::models::{Incident, Outcome, AREA_CODE_RE};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Columns every upload must carry
const REQUIRED_COLUMNS: [&str; 5] = [
    "date_time",
    "zip_code",
    "naloxone_administered",
    "naloxone_doses",
    "outcome",
];

/// Parse a CSV document into validated incidents.
///
/// `now` is the upper bound for timestamps; rows dated after it are
/// rejected. Returns every incident in file order, or the first
/// validation error encountered — a batch with any bad row is never
/// partially ingested.
pub fn parse_incidents(data: &[u8], now: DateTime<Utc>) -> IngestResult<Vec<Incident>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut column_indices = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in column_indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(IngestError::MissingColumn(column))?;
    }
    let [date_idx, zip_idx, flag_idx, doses_idx, outcome_idx] = column_indices;

    let mut incidents = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Header is row 1, first data row is row 2
        let row = index + 2;

        let date_time = require_field(&record, date_idx, row, "date_time")?;
        let zip_code = require_field(&record, zip_idx, row, "zip_code")?;
        let flag = require_field(&record, flag_idx, row, "naloxone_administered")?;
        let doses = require_field(&record, doses_idx, row, "naloxone_doses")?;
        let outcome = require_field(&record, outcome_idx, row, "outcome")?;

        let date_time = parse_date_time(date_time).ok_or_else(|| IngestError::InvalidDateTime {
            row,
            value: date_time.to_string(),
        })?;
        if date_time > now {
            return Err(IngestError::FutureDateTime {
                row,
                value: date_time.to_rfc3339(),
            });
        }

        if !AREA_CODE_RE.is_match(zip_code) {
            return Err(IngestError::InvalidAreaCode {
                row,
                value: zip_code.to_string(),
            });
        }

        let naloxone_administered = if flag.eq_ignore_ascii_case("true") {
            true
        } else if flag.eq_ignore_ascii_case("false") {
            false
        } else {
            return Err(IngestError::InvalidFlag {
                row,
                value: flag.to_string(),
            });
        };

        let naloxone_doses: u32 = doses.parse().map_err(|_| IngestError::InvalidDoses {
            row,
            value: doses.to_string(),
        })?;

        incidents.push(Incident::new(
            date_time,
            zip_code.to_string(),
            naloxone_administered,
            naloxone_doses,
            Outcome::from(outcome.to_string()),
        ));
    }

    if incidents.is_empty() {
        return Err(IngestError::Empty);
    }

    Ok(incidents)
}

fn require_field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    row: usize,
    field: &'static str,
) -> IngestResult<&'r str> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(IngestError::MissingField { row, field }),
    }
}

/// Parse a timestamp in any of the accepted formats. Naive values are
/// interpreted as UTC, the same normalization the analytics engine
/// applies when bucketing.
fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    // Bare dates bucket at midnight
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    None
}
