//! Incident ingestion and validation
//!
//! The validation boundary in front of the analytics engine: bulk
//! incident tables are parsed and checked here, and a batch containing
//! any bad row is rejected whole with an error naming the offending
//! row and field.

mod csv;
mod error;

pub use self::csv::parse_incidents;
pub use error::{IngestError, IngestResult};
