//! Incident processing pipeline
//!
//! Connects ingestion, storage, the analytics worker and the
//! forecasting collaborator into the ingest-analyze-persist flow.

mod processor;
mod worker;

pub use processor::{IncidentProcessor, IngestOutcome};
pub use worker::AnalysisWorker;
