//! Incident analytics
//!
//! The algorithmic core of the service: turning a raw incident
//! collection into per-area daily counts, rolling baseline statistics,
//! deviation scores and severity classifications.
//!
//! # Design
//!
//! - **Pure**: the engine performs no I/O and never mutates its input;
//!   re-running it on the same input with the same reference instant
//!   yields identical output.
//! - **Total**: well-formed input has no error paths. All fallibility
//!   lives in the ingestion layer, which validates rows before they
//!   ever reach the engine.
//! - **Deterministic ordering**: daily counts are ordered maps and the
//!   per-area list is sorted by area code.
//!
//! # Example
//!
//! ```no_run
//! use overdose_sentinel::analytics::AnalyticsEngine;
//!
//! let engine = AnalyticsEngine::with_defaults();
//! let result = engine.analyze(&[]);
//! assert_eq!(result.total_incidents, 0);
//! ```

mod engine;
mod error;
mod statistics;

pub use engine::{classify_severity, AnalyticsEngine, EngineConfig};
pub use error::{AnalyticsError, AnalyticsResult};
pub use statistics::{daily_counts, period_average, rolling_stats};
