//! Error types for analytics operations

use crate::error::AppError;

/// Result type for analytics operations
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur in analytics operations.
///
/// The engine itself is total over well-formed input; the only failure
/// mode is constructing it with an unusable configuration.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InvalidConfiguration(msg) => AppError::Configuration(msg),
        }
    }
}
