//! Risk forecasting and intervention recommendations
//!
//! The analytics engine's output is handed to an opaque generative
//! text collaborator that produces county risk forecasts and a ranked
//! list of intervention recommendations. The collaborator sits behind
//! the [`ForecastProvider`] capability trait so it can be mocked in
//! tests, and every call path degrades to a low-risk placeholder when
//! the collaborator is disabled, unavailable or malformed — a computed
//! analysis is never blocked by a forecasting failure.

mod gemini;
mod service;

pub use gemini::GeminiProvider;
pub use service::ForecastService;

use crate::error::Result;
use crate::models::{AnalysisResult, AreaAnalysis, Forecast, Recommendation};
use async_trait::async_trait;

/// Capability interface of the generative forecasting collaborator.
///
/// The engine's [`AnalysisResult`] is the sole input contract.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Produce 3-day and 7-day county risk forecasts
    async fn forecast(&self, analysis: &AnalysisResult) -> Result<Forecast>;

    /// Produce prioritized intervention recommendations for the
    /// currently elevated areas
    async fn recommend(&self, elevated: &[AreaAnalysis]) -> Result<Vec<Recommendation>>;
}
