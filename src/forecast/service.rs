use crate::config::ForecastConfig;
use crate::error::{AppError, Result};
use crate::forecast::{ForecastProvider, GeminiProvider};
use crate::models::{AnalysisResult, AreaAnalysis, Forecast, StoredRecommendation};
use std::sync::Arc;

/// Forecasting front-end with graceful degradation.
///
/// Wraps an optional [`ForecastProvider`] and guarantees a usable
/// forecast for every analysis run: when no areas are elevated the
/// collaborator is not consulted at all, and when it is disabled or
/// fails, a low-risk placeholder is substituted instead of propagating
/// the failure into the snapshot.
pub struct ForecastService {
    provider: Option<Arc<dyn ForecastProvider>>,
}

impl ForecastService {
    /// Create a service around an explicit provider
    pub fn new(provider: Option<Arc<dyn ForecastProvider>>) -> Self {
        Self { provider }
    }

    /// Build from configuration.
    ///
    /// Fails only on contradictory configuration (enabled with no API
    /// key); a disabled collaborator is a valid, fully degraded setup.
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::new(None));
        }

        let api_key = config.api_key.clone().ok_or_else(|| {
            AppError::Configuration(
                "Forecasting is enabled but no API key is configured".to_string(),
            )
        })?;

        let provider = GeminiProvider::new(
            api_key,
            config.model.clone(),
            config.endpoint.clone(),
            config.timeout_secs,
        )?;

        Ok(Self::new(Some(Arc::new(provider))))
    }

    /// Generate the forecast and recommendations for an analysis run.
    ///
    /// Never fails; degraded results are logged and substituted.
    pub async fn generate(
        &self,
        analysis: &AnalysisResult,
    ) -> (Forecast, Vec<StoredRecommendation>) {
        let elevated: Vec<AreaAnalysis> =
            analysis.elevated_areas().into_iter().cloned().collect();

        if elevated.is_empty() {
            tracing::debug!("No elevated areas; using low-risk forecast");
            return (Forecast::low_risk(), Vec::new());
        }

        let Some(provider) = &self.provider else {
            tracing::debug!(
                elevated = elevated.len(),
                "Forecasting collaborator disabled; using low-risk placeholder"
            );
            return (Forecast::low_risk(), Vec::new());
        };

        let (forecast, recommendations) =
            tokio::join!(provider.forecast(analysis), provider.recommend(&elevated));

        let forecast = forecast.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Forecast call failed; substituting low-risk placeholder");
            Forecast::low_risk()
        });

        let recommendations = recommendations.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Recommendation call failed; substituting empty list");
            Vec::new()
        });

        let recommendations = recommendations
            .into_iter()
            .map(StoredRecommendation::from)
            .collect();

        (forecast, recommendations)
    }
}
