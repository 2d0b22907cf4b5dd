use crate::error::{AppError, Result};
use crate::forecast::ForecastProvider;
use crate::models::{AnalysisResult, AreaAnalysis, Forecast, Recommendation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

/// Gemini generative endpoint provider.
///
/// Sends structured-JSON prompts to the `generateContent` REST API and
/// parses the model's JSON reply into typed forecast values.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
    /// Create a new provider against the given endpoint
    pub fn new(api_key: String, model: String, endpoint: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model,
            endpoint,
            timeout_secs,
        })
    }

    /// Send a prompt and parse the model's JSON reply into `T`
    async fn generate<T: serde::de::DeserializeOwned>(
        &self,
        prompt: String,
        temperature: f64,
    ) -> Result<T> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!(
                        "Generative endpoint timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else {
                    AppError::Upstream(format!("Generative endpoint request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| String::new());

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Generative endpoint returned status {}: {}",
                status,
                if body.is_empty() { "no body" } else { &body }
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Upstream(format!("Malformed endpoint response: {}", e)))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Upstream("Empty response from generative endpoint".to_string()))?;

        serde_json::from_str(text)
            .map_err(|e| AppError::Upstream(format!("Malformed model output: {}", e)))
    }
}

fn describe_elevated_areas(areas: &[AreaAnalysis]) -> String {
    let mut out = String::new();
    for area in areas {
        let _ = writeln!(
            out,
            "- Area {} is {} with a 7-day average of {:.1} incidents/day, \
             {:.1} standard deviations above its 28-day mean of {:.1}.",
            area.area_code,
            area.severity,
            area.current_7_day_avg,
            area.std_devs_from_mean,
            area.rolling_28_day_mean,
        );
    }
    out
}

#[async_trait::async_trait]
impl ForecastProvider for GeminiProvider {
    async fn forecast(&self, analysis: &AnalysisResult) -> Result<Forecast> {
        let elevated: Vec<AreaAnalysis> =
            analysis.elevated_areas().into_iter().cloned().collect();
        let spikes = describe_elevated_areas(&elevated);

        let prompt = format!(
            "As a public health analyst, forecast the opioid overdose risk for a county.\n\
             \n\
             Current situation:\n\
             - Total incidents in the last 7 days: {}\n\
             - Change from the previous week: {:.1}%\n\
             - Areas currently spiking:\n{}\n\
             Provide a 3-day and 7-day risk forecast for the entire county.\n\
             Respond with a single JSON object with string fields \
             \"three_day\", \"three_day_summary\", \"seven_day\" and \
             \"seven_day_summary\". Risk levels should read like \
             'High Risk' or 'Moderate Risk'; summaries should be 5-10 words.",
            analysis.total_last_7_days, analysis.percent_change_last_7_days, spikes
        );

        self.generate(prompt, 0.5).await
    }

    async fn recommend(&self, elevated: &[AreaAnalysis]) -> Result<Vec<Recommendation>> {
        let prompt = format!(
            "As a public health response coordinator, provide a ranked list of the \
             top 3-5 intervention recommendations for the following overdose spikes.\n\
             \n\
             Available resources: 4 mobile harm reduction teams, ample naloxone kits, \
             community partners (shelters, treatment centers), law enforcement liaisons.\n\
             \n\
             Current spikes:\n{}\n\
             Respond with a JSON array of objects with string fields \"action\" and \
             \"rationale\" and an integer field \"priority_score\" from 1 to 100. \
             Prioritize specific, impactful actions for the highest-risk areas.",
            describe_elevated_areas(elevated)
        );

        let mut recommendations: Vec<Recommendation> = self.generate(prompt, 0.7).await?;
        recommendations.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyCounts, Severity};

    fn elevated_area() -> AreaAnalysis {
        AreaAnalysis {
            area_code: "46619".to_string(),
            total_incidents: 40,
            current_7_day_avg: 4.0,
            rolling_28_day_mean: 1.5,
            rolling_28_day_std_dev: 0.8,
            std_devs_from_mean: 3.1,
            severity: Severity::Critical,
            daily_counts: DailyCounts::new(),
        }
    }

    fn analysis_with_spike() -> AnalysisResult {
        let mut analysis = AnalysisResult::empty();
        analysis.total_incidents = 40;
        analysis.total_last_7_days = 28;
        analysis.percent_change_last_7_days = 75.0;
        analysis.area_analyses = vec![elevated_area()];
        analysis
    }

    fn candidate_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
        .to_string()
    }

    fn provider_for(server: &mockito::ServerGuard) -> GeminiProvider {
        GeminiProvider::new(
            "test-key".to_string(),
            "test-model".to_string(),
            server.url(),
            5,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_forecast_parses_model_output() {
        let mut server = mockito::Server::new_async().await;
        let body = candidate_body(
            "{\"three_day\":\"High Risk\",\"three_day_summary\":\"Spike continuing\",\
             \"seven_day\":\"Moderate Risk\",\"seven_day_summary\":\"Expected to taper\"}",
        );
        let mock = server
            .mock("POST", "/v1beta/models/test-model:generateContent")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let forecast = provider.forecast(&analysis_with_spike()).await.unwrap();

        assert_eq!(forecast.three_day, "High Risk");
        assert_eq!(forecast.seven_day, "Moderate Risk");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_recommendations_sorted_by_priority() {
        let mut server = mockito::Server::new_async().await;
        let body = candidate_body(
            "[{\"action\":\"b\",\"rationale\":\"r\",\"priority_score\":40},\
              {\"action\":\"a\",\"rationale\":\"r\",\"priority_score\":90}]",
        );
        let _mock = server
            .mock("POST", "/v1beta/models/test-model:generateContent")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let recommendations = provider.recommend(&[elevated_area()]).await.unwrap();

        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].action, "a");
        assert_eq!(recommendations[0].priority_score, 90);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_upstream() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/test-model:generateContent")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let provider = provider_for(&server);
        let err = provider.forecast(&analysis_with_spike()).await.unwrap_err();
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/test-model:generateContent")
            .with_status(200)
            .with_body("{\"candidates\":[]}")
            .create_async()
            .await;

        let provider = provider_for(&server);
        let err = provider.forecast(&analysis_with_spike()).await.unwrap_err();
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
    }
}
