use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{AnalysisSnapshot, Incident};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Upload a CSV incident batch for a user.
///
/// The body is the raw CSV document. Validation failures come back as
/// 400s naming the offending row and field; a batch with any bad row
/// is rejected whole.
pub async fn upload_incidents(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: String,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("Request body is empty".to_string()));
    }

    let outcome = state.processor.ingest_csv(&user_id, body.as_bytes()).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            batch_id: outcome.batch_id,
            ingested: outcome.ingested,
            snapshot: outcome.snapshot,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub batch_id: Uuid,
    pub ingested: usize,
    pub snapshot: AnalysisSnapshot,
}

/// Get the latest persisted analysis snapshot for a user
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AnalysisSnapshot>> {
    let snapshot = state
        .processor
        .latest(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No analysis snapshot for user {}", user_id)))?;

    Ok(Json(snapshot))
}

/// Recompute the analysis from a user's stored incidents
pub async fn refresh_analysis(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AnalysisSnapshot>> {
    let snapshot = state.processor.refresh(&user_id).await?;
    Ok(Json(snapshot))
}

/// List a user's raw incident records
pub async fn list_incidents(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ListIncidentsQuery>,
) -> Result<Json<ListIncidentsResponse>> {
    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(20).min(100); // Max 100 per page

    let incidents = state.processor.store().load_incidents(&user_id).await?;
    let total = incidents.len() as u64;

    let start = (page as usize) * (page_size as usize);
    let incidents: Vec<Incident> = incidents
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    Ok(Json(ListIncidentsResponse {
        incidents,
        total,
        page,
        page_size,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListIncidentsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListIncidentsResponse {
    pub incidents: Vec<Incident>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Flip the completed flag on a stored recommendation
pub async fn toggle_recommendation(
    State(state): State<AppState>,
    Path((user_id, index)): Path<(String, usize)>,
) -> Result<Json<AnalysisSnapshot>> {
    let snapshot = state.processor.toggle_recommendation(&user_id, index).await?;
    Ok(Json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsEngine;
    use crate::api::build_router;
    use crate::forecast::ForecastService;
    use crate::processing::{AnalysisWorker, IncidentProcessor};
    use crate::state::InMemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_router() -> axum::Router {
        let processor = IncidentProcessor::new(
            Arc::new(InMemoryStore::new()),
            AnalysisWorker::spawn(AnalyticsEngine::with_defaults()),
            Arc::new(ForecastService::new(None)),
        );
        build_router(AppState::new(Arc::new(processor)))
    }

    const CSV: &str = "\
date_time,zip_code,naloxone_administered,naloxone_doses,outcome
2024-03-15T10:30:00,46619,true,2,Non-Fatal
2024-03-16T11:00:00,46601,false,0,Fatal
";

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = test_router();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_upload_then_get_analysis() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(
                Request::post("/v1/users/user-1/incidents/upload")
                    .header("content-type", "text/csv")
                    .body(Body::from(CSV))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = body_json(response).await;
        assert_eq!(json["ingested"], 2);
        assert_eq!(json["snapshot"]["analysis"]["total_incidents"], 2);

        let response = router
            .oneshot(
                Request::get("/v1/users/user-1/analysis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["analysis"]["area_analyses"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_analysis_without_snapshot_is_404() {
        let router = test_router();
        let response = router
            .oneshot(
                Request::get("/v1/users/nobody/analysis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_invalid_batch_is_400() {
        let router = test_router();

        let bad = "\
date_time,zip_code,naloxone_administered,naloxone_doses,outcome
2024-03-15T10:30:00,bad,true,2,Non-Fatal
";
        let response = router
            .oneshot(
                Request::post("/v1/users/user-1/incidents/upload")
                    .header("content-type", "text/csv")
                    .body(Body::from(bad))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_list_incidents_paginates() {
        let router = test_router();

        router
            .clone()
            .oneshot(
                Request::post("/v1/users/user-1/incidents/upload")
                    .body(Body::from(CSV))
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = router
            .oneshot(
                Request::get("/v1/users/user-1/incidents?page=0&page_size=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["incidents"].as_array().unwrap().len(), 1);
    }
}
