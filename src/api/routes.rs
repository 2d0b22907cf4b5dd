use crate::api::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        // Incident ingestion and inspection
        .route(
            "/v1/users/:user_id/incidents/upload",
            post(handlers::upload_incidents),
        )
        .route("/v1/users/:user_id/incidents", get(handlers::list_incidents))
        // Analysis snapshots
        .route("/v1/users/:user_id/analysis", get(handlers::get_analysis))
        .route(
            "/v1/users/:user_id/analysis/refresh",
            post(handlers::refresh_analysis),
        )
        // Recommendation tracking
        .route(
            "/v1/users/:user_id/recommendations/:index/toggle",
            post(handlers::toggle_recommendation),
        )
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
