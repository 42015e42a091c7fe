pub mod admin;
pub mod analytics;
pub mod fechamento;
pub mod settlements;

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

/// Service health
///
/// Aggregated dependency health for liveness probes.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy or degraded", body = crate::health::HealthResponse),
        (status = 503, description = "Service unhealthy")
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let health_response = state.health_checker.check_all().await;

    let status_code = match health_response.status.as_str() {
        "healthy" | "degraded" => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health_response))
}

pub async fn cache_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.query_cache.metrics()))
}
