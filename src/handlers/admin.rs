use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ConsolidateRequest {
    /// Target month; defaults to the month that just ended.
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Trigger a consolidation run. Cron hits this monthly; operators can also
/// re-run a past period by passing an explicit target.
pub async fn consolidate(
    State(state): State<AppState>,
    Json(request): Json<ConsolidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let target = match (request.month, request.year) {
        (Some(month), Some(year)) => Some((month, year)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "month and year must be provided together".to_string(),
            ))
        }
    };

    let summary = state.consolidator().consolidate(target).await?;

    // Dashboards must pick up the fresh settlement data.
    if let Err(e) = state.query_cache.invalidate_dashboards().await {
        tracing::warn!("Dashboard cache invalidation failed: {}", e);
    }

    Ok(Json(summary))
}
