use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::fechamento::{ClosingReport, ReportFilter};
use crate::services::query_cache::{cache_key_closing_report, CacheConfig};
use crate::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Deserialize, Hash)]
pub struct FechamentoQuery {
    pub user_id: Uuid,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub customer_id: Option<Uuid>,
    pub mcc: Option<String>,
    pub product_type: Option<String>,
    pub brand: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl FechamentoQuery {
    fn into_filter(self) -> ReportFilter {
        ReportFilter {
            date_from: self.date_from,
            date_to: self.date_to,
            customer_id: self.customer_id,
            mcc: self.mcc,
            product_type: self.product_type,
            brand: self.brand,
            page: self.page.unwrap_or(1).max(1),
            page_size: self
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

pub async fn closing_report(
    State(state): State<AppState>,
    Query(query): Query<FechamentoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = query.user_id;
    let cache_key = cache_key_closing_report(user_id, query.digest());
    let config = CacheConfig::default();

    if let Ok(Some(cached)) = state.query_cache.get::<serde_json::Value>(&cache_key).await {
        return Ok(Json(cached));
    }

    let filter = query.into_filter();
    let report = match state.fechamento().report(user_id, &filter).await {
        Ok(report) => report,
        Err(e @ AppError::BadRequest(_)) => return Err(e),
        Err(e) => {
            // Read paths fail soft: a broken dashboard renders as empty,
            // not as an error page.
            tracing::error!(user_id = %user_id, "Closing report failed: {}", e);
            ClosingReport::zeroed(&filter)
        }
    };

    let body = serde_json::to_value(&report)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let _ = state
        .query_cache
        .set(&cache_key, &body, Duration::from_secs(config.closing_report_ttl))
        .await;

    Ok(Json(body))
}
