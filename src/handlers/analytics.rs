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
use crate::services::analytics::{AnalyticsFilter, AnalyticsOverview};
use crate::services::query_cache::{cache_key_analytics, CacheConfig};
use crate::stores::Dimension;
use crate::AppState;

#[derive(Debug, Deserialize, Hash)]
pub struct AnalyticsQuery {
    pub user_id: Uuid,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub customer_id: Option<Uuid>,
    pub brand: Option<String>,
    pub product_type: Option<String>,
    pub dimension: Option<Dimension>,
    pub compare: Option<bool>,
}

impl AnalyticsQuery {
    fn into_filter(self) -> AnalyticsFilter {
        AnalyticsFilter {
            date_from: self.date_from,
            date_to: self.date_to,
            customer_id: self.customer_id,
            brand: self.brand,
            product_type: self.product_type,
            dimension: self.dimension.unwrap_or(Dimension::Brand),
            compare_previous: self.compare.unwrap_or(false),
        }
    }

    fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

pub async fn overview(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = query.user_id;
    let cache_key = cache_key_analytics(user_id, query.digest());
    let config = CacheConfig::default();

    if let Ok(Some(cached)) = state.query_cache.get::<serde_json::Value>(&cache_key).await {
        return Ok(Json(cached));
    }

    let filter = query.into_filter();
    let overview = match state.analytics().overview(user_id, &filter).await {
        Ok(overview) => overview,
        Err(e @ AppError::BadRequest(_)) => return Err(e),
        Err(e) => {
            tracing::error!(user_id = %user_id, "Analytics overview failed: {}", e);
            AnalyticsOverview::zeroed(&filter)
        }
    };

    let body = serde_json::to_value(&overview)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let _ = state
        .query_cache
        .set(&cache_key, &body, Duration::from_secs(config.analytics_ttl))
        .await;

    Ok(Json(body))
}
