use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// TTL response cache for the read-side dashboards.
///
/// Explicitly constructed at startup and owned by the app state, never a
/// process-wide static. Distinct from the per-call margin cache, which is
/// in-process and owned by a single invocation.
#[derive(Clone)]
pub struct QueryCache {
    client: Client,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub analytics_ttl: u64,
    pub closing_report_ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            analytics_ttl: 300,      // 5 minutes
            closing_report_ttl: 120, // 2 minutes
        }
    }
}

impl QueryCache {
    pub fn new(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            client,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        })
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, redis::RedisError> {
        let mut conn: MultiplexedConnection = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(v) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                serde_json::from_str(&v).map(Some).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::TypeError,
                        "deserialization failed",
                        e.to_string(),
                    ))
                })
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), redis::RedisError> {
        let mut conn: MultiplexedConnection = self.get_connection().await?;
        let serialized = serde_json::to_string(value).map_err(|e| {
            redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "serialization failed",
                e.to_string(),
            ))
        })?;

        conn.set_ex(key, serialized, ttl.as_secs()).await
    }

    pub async fn invalidate(&self, pattern: &str) -> Result<(), redis::RedisError> {
        let mut conn: MultiplexedConnection = self.get_connection().await?;
        let keys: Vec<String> = conn.keys(pattern).await?;

        if !keys.is_empty() {
            conn.del::<_, ()>(keys).await?;
        }
        Ok(())
    }

    /// Drop every cached dashboard. Called after a consolidation run so
    /// dashboards pick up fresh settlement data on the next request.
    pub async fn invalidate_dashboards(&self) -> Result<(), redis::RedisError> {
        self.invalidate("dash:*").await
    }

    pub fn metrics(&self) -> CacheMetrics {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheMetrics {
            hits,
            misses,
            total,
            hit_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub total: u64,
    pub hit_rate: f64,
}

pub fn cache_key_analytics(user_id: Uuid, digest: u64) -> String {
    format!("dash:analytics:{}:{:x}", user_id, digest)
}

pub fn cache_key_closing_report(user_id: Uuid, digest: u64) -> String {
    format!("dash:fechamento:{}:{:x}", user_id, digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_metrics_start_at_zero() {
        let cache = QueryCache::new("redis://localhost:6379").unwrap();
        let metrics = cache.metrics();
        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.misses, 0);
        assert_eq!(metrics.hit_rate, 0.0);
    }

    #[test]
    fn test_cache_key_generation() {
        let user = Uuid::nil();
        assert_eq!(
            cache_key_analytics(user, 0xfeed),
            format!("dash:analytics:{}:feed", user)
        );
        assert_eq!(
            cache_key_closing_report(user, 0xbeef),
            format!("dash:fechamento:{}:beef", user)
        );
    }
}
