pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod schemas;
pub mod services;
pub mod stores;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::health::{HealthChecker, PostgresChecker, RedisChecker};
use crate::services::{
    AnalyticsService, CommissionResolver, FechamentoService, MarginResolver, QueryCache,
    SettlementConsolidator, SettlementLifecycle,
};
use crate::stores::{DirectoryStore, InvoiceStore, LedgerStore, MarginStore, SettlementStore};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub directory: Arc<dyn DirectoryStore>,
    pub margins: Arc<dyn MarginStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub settlements: Arc<dyn SettlementStore>,
    pub invoices: Arc<dyn InvoiceStore>,
    pub query_cache: QueryCache,
    pub health_checker: Arc<HealthChecker>,
}

impl AppState {
    /// Wire the Postgres-backed state used by both the server and the CLI.
    pub fn from_pool(pool: sqlx::PgPool, redis_url: &str) -> anyhow::Result<Self> {
        let query_cache = QueryCache::new(redis_url)?;
        let health_checker = Arc::new(
            HealthChecker::new()
                .add_checker(Box::new(PostgresChecker::new(pool.clone())))
                .add_checker(Box::new(RedisChecker::new(redis_url.to_string()))),
        );

        Ok(Self {
            directory: Arc::new(db::pg::PgDirectoryStore::new(pool.clone())),
            margins: Arc::new(db::pg::PgMarginStore::new(pool.clone())),
            ledger: Arc::new(db::pg::PgLedgerStore::new(pool.clone())),
            settlements: Arc::new(db::pg::PgSettlementStore::new(pool.clone())),
            invoices: Arc::new(db::pg::PgInvoiceStore::new(pool.clone())),
            query_cache,
            health_checker,
            db: pool,
        })
    }

    pub fn commissions(&self) -> CommissionResolver {
        CommissionResolver::new(self.directory.clone(), self.margins.clone())
    }

    pub fn fechamento(&self) -> FechamentoService {
        FechamentoService::new(
            self.directory.clone(),
            self.ledger.clone(),
            MarginResolver::new(self.margins.clone()),
            self.commissions(),
        )
    }

    pub fn analytics(&self) -> AnalyticsService {
        AnalyticsService::new(self.directory.clone(), self.ledger.clone(), self.commissions())
    }

    pub fn consolidator(&self) -> SettlementConsolidator {
        SettlementConsolidator::new(
            self.directory.clone(),
            self.margins.clone(),
            self.ledger.clone(),
            self.settlements.clone(),
        )
    }

    pub fn lifecycle(&self) -> SettlementLifecycle {
        SettlementLifecycle::new(self.settlements.clone(), self.invoices.clone())
    }
}

pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/fechamento", get(handlers::fechamento::closing_report))
        .route("/analytics", get(handlers::analytics::overview))
        .route("/settlements", get(handlers::settlements::list_settlements))
        .route(
            "/settlements/admin",
            get(handlers::settlements::list_settlements_admin),
        )
        .route("/settlements/:id", get(handlers::settlements::get_settlement))
        .route(
            "/settlements/:id/invoice",
            post(handlers::settlements::upload_invoice),
        )
        .route("/settlements/:id/pay", post(handlers::settlements::mark_paid))
        .route(
            "/invoices/:id/validation",
            post(handlers::settlements::record_validation),
        )
        .route(
            "/users/:id/commissions",
            get(handlers::settlements::user_commissions),
        )
        .route("/admin/consolidate", post(handlers::admin::consolidate))
        .route("/admin/cache/metrics", get(handlers::cache_metrics))
        .layer(from_fn(middleware::request_logger_middleware))
        .with_state(app_state)
}
