pub mod analytics;
pub mod commissions;
pub mod consolidator;
pub mod fechamento;
pub mod lifecycle;
pub mod margin;
pub mod query_cache;

pub use analytics::AnalyticsService;
pub use commissions::CommissionResolver;
pub use consolidator::{ConsolidationSummary, SettlementConsolidator};
pub use fechamento::FechamentoService;
pub use lifecycle::{PaymentOutcome, SettlementLifecycle};
pub use margin::{MarginCache, MarginResolver, ResolvedMargin};
pub use query_cache::QueryCache;
