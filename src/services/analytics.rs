//! Transaction analytics.
//!
//! KPI, dimensional-breakdown, and time-series reads over the ledger,
//! scoped by the same customer-access rules as the closing report but with
//! no margin resolution. Optionally compares against the previous period of
//! equal length, anchored immediately before the requested range.

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::commissions::CommissionResolver;
use crate::stores::{Dimension, DimensionSlice, DirectoryStore, LedgerFilter, LedgerStore};

#[derive(Debug, Clone)]
pub struct AnalyticsFilter {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub customer_id: Option<Uuid>,
    pub brand: Option<String>,
    pub product_type: Option<String>,
    pub dimension: Dimension,
    pub compare_previous: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Kpis {
    pub total_count: i64,
    pub authorized_count: i64,
    pub denied_count: i64,
    pub pending_count: i64,
    pub approval_rate_percent: f64,
    pub authorized_amount: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub day: NaiveDate,
    pub tx_count: i64,
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    pub previous: Kpis,
    pub volume_change_percent: Option<f64>,
    pub count_change_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsOverview {
    pub kpis: Kpis,
    pub breakdown: Vec<DimensionSlice>,
    pub series: Vec<SeriesPoint>,
    pub comparison: Option<PeriodComparison>,
}

impl AnalyticsOverview {
    /// All-zero shape with a gap-filled zero series, used both for empty
    /// access scopes and for failed read paths.
    pub fn zeroed(filter: &AnalyticsFilter) -> Self {
        Self {
            kpis: Kpis::default(),
            breakdown: Vec::new(),
            series: gap_filled_series(filter.date_from, filter.date_to, Vec::new()),
            comparison: None,
        }
    }
}

pub struct AnalyticsService {
    directory: Arc<dyn DirectoryStore>,
    ledger: Arc<dyn LedgerStore>,
    commissions: CommissionResolver,
}

impl AnalyticsService {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        ledger: Arc<dyn LedgerStore>,
        commissions: CommissionResolver,
    ) -> Self {
        Self {
            directory,
            ledger,
            commissions,
        }
    }

    pub async fn overview(
        &self,
        user_id: Uuid,
        filter: &AnalyticsFilter,
    ) -> Result<AnalyticsOverview, AppError> {
        if filter.date_from > filter.date_to {
            return Err(AppError::BadRequest(
                "date_from must not be after date_to".to_string(),
            ));
        }

        let scope = match self.resolve_scope(user_id).await? {
            Scope::Unrestricted => None,
            Scope::Customers(ids) if ids.is_empty() => {
                return Ok(AnalyticsOverview::zeroed(filter));
            }
            Scope::Customers(ids) => Some(ids),
        };

        let scope = match (filter.customer_id, scope) {
            (Some(wanted), Some(ids)) => {
                if !ids.contains(&wanted) {
                    return Ok(AnalyticsOverview::zeroed(filter));
                }
                Some(vec![wanted])
            }
            (Some(wanted), None) => Some(vec![wanted]),
            (None, scope) => scope,
        };

        let ledger_filter = base_filter(&scope, filter, filter.date_from, filter.date_to);

        let totals = self.ledger.kpi_totals(&ledger_filter).await?;
        let kpis = to_kpis(&totals);

        let breakdown = self.ledger.breakdown(&ledger_filter, filter.dimension).await?;

        let daily = self.ledger.daily_totals(&ledger_filter).await?;
        let series = gap_filled_series(filter.date_from, filter.date_to, daily);

        let comparison = if filter.compare_previous {
            let (prev_from, prev_to) = previous_period(filter.date_from, filter.date_to);
            let prev_filter = base_filter(&scope, filter, prev_from, prev_to);
            let prev_totals = self.ledger.kpi_totals(&prev_filter).await?;
            let previous = to_kpis(&prev_totals);
            Some(PeriodComparison {
                volume_change_percent: change_percent(
                    &totals.authorized_amount,
                    &prev_totals.authorized_amount,
                ),
                count_change_percent: change_percent(
                    &BigDecimal::from(totals.total_count),
                    &BigDecimal::from(prev_totals.total_count),
                ),
                previous,
            })
        } else {
            None
        };

        Ok(AnalyticsOverview {
            kpis,
            breakdown,
            series,
            comparison,
        })
    }

    async fn resolve_scope(&self, user_id: Uuid) -> Result<Scope, AppError> {
        let role = match self.directory.user_role(user_id).await? {
            Some(role) => role,
            None => return Ok(Scope::Customers(Vec::new())),
        };
        if role.is_super_admin() {
            return Ok(Scope::Unrestricted);
        }
        let inherited = self.commissions.inherited_commissions(user_id).await?;
        Ok(Scope::Customers(
            inherited.into_iter().map(|c| c.customer_id).collect(),
        ))
    }
}

enum Scope {
    Unrestricted,
    Customers(Vec<Uuid>),
}

fn base_filter(
    scope: &Option<Vec<Uuid>>,
    filter: &AnalyticsFilter,
    from: NaiveDate,
    to: NaiveDate,
) -> LedgerFilter {
    LedgerFilter {
        customer_ids: scope.clone(),
        date_from: Some(day_start_utc(from)),
        date_to: to.succ_opt().map(day_start_utc),
        status: None,
        brand: filter.brand.clone(),
        product_label: filter.product_type.clone(),
        mcc: None,
    }
}

fn to_kpis(totals: &crate::stores::KpiTotals) -> Kpis {
    let approval_rate = if totals.total_count > 0 {
        totals.authorized_count as f64 / totals.total_count as f64 * 100.0
    } else {
        0.0
    };
    Kpis {
        total_count: totals.total_count,
        authorized_count: totals.authorized_count,
        denied_count: totals.denied_count,
        pending_count: totals.pending_count,
        approval_rate_percent: approval_rate,
        authorized_amount: totals.authorized_amount.clone(),
    }
}

/// Mirror the range backward by its own span, ending the day before `from`.
fn previous_period(from: NaiveDate, to: NaiveDate) -> (NaiveDate, NaiveDate) {
    let span = to - from;
    let prev_to = from.pred_opt().unwrap_or(from);
    let prev_from = prev_to - span;
    (prev_from, prev_to)
}

fn change_percent(current: &BigDecimal, previous: &BigDecimal) -> Option<f64> {
    if previous == &BigDecimal::from(0) {
        return None;
    }
    let delta = (current - previous) * BigDecimal::from(100) / previous;
    delta.to_f64()
}

fn day_start_utc(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

fn gap_filled_series(
    from: NaiveDate,
    to: NaiveDate,
    daily: Vec<crate::stores::DailyTotal>,
) -> Vec<SeriesPoint> {
    let mut by_day: HashMap<NaiveDate, SeriesPoint> = daily
        .into_iter()
        .map(|d| {
            (
                d.day,
                SeriesPoint {
                    day: d.day,
                    tx_count: d.tx_count,
                    amount: d.amount,
                },
            )
        })
        .collect();

    let mut series = Vec::new();
    let mut day = from;
    while day <= to {
        series.push(by_day.remove(&day).unwrap_or(SeriesPoint {
            day,
            tx_count: 0,
            amount: BigDecimal::from(0),
        }));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    series
}

