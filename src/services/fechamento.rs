//! Closing report ("fechamento") aggregation.
//!
//! A live projection over the transaction ledger: every row's commission is
//! resolved from the *current* margin configuration at read time, so the
//! report can diverge from settlement snapshots taken at consolidation:
//! fechamento is a projection, settlements are a ledger.
//!
//! Three aggregation passes share one filtered transaction set and one
//! call-scoped margin cache: paginated rows, a per-customer rollup, and a
//! gap-filled daily chart series.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::MarginClass;
use crate::error::AppError;
use crate::services::commissions::CommissionResolver;
use crate::services::margin::{MarginCache, MarginResolver};
use crate::stores::{DirectoryStore, LedgerFilter, LedgerStore, TransactionStatus};

#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub customer_id: Option<Uuid>,
    pub mcc: Option<String>,
    pub product_type: Option<String>,
    pub brand: Option<String>,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub slug: String,
    pub occurred_at: DateTime<Utc>,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub merchant_ref: String,
    pub brand: String,
    pub product_label: String,
    pub channel_label: String,
    pub amount: BigDecimal,
    pub commission_percent: BigDecimal,
    pub profit: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub tx_count: i64,
    pub total_amount: BigDecimal,
    pub profit: BigDecimal,
    /// Effective rate: profit / volume, not an average of per-row rates.
    pub effective_percent: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub tx_count: i64,
    pub total_amount: BigDecimal,
    pub total_profit: BigDecimal,
    pub effective_percent: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub day: NaiveDate,
    pub gross: BigDecimal,
    pub profit: BigDecimal,
    pub tx_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total_rows: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ClosingReport {
    pub summary: ReportSummary,
    pub customers: Vec<CustomerSummary>,
    pub transactions: Vec<ReportRow>,
    pub pagination: Pagination,
    pub chart: Vec<ChartPoint>,
}

impl ClosingReport {
    /// All-zero shape: empty rows, zero summary, gap-filled zero chart.
    /// Returned for empty access scopes and for failed read paths alike.
    pub fn zeroed(filter: &ReportFilter) -> Self {
        Self {
            summary: ReportSummary {
                tx_count: 0,
                total_amount: BigDecimal::from(0),
                total_profit: BigDecimal::from(0),
                effective_percent: BigDecimal::from(0),
            },
            customers: Vec::new(),
            transactions: Vec::new(),
            pagination: Pagination {
                page: filter.page,
                page_size: filter.page_size,
                total_rows: 0,
                total_pages: 0,
            },
            chart: gap_filled_chart(filter.date_from, filter.date_to, HashMap::new()),
        }
    }
}

pub struct FechamentoService {
    directory: Arc<dyn DirectoryStore>,
    ledger: Arc<dyn LedgerStore>,
    margins: MarginResolver,
    commissions: CommissionResolver,
}

impl FechamentoService {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        ledger: Arc<dyn LedgerStore>,
        margins: MarginResolver,
        commissions: CommissionResolver,
    ) -> Self {
        Self {
            directory,
            ledger,
            margins,
            commissions,
        }
    }

    pub async fn report(
        &self,
        user_id: Uuid,
        filter: &ReportFilter,
    ) -> Result<ClosingReport, AppError> {
        if filter.date_from > filter.date_to {
            return Err(AppError::BadRequest(
                "date_from must not be after date_to".to_string(),
            ));
        }

        let role = match self.directory.user_role(user_id).await? {
            Some(role) => role,
            None => return Ok(ClosingReport::zeroed(filter)),
        };

        // Access scope and margin class are determined once per call.
        let margin_class = role.margin_class();
        let (scope, names): (Option<Vec<Uuid>>, HashMap<Uuid, String>) = if role.is_super_admin() {
            let customers = self.directory.all_customers().await?;
            let names = customers.iter().map(|c| (c.id, c.name.clone())).collect();
            (None, names)
        } else {
            let inherited = self.commissions.inherited_commissions(user_id).await?;
            if inherited.is_empty() {
                // No qualifying links: all-zero result, no ledger query.
                return Ok(ClosingReport::zeroed(filter));
            }
            let names = inherited
                .iter()
                .map(|c| (c.customer_id, c.customer_name.clone()))
                .collect();
            let ids = inherited.iter().map(|c| c.customer_id).collect();
            (Some(ids), names)
        };

        // Narrow the scope by an explicit customer filter.
        let scope = match (filter.customer_id, scope) {
            (Some(wanted), Some(ids)) => {
                if !ids.contains(&wanted) {
                    return Ok(ClosingReport::zeroed(filter));
                }
                Some(vec![wanted])
            }
            (Some(wanted), None) => Some(vec![wanted]),
            (None, scope) => scope,
        };

        let ledger_filter = LedgerFilter {
            customer_ids: scope,
            date_from: Some(day_start_utc(filter.date_from)),
            date_to: Some(day_start_utc(next_day(filter.date_to))),
            status: Some(TransactionStatus::Authorized),
            brand: filter.brand.clone(),
            product_label: filter.product_type.clone(),
            mcc: filter.mcc.clone(),
        };

        let mut cache = MarginCache::new();

        let (transactions, total_rows) = self
            .rows_pass(&ledger_filter, filter, &names, margin_class, &mut cache)
            .await?;
        let customers = self
            .rollup_pass(&ledger_filter, &names, margin_class, &mut cache)
            .await?;
        let chart = self
            .chart_pass(&ledger_filter, filter, margin_class, &mut cache)
            .await?;

        let summary = summarize(&customers);
        let total_pages = if filter.page_size > 0 {
            (total_rows + filter.page_size - 1) / filter.page_size
        } else {
            0
        };

        Ok(ClosingReport {
            summary,
            customers,
            transactions,
            pagination: Pagination {
                page: filter.page,
                page_size: filter.page_size,
                total_rows,
                total_pages,
            },
            chart,
        })
    }

    /// Paginated row listing with per-row live margin resolution.
    async fn rows_pass(
        &self,
        ledger_filter: &LedgerFilter,
        filter: &ReportFilter,
        names: &HashMap<Uuid, String>,
        margin_class: MarginClass,
        cache: &mut MarginCache,
    ) -> Result<(Vec<ReportRow>, i64), AppError> {
        let (rows, total) = self
            .ledger
            .list_transactions(ledger_filter, filter.page, filter.page_size)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let resolved = self
                .margins
                .resolve(
                    cache,
                    row.customer_id,
                    &row.brand,
                    &row.product_label,
                    &row.channel_label,
                    margin_class,
                )
                .await?;
            let profit = &row.amount * &resolved.percent / BigDecimal::from(100);
            out.push(ReportRow {
                slug: row.slug,
                occurred_at: row.occurred_at,
                customer_id: row.customer_id,
                customer_name: names.get(&row.customer_id).cloned().unwrap_or_default(),
                merchant_ref: row.merchant_ref,
                brand: row.brand,
                product_label: row.product_label,
                channel_label: row.channel_label,
                amount: row.amount,
                commission_percent: resolved.percent,
                profit,
            });
        }

        Ok((out, total))
    }

    /// Per-customer rollup. Rows grouped by margin key resolve identically,
    /// so applying the rate per group reproduces per-row resolution.
    async fn rollup_pass(
        &self,
        ledger_filter: &LedgerFilter,
        names: &HashMap<Uuid, String>,
        margin_class: MarginClass,
        cache: &mut MarginCache,
    ) -> Result<Vec<CustomerSummary>, AppError> {
        let groups = self.ledger.grouped_totals(ledger_filter).await?;

        let mut by_customer: HashMap<Uuid, CustomerSummary> = HashMap::new();
        for group in groups {
            let resolved = self
                .margins
                .resolve(
                    cache,
                    group.customer_id,
                    &group.brand,
                    &group.product_label,
                    &group.channel_label,
                    margin_class,
                )
                .await?;
            let profit = &group.amount * &resolved.percent / BigDecimal::from(100);

            let entry = by_customer
                .entry(group.customer_id)
                .or_insert_with(|| CustomerSummary {
                    customer_id: group.customer_id,
                    customer_name: names.get(&group.customer_id).cloned().unwrap_or_default(),
                    tx_count: 0,
                    total_amount: BigDecimal::from(0),
                    profit: BigDecimal::from(0),
                    effective_percent: BigDecimal::from(0),
                });
            entry.tx_count += group.tx_count;
            entry.total_amount += group.amount;
            entry.profit += profit;
        }

        let mut customers: Vec<CustomerSummary> = by_customer.into_values().collect();
        for customer in &mut customers {
            customer.effective_percent = effective_percent(&customer.profit, &customer.total_amount);
        }
        customers.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

        Ok(customers)
    }

    /// Daily series, gap-filled so every calendar day in range is present.
    async fn chart_pass(
        &self,
        ledger_filter: &LedgerFilter,
        filter: &ReportFilter,
        margin_class: MarginClass,
        cache: &mut MarginCache,
    ) -> Result<Vec<ChartPoint>, AppError> {
        let groups = self.ledger.daily_grouped_totals(ledger_filter).await?;

        let mut by_day: HashMap<NaiveDate, ChartPoint> = HashMap::new();
        for group in groups {
            let resolved = self
                .margins
                .resolve(
                    cache,
                    group.customer_id,
                    &group.brand,
                    &group.product_label,
                    &group.channel_label,
                    margin_class,
                )
                .await?;
            let profit = &group.amount * &resolved.percent / BigDecimal::from(100);

            let entry = by_day.entry(group.day).or_insert_with(|| ChartPoint {
                day: group.day,
                gross: BigDecimal::from(0),
                profit: BigDecimal::from(0),
                tx_count: 0,
            });
            entry.gross += group.amount;
            entry.profit += profit;
            entry.tx_count += group.tx_count;
        }

        Ok(gap_filled_chart(filter.date_from, filter.date_to, by_day))
    }
}

fn summarize(customers: &[CustomerSummary]) -> ReportSummary {
    let mut tx_count = 0;
    let mut total_amount = BigDecimal::from(0);
    let mut total_profit = BigDecimal::from(0);
    for customer in customers {
        tx_count += customer.tx_count;
        total_amount += customer.total_amount.clone();
        total_profit += customer.profit.clone();
    }
    let effective = effective_percent(&total_profit, &total_amount);
    ReportSummary {
        tx_count,
        total_amount,
        total_profit,
        effective_percent: effective,
    }
}

fn effective_percent(profit: &BigDecimal, volume: &BigDecimal) -> BigDecimal {
    if volume == &BigDecimal::from(0) {
        BigDecimal::from(0)
    } else {
        profit * BigDecimal::from(100) / volume
    }
}

fn day_start_utc(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.succ_opt().unwrap_or(day)
}

fn gap_filled_chart(
    from: NaiveDate,
    to: NaiveDate,
    mut by_day: HashMap<NaiveDate, ChartPoint>,
) -> Vec<ChartPoint> {
    let mut chart = Vec::new();
    let mut day = from;
    while day <= to {
        chart.push(by_day.remove(&day).unwrap_or(ChartPoint {
            day,
            gross: BigDecimal::from(0),
            profit: BigDecimal::from(0),
            tx_count: 0,
        }));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    chart
}

