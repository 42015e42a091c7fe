//! Monthly settlement consolidation job.
//!
//! For every active (user, customer, commission-type) link, aggregates the
//! target month's approved transaction volume, computes the commission at
//! the link's flat tier, and upserts the settlement row. Intended to run
//! from cron shortly after month close; defaults to the month that just
//! ended. Per-tuple failures are recorded and never abort sibling work;
//! a failed tuple commits nothing and is retried on the next run.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{month_range_utc, previous_month, MarginClass, MonthlySettlement, SettlementStatus};
use crate::error::AppError;
use crate::stores::{CommissionLink, DirectoryStore, LedgerStore, MarginStore, SettlementStore};

#[derive(Debug, Serialize)]
pub struct ConsolidationSummary {
    pub month: u32,
    pub year: i32,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<ConsolidationError>,
}

#[derive(Debug, Serialize)]
pub struct ConsolidationError {
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub message: String,
}

enum TupleOutcome {
    Created,
    Updated,
    /// Existing row already progressed past invoicing; left untouched.
    Preserved,
}

pub struct SettlementConsolidator {
    directory: Arc<dyn DirectoryStore>,
    margins: Arc<dyn MarginStore>,
    ledger: Arc<dyn LedgerStore>,
    settlements: Arc<dyn SettlementStore>,
}

impl SettlementConsolidator {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        margins: Arc<dyn MarginStore>,
        ledger: Arc<dyn LedgerStore>,
        settlements: Arc<dyn SettlementStore>,
    ) -> Self {
        Self {
            directory,
            margins,
            ledger,
            settlements,
        }
    }

    /// Run consolidation for the given (month, year), or for the month that
    /// just ended when no target is given.
    pub async fn consolidate(
        &self,
        target: Option<(u32, i32)>,
    ) -> Result<ConsolidationSummary, AppError> {
        let (month, year) = target.unwrap_or_else(|| previous_month(Utc::now()));
        if !(1..=12).contains(&month) {
            return Err(AppError::BadRequest(format!("invalid month: {}", month)));
        }

        let range = month_range_utc(month, year);
        let links = self.directory.commission_links().await?;

        info!(
            month = month,
            year = year,
            tuples = links.len(),
            "Starting settlement consolidation"
        );

        let mut summary = ConsolidationSummary {
            month,
            year,
            created: 0,
            updated: 0,
            errors: Vec::new(),
        };

        for link in &links {
            match self.consolidate_tuple(link, month, year, range).await {
                Ok(TupleOutcome::Created) => summary.created += 1,
                Ok(TupleOutcome::Updated) => summary.updated += 1,
                Ok(TupleOutcome::Preserved) => {}
                Err(e) => {
                    error!(
                        user_id = %link.user_id,
                        customer_id = %link.customer_id,
                        "Consolidation tuple failed: {}",
                        e
                    );
                    summary.errors.push(ConsolidationError {
                        user_id: link.user_id,
                        customer_id: link.customer_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            month = month,
            year = year,
            created = summary.created,
            updated = summary.updated,
            errors = summary.errors.len(),
            "Settlement consolidation completed"
        );

        Ok(summary)
    }

    async fn consolidate_tuple(
        &self,
        link: &CommissionLink,
        month: u32,
        year: i32,
        range: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<TupleOutcome, AppError> {
        let config = self.margins.margin_config(link.customer_id).await?;
        let percent = config
            .and_then(|c| match link.commission_type.margin_class() {
                MarginClass::Executivo => c.margin_executivo,
                MarginClass::Core => c.margin_core,
                _ => None,
            })
            .unwrap_or_else(|| BigDecimal::from(0));

        let totals = self.ledger.approved_totals(link.customer_id, range).await?;
        let commission_value = &totals.total_amount * &percent / BigDecimal::from(100);
        let status = SettlementStatus::classify(&commission_value);

        match self
            .settlements
            .find_by_key(link.user_id, link.customer_id, month, year)
            .await?
        {
            Some(existing) if existing.status.is_sticky() => {
                // Paid/eligible settlements never regress on re-runs.
                Ok(TupleOutcome::Preserved)
            }
            Some(existing) => {
                self.settlements
                    .update_consolidated(
                        existing.id,
                        totals.tx_count,
                        &totals.total_amount,
                        &percent,
                        &commission_value,
                        status,
                    )
                    .await?;
                Ok(TupleOutcome::Updated)
            }
            None => {
                let settlement = MonthlySettlement::new(
                    link.user_id,
                    link.customer_id,
                    month,
                    year,
                    totals.tx_count,
                    totals.total_amount,
                    percent,
                    commission_value,
                );
                self.settlements.insert(&settlement).await?;
                Ok(TupleOutcome::Created)
            }
        }
    }
}
