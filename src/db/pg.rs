//! Postgres implementations of the store traits.
//!
//! Runtime-bound queries throughout; dynamic filters go through
//! `QueryBuilder`. Each store owns a pool handle and is cheap to clone.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

use crate::db::models::{
    MarginConfigRow, MdrMarginRow, MonthlySettlementRow, SettlementInvoiceRow,
};
use crate::domain::{
    CommissionType, MonthlySettlement, RoleCategory, SettlementInvoice, SettlementStatus,
    ValidationStatus,
};
use crate::error::AppError;
use crate::stores::{
    AdminSettlementFilter, CommissionLink, CustomerLink, CustomerRef, DailyGroupedTotal,
    DailyTotal, Dimension, DimensionSlice, DirectoryStore, GroupedTotal, InvoiceFields,
    InvoiceStore, KpiTotals, LedgerFilter, LedgerStore, LedgerTotals, LedgerTransaction,
    MarginConfig, MarginStore, MdrMargin, SettlementStore,
};

const TX_COLUMNS: &str =
    "slug, occurred_at, merchant_ref, customer_id, brand, product_label, channel_label, amount, status, mcc";

const SETTLEMENT_COLUMNS: &str = "id, user_id, customer_id, month, year, total_transactions, \
     total_amount, commission_percent, commission_value, status, invoice_deadline, \
     payment_deadline, paid_at, paid_by_user_id, active, created_at, updated_at";

const INVOICE_COLUMNS: &str = "id, settlement_id, file_ref, access_key, invoice_number, \
     invoice_value, issuer_cnpj, issuer_name, validation_status, validation_error, active, created_at";

fn push_tx_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &LedgerFilter) {
    if let Some(ids) = &filter.customer_ids {
        qb.push(" AND customer_id = ANY(");
        qb.push_bind(ids.clone());
        qb.push(")");
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND occurred_at >= ");
        qb.push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND occurred_at < ");
        qb.push_bind(to);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status.as_str());
    }
    if let Some(brand) = &filter.brand {
        qb.push(" AND brand ILIKE ");
        qb.push_bind(format!("%{}%", brand));
    }
    if let Some(product) = &filter.product_label {
        qb.push(" AND product_label ILIKE ");
        qb.push_bind(format!("%{}%", product));
    }
    if let Some(mcc) = &filter.mcc {
        qb.push(" AND mcc = ");
        qb.push_bind(mcc.clone());
    }
}

#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn approved_totals(
        &self,
        customer_id: Uuid,
        range: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<LedgerTotals, AppError> {
        let (tx_count, total_amount): (i64, BigDecimal) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(amount), 0) FROM transactions \
             WHERE customer_id = $1 AND status = 'authorized' \
             AND occurred_at >= $2 AND occurred_at < $3",
        )
        .bind(customer_id)
        .bind(range.0)
        .bind(range.1)
        .fetch_one(&self.pool)
        .await?;

        Ok(LedgerTotals {
            tx_count,
            total_amount,
        })
    }

    async fn list_transactions(
        &self,
        filter: &LedgerFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<LedgerTransaction>, i64), AppError> {
        let mut count_qb =
            QueryBuilder::new("SELECT COUNT(*) FROM transactions WHERE 1=1");
        push_tx_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let offset = (page.max(1) - 1) * page_size;
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE 1=1",
            TX_COLUMNS
        ));
        push_tx_filters(&mut qb, filter);
        qb.push(" ORDER BY occurred_at DESC LIMIT ");
        qb.push_bind(page_size);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<LedgerTransaction>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn grouped_totals(&self, filter: &LedgerFilter) -> Result<Vec<GroupedTotal>, AppError> {
        let mut qb = QueryBuilder::new(
            "SELECT customer_id, brand, product_label, channel_label, COUNT(*), \
             COALESCE(SUM(amount), 0) FROM transactions WHERE 1=1",
        );
        push_tx_filters(&mut qb, filter);
        qb.push(" GROUP BY customer_id, brand, product_label, channel_label");

        let rows: Vec<(Uuid, String, String, String, i64, BigDecimal)> =
            qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(
                |(customer_id, brand, product_label, channel_label, tx_count, amount)| {
                    GroupedTotal {
                        customer_id,
                        brand,
                        product_label,
                        channel_label,
                        tx_count,
                        amount,
                    }
                },
            )
            .collect())
    }

    async fn daily_grouped_totals(
        &self,
        filter: &LedgerFilter,
    ) -> Result<Vec<DailyGroupedTotal>, AppError> {
        let mut qb = QueryBuilder::new(
            "SELECT occurred_at::date, customer_id, brand, product_label, channel_label, \
             COUNT(*), COALESCE(SUM(amount), 0) FROM transactions WHERE 1=1",
        );
        push_tx_filters(&mut qb, filter);
        qb.push(
            " GROUP BY occurred_at::date, customer_id, brand, product_label, channel_label \
             ORDER BY occurred_at::date",
        );

        let rows: Vec<(NaiveDate, Uuid, String, String, String, i64, BigDecimal)> =
            qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(
                |(day, customer_id, brand, product_label, channel_label, tx_count, amount)| {
                    DailyGroupedTotal {
                        day,
                        customer_id,
                        brand,
                        product_label,
                        channel_label,
                        tx_count,
                        amount,
                    }
                },
            )
            .collect())
    }

    async fn kpi_totals(&self, filter: &LedgerFilter) -> Result<KpiTotals, AppError> {
        let mut qb = QueryBuilder::new(
            "SELECT COUNT(*), \
             COUNT(*) FILTER (WHERE status = 'authorized'), \
             COUNT(*) FILTER (WHERE status = 'denied'), \
             COUNT(*) FILTER (WHERE status = 'pending'), \
             COALESCE(SUM(amount) FILTER (WHERE status = 'authorized'), 0) \
             FROM transactions WHERE 1=1",
        );
        push_tx_filters(&mut qb, filter);

        let (total_count, authorized_count, denied_count, pending_count, authorized_amount): (
            i64,
            i64,
            i64,
            i64,
            BigDecimal,
        ) = qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(KpiTotals {
            total_count,
            authorized_count,
            denied_count,
            pending_count,
            authorized_amount,
        })
    }

    async fn daily_totals(&self, filter: &LedgerFilter) -> Result<Vec<DailyTotal>, AppError> {
        let mut qb = QueryBuilder::new(
            "SELECT occurred_at::date, COUNT(*), COALESCE(SUM(amount), 0) \
             FROM transactions WHERE 1=1",
        );
        push_tx_filters(&mut qb, filter);
        qb.push(" GROUP BY occurred_at::date ORDER BY occurred_at::date");

        let rows: Vec<(NaiveDate, i64, BigDecimal)> =
            qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(day, tx_count, amount)| DailyTotal {
                day,
                tx_count,
                amount,
            })
            .collect())
    }

    async fn breakdown(
        &self,
        filter: &LedgerFilter,
        dimension: Dimension,
    ) -> Result<Vec<DimensionSlice>, AppError> {
        let column = match dimension {
            Dimension::Brand => "brand",
            Dimension::ProductType => "product_label",
            Dimension::Channel => "channel_label",
        };

        let mut qb = QueryBuilder::new(format!(
            "SELECT {}, COUNT(*), COALESCE(SUM(amount), 0) FROM transactions WHERE 1=1",
            column
        ));
        push_tx_filters(&mut qb, filter);
        qb.push(format!(" GROUP BY {} ORDER BY 3 DESC", column));

        let rows: Vec<(String, i64, BigDecimal)> =
            qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(key, tx_count, amount)| DimensionSlice {
                key,
                tx_count,
                amount,
            })
            .collect())
    }
}

#[derive(Clone)]
pub struct PgMarginStore {
    pool: PgPool,
}

impl PgMarginStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarginStore for PgMarginStore {
    async fn margin_config(&self, customer_id: Uuid) -> Result<Option<MarginConfig>, AppError> {
        let row: Option<MarginConfigRow> = sqlx::query_as(
            "SELECT customer_id, margin_outbank, margin_executivo, margin_core \
             FROM margin_configs WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MarginConfigRow::into_domain).transpose()
    }

    async fn validated_mdr_margins(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<MdrMargin>, AppError> {
        let rows: Vec<MdrMarginRow> = sqlx::query_as(
            "SELECT m.brand, m.modality, m.channel, m.percent \
             FROM mdr_margins m \
             JOIN mdr_links l ON l.id = m.link_id \
             WHERE l.customer_id = $1 AND l.status = 'validada'",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MdrMarginRow::into_domain).collect()
    }
}

#[derive(Clone)]
pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn user_role(&self, user_id: Uuid) -> Result<Option<RoleCategory>, AppError> {
        let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT category, profile_name FROM users WHERE id = $1 AND active = true",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        // The structured category wins; the legacy profile label is the
        // fallback. Mapping is total, so every stored value lands somewhere.
        Ok(row.map(|(category, profile_name)| {
            let label = category.or(profile_name).unwrap_or_default();
            RoleCategory::from_label(&label)
        }))
    }

    async fn active_links(&self, user_id: Uuid) -> Result<Vec<CustomerLink>, AppError> {
        let rows: Vec<(Uuid, String, Option<String>)> = sqlx::query_as(
            "SELECT l.customer_id, c.name, l.commission_type \
             FROM user_customer_links l \
             JOIN customers c ON c.id = l.customer_id \
             WHERE l.user_id = $1 AND l.active = true AND c.active = true \
             ORDER BY c.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(customer_id, customer_name, commission_type)| CustomerLink {
                customer_id,
                customer_name,
                commission_type: commission_type
                    .as_deref()
                    .and_then(CommissionType::from_label),
            })
            .collect())
    }

    async fn all_customers(&self) -> Result<Vec<CustomerRef>, AppError> {
        let rows: Vec<(Uuid, String, String)> = sqlx::query_as(
            "SELECT id, slug, name FROM customers WHERE active = true ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, slug, name)| CustomerRef { id, slug, name })
            .collect())
    }

    async fn commission_links(&self) -> Result<Vec<CommissionLink>, AppError> {
        let rows: Vec<(Uuid, Uuid, String)> = sqlx::query_as(
            "SELECT l.user_id, l.customer_id, l.commission_type \
             FROM user_customer_links l \
             JOIN customers c ON c.id = l.customer_id \
             WHERE l.active = true AND l.commission_type IS NOT NULL AND c.active = true",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(user_id, customer_id, raw)| {
                match CommissionType::from_label(&raw) {
                    Some(commission_type) => Some(CommissionLink {
                        user_id,
                        customer_id,
                        commission_type,
                    }),
                    None => {
                        warn!(
                            user_id = %user_id,
                            customer_id = %customer_id,
                            "Skipping link with unrecognized commission type: {}",
                            raw
                        );
                        None
                    }
                }
            })
            .collect())
    }
}

#[derive(Clone)]
pub struct PgSettlementStore {
    pool: PgPool,
}

impl PgSettlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettlementStore for PgSettlementStore {
    async fn find_by_key(
        &self,
        user_id: Uuid,
        customer_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<Option<MonthlySettlement>, AppError> {
        let row: Option<MonthlySettlementRow> = sqlx::query_as(&format!(
            "SELECT {} FROM monthly_settlements \
             WHERE user_id = $1 AND customer_id = $2 AND month = $3 AND year = $4 \
             AND active = true",
            SETTLEMENT_COLUMNS
        ))
        .bind(user_id)
        .bind(customer_id)
        .bind(month as i32)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MonthlySettlementRow::into_domain).transpose()
    }

    async fn get(&self, id: Uuid) -> Result<Option<MonthlySettlement>, AppError> {
        let row: Option<MonthlySettlementRow> = sqlx::query_as(&format!(
            "SELECT {} FROM monthly_settlements WHERE id = $1 AND active = true",
            SETTLEMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MonthlySettlementRow::into_domain).transpose()
    }

    async fn insert(&self, settlement: &MonthlySettlement) -> Result<(), AppError> {
        // The natural-key constraint closes the insert-vs-insert race
        // between concurrently triggered consolidation runs.
        let result = sqlx::query(
            "INSERT INTO monthly_settlements \
             (id, user_id, customer_id, month, year, total_transactions, total_amount, \
              commission_percent, commission_value, status, invoice_deadline, \
              payment_deadline, paid_at, paid_by_user_id, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             ON CONFLICT (user_id, customer_id, month, year) DO NOTHING",
        )
        .bind(settlement.id)
        .bind(settlement.user_id)
        .bind(settlement.customer_id)
        .bind(settlement.month as i32)
        .bind(settlement.year)
        .bind(settlement.total_transactions)
        .bind(&settlement.total_amount)
        .bind(&settlement.commission_percent)
        .bind(&settlement.commission_value)
        .bind(settlement.status.as_str())
        .bind(settlement.invoice_deadline)
        .bind(settlement.payment_deadline)
        .bind(settlement.paid_at)
        .bind(settlement.paid_by_user_id)
        .bind(settlement.active)
        .bind(settlement.created_at)
        .bind(settlement.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(
                user_id = %settlement.user_id,
                customer_id = %settlement.customer_id,
                month = settlement.month,
                year = settlement.year,
                "Settlement insert skipped, row already exists for natural key"
            );
        }
        Ok(())
    }

    async fn update_consolidated(
        &self,
        id: Uuid,
        total_transactions: i64,
        total_amount: &BigDecimal,
        commission_percent: &BigDecimal,
        commission_value: &BigDecimal,
        status: SettlementStatus,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE monthly_settlements SET total_transactions = $2, total_amount = $3, \
             commission_percent = $4, commission_value = $5, status = $6, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(total_transactions)
        .bind(total_amount)
        .bind(commission_percent)
        .bind(commission_value)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: SettlementStatus) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE monthly_settlements SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_payment(
        &self,
        id: Uuid,
        paid_by_user_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE monthly_settlements SET status = 'paid', paid_at = $2, \
             paid_by_user_id = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(paid_at)
        .bind(paid_by_user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<MonthlySettlement>, i64), AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM monthly_settlements WHERE user_id = $1 AND active = true",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let offset = (page.max(1) - 1) * page_size;
        let rows: Vec<MonthlySettlementRow> = sqlx::query_as(&format!(
            "SELECT {} FROM monthly_settlements WHERE user_id = $1 AND active = true \
             ORDER BY year DESC, month DESC LIMIT $2 OFFSET $3",
            SETTLEMENT_COLUMNS
        ))
        .bind(user_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let settlements = rows
            .into_iter()
            .map(MonthlySettlementRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((settlements, total))
    }

    async fn list_admin(
        &self,
        filter: &AdminSettlementFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<MonthlySettlement>, i64), AppError> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AdminSettlementFilter) {
            if let Some(status) = filter.status {
                qb.push(" AND s.status = ");
                qb.push_bind(status.as_str());
            }
            if let Some(month) = filter.month {
                qb.push(" AND s.month = ");
                qb.push_bind(month as i32);
            }
            if let Some(year) = filter.year {
                qb.push(" AND s.year = ");
                qb.push_bind(year);
            }
            if let Some(user_id) = filter.user_id {
                qb.push(" AND s.user_id = ");
                qb.push_bind(user_id);
            }
            if !filter.include_super_admin_rows {
                qb.push(
                    " AND NOT EXISTS (SELECT 1 FROM users u \
                     WHERE u.id = s.user_id AND u.category = 'SUPER_ADMIN')",
                );
            }
        }

        let mut count_qb = QueryBuilder::new(
            "SELECT COUNT(*) FROM monthly_settlements s WHERE s.active = true",
        );
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let offset = (page.max(1) - 1) * page_size;
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM monthly_settlements s WHERE s.active = true",
            SETTLEMENT_COLUMNS
                .split(", ")
                .map(|c| format!("s.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY s.year DESC, s.month DESC LIMIT ");
        qb.push_bind(page_size);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows: Vec<MonthlySettlementRow> =
            qb.build_query_as().fetch_all(&self.pool).await?;
        let settlements = rows
            .into_iter()
            .map(MonthlySettlementRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((settlements, total))
    }
}

#[derive(Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn insert_replacing(&self, invoice: &SettlementInvoice) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE settlement_invoices SET active = false \
             WHERE settlement_id = $1 AND active = true",
        )
        .bind(invoice.settlement_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO settlement_invoices \
             (id, settlement_id, file_ref, access_key, invoice_number, invoice_value, \
              issuer_cnpj, issuer_name, validation_status, validation_error, active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(invoice.id)
        .bind(invoice.settlement_id)
        .bind(&invoice.file_ref)
        .bind(&invoice.access_key)
        .bind(&invoice.invoice_number)
        .bind(&invoice.invoice_value)
        .bind(&invoice.issuer_cnpj)
        .bind(&invoice.issuer_name)
        .bind(invoice.validation_status.as_str())
        .bind(&invoice.validation_error)
        .bind(invoice.active)
        .bind(invoice.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SettlementInvoice>, AppError> {
        let row: Option<SettlementInvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM settlement_invoices WHERE id = $1",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SettlementInvoiceRow::into_domain).transpose()
    }

    async fn active_for_settlement(
        &self,
        settlement_id: Uuid,
    ) -> Result<Option<SettlementInvoice>, AppError> {
        let row: Option<SettlementInvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM settlement_invoices \
             WHERE settlement_id = $1 AND active = true \
             ORDER BY created_at DESC LIMIT 1",
            INVOICE_COLUMNS
        ))
        .bind(settlement_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SettlementInvoiceRow::into_domain).transpose()
    }

    async fn record_validation(
        &self,
        id: Uuid,
        status: ValidationStatus,
        fields: InvoiceFields,
        error: Option<String>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE settlement_invoices SET validation_status = $2, access_key = $3, \
             invoice_number = $4, invoice_value = $5, issuer_cnpj = $6, issuer_name = $7, \
             validation_error = $8 WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(&fields.access_key)
        .bind(&fields.invoice_number)
        .bind(&fields.invoice_value)
        .bind(&fields.issuer_cnpj)
        .bind(&fields.issuer_name)
        .bind(&error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
