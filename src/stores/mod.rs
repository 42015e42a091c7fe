//! Boundary contracts over the relational store.
//!
//! The engine never talks to SQL directly; it consumes these traits. The
//! production implementations live in `db::pg` and are backed by Postgres,
//! the test suite substitutes in-memory implementations with call-count
//! instrumentation.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    CommissionType, MonthlySettlement, RoleCategory, SettlementInvoice, SettlementStatus,
    ValidationStatus,
};
use crate::error::AppError;

/// Transaction status in the external ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Authorized,
    Denied,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "authorized",
            Self::Denied => "denied",
            Self::Pending => "pending",
        }
    }
}

/// Row-level view of a ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerTransaction {
    pub slug: String,
    pub occurred_at: DateTime<Utc>,
    pub merchant_ref: String,
    pub customer_id: Uuid,
    pub brand: String,
    pub product_label: String,
    pub channel_label: String,
    pub amount: BigDecimal,
    pub status: String,
    pub mcc: Option<String>,
}

/// Filter shared by every ledger read. `customer_ids: None` means
/// unrestricted (super-admin scope); `Some` restricts to that set.
/// `product_label` and `brand` are matched case-insensitively as substrings
/// of the stored labels.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub customer_ids: Option<Vec<Uuid>>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub status: Option<TransactionStatus>,
    pub brand: Option<String>,
    pub product_label: Option<String>,
    pub mcc: Option<String>,
}

/// Count and sum of approved volume for one customer over one period.
#[derive(Debug, Clone, Default)]
pub struct LedgerTotals {
    pub tx_count: i64,
    pub total_amount: BigDecimal,
}

/// Ledger-wide counters for the analytics KPIs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KpiTotals {
    pub total_count: i64,
    pub authorized_count: i64,
    pub denied_count: i64,
    pub pending_count: i64,
    pub authorized_amount: BigDecimal,
}

/// Volume grouped by the margin-resolution key. One margin lookup per group
/// reproduces per-row resolution exactly, because every row in a group
/// resolves to the same percentage.
#[derive(Debug, Clone)]
pub struct GroupedTotal {
    pub customer_id: Uuid,
    pub brand: String,
    pub product_label: String,
    pub channel_label: String,
    pub tx_count: i64,
    pub amount: BigDecimal,
}

/// Same grouping, additionally keyed by calendar day, for chart series.
#[derive(Debug, Clone)]
pub struct DailyGroupedTotal {
    pub day: NaiveDate,
    pub customer_id: Uuid,
    pub brand: String,
    pub product_label: String,
    pub channel_label: String,
    pub tx_count: i64,
    pub amount: BigDecimal,
}

/// Sparse per-day totals (no margin data) for analytics series.
#[derive(Debug, Clone, Serialize)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub tx_count: i64,
    pub amount: BigDecimal,
}

/// Dimensional breakdown axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Brand,
    ProductType,
    Channel,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionSlice {
    pub key: String,
    pub tx_count: i64,
    pub amount: BigDecimal,
}

/// Read-only access to the external transaction ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Approved transaction count and volume for one customer in a half-open
    /// UTC range. Consolidation input.
    async fn approved_totals(
        &self,
        customer_id: Uuid,
        range: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<LedgerTotals, AppError>;

    /// Paginated row listing, most recent first. Returns the page and the
    /// total row count for the filter.
    async fn list_transactions(
        &self,
        filter: &LedgerFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<LedgerTransaction>, i64), AppError>;

    /// Volume grouped by (customer, brand, product, channel).
    async fn grouped_totals(&self, filter: &LedgerFilter) -> Result<Vec<GroupedTotal>, AppError>;

    /// Volume grouped by day and margin key. Sparse: days without activity
    /// are absent and must be gap-filled by the caller.
    async fn daily_grouped_totals(
        &self,
        filter: &LedgerFilter,
    ) -> Result<Vec<DailyGroupedTotal>, AppError>;

    /// Ledger-wide status counters and approved volume.
    async fn kpi_totals(&self, filter: &LedgerFilter) -> Result<KpiTotals, AppError>;

    /// Sparse per-day count/volume series.
    async fn daily_totals(&self, filter: &LedgerFilter) -> Result<Vec<DailyTotal>, AppError>;

    /// Count and volume per value of the given dimension.
    async fn breakdown(
        &self,
        filter: &LedgerFilter,
        dimension: Dimension,
    ) -> Result<Vec<DimensionSlice>, AppError>;
}

/// Flat per-tier percentages for one customer. Absent fields mean the tier
/// is unconfigured and resolves to the default 0%.
#[derive(Debug, Clone, Default)]
pub struct MarginConfig {
    pub customer_id: Uuid,
    pub margin_outbank: Option<BigDecimal>,
    pub margin_executivo: Option<BigDecimal>,
    pub margin_core: Option<BigDecimal>,
}

/// One granular ISO-own margin row. Only rows whose parent MDR link has been
/// approved (`validada`) are ever returned by the store.
#[derive(Debug, Clone)]
pub struct MdrMargin {
    pub brand: String,
    pub modality: String,
    pub channel: String,
    pub percent: BigDecimal,
}

/// Margin configuration reads.
#[async_trait]
pub trait MarginStore: Send + Sync {
    async fn margin_config(&self, customer_id: Uuid) -> Result<Option<MarginConfig>, AppError>;

    async fn validated_mdr_margins(&self, customer_id: Uuid)
        -> Result<Vec<MdrMargin>, AppError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerRef {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

/// An active user→customer link as seen by read paths.
#[derive(Debug, Clone)]
pub struct CustomerLink {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub commission_type: Option<CommissionType>,
}

/// Consolidation input tuple: an active link with a non-null commission type.
#[derive(Debug, Clone)]
pub struct CommissionLink {
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub commission_type: CommissionType,
}

/// User/permission directory reads. Legacy free-text labels are mapped to
/// [`RoleCategory`] inside the implementation, never re-parsed downstream.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// `None` when the user does not exist.
    async fn user_role(&self, user_id: Uuid) -> Result<Option<RoleCategory>, AppError>;

    async fn active_links(&self, user_id: Uuid) -> Result<Vec<CustomerLink>, AppError>;

    async fn all_customers(&self) -> Result<Vec<CustomerRef>, AppError>;

    /// Every active link carrying a commission type, across all users.
    async fn commission_links(&self) -> Result<Vec<CommissionLink>, AppError>;
}

/// Filters for the administrative settlement listing.
#[derive(Debug, Clone, Default)]
pub struct AdminSettlementFilter {
    pub status: Option<SettlementStatus>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub user_id: Option<Uuid>,
    /// Rows owned by SUPER_ADMIN users are hidden unless the requesting
    /// viewer is one. Display scoping, not a security boundary.
    pub include_super_admin_rows: bool,
}

/// Settlement persistence, upsert-by-natural-key.
#[async_trait]
pub trait SettlementStore: Send + Sync {
    async fn find_by_key(
        &self,
        user_id: Uuid,
        customer_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<Option<MonthlySettlement>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<MonthlySettlement>, AppError>;

    async fn insert(&self, settlement: &MonthlySettlement) -> Result<(), AppError>;

    /// Refresh aggregates and status from a consolidation run. Callers are
    /// responsible for the sticky-status rule; this is a plain write.
    async fn update_consolidated(
        &self,
        id: Uuid,
        total_transactions: i64,
        total_amount: &BigDecimal,
        commission_percent: &BigDecimal,
        commission_value: &BigDecimal,
        status: SettlementStatus,
    ) -> Result<(), AppError>;

    async fn set_status(&self, id: Uuid, status: SettlementStatus) -> Result<(), AppError>;

    async fn record_payment(
        &self,
        id: Uuid,
        paid_by_user_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<MonthlySettlement>, i64), AppError>;

    async fn list_admin(
        &self,
        filter: &AdminSettlementFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<MonthlySettlement>, i64), AppError>;
}

/// Extracted fiscal-document fields recorded with a validation outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceFields {
    pub access_key: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_value: Option<BigDecimal>,
    pub issuer_cnpj: Option<String>,
    pub issuer_name: Option<String>,
}

/// Invoice persistence. At most one active invoice per settlement.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Deactivates any active invoice for the same settlement, then inserts.
    async fn insert_replacing(&self, invoice: &SettlementInvoice) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<SettlementInvoice>, AppError>;

    async fn active_for_settlement(
        &self,
        settlement_id: Uuid,
    ) -> Result<Option<SettlementInvoice>, AppError>;

    async fn record_validation(
        &self,
        id: Uuid,
        status: ValidationStatus,
        fields: InvoiceFields,
        error: Option<String>,
    ) -> Result<(), AppError>;
}
