//! In-memory store implementations backing the service tests.
//!
//! Each store mirrors the Postgres implementation's observable behavior and
//! counts data-source hits so tests can assert on lookup/caching behavior.

#![allow(dead_code)]

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use repasse_core::domain::{
    MonthlySettlement, RoleCategory, SettlementInvoice, SettlementStatus, ValidationStatus,
};
use repasse_core::error::AppError;
use repasse_core::stores::{
    AdminSettlementFilter, CommissionLink, CustomerLink, CustomerRef, DailyGroupedTotal,
    DailyTotal, Dimension, DimensionSlice, DirectoryStore, GroupedTotal, InvoiceFields,
    InvoiceStore, KpiTotals, LedgerFilter, LedgerStore, LedgerTotals, LedgerTransaction,
    MarginConfig, MarginStore, MdrMargin, SettlementStore,
};

#[derive(Default)]
pub struct MemMarginStore {
    pub configs: Mutex<HashMap<Uuid, MarginConfig>>,
    pub mdr: Mutex<HashMap<Uuid, Vec<MdrMargin>>>,
    pub config_calls: AtomicU64,
    pub mdr_calls: AtomicU64,
    /// Customers whose lookups fail, for batch-isolation tests.
    pub fail_for: Mutex<HashSet<Uuid>>,
}

impl MemMarginStore {
    pub fn with_config(self, config: MarginConfig) -> Self {
        self.configs.lock().unwrap().insert(config.customer_id, config);
        self
    }

    pub fn with_mdr(self, customer_id: Uuid, rows: Vec<MdrMargin>) -> Self {
        self.mdr.lock().unwrap().insert(customer_id, rows);
        self
    }

    pub fn lookup_count(&self) -> u64 {
        self.config_calls.load(Ordering::Relaxed) + self.mdr_calls.load(Ordering::Relaxed)
    }

    pub fn failing_for(self, customer_id: Uuid) -> Self {
        self.fail_for.lock().unwrap().insert(customer_id);
        self
    }
}

#[async_trait]
impl MarginStore for MemMarginStore {
    async fn margin_config(&self, customer_id: Uuid) -> Result<Option<MarginConfig>, AppError> {
        self.config_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_for.lock().unwrap().contains(&customer_id) {
            return Err(AppError::InternalError("margin store unavailable".to_string()));
        }
        Ok(self.configs.lock().unwrap().get(&customer_id).cloned())
    }

    async fn validated_mdr_margins(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<MdrMargin>, AppError> {
        self.mdr_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .mdr
            .lock()
            .unwrap()
            .get(&customer_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemDirectoryStore {
    pub roles: Mutex<HashMap<Uuid, RoleCategory>>,
    pub links: Mutex<HashMap<Uuid, Vec<CustomerLink>>>,
    pub customers: Mutex<Vec<CustomerRef>>,
}

impl MemDirectoryStore {
    pub fn with_user(self, user_id: Uuid, role: RoleCategory) -> Self {
        self.roles.lock().unwrap().insert(user_id, role);
        self
    }

    pub fn with_links(self, user_id: Uuid, links: Vec<CustomerLink>) -> Self {
        self.links.lock().unwrap().insert(user_id, links);
        self
    }

    pub fn with_customer(self, customer: CustomerRef) -> Self {
        self.customers.lock().unwrap().push(customer);
        self
    }
}

#[async_trait]
impl DirectoryStore for MemDirectoryStore {
    async fn user_role(&self, user_id: Uuid) -> Result<Option<RoleCategory>, AppError> {
        Ok(self.roles.lock().unwrap().get(&user_id).copied())
    }

    async fn active_links(&self, user_id: Uuid) -> Result<Vec<CustomerLink>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn all_customers(&self) -> Result<Vec<CustomerRef>, AppError> {
        Ok(self.customers.lock().unwrap().clone())
    }

    async fn commission_links(&self) -> Result<Vec<CommissionLink>, AppError> {
        let links = self.links.lock().unwrap();
        let mut out = Vec::new();
        for (user_id, user_links) in links.iter() {
            for link in user_links {
                if let Some(commission_type) = link.commission_type {
                    out.push(CommissionLink {
                        user_id: *user_id,
                        customer_id: link.customer_id,
                        commission_type,
                    });
                }
            }
        }
        Ok(out)
    }
}

#[derive(Default)]
pub struct MemLedgerStore {
    pub transactions: Mutex<Vec<LedgerTransaction>>,
    pub query_calls: AtomicU64,
}

impl MemLedgerStore {
    pub fn with_transactions(self, txs: Vec<LedgerTransaction>) -> Self {
        self.transactions.lock().unwrap().extend(txs);
        self
    }

    pub fn query_count(&self) -> u64 {
        self.query_calls.load(Ordering::Relaxed)
    }

    fn matching(&self, filter: &LedgerFilter) -> Vec<LedgerTransaction> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| {
                if let Some(ids) = &filter.customer_ids {
                    if !ids.contains(&tx.customer_id) {
                        return false;
                    }
                }
                if let Some(from) = filter.date_from {
                    if tx.occurred_at < from {
                        return false;
                    }
                }
                if let Some(to) = filter.date_to {
                    if tx.occurred_at >= to {
                        return false;
                    }
                }
                if let Some(status) = filter.status {
                    if tx.status != status.as_str() {
                        return false;
                    }
                }
                if let Some(brand) = &filter.brand {
                    if !tx.brand.to_lowercase().contains(&brand.to_lowercase()) {
                        return false;
                    }
                }
                if let Some(product) = &filter.product_label {
                    if !tx
                        .product_label
                        .to_lowercase()
                        .contains(&product.to_lowercase())
                    {
                        return false;
                    }
                }
                if let Some(mcc) = &filter.mcc {
                    if tx.mcc.as_deref() != Some(mcc.as_str()) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LedgerStore for MemLedgerStore {
    async fn approved_totals(
        &self,
        customer_id: Uuid,
        range: (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<LedgerTotals, AppError> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        let mut totals = LedgerTotals::default();
        for tx in self.transactions.lock().unwrap().iter() {
            if tx.customer_id == customer_id
                && tx.status == "authorized"
                && tx.occurred_at >= range.0
                && tx.occurred_at < range.1
            {
                totals.tx_count += 1;
                totals.total_amount += tx.amount.clone();
            }
        }
        Ok(totals)
    }

    async fn list_transactions(
        &self,
        filter: &LedgerFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<LedgerTransaction>, i64), AppError> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        let mut rows = self.matching(filter);
        rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        let total = rows.len() as i64;
        let offset = ((page.max(1) - 1) * page_size) as usize;
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();
        Ok((rows, total))
    }

    async fn grouped_totals(&self, filter: &LedgerFilter) -> Result<Vec<GroupedTotal>, AppError> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        let mut groups: HashMap<(Uuid, String, String, String), (i64, BigDecimal)> =
            HashMap::new();
        for tx in self.matching(filter) {
            let key = (
                tx.customer_id,
                tx.brand.clone(),
                tx.product_label.clone(),
                tx.channel_label.clone(),
            );
            let entry = groups.entry(key).or_insert((0, BigDecimal::from(0)));
            entry.0 += 1;
            entry.1 += tx.amount;
        }
        Ok(groups
            .into_iter()
            .map(
                |((customer_id, brand, product_label, channel_label), (tx_count, amount))| {
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
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        let mut groups: HashMap<(NaiveDate, Uuid, String, String, String), (i64, BigDecimal)> =
            HashMap::new();
        for tx in self.matching(filter) {
            let key = (
                tx.occurred_at.date_naive(),
                tx.customer_id,
                tx.brand.clone(),
                tx.product_label.clone(),
                tx.channel_label.clone(),
            );
            let entry = groups.entry(key).or_insert((0, BigDecimal::from(0)));
            entry.0 += 1;
            entry.1 += tx.amount;
        }
        Ok(groups
            .into_iter()
            .map(
                |(
                    (day, customer_id, brand, product_label, channel_label),
                    (tx_count, amount),
                )| DailyGroupedTotal {
                    day,
                    customer_id,
                    brand,
                    product_label,
                    channel_label,
                    tx_count,
                    amount,
                },
            )
            .collect())
    }

    async fn kpi_totals(&self, filter: &LedgerFilter) -> Result<KpiTotals, AppError> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        let mut totals = KpiTotals::default();
        for tx in self.matching(filter) {
            totals.total_count += 1;
            match tx.status.as_str() {
                "authorized" => {
                    totals.authorized_count += 1;
                    totals.authorized_amount += tx.amount;
                }
                "denied" => totals.denied_count += 1,
                _ => totals.pending_count += 1,
            }
        }
        Ok(totals)
    }

    async fn daily_totals(&self, filter: &LedgerFilter) -> Result<Vec<DailyTotal>, AppError> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        let mut days: HashMap<NaiveDate, (i64, BigDecimal)> = HashMap::new();
        for tx in self.matching(filter) {
            let entry = days
                .entry(tx.occurred_at.date_naive())
                .or_insert((0, BigDecimal::from(0)));
            entry.0 += 1;
            entry.1 += tx.amount;
        }
        let mut out: Vec<DailyTotal> = days
            .into_iter()
            .map(|(day, (tx_count, amount))| DailyTotal {
                day,
                tx_count,
                amount,
            })
            .collect();
        out.sort_by_key(|d| d.day);
        Ok(out)
    }

    async fn breakdown(
        &self,
        filter: &LedgerFilter,
        dimension: Dimension,
    ) -> Result<Vec<DimensionSlice>, AppError> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        let mut slices: HashMap<String, (i64, BigDecimal)> = HashMap::new();
        for tx in self.matching(filter) {
            let key = match dimension {
                Dimension::Brand => tx.brand.clone(),
                Dimension::ProductType => tx.product_label.clone(),
                Dimension::Channel => tx.channel_label.clone(),
            };
            let entry = slices.entry(key).or_insert((0, BigDecimal::from(0)));
            entry.0 += 1;
            entry.1 += tx.amount;
        }
        let mut out: Vec<DimensionSlice> = slices
            .into_iter()
            .map(|(key, (tx_count, amount))| DimensionSlice {
                key,
                tx_count,
                amount,
            })
            .collect();
        out.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(out)
    }
}

#[derive(Default)]
pub struct MemSettlementStore {
    pub rows: Mutex<Vec<MonthlySettlement>>,
    pub super_admins: Mutex<HashSet<Uuid>>,
}

impl MemSettlementStore {
    pub fn with_settlement(self, settlement: MonthlySettlement) -> Self {
        self.rows.lock().unwrap().push(settlement);
        self
    }

    pub fn with_super_admin(self, user_id: Uuid) -> Self {
        self.super_admins.lock().unwrap().insert(user_id);
        self
    }

    pub fn snapshot(&self) -> Vec<MonthlySettlement> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettlementStore for MemSettlementStore {
    async fn find_by_key(
        &self,
        user_id: Uuid,
        customer_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<Option<MonthlySettlement>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| {
                s.user_id == user_id
                    && s.customer_id == customer_id
                    && s.month == month
                    && s.year == year
                    && s.active
            })
            .cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<MonthlySettlement>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id && s.active)
            .cloned())
    }

    async fn insert(&self, settlement: &MonthlySettlement) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let exists = rows.iter().any(|s| {
            s.user_id == settlement.user_id
                && s.customer_id == settlement.customer_id
                && s.month == settlement.month
                && s.year == settlement.year
        });
        if !exists {
            rows.push(settlement.clone());
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
        let mut rows = self.rows.lock().unwrap();
        if let Some(s) = rows.iter_mut().find(|s| s.id == id) {
            s.total_transactions = total_transactions;
            s.total_amount = total_amount.clone();
            s.commission_percent = commission_percent.clone();
            s.commission_value = commission_value.clone();
            s.status = status;
            s.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: SettlementStatus) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(s) = rows.iter_mut().find(|s| s.id == id) {
            s.status = status;
            s.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn record_payment(
        &self,
        id: Uuid,
        paid_by_user_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(s) = rows.iter_mut().find(|s| s.id == id) {
            s.status = SettlementStatus::Paid;
            s.paid_at = Some(paid_at);
            s.paid_by_user_id = Some(paid_by_user_id);
            s.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<MonthlySettlement>, i64), AppError> {
        let mut rows: Vec<MonthlySettlement> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id && s.active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        let total = rows.len() as i64;
        let offset = ((page.max(1) - 1) * page_size) as usize;
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();
        Ok((rows, total))
    }

    async fn list_admin(
        &self,
        filter: &AdminSettlementFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<MonthlySettlement>, i64), AppError> {
        let super_admins = self.super_admins.lock().unwrap().clone();
        let mut rows: Vec<MonthlySettlement> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                if !s.active {
                    return false;
                }
                if let Some(status) = filter.status {
                    if s.status != status {
                        return false;
                    }
                }
                if let Some(month) = filter.month {
                    if s.month != month {
                        return false;
                    }
                }
                if let Some(year) = filter.year {
                    if s.year != year {
                        return false;
                    }
                }
                if let Some(user_id) = filter.user_id {
                    if s.user_id != user_id {
                        return false;
                    }
                }
                if !filter.include_super_admin_rows && super_admins.contains(&s.user_id) {
                    return false;
                }
                true
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        let total = rows.len() as i64;
        let offset = ((page.max(1) - 1) * page_size) as usize;
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();
        Ok((rows, total))
    }
}

#[derive(Default)]
pub struct MemInvoiceStore {
    pub rows: Mutex<Vec<SettlementInvoice>>,
}

impl MemInvoiceStore {
    pub fn snapshot(&self) -> Vec<SettlementInvoice> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl InvoiceStore for MemInvoiceStore {
    async fn insert_replacing(&self, invoice: &SettlementInvoice) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.settlement_id == invoice.settlement_id && row.active {
                row.active = false;
            }
        }
        rows.push(invoice.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SettlementInvoice>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn active_for_settlement(
        &self,
        settlement_id: Uuid,
    ) -> Result<Option<SettlementInvoice>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|i| i.settlement_id == settlement_id && i.active)
            .max_by_key(|i| i.created_at)
            .cloned())
    }

    async fn record_validation(
        &self,
        id: Uuid,
        status: ValidationStatus,
        fields: InvoiceFields,
        error: Option<String>,
    ) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(i) = rows.iter_mut().find(|i| i.id == id) {
            i.validation_status = status;
            i.access_key = fields.access_key;
            i.invoice_number = fields.invoice_number;
            i.invoice_value = fields.invoice_value;
            i.issuer_cnpj = fields.issuer_cnpj;
            i.issuer_name = fields.issuer_name;
            i.validation_error = error;
        }
        Ok(())
    }
}

/// Authorized POS transaction on the given UTC day.
pub fn approved_tx(customer_id: Uuid, day: (i32, u32, u32), amount: i64) -> LedgerTransaction {
    tx(customer_id, day, amount, "authorized")
}

pub fn tx(
    customer_id: Uuid,
    day: (i32, u32, u32),
    amount: i64,
    status: &str,
) -> LedgerTransaction {
    LedgerTransaction {
        slug: Uuid::new_v4().to_string(),
        occurred_at: Utc
            .with_ymd_and_hms(day.0, day.1, day.2, 12, 0, 0)
            .unwrap(),
        merchant_ref: "merchant-1".to_string(),
        customer_id,
        brand: "Visa".to_string(),
        product_label: "Credito a vista".to_string(),
        channel_label: "POS".to_string(),
        amount: BigDecimal::from(amount),
        status: status.to_string(),
        mcc: None,
    }
}

pub fn link(customer_id: Uuid, name: &str, commission_type: Option<&str>) -> CustomerLink {
    CustomerLink {
        customer_id,
        customer_name: name.to_string(),
        commission_type: commission_type
            .and_then(repasse_core::domain::CommissionType::from_label),
    }
}

pub fn margin_config(
    customer_id: Uuid,
    outbank: Option<&str>,
    executivo: Option<&str>,
    core: Option<&str>,
) -> MarginConfig {
    let parse = |v: Option<&str>| v.map(|s| repasse_core::domain::parse_decimal(s).unwrap());
    MarginConfig {
        customer_id,
        margin_outbank: parse(outbank),
        margin_executivo: parse(executivo),
        margin_core: parse(core),
    }
}
